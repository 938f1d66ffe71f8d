//! Classified API responses

use serde_json::{Map, Value, json};

use vessel_api::envelope::{Envelope, ResponseType};

use crate::error::Result;
use crate::transport::{Content, TransportResponse};

/// How the server resolved the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// Completed before the response was sent.
    Sync,
    /// A background operation was spawned; metadata describes it.
    Async,
    /// The envelope carries an error.
    Error,
    /// Binary payload, no envelope.
    Raw,
}

impl ResponseKind {
    fn as_str(&self) -> &'static str {
        match self {
            ResponseKind::Sync => "sync",
            ResponseKind::Async => "async",
            ResponseKind::Error => "error",
            ResponseKind::Raw => "raw",
        }
    }
}

/// Normalized result of one API call. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    http_code: u16,
    etag: Option<String>,
    location: Option<String>,
    kind: ResponseKind,
    metadata: Value,
    raw: Option<Vec<u8>>,
    error: Option<String>,
    error_code: Option<u16>,
}

impl ApiResponse {
    /// Classify a transport response.
    ///
    /// Binary content yields a `Raw` response with no metadata; JSON content
    /// is decoded as an [`Envelope`] and classified by its `type` field.
    pub fn classify(response: TransportResponse) -> Result<Self> {
        let etag = response.header("ETag").map(str::to_string);
        let location = response.header("Location").map(str::to_string);
        match response.content {
            Content::Binary(bytes) => Ok(Self {
                http_code: response.status,
                etag,
                location,
                kind: ResponseKind::Raw,
                metadata: Value::Object(Map::new()),
                raw: Some(bytes),
                error: None,
                error_code: None,
            }),
            Content::Json(value) => {
                let envelope: Envelope = serde_json::from_value(value)?;
                let kind = match envelope.response_type {
                    ResponseType::Sync => ResponseKind::Sync,
                    ResponseType::Async => ResponseKind::Async,
                    ResponseType::Error => ResponseKind::Error,
                };
                Ok(Self {
                    http_code: response.status,
                    etag,
                    location,
                    kind,
                    metadata: envelope.metadata,
                    raw: None,
                    error: envelope.error,
                    error_code: envelope.error_code,
                })
            }
        }
    }

    pub fn http_code(&self) -> u16 {
        self.http_code
    }

    pub fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn kind(&self) -> ResponseKind {
        self.kind
    }

    /// Envelope metadata; an empty object for raw responses.
    pub fn metadata(&self) -> &Value {
        &self.metadata
    }

    /// Binary payload of a raw response.
    pub fn bytes(&self) -> Option<&[u8]> {
        self.raw.as_deref()
    }

    /// Error message from an error envelope.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Error code from an error envelope.
    pub fn error_code(&self) -> Option<u16> {
        self.error_code
    }

    /// Deterministic key-sorted rendering for diagnostics.
    ///
    /// Not protocol-significant; the raw payload is rendered as its length.
    pub fn render(&self) -> String {
        let metadata = match &self.raw {
            Some(bytes) => json!(format!("<{} raw bytes>", bytes.len())),
            None => self.metadata.clone(),
        };
        let data = json!({
            "http-code": self.http_code,
            "etag": self.etag,
            "location": self.location,
            "type": self.kind.as_str(),
            "metadata": metadata,
        });
        // serde_json maps are sorted by key, so this is stable.
        serde_json::to_string_pretty(&data).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn transport_response(
        status: u16,
        headers: Vec<(String, String)>,
        content: Value,
    ) -> TransportResponse {
        TransportResponse {
            status,
            headers,
            content: Content::Json(content),
        }
    }

    #[test]
    fn test_classify_sync() {
        let response = ApiResponse::classify(transport_response(
            200,
            vec![("ETag".to_string(), "abcde".to_string())],
            json!({"type": "sync", "metadata": {"some": "content"}}),
        ))
        .unwrap();
        assert_eq!(response.http_code(), 200);
        assert_eq!(response.etag(), Some("abcde"));
        assert_eq!(response.kind(), ResponseKind::Sync);
        assert_eq!(response.metadata(), &json!({"some": "content"}));
    }

    #[test]
    fn test_classify_async_with_location() {
        let response = ApiResponse::classify(transport_response(
            202,
            vec![("Location".to_string(), "/operations/op".to_string())],
            json!({"type": "async", "metadata": {"id": "op"}}),
        ))
        .unwrap();
        assert_eq!(response.kind(), ResponseKind::Async);
        assert_eq!(response.location(), Some("/operations/op"));
    }

    #[test]
    fn test_classify_header_lookup_ignores_case() {
        let response = ApiResponse::classify(transport_response(
            200,
            vec![("etag".to_string(), "abcde".to_string())],
            json!({"type": "sync"}),
        ))
        .unwrap();
        assert_eq!(response.etag(), Some("abcde"));
    }

    #[test]
    fn test_classify_missing_metadata_defaults_empty() {
        let response = ApiResponse::classify(transport_response(
            200,
            vec![],
            json!({"type": "sync"}),
        ))
        .unwrap();
        assert_eq!(response.metadata(), &json!({}));
    }

    #[test]
    fn test_classify_raw() {
        let response = ApiResponse::classify(TransportResponse {
            status: 200,
            headers: vec![],
            content: Content::Binary(vec![1, 2, 3]),
        })
        .unwrap();
        assert_eq!(response.kind(), ResponseKind::Raw);
        assert_eq!(response.bytes(), Some(&[1u8, 2, 3][..]));
        assert_eq!(response.metadata(), &json!({}));
    }

    #[test]
    fn test_render_sorted() {
        let response = ApiResponse::classify(transport_response(
            200,
            vec![
                ("ETag".to_string(), "abcde".to_string()),
                ("Location".to_string(), "/some/url".to_string()),
            ],
            json!({"type": "sync", "metadata": {"some": "content"}}),
        ))
        .unwrap();
        let rendered = response.render();
        let etag_at = rendered.find("\"etag\"").unwrap();
        let code_at = rendered.find("\"http-code\"").unwrap();
        let location_at = rendered.find("\"location\"").unwrap();
        let metadata_at = rendered.find("\"metadata\"").unwrap();
        let type_at = rendered.find("\"type\"").unwrap();
        assert!(etag_at < code_at);
        assert!(code_at < location_at);
        assert!(location_at < metadata_at);
        assert!(metadata_at < type_at);
        assert!(rendered.contains("\"abcde\""));
    }
}
