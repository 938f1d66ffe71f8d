//! Response envelope for the API

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How the server resolved a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    /// The request completed before the response was sent.
    Sync,
    /// The request spawned a background operation; metadata describes it.
    Async,
    /// The request failed; `error` and `error_code` carry the details.
    Error,
}

/// Body shared by every JSON response from the daemon.
///
/// `ETag` and `Location` travel in HTTP headers, not in the envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    /// Human-readable status, e.g. "Success".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<i64>,
    /// Response payload; an empty object when the server sends none.
    #[serde(default = "empty_metadata")]
    pub metadata: Value,
    /// Error message, only present on error responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<u16>,
}

fn empty_metadata() -> Value {
    Value::Object(serde_json::Map::new())
}

impl Envelope {
    /// Build a successful synchronous envelope around `metadata`.
    pub fn sync(metadata: Value) -> Self {
        Self {
            response_type: ResponseType::Sync,
            status: Some("Success".to_string()),
            status_code: Some(200),
            metadata,
            error: None,
            error_code: None,
        }
    }

    /// Build a background-operation envelope around `metadata`.
    pub fn background(metadata: Value) -> Self {
        Self {
            response_type: ResponseType::Async,
            status: Some("Operation created".to_string()),
            status_code: Some(100),
            metadata,
            error: None,
            error_code: None,
        }
    }

    /// Build an error envelope with the given message and code.
    pub fn failure(error: impl Into<String>, code: u16) -> Self {
        Self {
            response_type: ResponseType::Error,
            status: None,
            status_code: None,
            metadata: Value::Object(serde_json::Map::new()),
            error: Some(error.into()),
            error_code: Some(code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_sync() {
        let envelope: Envelope = serde_json::from_value(json!({
            "type": "sync",
            "status": "Success",
            "status_code": 200,
            "metadata": {"some": "content"},
        }))
        .unwrap();
        assert_eq!(envelope.response_type, ResponseType::Sync);
        assert_eq!(envelope.metadata, json!({"some": "content"}));
        assert!(envelope.error.is_none());
    }

    #[test]
    fn test_deserialize_missing_metadata() {
        let envelope: Envelope =
            serde_json::from_value(json!({"type": "async"})).unwrap();
        assert_eq!(envelope.response_type, ResponseType::Async);
        assert_eq!(envelope.metadata, json!({}));
    }

    #[test]
    fn test_deserialize_error() {
        let envelope: Envelope = serde_json::from_value(json!({
            "type": "error",
            "error": "not found",
            "error_code": 404,
        }))
        .unwrap();
        assert_eq!(envelope.response_type, ResponseType::Error);
        assert_eq!(envelope.error.as_deref(), Some("not found"));
        assert_eq!(envelope.error_code, Some(404));
    }

    #[test]
    fn test_constructors() {
        let envelope = Envelope::sync(json!(["/containers/c"]));
        assert_eq!(envelope.response_type, ResponseType::Sync);
        assert_eq!(envelope.metadata, json!(["/containers/c"]));

        let envelope = Envelope::failure("boom", 500);
        assert_eq!(envelope.response_type, ResponseType::Error);
        assert_eq!(envelope.error_code, Some(500));
    }

    #[test]
    fn test_roundtrip() {
        let envelope = Envelope::background(json!({"id": "op"}));
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["type"], "async");
        let back: Envelope = serde_json::from_value(value).unwrap();
        assert_eq!(back.response_type, ResponseType::Async);
        assert_eq!(back.metadata, json!({"id": "op"}));
    }
}
