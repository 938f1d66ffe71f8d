//! Transport seam between the entity layer and the wire

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{ClientError, Result};

/// HTTP methods the API uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request body: JSON content or a binary upload, never both.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Json(Value),
    Bytes(Vec<u8>),
}

/// A single outbound call.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub path: String,
    /// Query string parameters.
    pub params: Vec<(String, String)>,
    /// Headers, with derived Content-Type already applied.
    pub headers: Vec<(String, String)>,
    pub body: Option<Body>,
}

impl TransportRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Apply the request body and the content-type it implies.
    ///
    /// `content` sets `application/json`, `upload` sets
    /// `application/octet-stream`; the derived header overrides any
    /// caller-supplied Content-Type. Supplying both is an error.
    pub fn with_body(
        mut self,
        content: Option<Value>,
        upload: Option<Vec<u8>>,
    ) -> Result<Self> {
        match (content, upload) {
            (Some(_), Some(_)) => Err(ClientError::InvalidRequest(
                "content and upload are mutually exclusive".to_string(),
            )),
            (Some(content), None) => {
                self.set_header("Content-Type", "application/json");
                self.body = Some(Body::Json(content));
                Ok(self)
            }
            (None, Some(upload)) => {
                self.set_header("Content-Type", "application/octet-stream");
                self.body = Some(Body::Bytes(upload));
                Ok(self)
            }
            (None, None) => Ok(self),
        }
    }

    pub fn with_params(mut self, params: Vec<(String, String)>) -> Self {
        self.params = params;
        self
    }

    pub fn with_headers(mut self, headers: Vec<(String, String)>) -> Self {
        for (name, value) in headers {
            self.set_header_owned(name, value);
        }
        self
    }

    /// Look up a header, ignoring name case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(header, _)| header.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    fn set_header(&mut self, name: &str, value: &str) {
        self.set_header_owned(name.to_string(), value.to_string());
    }

    fn set_header_owned(&mut self, name: String, value: String) {
        if let Some(entry) = self
            .headers
            .iter_mut()
            .find(|(header, _)| header.eq_ignore_ascii_case(&name))
        {
            entry.1 = value;
        } else {
            self.headers.push((name, value));
        }
    }
}

/// Decoded response content.
#[derive(Debug, Clone)]
pub enum Content {
    Json(Value),
    /// Non-JSON payload, e.g. an exported image.
    Binary(Vec<u8>),
}

/// What came back from a successful (2xx) call.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub content: Content,
}

impl TransportResponse {
    /// Look up a header, ignoring name case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(header, _)| header.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// One outbound call against the daemon.
///
/// Implementations fail with [`ClientError::Api`] on non-2xx outcomes,
/// recovering `error_code`/`error` from a JSON error body when present.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse>;
}
