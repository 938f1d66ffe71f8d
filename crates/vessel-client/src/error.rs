//! Error types for the vessel client

use thiserror::Error;

use crate::registry::ResourceKind;

/// Errors that can occur when using the vessel client
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// WebSocket error
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The API returned an error, either as a non-2xx status or as an
    /// error envelope
    #[error("API request failed with {code}: {message}")]
    Api {
        /// Error code from the response body, or the HTTP status code
        code: u16,
        /// Error message from the server
        message: String,
    },

    /// Field access on an entity with no cached details
    #[error("no cached details: call read() first")]
    NotLoaded,

    /// Cached details do not contain the requested field
    #[error("no such field: {0}")]
    MissingField(String),

    /// Rename on a resource kind that does not support it
    #[error("{0} resources cannot be renamed")]
    RenameUnsupported(ResourceKind),

    /// A typed wrapper was constructed over an entity of another kind
    #[error("expected a {expected} entity, got {actual}")]
    WrongKind {
        expected: ResourceKind,
        actual: ResourceKind,
    },

    /// The request cannot be expressed on the wire
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The response payload has an unexpected shape
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
