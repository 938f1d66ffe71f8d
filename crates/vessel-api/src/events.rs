//! Event types delivered over the events WebSocket

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single event frame from the daemon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Event class, e.g. "operation", "logging", "lifecycle".
    #[serde(rename = "type")]
    pub event_type: String,
    pub timestamp: DateTime<Utc>,
    /// Event payload; shape depends on `event_type`.
    #[serde(default)]
    pub metadata: Value,
}
