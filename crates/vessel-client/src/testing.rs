//! Test doubles for the transport seam
//!
//! A scripted transport standing in for the daemon: tests queue responses
//! and assert on the recorded calls afterwards.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::Value;

use vessel_api::envelope::Envelope;

use crate::error::{ClientError, Result};
use crate::transport::{Content, Transport, TransportRequest, TransportResponse};

enum Scripted {
    Response(TransportResponse),
    Error { code: u16, message: String },
}

#[derive(Default)]
struct FakeState {
    responses: VecDeque<Scripted>,
    calls: Vec<TransportRequest>,
}

/// Scripted [`Transport`]: hands out queued responses in order and records
/// every request it sees.
#[derive(Default)]
pub struct FakeTransport {
    state: Mutex<FakeState>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a JSON response with the given status and no extra headers.
    pub fn push(&self, status: u16, body: Value) {
        self.push_with_headers(status, &[], body);
    }

    /// Queue a JSON response with extra headers (e.g. ETag, Location).
    pub fn push_with_headers(&self, status: u16, headers: &[(&str, &str)], body: Value) {
        self.push_scripted(Scripted::Response(TransportResponse {
            status,
            headers: headers
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            content: Content::Json(body),
        }));
    }

    /// Queue a 200 sync envelope around `metadata`.
    pub fn push_sync(&self, metadata: Value) {
        self.push_sync_with_headers(metadata, &[]);
    }

    /// Queue a 200 sync envelope around `metadata`, with extra headers.
    pub fn push_sync_with_headers(&self, metadata: Value, headers: &[(&str, &str)]) {
        let body = serde_json::to_value(Envelope::sync(metadata)).unwrap_or_default();
        self.push_with_headers(200, headers, body);
    }

    /// Queue a 202 async envelope with the operation's Location header.
    pub fn push_async(&self, location: &str, metadata: Value) {
        let body = serde_json::to_value(Envelope::background(metadata)).unwrap_or_default();
        self.push_with_headers(202, &[("Location", location)], body);
    }

    /// Queue a binary (raw) response.
    pub fn push_binary(&self, bytes: Vec<u8>) {
        self.push_scripted(Scripted::Response(TransportResponse {
            status: 200,
            headers: Vec::new(),
            content: Content::Binary(bytes),
        }));
    }

    /// Queue a transport-level failure.
    pub fn push_error(&self, code: u16, message: &str) {
        self.push_scripted(Scripted::Error {
            code,
            message: message.to_string(),
        });
    }

    /// Requests seen so far, in order.
    pub fn calls(&self) -> Vec<TransportRequest> {
        self.lock_state().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock_state().calls.len()
    }

    fn push_scripted(&self, scripted: Scripted) {
        self.lock_state().responses.push_back(scripted);
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        let mut state = self.lock_state();
        state.calls.push(request);
        match state.responses.pop_front() {
            Some(Scripted::Response(response)) => Ok(response),
            Some(Scripted::Error { code, message }) => {
                Err(ClientError::Api { code, message })
            }
            None => Err(ClientError::InvalidResponse(
                "no scripted response left".to_string(),
            )),
        }
    }
}
