//! Testing utilities for unary calls
//!
//! [`RecordingHttpTransport`] answers every request from a queue of canned
//! responses and records what was asked.

use crate::http::{HttpRequest, HttpTransport};
use async_trait::async_trait;
use mercury_core::{Error, Result};
use mercury_wire::JsonValue;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

#[derive(Default)]
struct Recording {
    requests: Vec<HttpRequest>,
    responses: VecDeque<Result<JsonValue>>,
}

/// In-memory [`HttpTransport`].
///
/// Clones share state. With no canned response queued, requests fail with a
/// transport error.
#[derive(Clone, Default)]
pub struct RecordingHttpTransport {
    recording: Arc<Mutex<Recording>>,
}

impl RecordingHttpTransport {
    /// Create a transport with no canned responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response body.
    pub fn respond(&self, body: JsonValue) {
        self.recording.lock().responses.push_back(Ok(body));
    }

    /// Queue a failure.
    pub fn fail(&self, error: Error) {
        self.recording.lock().responses.push_back(Err(error));
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.recording.lock().requests.clone()
    }
}

impl std::fmt::Debug for RecordingHttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let recording = self.recording.lock();
        f.debug_struct("RecordingHttpTransport")
            .field("requests", &recording.requests.len())
            .field("queued", &recording.responses.len())
            .finish()
    }
}

#[async_trait]
impl HttpTransport for RecordingHttpTransport {
    async fn request(&self, request: HttpRequest) -> Result<JsonValue> {
        let mut recording = self.recording.lock();
        recording.requests.push(request);
        recording
            .responses
            .pop_front()
            .unwrap_or_else(|| Err(Error::transport("no response queued")))
    }
}
