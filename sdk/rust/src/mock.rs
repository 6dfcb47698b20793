//! A scripted transport for tests.
//!
//! ```ignore
//! let transport = Arc::new(MockTransport::new());
//! transport.push_json(json!({"data": {"singleObject": {"value": "hello"}}}));
//!
//! let mut registry = EndpointRegistry::new();
//! registry.register_with_transport("simple", EndpointConfig::new("http://mock"), transport.clone())?;
//! ```

use crate::config::EndpointConfig;
use crate::error::TransportError;
use crate::transport::{GraphqlRequest, RawResponse, Transport};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Replays queued responses in order and records every request it sees.
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<RawResponse, TransportError>>>,
    requests: Mutex<Vec<GraphqlRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a 200 response with the given body.
    pub fn push_json(&self, body: Value) -> &Self {
        self.push_response(RawResponse::ok(body))
    }

    pub fn push_response(&self, response: RawResponse) -> &Self {
        lock(&self.responses).push_back(Ok(response));
        self
    }

    pub fn push_error(&self, error: TransportError) -> &Self {
        lock(&self.responses).push_back(Err(error));
        self
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<GraphqlRequest> {
        lock(&self.requests).clone()
    }

    /// Number of queued responses not yet consumed.
    pub fn pending(&self) -> usize {
        lock(&self.responses).len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(
        &self,
        _config: &EndpointConfig,
        request: &GraphqlRequest,
    ) -> Result<RawResponse, TransportError> {
        lock(&self.requests).push(request.clone());
        let next = lock(&self.responses).pop_front();
        next.unwrap_or_else(|| Err(TransportError::Io("no response queued in MockTransport".into())))
    }
}

// A panicking test must not cascade into unrelated assertions.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
