//! Request lifecycle events.
//!
//! An endpoint may carry an [`EventHandler`] that observes every request sent
//! to it, e.g. to record metrics or dump traffic while debugging.

use crate::transport::{GraphqlRequest, RawResponse};
use std::sync::Arc;

/// Something that happened while executing an operation.
#[derive(Debug, Clone, Copy)]
pub enum Event<'a> {
    /// About to hand the request to the transport.
    StartRequest {
        endpoint: &'a str,
        request: &'a GraphqlRequest,
    },
    /// The transport returned a decoded body.
    ReceiveResponse {
        endpoint: &'a str,
        response: &'a RawResponse,
    },
}

impl Event<'_> {
    pub fn endpoint(&self) -> &str {
        match self {
            Self::StartRequest { endpoint, .. } | Self::ReceiveResponse { endpoint, .. } => *endpoint,
        }
    }
}

/// Callback receiving [`Event`]s. Must not block.
pub type EventHandler = Arc<dyn Fn(&Event<'_>) + Send + Sync>;
