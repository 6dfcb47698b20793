//! The transport seam.
//!
//! A [`Transport`] moves one GraphQL request to an endpoint and brings back the
//! decoded JSON body. It does not look inside the body: deciding what `data`
//! and `errors` mean is left to the envelope parser and the hydrator.

use crate::config::EndpointConfig;
use crate::error::TransportError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Ordered variable values for one execution.
pub type Variables = Map<String, Value>;

/// A GraphQL-over-HTTP request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlRequest {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<Variables>,
}

impl GraphqlRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            operation_name: None,
            variables: None,
        }
    }

    pub fn operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    pub fn variables(mut self, variables: Variables) -> Self {
        self.variables = Some(variables);
        self
    }
}

/// The decoded body of a successful (2xx) exchange, untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Value,
}

impl RawResponse {
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }
}

/// Sends GraphQL requests.
///
/// Implementations perform exactly one exchange per call and never retry.
/// Timeouts must surface as [`TransportError::Timeout`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        config: &EndpointConfig,
        request: &GraphqlRequest,
    ) -> Result<RawResponse, TransportError>;
}
