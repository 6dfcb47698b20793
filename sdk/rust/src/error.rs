//! Error taxonomy for operation execution.
//!
//! Callers usually need to answer one of three questions about a failure:
//! - did the server report a problem? ([`OperationError::is_graphql`])
//! - is the response out of line with the generated code? ([`OperationError::is_schema_drift`])
//! - did the network fail? ([`OperationError::is_retryable`])
//!
//! Every error also carries a stable [`ErrorCode`].

use gqlop_runtime::{GraphqlError, HydrationError, MalformedEnvelope};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;
use std::time::Duration;
use thiserror::Error;

/// Typed error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorCode {
    // Configuration errors
    UnknownEndpoint,
    DuplicateEndpoint,
    InvalidConfig,

    // Transport errors
    ConnectionFailed,
    Timeout,
    HttpError,
    InvalidUrl,
    UnsupportedScheme,
    InvalidResponse,
    NetworkError,

    // Protocol errors
    MalformedEnvelope,

    // GraphQL errors
    GraphqlErrors,
    NoData,

    // Hydration errors
    ScalarCoercion,
    UnexpectedNull,
    TypeMismatch,
    MissingField,
    UnknownVariant,

    // Serialization errors
    SerializeError,
    DeserializeError,
}

impl ErrorCode {
    /// Returns the string representation of the error code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::UnknownEndpoint => "UNKNOWN_ENDPOINT",
            Self::DuplicateEndpoint => "DUPLICATE_ENDPOINT",
            Self::InvalidConfig => "INVALID_CONFIG",
            Self::ConnectionFailed => "CONNECTION_FAILED",
            Self::Timeout => "TIMEOUT",
            Self::HttpError => "HTTP_ERROR",
            Self::InvalidUrl => "INVALID_URL",
            Self::UnsupportedScheme => "UNSUPPORTED_SCHEME",
            Self::InvalidResponse => "INVALID_RESPONSE",
            Self::NetworkError => "NETWORK_ERROR",
            Self::MalformedEnvelope => "MALFORMED_ENVELOPE",
            Self::GraphqlErrors => "GRAPHQL_ERRORS",
            Self::NoData => "NO_DATA",
            Self::ScalarCoercion => "SCALAR_COERCION",
            Self::UnexpectedNull => "UNEXPECTED_NULL",
            Self::TypeMismatch => "TYPE_MISMATCH",
            Self::MissingField => "MISSING_FIELD",
            Self::UnknownVariant => "UNKNOWN_VARIANT",
            Self::SerializeError => "SERIALIZE_ERROR",
            Self::DeserializeError => "DESERIALIZE_ERROR",
        }
    }

    /// Returns true if retrying the same request may succeed.
    ///
    /// Nothing in this crate retries; this only informs caller policy.
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed | Self::Timeout | Self::NetworkError
        )
    }

    /// Returns true if the payload did not match the declared result shape.
    pub const fn is_schema_drift(&self) -> bool {
        matches!(
            self,
            Self::ScalarCoercion
                | Self::UnexpectedNull
                | Self::TypeMismatch
                | Self::MissingField
                | Self::UnknownVariant
                | Self::DeserializeError
        )
    }

    /// Returns true for configuration mistakes detected before sending.
    pub const fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownEndpoint | Self::DuplicateEndpoint | Self::InvalidConfig
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Endpoint registration and lookup failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("endpoint `{0}` is not registered")]
    UnknownEndpoint(String),

    #[error("endpoint `{0}` is already registered")]
    DuplicateEndpoint(String),

    #[error("invalid endpoint configuration: {0}")]
    InvalidConfig(String),
}

impl RegistryError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::UnknownEndpoint(_) => ErrorCode::UnknownEndpoint,
            Self::DuplicateEndpoint(_) => ErrorCode::DuplicateEndpoint,
            Self::InvalidConfig(_) => ErrorCode::InvalidConfig,
        }
    }
}

/// Failures while talking to an endpoint.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("connection to {address} failed: {message}")]
    Connect { address: String, message: String },

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP error: status {status}")]
    HttpStatus { status: u16, body: String },

    #[error("response body is not valid JSON: {0}")]
    MalformedBody(String),

    #[error("invalid endpoint URL `{0}`")]
    InvalidUrl(String),

    #[error("unsupported URL scheme in `{0}`, only http:// is supported")]
    UnsupportedScheme(String),

    #[error("invalid HTTP response: {0}")]
    InvalidResponse(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("failed to serialize request: {0}")]
    Serialize(String),
}

impl TransportError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Connect { .. } => ErrorCode::ConnectionFailed,
            Self::Timeout(_) => ErrorCode::Timeout,
            Self::HttpStatus { .. } => ErrorCode::HttpError,
            Self::MalformedBody(_) | Self::InvalidResponse(_) => ErrorCode::InvalidResponse,
            Self::InvalidUrl(_) => ErrorCode::InvalidUrl,
            Self::UnsupportedScheme(_) => ErrorCode::UnsupportedScheme,
            Self::Io(_) => ErrorCode::NetworkError,
            Self::Serialize(_) => ErrorCode::SerializeError,
        }
    }
}

/// A non-empty list of server-reported errors, in reporting order.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphqlErrors(Vec<GraphqlError>);

impl GraphqlErrors {
    pub fn new(errors: Vec<GraphqlError>) -> Self {
        debug_assert!(!errors.is_empty());
        Self(errors)
    }

    pub fn into_inner(self) -> Vec<GraphqlError> {
        self.0
    }
}

impl Deref for GraphqlErrors {
    type Target = [GraphqlError];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for GraphqlErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [] => f.write_str("no errors"),
            [only] => write!(f, "{only}"),
            [first, rest @ ..] => write!(f, "{first} (and {} more)", rest.len()),
        }
    }
}

impl std::error::Error for GraphqlErrors {}

/// Why an operation ended in the `Failed` state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OperationError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("transport failed: {0}")]
    Transport(#[from] TransportError),

    #[error("malformed response: {0}")]
    Envelope(#[from] MalformedEnvelope),

    /// The server reported errors and returned no usable data.
    #[error("server returned errors: {0}")]
    Graphql(GraphqlErrors),

    /// The data does not match the declared shape. `errors` holds any server
    /// errors that accompanied the data, since they often explain the mismatch.
    #[error("response does not match the declared shape: {source}")]
    Hydration {
        #[source]
        source: HydrationError,
        errors: Vec<GraphqlError>,
    },

    #[error("response contained neither data nor errors")]
    NoData,

    #[error("variables must serialize to a JSON object: {0}")]
    InvalidVariables(String),

    #[error("failed to deserialize hydrated data: {0}")]
    Deserialize(String),
}

impl OperationError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Registry(e) => e.code(),
            Self::Transport(e) => e.code(),
            Self::Envelope(_) => ErrorCode::MalformedEnvelope,
            Self::Graphql(_) => ErrorCode::GraphqlErrors,
            Self::Hydration { source, .. } => match source {
                HydrationError::ScalarCoercion { .. } => ErrorCode::ScalarCoercion,
                HydrationError::UnexpectedNull { .. } => ErrorCode::UnexpectedNull,
                HydrationError::TypeMismatch { .. } => ErrorCode::TypeMismatch,
                HydrationError::MissingField { .. } => ErrorCode::MissingField,
                HydrationError::UnknownVariant { .. } => ErrorCode::UnknownVariant,
            },
            Self::NoData => ErrorCode::NoData,
            Self::InvalidVariables(_) => ErrorCode::SerializeError,
            Self::Deserialize(_) => ErrorCode::DeserializeError,
        }
    }

    /// Server-reported errors attached to this failure, if any.
    pub fn graphql_errors(&self) -> &[GraphqlError] {
        match self {
            Self::Graphql(errors) => errors.0.as_slice(),
            Self::Hydration { errors, .. } => errors.as_slice(),
            _ => &[],
        }
    }

    pub fn hydration_error(&self) -> Option<&HydrationError> {
        match self {
            Self::Hydration { source, .. } => Some(source),
            _ => None,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.code().is_retryable()
    }

    pub fn is_schema_drift(&self) -> bool {
        self.code().is_schema_drift()
    }

    pub fn is_graphql(&self) -> bool {
        matches!(self, Self::Graphql(_))
    }
}

impl Serialize for OperationError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let errors = self.graphql_errors();
        let mut state = serializer.serialize_struct("OperationError", 3)?;
        state.serialize_field("code", &self.code())?;
        state.serialize_field("message", &self.to_string())?;
        if !errors.is_empty() {
            state.serialize_field("errors", errors)?;
        }
        state.end()
    }
}

/// Type alias for operation results.
pub type OperationResult<T> = std::result::Result<T, OperationError>;

#[cfg(test)]
mod tests {
    use super::*;
    use gqlop_runtime::ResponsePath;

    #[test]
    fn test_error_code_properties() {
        assert!(ErrorCode::Timeout.is_retryable());
        assert!(ErrorCode::ConnectionFailed.is_retryable());
        assert!(!ErrorCode::HttpError.is_retryable());
        assert!(!ErrorCode::GraphqlErrors.is_retryable());

        assert!(ErrorCode::MissingField.is_schema_drift());
        assert!(!ErrorCode::MalformedEnvelope.is_schema_drift());

        assert!(ErrorCode::UnknownEndpoint.is_config_error());
        assert_eq!(ErrorCode::UnknownVariant.to_string(), "UNKNOWN_VARIANT");
    }

    #[test]
    fn test_categories_are_distinct() {
        let graphql = OperationError::Graphql(GraphqlErrors::new(vec![GraphqlError::new("boom")]));
        let drift = OperationError::Hydration {
            source: HydrationError::UnexpectedNull {
                path: ResponsePath::root().child("a"),
            },
            errors: vec![],
        };
        let network = OperationError::from(TransportError::Timeout(Duration::from_secs(1)));

        assert!(graphql.is_graphql() && !graphql.is_schema_drift() && !graphql.is_retryable());
        assert!(!drift.is_graphql() && drift.is_schema_drift() && !drift.is_retryable());
        assert!(!network.is_graphql() && !network.is_schema_drift() && network.is_retryable());
    }

    #[test]
    fn test_display() {
        let err = OperationError::Graphql(GraphqlErrors::new(vec![
            GraphqlError::new("first").with_path(ResponsePath::root().child("a")),
            GraphqlError::new("second"),
        ]));
        insta::assert_snapshot!(err.to_string(), @"server returned errors: first (at a) (and 1 more)");

        let err = OperationError::from(RegistryError::UnknownEndpoint("simple".into()));
        insta::assert_snapshot!(err.to_string(), @"endpoint `simple` is not registered");
    }

    #[test]
    fn test_error_serialization() {
        let err = OperationError::Graphql(GraphqlErrors::new(vec![GraphqlError::new("boom")]));
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "GRAPHQL_ERRORS");
        assert_eq!(json["errors"][0]["message"], "boom");

        let json = serde_json::to_value(OperationError::NoData).unwrap();
        assert_eq!(json["code"], "NO_DATA");
        assert!(json.get("errors").is_none());
    }
}
