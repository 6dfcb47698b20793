//! Errors raised while decoding responses.

use crate::path::ResponsePath;
use serde_json::Value;
use thiserror::Error;

/// The response payload does not match the declared shape.
///
/// Usually means the generated code is out of date with the server schema.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HydrationError {
    #[error("cannot coerce {value} to {kind} at {path}{}", reason_suffix(.reason))]
    ScalarCoercion {
        kind: String,
        value: Value,
        path: ResponsePath,
        reason: Option<String>,
    },

    #[error("unexpected null at {path}")]
    UnexpectedNull { path: ResponsePath },

    #[error("expected {expected} at {path}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
        path: ResponsePath,
    },

    #[error("missing field `{field}` at {path}")]
    MissingField { field: String, path: ResponsePath },

    #[error("unknown variant `{type_name}` at {path}")]
    UnknownVariant {
        type_name: String,
        path: ResponsePath,
    },
}

fn reason_suffix(reason: &Option<String>) -> String {
    reason
        .as_ref()
        .map(|r| format!(": {r}"))
        .unwrap_or_default()
}

impl HydrationError {
    /// Path of the offending value, in the same form as a server error's
    /// `path`. For [`MissingField`](Self::MissingField) it ends with the
    /// missing key.
    pub fn path(&self) -> &ResponsePath {
        match self {
            Self::ScalarCoercion { path, .. }
            | Self::UnexpectedNull { path }
            | Self::TypeMismatch { path, .. }
            | Self::MissingField { path, .. }
            | Self::UnknownVariant { path, .. } => path,
        }
    }
}

/// The body is JSON but not a GraphQL response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedEnvelope {
    #[error("response body must be a JSON object, found {found}")]
    NotAnObject { found: &'static str },

    #[error("response contains neither `data` nor `errors`")]
    Empty,

    #[error("`data` must be an object or null, found {found}")]
    InvalidData { found: &'static str },

    #[error("`errors` must be an array, found {found}")]
    InvalidErrors { found: &'static str },

    #[error("invalid error at `errors[{index}]`: {reason}")]
    InvalidError { index: usize, reason: String },

    #[error("response body is not valid JSON: {0}")]
    Json(String),
}

/// Names the JSON type of a value for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}
