//! The GraphQL response envelope: `{ "data": ..., "errors": [...] }`.

use crate::error::{json_type_name, MalformedEnvelope};
use crate::path::ResponsePath;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A source location attached to a server error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

/// A server-reported GraphQL error.
///
/// Unknown keys are ignored so that newer servers stay readable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphqlError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<ResponsePath>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<Location>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Map<String, Value>>,
}

impl GraphqlError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: None,
            locations: None,
            extensions: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<ResponsePath>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_extension(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extensions
            .get_or_insert_with(Map::new)
            .insert(key.into(), value);
        self
    }

    /// Returns `extensions.category`, if the server reports one.
    pub fn category(&self) -> Option<&str> {
        self.extensions
            .as_ref()
            .and_then(|ext| ext.get("category"))
            .and_then(Value::as_str)
    }

    /// Whether the message is intended to be shown to end users.
    ///
    /// Servers that classify errors mark internal ones with the `internal`
    /// category; everything else is considered safe.
    pub fn is_client_safe(&self) -> bool {
        self.category() != Some("internal")
    }
}

impl fmt::Display for GraphqlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{} (at {path})", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// A parsed GraphQL response.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope {
    /// `Some(Value::Null)` when the server explicitly returned `"data": null`.
    pub data: Option<Value>,
    pub errors: Option<Vec<GraphqlError>>,
}

impl ResponseEnvelope {
    /// Validates a decoded response body.
    pub fn parse(raw: Value) -> Result<Self, MalformedEnvelope> {
        let mut body = match raw {
            Value::Object(body) => body,
            other => {
                return Err(MalformedEnvelope::NotAnObject {
                    found: json_type_name(&other),
                })
            }
        };

        let data = body.remove("data");
        let errors = body.remove("errors");
        if data.is_none() && errors.is_none() {
            return Err(MalformedEnvelope::Empty);
        }

        if let Some(data) = &data {
            if !(data.is_object() || data.is_null()) {
                return Err(MalformedEnvelope::InvalidData {
                    found: json_type_name(data),
                });
            }
        }

        let errors = errors.map(parse_errors).transpose()?;

        Ok(Self { data, errors })
    }

    /// Decodes and validates a response body.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, MalformedEnvelope> {
        let raw = serde_json::from_slice(bytes).map_err(|e| MalformedEnvelope::Json(e.to_string()))?;
        Self::parse(raw)
    }

    /// The `data` object, if the server returned a non-null one.
    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref().filter(|data| !data.is_null())
    }

    /// Server errors in reporting order; empty when none were sent.
    pub fn errors(&self) -> &[GraphqlError] {
        self.errors.as_deref().unwrap_or_default()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors().is_empty()
    }
}

fn parse_errors(raw: Value) -> Result<Vec<GraphqlError>, MalformedEnvelope> {
    let items = match raw {
        Value::Array(items) => items,
        other => {
            return Err(MalformedEnvelope::InvalidErrors {
                found: json_type_name(&other),
            })
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            if !item.is_object() {
                return Err(MalformedEnvelope::InvalidError {
                    index,
                    reason: format!("expected an object, found {}", json_type_name(&item)),
                });
            }
            serde_json::from_value(item).map_err(|e| MalformedEnvelope::InvalidError {
                index,
                reason: e.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_data_only() {
        let envelope = ResponseEnvelope::parse(json!({"data": {"hello": "world"}})).unwrap();
        assert_eq!(envelope.data(), Some(&json!({"hello": "world"})));
        assert!(envelope.errors.is_none());
        assert!(!envelope.has_errors());
    }

    #[test]
    fn test_parse_preserves_error_order_and_ignores_unknown_keys() {
        let envelope = ResponseEnvelope::parse(json!({
            "errors": [
                {"message": "second", "path": ["b", 1], "somethingNew": true},
                {"message": "first", "locations": [{"line": 1, "column": 3}]}
            ],
            "extensions": {"cost": 3}
        }))
        .unwrap();

        let messages: Vec<_> = envelope.errors().iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["second", "first"]);
        assert_eq!(
            envelope.errors()[0].path,
            Some(ResponsePath::root().child("b").child(1usize))
        );
        assert_eq!(
            envelope.errors()[1].locations,
            Some(vec![Location { line: 1, column: 3 }])
        );
        assert!(envelope.data.is_none());
    }

    #[test]
    fn test_parse_null_data() {
        let envelope = ResponseEnvelope::parse(json!({"data": null})).unwrap();
        assert_eq!(envelope.data, Some(Value::Null));
        assert!(envelope.data().is_none());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(
            ResponseEnvelope::parse(json!([1, 2])),
            Err(MalformedEnvelope::NotAnObject { found: "list" })
        );
        assert_eq!(
            ResponseEnvelope::parse(json!({"extensions": {}})),
            Err(MalformedEnvelope::Empty)
        );
        assert_eq!(
            ResponseEnvelope::parse(json!({"data": "nope"})),
            Err(MalformedEnvelope::InvalidData { found: "string" })
        );
        assert_eq!(
            ResponseEnvelope::parse(json!({"errors": {"message": "x"}})),
            Err(MalformedEnvelope::InvalidErrors { found: "object" })
        );
        assert!(matches!(
            ResponseEnvelope::parse(json!({"errors": [{"message": "ok"}, {"path": []}]})),
            Err(MalformedEnvelope::InvalidError { index: 1, .. })
        ));
        assert!(matches!(
            ResponseEnvelope::parse(json!({"errors": ["boom"]})),
            Err(MalformedEnvelope::InvalidError { index: 0, .. })
        ));
    }

    #[test]
    fn test_from_slice() {
        let envelope = ResponseEnvelope::from_slice(br#"{"data":{"a":1}}"#).unwrap();
        assert_eq!(envelope.data(), Some(&json!({"a": 1})));
        assert!(matches!(
            ResponseEnvelope::from_slice(b"<html>"),
            Err(MalformedEnvelope::Json(_))
        ));
    }

    #[test]
    fn test_client_safe() {
        let err = GraphqlError::new("db down").with_extension("category", json!("internal"));
        assert_eq!(err.category(), Some("internal"));
        assert!(!err.is_client_safe());
        assert!(GraphqlError::new("bad input").is_client_safe());
    }

    #[test]
    fn test_display() {
        let err = GraphqlError::new("boom").with_path(ResponsePath::root().child("singleObject"));
        assert_eq!(err.to_string(), "boom (at singleObject)");
    }
}
