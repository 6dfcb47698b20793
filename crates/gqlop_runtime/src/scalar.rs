//! Scalar kinds and custom scalar decoders.

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Decodes the wire representation of a custom scalar.
///
/// Decoders must be pure: the same input always yields the same output.
pub trait ScalarDecoder: Send + Sync {
    /// The GraphQL name of the scalar, e.g. `DateTime`.
    fn name(&self) -> &str;

    /// Validates and normalizes a JSON value. The error is a human-readable reason.
    fn decode(&self, value: &Value) -> Result<Value, String>;
}

/// A named custom scalar backed by a decoder.
#[derive(Clone)]
pub struct CustomScalar {
    decoder: Arc<dyn ScalarDecoder>,
}

impl CustomScalar {
    pub fn new(decoder: impl ScalarDecoder + 'static) -> Self {
        Self {
            decoder: Arc::new(decoder),
        }
    }

    pub fn name(&self) -> &str {
        self.decoder.name()
    }

    pub fn decode(&self, value: &Value) -> Result<Value, String> {
        self.decoder.decode(value)
    }
}

impl fmt::Debug for CustomScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CustomScalar").field(&self.name()).finish()
    }
}

/// Two custom scalars are equal when they share a name.
impl PartialEq for CustomScalar {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

/// A decoder built from a closure.
pub struct FnDecoder<F> {
    name: String,
    decode: F,
}

impl<F> FnDecoder<F>
where
    F: Fn(&Value) -> Result<Value, String> + Send + Sync,
{
    pub fn new(name: impl Into<String>, decode: F) -> Self {
        Self {
            name: name.into(),
            decode,
        }
    }
}

impl<F> ScalarDecoder for FnDecoder<F>
where
    F: Fn(&Value) -> Result<Value, String> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn decode(&self, value: &Value) -> Result<Value, String> {
        (self.decode)(value)
    }
}

/// The kind of a leaf value.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarKind {
    String,
    /// 32-bit signed integer.
    Int,
    /// Double precision float; integral JSON numbers are accepted.
    Float,
    Boolean,
    /// Serialized as a string in responses.
    Id,
    Enum {
        name: String,
        values: Vec<String>,
    },
    Custom(CustomScalar),
}

impl ScalarKind {
    /// Returns the GraphQL type name for this kind.
    pub fn name(&self) -> &str {
        match self {
            Self::String => "String",
            Self::Int => "Int",
            Self::Float => "Float",
            Self::Boolean => "Boolean",
            Self::Id => "ID",
            Self::Enum { name, .. } => name,
            Self::Custom(scalar) => scalar.name(),
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
