//! Hydrated result values.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::Value;

/// A validated result graph.
///
/// Every value was checked against a [`TypeShape`](crate::shape::TypeShape),
/// so consumers can rely on its structure without re-checking the JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum HydratedValue {
    Null,
    String(String),
    Int(i32),
    Float(f64),
    Boolean(bool),
    Enum(String),
    Custom { scalar: String, value: Value },
    List(Vec<HydratedValue>),
    Object(IndexMap<String, HydratedValue>),
}

impl HydratedValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::Enum(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[HydratedValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, HydratedValue>> {
        match self {
            Self::Object(fields) => Some(fields),
            _ => None,
        }
    }

    /// Looks up a field of an object value by response key.
    pub fn get(&self, key: &str) -> Option<&HydratedValue> {
        self.as_object().and_then(|fields| fields.get(key))
    }

    /// Converts back into plain JSON.
    pub fn into_json(self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::String(s) | Self::Enum(s) => Value::String(s),
            Self::Int(i) => Value::from(i),
            // Non-finite floats cannot come out of JSON in the first place.
            Self::Float(f) => serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number),
            Self::Boolean(b) => Value::Bool(b),
            Self::Custom { value, .. } => value,
            Self::List(items) => Value::Array(items.into_iter().map(Self::into_json).collect()),
            Self::Object(fields) => Value::Object(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, v.into_json()))
                    .collect(),
            ),
        }
    }

    /// Deserializes into a caller-defined type, typically a generated result struct.
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.into_json())
    }
}

impl Serialize for HydratedValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::String(s) | Self::Enum(s) => serializer.serialize_str(s),
            Self::Int(i) => serializer.serialize_i32(*i),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::Boolean(b) => serializer.serialize_bool(*b),
            Self::Custom { value, .. } => value.serialize(serializer),
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Object(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (key, value) in fields {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}
