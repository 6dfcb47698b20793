//! Result hydration.
//!
//! [`hydrate`] walks a JSON value and a [`TypeShape`] together and produces a
//! [`HydratedValue`] whose structure is guaranteed to match the shape. The walk
//! stops at the first mismatch and reports it with the exact response path;
//! there is no error aggregation at this layer, server errors already arrive
//! as a list.
//!
//! Hydration is a pure function of its two inputs: it holds no state between
//! calls and never suspends.

use crate::error::{json_type_name, HydrationError};
use crate::path::ResponsePath;
use crate::scalar::ScalarKind;
use crate::shape::{ObjectShape, TypeShape, UnionShape};
use crate::value::HydratedValue;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::trace;

/// Hydrates `value` against `shape`, starting at the response root.
pub fn hydrate(value: &Value, shape: &TypeShape) -> Result<HydratedValue, HydrationError> {
    hydrate_at(value, shape, ResponsePath::root())
}

/// Hydrates a subtree located at `path`; errors report paths below it.
pub fn hydrate_at(
    value: &Value,
    shape: &TypeShape,
    path: ResponsePath,
) -> Result<HydratedValue, HydrationError> {
    Hydrator { path }.value(value, shape).map_err(|err| {
        trace!(path = %err.path(), error = %err, "hydration failed");
        err
    })
}

struct Hydrator {
    path: ResponsePath,
}

impl Hydrator {
    fn value(&mut self, value: &Value, shape: &TypeShape) -> Result<HydratedValue, HydrationError> {
        match shape {
            TypeShape::Nullable(inner) => {
                if value.is_null() {
                    Ok(HydratedValue::Null)
                } else {
                    self.value(value, inner)
                }
            }
            _ if value.is_null() => Err(HydrationError::UnexpectedNull {
                path: self.path.clone(),
            }),
            TypeShape::Scalar(kind) => self.scalar(value, kind),
            TypeShape::List(element) => self.list(value, element),
            TypeShape::Object(fields) => {
                let object = self.expect_object(value)?;
                self.object(object, fields).map(HydratedValue::Object)
            }
            TypeShape::Union(union) => self.union(value, union),
        }
    }

    fn scalar(&self, value: &Value, kind: &ScalarKind) -> Result<HydratedValue, HydrationError> {
        let hydrated = match (kind, value) {
            (ScalarKind::String, Value::String(s)) => Some(HydratedValue::String(s.clone())),
            (ScalarKind::Id, Value::String(s)) => Some(HydratedValue::String(s.clone())),
            (ScalarKind::Int, Value::Number(n)) => n
                .as_i64()
                .and_then(|i| i32::try_from(i).ok())
                .map(HydratedValue::Int),
            (ScalarKind::Float, Value::Number(n)) => n.as_f64().map(HydratedValue::Float),
            (ScalarKind::Boolean, Value::Bool(b)) => Some(HydratedValue::Boolean(*b)),
            (ScalarKind::Enum { values, .. }, Value::String(s)) => values
                .iter()
                .any(|allowed| allowed == s)
                .then(|| HydratedValue::Enum(s.clone())),
            (ScalarKind::Custom(scalar), _) => {
                return scalar
                    .decode(value)
                    .map(|decoded| HydratedValue::Custom {
                        scalar: scalar.name().to_string(),
                        value: decoded,
                    })
                    .map_err(|reason| self.coercion_error(kind, value, Some(reason)));
            }
            _ => None,
        };

        hydrated.ok_or_else(|| self.coercion_error(kind, value, None))
    }

    fn coercion_error(&self, kind: &ScalarKind, value: &Value, reason: Option<String>) -> HydrationError {
        HydrationError::ScalarCoercion {
            kind: kind.name().to_string(),
            value: value.clone(),
            path: self.path.clone(),
            reason,
        }
    }

    fn list(&mut self, value: &Value, element: &TypeShape) -> Result<HydratedValue, HydrationError> {
        let Some(items) = value.as_array() else {
            return Err(self.mismatch("list", value));
        };

        let mut hydrated = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            self.path.push(index);
            let result = self.value(item, element);
            self.path.pop();
            hydrated.push(result?);
        }
        Ok(HydratedValue::List(hydrated))
    }

    fn expect_object<'v>(&self, value: &'v Value) -> Result<&'v Map<String, Value>, HydrationError> {
        value.as_object().ok_or_else(|| self.mismatch("object", value))
    }

    fn object(
        &mut self,
        object: &Map<String, Value>,
        fields: &ObjectShape,
    ) -> Result<IndexMap<String, HydratedValue>, HydrationError> {
        let mut hydrated = IndexMap::with_capacity(fields.len());
        for (key, shape) in fields.fields() {
            // A selected field is always present in a conforming response,
            // even when its value is null.
            let Some(field_value) = object.get(key) else {
                return Err(HydrationError::MissingField {
                    field: key.to_string(),
                    path: self.path.child(key),
                });
            };

            self.path.push(key);
            let result = self.value(field_value, shape);
            self.path.pop();
            hydrated.insert(key.to_string(), result?);
        }
        Ok(hydrated)
    }

    fn union(&mut self, value: &Value, union: &UnionShape) -> Result<HydratedValue, HydrationError> {
        let object = self.expect_object(value)?;
        let discriminator = union.discriminator();

        let type_name = match object.get(discriminator) {
            None => {
                return Err(HydrationError::MissingField {
                    field: discriminator.to_string(),
                    path: self.path.child(discriminator),
                })
            }
            Some(Value::String(type_name)) => type_name,
            Some(other) => {
                self.path.push(discriminator);
                let err = self.mismatch("string", other);
                self.path.pop();
                return Err(err);
            }
        };

        let Some(variant) = union.get(type_name) else {
            return Err(HydrationError::UnknownVariant {
                type_name: type_name.clone(),
                path: self.path.clone(),
            });
        };

        let mut hydrated = self.object(object, variant)?;
        if !hydrated.contains_key(discriminator) {
            hydrated.shift_insert(
                0,
                discriminator.to_string(),
                HydratedValue::String(type_name.clone()),
            );
        }
        Ok(HydratedValue::Object(hydrated))
    }

    fn mismatch(&self, expected: &'static str, found: &Value) -> HydrationError {
        HydrationError::TypeMismatch {
            expected,
            found: json_type_name(found),
            path: self.path.clone(),
        }
    }
}
