//! Declarative result shapes.
//!
//! A [`TypeShape`] describes what a selection set is expected to return. Shapes
//! are produced ahead of time (typically by a code generator) and are immutable
//! while requests execute, so one shape can be shared by any number of
//! concurrent hydrations.
//!
//! # Example
//!
//! ```
//! use gqlop_runtime::shape::TypeShape;
//!
//! // query { hero { name friends { name } } }
//! let shape = TypeShape::object([(
//!     "hero",
//!     TypeShape::object([
//!         ("name", TypeShape::string()),
//!         ("friends", TypeShape::list(TypeShape::object([("name", TypeShape::string())])).nullable()),
//!     ])
//!     .nullable(),
//! )]);
//! assert!(shape.is_object());
//! ```

use crate::scalar::{CustomScalar, ScalarDecoder, ScalarKind};
use indexmap::IndexMap;

/// The conventional discriminator for unions and interfaces.
pub const TYPENAME_FIELD: &str = "__typename";

/// Expected shape of a response subtree.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeShape {
    Scalar(ScalarKind),
    Object(ObjectShape),
    List(Box<TypeShape>),
    Nullable(Box<TypeShape>),
    /// Unions and interfaces; both branch on a discriminator field.
    Union(UnionShape),
}

/// Fields of an object selection, keyed by response key.
///
/// The response key is the alias when one is used, otherwise the schema field
/// name. Declaration order is the order of the hydrated object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectShape {
    fields: IndexMap<String, TypeShape>,
}

impl ObjectShape {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field. A later declaration of the same key replaces the earlier one.
    pub fn field(mut self, response_key: impl Into<String>, shape: TypeShape) -> Self {
        self.fields.insert(response_key.into(), shape);
        self
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &TypeShape)> {
        self.fields.iter().map(|(key, shape)| (key.as_str(), shape))
    }

    pub fn get(&self, response_key: &str) -> Option<&TypeShape> {
        self.fields.get(response_key)
    }

    pub fn contains(&self, response_key: &str) -> bool {
        self.fields.contains_key(response_key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, TypeShape)> for ObjectShape {
    fn from_iter<I: IntoIterator<Item = (K, TypeShape)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Variant table for an abstract type.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionShape {
    discriminator: String,
    variants: IndexMap<String, ObjectShape>,
}

impl UnionShape {
    /// Creates an empty variant table keyed by `discriminator`.
    pub fn new(discriminator: impl Into<String>) -> Self {
        Self {
            discriminator: discriminator.into(),
            variants: IndexMap::new(),
        }
    }

    pub fn variant(mut self, type_name: impl Into<String>, shape: ObjectShape) -> Self {
        self.variants.insert(type_name.into(), shape);
        self
    }

    pub fn discriminator(&self) -> &str {
        &self.discriminator
    }

    pub fn get(&self, type_name: &str) -> Option<&ObjectShape> {
        self.variants.get(type_name)
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.variants.keys().map(String::as_str)
    }
}

impl TypeShape {
    pub fn string() -> Self {
        Self::Scalar(ScalarKind::String)
    }

    pub fn int() -> Self {
        Self::Scalar(ScalarKind::Int)
    }

    pub fn float() -> Self {
        Self::Scalar(ScalarKind::Float)
    }

    pub fn boolean() -> Self {
        Self::Scalar(ScalarKind::Boolean)
    }

    pub fn id() -> Self {
        Self::Scalar(ScalarKind::Id)
    }

    /// An enum accepting exactly `values`.
    pub fn enumeration<V, I>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self::Scalar(ScalarKind::Enum {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        })
    }

    pub fn custom(decoder: impl ScalarDecoder + 'static) -> Self {
        Self::Scalar(ScalarKind::Custom(CustomScalar::new(decoder)))
    }

    pub fn object<K, I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, TypeShape)>,
        K: Into<String>,
    {
        Self::Object(fields.into_iter().collect())
    }

    pub fn list(element: TypeShape) -> Self {
        Self::List(Box::new(element))
    }

    /// A union or interface discriminated by `discriminator`.
    pub fn union<K, I>(discriminator: impl Into<String>, variants: I) -> Self
    where
        I: IntoIterator<Item = (K, ObjectShape)>,
        K: Into<String>,
    {
        let shape = variants
            .into_iter()
            .fold(UnionShape::new(discriminator), |shape, (name, variant)| {
                shape.variant(name, variant)
            });
        Self::Union(shape)
    }

    /// Wraps this shape so that JSON `null` is accepted.
    ///
    /// Already-nullable shapes are returned unchanged.
    pub fn nullable(self) -> Self {
        match self {
            Self::Nullable(_) => self,
            other => Self::Nullable(Box::new(other)),
        }
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, Self::Nullable(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    /// Returns the shape with any nullable wrapper removed.
    pub fn inner(&self) -> &TypeShape {
        match self {
            Self::Nullable(inner) => inner.inner(),
            other => other,
        }
    }
}

impl From<ObjectShape> for TypeShape {
    fn from(shape: ObjectShape) -> Self {
        Self::Object(shape)
    }
}

impl From<UnionShape> for TypeShape {
    fn from(shape: UnionShape) -> Self {
        Self::Union(shape)
    }
}
