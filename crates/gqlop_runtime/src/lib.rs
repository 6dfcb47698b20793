//! Decoding runtime for gqlop.
//!
//! This crate turns raw GraphQL responses into validated result graphs:
//! - `path`: Response paths shared by server errors and hydration failures
//! - `scalar`: Scalar kinds and custom scalar decoders
//! - `shape`: Declared result shapes
//! - `envelope`: `{data, errors}` response parsing
//! - `hydrate`: Shape-directed hydration of response data
//! - `value`: Hydrated result values
//!
//! Everything here is synchronous and free of I/O.

pub mod envelope;
pub mod error;
pub mod hydrate;
pub mod path;
pub mod scalar;
pub mod shape;
pub mod value;

pub use envelope::{GraphqlError, Location, ResponseEnvelope};
pub use error::{HydrationError, MalformedEnvelope};
pub use hydrate::{hydrate, hydrate_at};
pub use path::{PathSegment, ResponsePath};
pub use scalar::{CustomScalar, FnDecoder, ScalarDecoder, ScalarKind};
pub use shape::{ObjectShape, TypeShape, UnionShape, TYPENAME_FIELD};
pub use value::HydratedValue;
