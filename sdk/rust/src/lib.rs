//! gqlop SDK
//!
//! Executes GraphQL operations against named endpoints and hands back typed,
//! validated results.
//!
//! # Registering endpoints
//!
//! ```ignore
//! use gqlop_sdk::{EndpointConfig, EndpointRegistry};
//! use std::time::Duration;
//!
//! let mut registry = EndpointRegistry::new();
//! registry.register(
//!     "simple",
//!     EndpointConfig::new("http://localhost:4000/graphql")
//!         .header("Authorization", "Bearer token")
//!         .timeout(Duration::from_secs(5)),
//! )?;
//! ```
//!
//! # Executing a generated operation
//!
//! ```ignore
//! use gqlop_sdk::{execute, NoVariables, Outcome};
//!
//! match execute::<MyObjectQuery>(&registry, NoVariables).await? {
//!     Outcome::Succeeded(data) => println!("{}", data.single_object.value),
//!     Outcome::PartiallySucceeded { data, errors } => {
//!         eprintln!("{} field(s) failed", errors.len());
//!         println!("{}", data.single_object.value);
//!     }
//! }
//! ```
//!
//! # Ad-hoc documents
//!
//! ```ignore
//! use gqlop_sdk::{execute_document, Document, TypeShape};
//!
//! let shape = TypeShape::object([("hello", TypeShape::string())]);
//! let outcome = execute_document(&registry, "simple", &Document::new("{ hello }"), None, &shape).await?;
//! assert_eq!(outcome.data().get("hello").and_then(|v| v.as_str()), Some("world"));
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod http;
pub mod mock;
pub mod operation;
pub mod registry;
pub mod transport;

// Re-exports for convenience
pub use config::{EndpointConfig, RegistryConfig};
pub use error::{
    ErrorCode, GraphqlErrors, OperationError, OperationResult, RegistryError, TransportError,
};
pub use events::{Event, EventHandler};
pub use http::HttpTransport;
pub use mock::MockTransport;
pub use operation::{
    execute, execute_document, Document, GraphqlOperation, NoVariables, Operation,
    OperationState, Outcome,
};
pub use registry::{Endpoint, EndpointRegistry};
pub use transport::{GraphqlRequest, RawResponse, Transport, Variables};

// Re-export runtime types that generated code needs
pub use gqlop_runtime::{
    hydrate, hydrate_at, CustomScalar, FnDecoder, GraphqlError, HydratedValue, HydrationError,
    Location, MalformedEnvelope, ObjectShape, PathSegment, ResponseEnvelope, ResponsePath,
    ScalarDecoder, ScalarKind, TypeShape, UnionShape, TYPENAME_FIELD,
};
