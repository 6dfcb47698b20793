//! Operation execution.
//!
//! Generated code implements [`GraphqlOperation`] for each operation in a
//! document. Executing one runs the whole pipeline:
//!
//! ```text
//! registry.resolve(ENDPOINT) -> transport.send -> ResponseEnvelope::parse -> hydrate -> Data
//! ```
//!
//! # Example
//!
//! ```ignore
//! use gqlop_sdk::operation::{GraphqlOperation, NoVariables, Operation};
//! use gqlop_sdk::TypeShape;
//! use std::sync::OnceLock;
//!
//! #[derive(Deserialize)]
//! #[serde(rename_all = "camelCase")]
//! struct MyObjectQueryData { single_object: SingleObject }
//!
//! #[derive(Deserialize)]
//! struct SingleObject { value: String }
//!
//! struct MyObjectQuery;
//!
//! impl GraphqlOperation for MyObjectQuery {
//!     type Variables = NoVariables;
//!     type Data = MyObjectQueryData;
//!     const DOCUMENT: &'static str = "query MyObjectQuery { singleObject { value } }";
//!     const OPERATION_NAME: Option<&'static str> = Some("MyObjectQuery");
//!     const ENDPOINT: &'static str = "simple";
//!
//!     fn shape() -> &'static TypeShape {
//!         static SHAPE: OnceLock<TypeShape> = OnceLock::new();
//!         SHAPE.get_or_init(|| {
//!             TypeShape::object([("singleObject", TypeShape::object([("value", TypeShape::string())]))])
//!         })
//!     }
//! }
//!
//! let outcome = Operation::<MyObjectQuery>::new(&registry).execute(NoVariables).await?;
//! println!("{}", outcome.data().single_object.value);
//! ```

use crate::error::{GraphqlErrors, OperationError, OperationResult};
use crate::events::Event;
use crate::registry::EndpointRegistry;
use crate::transport::{GraphqlRequest, Variables};
use gqlop_runtime::error::json_type_name;
use gqlop_runtime::{hydrate, GraphqlError, HydratedValue, ResponseEnvelope, TypeShape};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;
use tracing::{debug, warn};

/// A GraphQL operation with a statically known document, endpoint and result shape.
pub trait GraphqlOperation {
    /// Variables; must serialize to a JSON object (or use [`NoVariables`]).
    type Variables: Serialize;

    /// The typed result, deserialized from the hydrated `data`.
    type Data: DeserializeOwned;

    /// The GraphQL document.
    const DOCUMENT: &'static str;

    /// The operation to run when the document defines several.
    const OPERATION_NAME: Option<&'static str>;

    /// Name of the registered endpoint to send to.
    const ENDPOINT: &'static str;

    /// Shape of `data` for this operation's selection set.
    fn shape() -> &'static TypeShape;
}

/// Marker type for operations without variables.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct NoVariables;

/// A GraphQL document plus the operation to select from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    query: String,
    operation_name: Option<String>,
}

impl Document {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            operation_name: None,
        }
    }

    pub fn with_operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn operation_name(&self) -> Option<&str> {
        self.operation_name.as_deref()
    }

    fn request(&self, variables: Option<Variables>) -> GraphqlRequest {
        GraphqlRequest {
            query: self.query.clone(),
            operation_name: self.operation_name.clone(),
            variables,
        }
    }
}

/// Lifecycle of a single execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationState {
    /// Document, variables and endpoint bound; nothing sent.
    Created,
    /// Handed to the transport.
    Sent,
    Succeeded,
    PartiallySucceeded,
    Failed,
}

impl OperationState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Created | Self::Sent)
    }
}

impl fmt::Display for OperationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "created",
            Self::Sent => "sent",
            Self::Succeeded => "succeeded",
            Self::PartiallySucceeded => "partially succeeded",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// A successful execution: typed data, possibly with server errors for other fields.
///
/// Failures are reported as [`OperationError`] instead and never carry data.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Succeeded(T),
    PartiallySucceeded { data: T, errors: Vec<GraphqlError> },
}

impl<T> Outcome<T> {
    pub fn state(&self) -> OperationState {
        match self {
            Self::Succeeded(_) => OperationState::Succeeded,
            Self::PartiallySucceeded { .. } => OperationState::PartiallySucceeded,
        }
    }

    pub fn data(&self) -> &T {
        match self {
            Self::Succeeded(data) | Self::PartiallySucceeded { data, .. } => data,
        }
    }

    /// Returns the data, discarding any accompanying errors.
    pub fn into_data(self) -> T {
        match self {
            Self::Succeeded(data) | Self::PartiallySucceeded { data, .. } => data,
        }
    }

    /// Server errors that accompanied the data; empty on full success.
    pub fn errors(&self) -> &[GraphqlError] {
        match self {
            Self::Succeeded(_) => &[],
            Self::PartiallySucceeded { errors, .. } => errors,
        }
    }

    pub fn is_partial(&self) -> bool {
        matches!(self, Self::PartiallySucceeded { .. })
    }

    /// Returns the data only if the server reported no errors at all.
    pub fn error_free(self) -> OperationResult<T> {
        match self {
            Self::Succeeded(data) => Ok(data),
            Self::PartiallySucceeded { data, errors } if errors.is_empty() => Ok(data),
            Self::PartiallySucceeded { errors, .. } => {
                Err(OperationError::Graphql(GraphqlErrors::new(errors)))
            }
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Succeeded(data) => Outcome::Succeeded(f(data)),
            Self::PartiallySucceeded { data, errors } => Outcome::PartiallySucceeded {
                data: f(data),
                errors,
            },
        }
    }

    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<Outcome<U>, E> {
        Ok(match self {
            Self::Succeeded(data) => Outcome::Succeeded(f(data)?),
            Self::PartiallySucceeded { data, errors } => Outcome::PartiallySucceeded {
                data: f(data)?,
                errors,
            },
        })
    }
}

/// A single-shot execution of a generated operation.
///
/// [`execute`](Self::execute) consumes the value; running the operation again
/// takes a fresh `Operation`, so a previous response is never reused.
pub struct Operation<'r, Op> {
    registry: &'r EndpointRegistry,
    _op: PhantomData<fn() -> Op>,
}

impl<'r, Op: GraphqlOperation> Operation<'r, Op> {
    pub fn new(registry: &'r EndpointRegistry) -> Self {
        Self {
            registry,
            _op: PhantomData,
        }
    }

    /// Always [`OperationState::Created`]. This value is not a live state
    /// machine: [`execute`](Self::execute) consumes it, transitions are only
    /// logged, and the terminal state is read from the returned
    /// [`Outcome::state`] or implied by the error.
    pub fn state(&self) -> OperationState {
        OperationState::Created
    }

    pub async fn execute(self, variables: Op::Variables) -> OperationResult<Outcome<Op::Data>> {
        let mut document = Document::new(Op::DOCUMENT);
        if let Some(name) = Op::OPERATION_NAME {
            document = document.with_operation_name(name);
        }
        let variables = to_variables(&variables)?;

        let outcome =
            execute_document(self.registry, Op::ENDPOINT, &document, variables, Op::shape()).await?;

        outcome.try_map(|data| {
            data.into_typed()
                .map_err(|e| OperationError::Deserialize(e.to_string()))
        })
    }
}

impl<Op> fmt::Debug for Operation<'_, Op> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("operation", &std::any::type_name::<Op>())
            .finish_non_exhaustive()
    }
}

/// Executes a generated operation once.
pub async fn execute<Op: GraphqlOperation>(
    registry: &EndpointRegistry,
    variables: Op::Variables,
) -> OperationResult<Outcome<Op::Data>> {
    Operation::<Op>::new(registry).execute(variables).await
}

/// Executes an arbitrary document against a named endpoint and hydrates the
/// response against `shape`.
pub async fn execute_document(
    registry: &EndpointRegistry,
    endpoint_name: &str,
    document: &Document,
    variables: Option<Variables>,
    shape: &TypeShape,
) -> OperationResult<Outcome<HydratedValue>> {
    let operation = document.operation_name().unwrap_or("<anonymous>");
    let mut state = OperationState::Created;

    let result = run(registry, endpoint_name, document, variables, shape, &mut state).await;
    match &result {
        Ok(outcome) => transition(&mut state, outcome.state(), endpoint_name, operation),
        Err(err) => {
            transition(&mut state, OperationState::Failed, endpoint_name, operation);
            warn!(
                endpoint = endpoint_name,
                operation,
                code = %err.code(),
                error = %err,
                "GraphQL operation failed"
            );
        }
    }
    result
}

async fn run(
    registry: &EndpointRegistry,
    endpoint_name: &str,
    document: &Document,
    variables: Option<Variables>,
    shape: &TypeShape,
    state: &mut OperationState,
) -> OperationResult<Outcome<HydratedValue>> {
    let operation = document.operation_name().unwrap_or("<anonymous>");
    let endpoint = registry.resolve(endpoint_name)?;
    let request = document.request(variables);

    endpoint.emit(&Event::StartRequest {
        endpoint: endpoint_name,
        request: &request,
    });
    transition(state, OperationState::Sent, endpoint_name, operation);

    let response = endpoint
        .transport()
        .send(endpoint.config(), &request)
        .await?;

    endpoint.emit(&Event::ReceiveResponse {
        endpoint: endpoint_name,
        response: &response,
    });

    let envelope = ResponseEnvelope::parse(response.body)?;
    settle(envelope, shape)
}

/// Decides the terminal outcome for a parsed response.
fn settle(envelope: ResponseEnvelope, shape: &TypeShape) -> OperationResult<Outcome<HydratedValue>> {
    let errors = envelope.errors.unwrap_or_default();

    let data = match envelope.data {
        Some(data @ Value::Object(_)) => data,
        _ if errors.is_empty() => return Err(OperationError::NoData),
        _ => return Err(OperationError::Graphql(GraphqlErrors::new(errors))),
    };

    match hydrate(&data, shape) {
        Ok(value) if errors.is_empty() => Ok(Outcome::Succeeded(value)),
        Ok(value) => {
            warn!(errors = errors.len(), "GraphQL response carried errors alongside data");
            Ok(Outcome::PartiallySucceeded {
                data: value,
                errors,
            })
        }
        Err(source) => Err(OperationError::Hydration { source, errors }),
    }
}

fn transition(state: &mut OperationState, next: OperationState, endpoint: &str, operation: &str) {
    debug!(endpoint, operation, from = %state, to = %next, "operation state changed");
    *state = next;
}

fn to_variables<V: Serialize>(variables: &V) -> OperationResult<Option<Variables>> {
    let value = serde_json::to_value(variables)
        .map_err(|e| OperationError::InvalidVariables(e.to_string()))?;

    match value {
        Value::Null => Ok(None),
        Value::Object(map) if map.is_empty() => Ok(None),
        Value::Object(map) => Ok(Some(map)),
        other => Err(OperationError::InvalidVariables(format!(
            "expected an object, found {}",
            json_type_name(&other)
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gqlop_runtime::{HydrationError, ResponsePath};
    use serde_json::json;

    fn simple_shape() -> TypeShape {
        TypeShape::object([(
            "singleObject",
            TypeShape::object([("value", TypeShape::string())]),
        )])
    }

    #[test]
    fn test_settle_success() {
        let envelope =
            ResponseEnvelope::parse(json!({"data": {"singleObject": {"value": "hello"}}})).unwrap();
        let outcome = settle(envelope, &simple_shape()).unwrap();
        assert_eq!(outcome.state(), OperationState::Succeeded);
        assert_eq!(
            outcome.data().get("singleObject").and_then(|o| o.get("value")),
            Some(&HydratedValue::String("hello".into()))
        );
    }

    #[test]
    fn test_settle_partial() {
        let envelope = ResponseEnvelope::parse(json!({
            "data": {"singleObject": {"value": "hello"}},
            "errors": [{"message": "other field failed", "path": ["other"]}]
        }))
        .unwrap();
        let outcome = settle(envelope, &simple_shape()).unwrap();
        assert_eq!(outcome.state(), OperationState::PartiallySucceeded);
        assert_eq!(outcome.errors().len(), 1);

        let err = outcome.error_free().unwrap_err();
        assert!(err.is_graphql());
        assert_eq!(err.graphql_errors()[0].message, "other field failed");
    }

    #[test]
    fn test_settle_errors_without_data() {
        for body in [
            json!({"errors": [{"message": "boom"}]}),
            json!({"data": null, "errors": [{"message": "boom"}]}),
        ] {
            let envelope = ResponseEnvelope::parse(body).unwrap();
            let err = settle(envelope, &simple_shape()).unwrap_err();
            assert!(err.is_graphql());
            assert_eq!(err.graphql_errors().len(), 1);
        }
    }

    #[test]
    fn test_settle_null_data_without_errors() {
        for body in [json!({"data": null}), json!({"data": null, "errors": []})] {
            let envelope = ResponseEnvelope::parse(body).unwrap();
            assert_eq!(
                settle(envelope, &simple_shape()).unwrap_err(),
                OperationError::NoData
            );
        }
    }

    #[test]
    fn test_settle_hydration_failure_keeps_server_errors() {
        // The server nulled a non-null field and explained why.
        let envelope = ResponseEnvelope::parse(json!({
            "data": {"singleObject": {"value": null}},
            "errors": [{"message": "value resolver failed", "path": ["singleObject", "value"]}]
        }))
        .unwrap();
        let err = settle(envelope, &simple_shape()).unwrap_err();

        assert!(err.is_schema_drift());
        assert_eq!(
            err.hydration_error(),
            Some(&HydrationError::UnexpectedNull {
                path: ResponsePath::root().child("singleObject").child("value"),
            })
        );
        assert_eq!(err.graphql_errors()[0].message, "value resolver failed");
    }

    #[test]
    fn test_to_variables() {
        #[derive(Serialize)]
        struct Vars {
            zeta: i32,
            alpha: &'static str,
        }

        let vars = to_variables(&Vars { zeta: 1, alpha: "a" }).unwrap().unwrap();
        assert_eq!(vars.keys().collect::<Vec<_>>(), vec!["zeta", "alpha"]);

        assert_eq!(to_variables(&NoVariables).unwrap(), None);
        assert!(matches!(
            to_variables(&42),
            Err(OperationError::InvalidVariables(msg)) if msg.contains("number")
        ));
    }

    #[test]
    fn test_outcome_map() {
        let outcome = Outcome::PartiallySucceeded {
            data: 2,
            errors: vec![GraphqlError::new("x")],
        }
        .map(|n| n * 10);
        assert_eq!(*outcome.data(), 20);
        assert!(outcome.is_partial());
        assert_eq!(outcome.into_data(), 20);
    }

    #[test]
    fn test_error_free_without_errors() {
        let outcome: Outcome<i32> = Outcome::PartiallySucceeded {
            data: 7,
            errors: Vec::new(),
        };
        assert_eq!(outcome.error_free(), Ok(7));
        assert_eq!(Outcome::Succeeded(3).error_free(), Ok(3));
    }

    #[test]
    fn test_state_display() {
        assert_eq!(OperationState::PartiallySucceeded.to_string(), "partially succeeded");
        assert!(OperationState::Failed.is_terminal());
        assert!(!OperationState::Sent.is_terminal());
    }
}
