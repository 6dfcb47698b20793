//! Named endpoints.
//!
//! An [`EndpointRegistry`] maps endpoint names (as referenced by generated
//! operations) to transport configuration. Build it once at startup, then share
//! it read-only:
//!
//! ```ignore
//! let mut registry = EndpointRegistry::new();
//! registry.register("simple", EndpointConfig::new("http://localhost:4000/graphql"))?;
//! let registry = Arc::new(registry);
//! ```
//!
//! Registration needs `&mut self`, so once the registry sits behind an `Arc`
//! no further mutation is possible. All registration must therefore happen
//! before the registry is shared with concurrent executions.

use crate::config::{EndpointConfig, RegistryConfig};
use crate::error::RegistryError;
use crate::events::{Event, EventHandler};
use crate::http::HttpTransport;
use crate::transport::Transport;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A configured endpoint: settings, the transport that reaches it, and an
/// optional event handler.
#[derive(Clone)]
pub struct Endpoint {
    config: EndpointConfig,
    transport: Arc<dyn Transport>,
    events: Option<EventHandler>,
}

impl Endpoint {
    /// Creates an endpoint served by [`HttpTransport`].
    pub fn new(config: EndpointConfig) -> Self {
        Self {
            config,
            transport: Arc::new(HttpTransport::new()),
            events: None,
        }
    }

    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    pub fn on_event<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Event<'_>) + Send + Sync + 'static,
    {
        self.events = Some(Arc::new(handler));
        self
    }

    pub fn config(&self) -> &EndpointConfig {
        &self.config
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    pub(crate) fn emit(&self, event: &Event<'_>) {
        if let Some(handler) = &self.events {
            handler(event);
        }
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("config", &self.config)
            .field("events", &self.events.is_some())
            .finish_non_exhaustive()
    }
}

/// Endpoint name to [`Endpoint`] mapping.
#[derive(Debug, Clone, Default)]
pub struct EndpointRegistry {
    endpoints: IndexMap<String, Endpoint>,
}

impl EndpointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry with an HTTP endpoint per configured entry.
    pub fn from_config(config: RegistryConfig) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for (name, endpoint) in config.endpoints {
            registry.register(name, endpoint)?;
        }
        Ok(registry)
    }

    /// Parses a JSON [`RegistryConfig`] and builds a registry from it.
    pub fn from_json_str(json: &str) -> Result<Self, RegistryError> {
        Self::from_config(RegistryConfig::from_json_str(json)?)
    }

    /// Registers an endpoint reached over HTTP.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        config: EndpointConfig,
    ) -> Result<(), RegistryError> {
        self.register_endpoint(name, Endpoint::new(config))
    }

    /// Registers an endpoint reached through a custom transport.
    pub fn register_with_transport(
        &mut self,
        name: impl Into<String>,
        config: EndpointConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<(), RegistryError> {
        self.register_endpoint(name, Endpoint::new(config).with_transport(transport))
    }

    /// Registers a fully built endpoint.
    pub fn register_endpoint(
        &mut self,
        name: impl Into<String>,
        endpoint: Endpoint,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if self.endpoints.contains_key(&name) {
            return Err(RegistryError::DuplicateEndpoint(name));
        }
        endpoint.config.validate(&name)?;

        debug!(endpoint = %name, url = %endpoint.config.url, "registered GraphQL endpoint");
        self.endpoints.insert(name, endpoint);
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> Result<&Endpoint, RegistryError> {
        self.endpoints
            .get(name)
            .ok_or_else(|| RegistryError::UnknownEndpoint(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.endpoints.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.endpoints.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}
