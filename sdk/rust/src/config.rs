//! Endpoint configuration.

use crate::error::RegistryError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Transport settings for one GraphQL endpoint.
///
/// Deserializes from `{"url": "...", "headers": {...}, "timeout_ms": 5000}`;
/// `headers` and `timeout_ms` are optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// URL of the GraphQL endpoint.
    pub url: String,
    /// Headers sent with every request, in insertion order.
    #[serde(default)]
    pub headers: IndexMap<String, String>,
    /// Upper bound for a whole request/response exchange.
    #[serde(rename = "timeout_ms", with = "millis", default = "default_timeout")]
    pub timeout: Duration,
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

impl EndpointConfig {
    /// Creates a new config with a URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: IndexMap::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets the timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Adds a default header.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub(crate) fn validate(&self, name: &str) -> Result<(), RegistryError> {
        if self.url.trim().is_empty() {
            return Err(RegistryError::InvalidConfig(format!(
                "endpoint `{name}` has an empty url"
            )));
        }
        if self.timeout.is_zero() {
            return Err(RegistryError::InvalidConfig(format!(
                "endpoint `{name}` has a zero timeout"
            )));
        }
        if has_line_break(&self.url) {
            return Err(RegistryError::InvalidConfig(format!(
                "endpoint `{name}` has a line break in its url"
            )));
        }
        for (key, value) in &self.headers {
            let bad_name = key.trim().is_empty() || key.contains(':') || has_line_break(key);
            if bad_name || has_line_break(value) {
                return Err(RegistryError::InvalidConfig(format!(
                    "endpoint `{name}` has an invalid header `{}`",
                    key.escape_debug()
                )));
            }
        }
        Ok(())
    }
}

// Header lines are written verbatim into the HTTP request head.
fn has_line_break(s: &str) -> bool {
    s.contains(|c: char| c == '\r' || c == '\n')
}

/// Configuration for a whole registry.
///
/// ```json
/// {
///   "endpoints": {
///     "simple": { "url": "http://localhost:4000/graphql", "timeout_ms": 5000 }
///   }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub endpoints: IndexMap<String, EndpointConfig>,
}

impl RegistryConfig {
    pub fn from_json_str(json: &str) -> Result<Self, RegistryError> {
        serde_json::from_str(json).map_err(|e| RegistryError::InvalidConfig(e.to_string()))
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
