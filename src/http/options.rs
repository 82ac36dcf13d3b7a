//! Client and per-request options

use crate::types::BackoffType;
use std::collections::BTreeMap;
use std::time::Duration;

/// Configuration for a [`Client`](crate::Client)
///
/// Transport-level settings only. Nothing here changes how pagination works.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Request timeout, applied to each request individually
    pub timeout: Duration,
    /// Maximum number of retries for idempotent requests
    pub max_retries: u32,
    /// Initial delay for backoff
    pub initial_backoff: Duration,
    /// Maximum delay for backoff
    pub max_backoff: Duration,
    /// Type of backoff strategy
    pub backoff_type: BackoffType,
    /// Default headers for all requests
    pub default_headers: BTreeMap<String, String>,
    /// User agent string
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 2,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(60),
            backoff_type: BackoffType::Exponential,
            default_headers: BTreeMap::new(),
            user_agent: format!("canvas-api/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientOptions {
    /// Create a new options builder
    pub fn builder() -> ClientOptionsBuilder {
        ClientOptionsBuilder::default()
    }
}

/// Builder for client options
#[derive(Default)]
pub struct ClientOptionsBuilder {
    options: ClientOptions,
}

impl ClientOptionsBuilder {
    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = timeout;
        self
    }

    /// Set max retries
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.options.max_retries = retries;
        self
    }

    /// Disable retries
    pub fn no_retries(mut self) -> Self {
        self.options.max_retries = 0;
        self
    }

    /// Set backoff configuration
    pub fn backoff(mut self, backoff_type: BackoffType, initial: Duration, max: Duration) -> Self {
        self.options.backoff_type = backoff_type;
        self.options.initial_backoff = initial;
        self.options.max_backoff = max;
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.options.user_agent = agent.into();
        self
    }

    /// Build the options
    pub fn build(self) -> ClientOptions {
        self.options
    }
}

/// Extra options for a single call
///
/// For paginated calls these are re-applied to every page request.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Request headers, merged over the client's defaults
    pub headers: BTreeMap<String, String>,
    /// Override timeout for this request
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    /// Create empty request options
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
