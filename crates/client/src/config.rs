//! Client configuration.

use std::time::Duration;

/// Configuration for a [`Connection`](crate::Connection).
///
/// The consumer secret is redacted in Debug output to prevent accidental
/// exposure in logs.
#[derive(Clone)]
pub struct ClientConfig {
    /// OAuth consumer key (client_id).
    pub consumer_key: String,
    /// OAuth consumer secret (client_secret).
    consumer_secret: String,
    /// Host used for token grants. Defaults to `login.salesforce.com`.
    pub login_host: String,
    /// API version used to build data paths.
    pub api_version: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// User-Agent header value.
    pub user_agent: String,
    /// Whether to emit request/response tracing events.
    pub enable_tracing: bool,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"[REDACTED]")
            .field("login_host", &self.login_host)
            .field("api_version", &self.api_version)
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("user_agent", &self.user_agent)
            .field("enable_tracing", &self.enable_tracing)
            .finish()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            consumer_key: String::new(),
            consumer_secret: String::new(),
            login_host: crate::DEFAULT_LOGIN_HOST.to_string(),
            api_version: crate::DEFAULT_API_VERSION.to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: crate::USER_AGENT.to_string(),
            enable_tracing: true,
        }
    }
}

impl ClientConfig {
    /// Create a config for the given connected-app credentials.
    pub fn new(consumer_key: impl Into<String>, consumer_secret: impl Into<String>) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            ..Self::default()
        }
    }

    /// Create a new config builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Get the consumer secret (for internal use).
    pub(crate) fn consumer_secret(&self) -> &str {
        &self.consumer_secret
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the OAuth consumer key.
    pub fn with_consumer_key(mut self, key: impl Into<String>) -> Self {
        self.config.consumer_key = key.into();
        self
    }

    /// Set the OAuth consumer secret.
    pub fn with_consumer_secret(mut self, secret: impl Into<String>) -> Self {
        self.config.consumer_secret = secret.into();
        self
    }

    /// Set the login host used for token grants.
    pub fn with_login_host(mut self, host: impl Into<String>) -> Self {
        self.config.login_host = host.into();
        self
    }

    /// Set the API version.
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.config.api_version = version.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the connection timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set a custom User-Agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Enable or disable request/response tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.config.enable_tracing = enabled;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}
