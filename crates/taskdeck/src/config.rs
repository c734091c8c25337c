//! Client configuration.

use std::time::Duration;

use crate::types::ApiUrl;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for the API client.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use taskdeck::{ApiUrl, ClientConfig};
///
/// let config = ClientConfig::new(ApiUrl::new("http://localhost:3000/api").unwrap())
///     .with_timeout(Duration::from_secs(5));
/// assert_eq!(config.timeout, Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every endpoint path is appended to.
    pub base_url: ApiUrl,
    /// Per-request timeout.
    pub timeout: Duration,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl ClientConfig {
    /// Create a configuration with default timeout and user agent.
    pub fn new(base_url: ApiUrl) -> Self {
        Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!("taskdeck/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
