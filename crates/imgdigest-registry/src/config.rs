//! Per-lookup transport configuration

use crate::error::{Error, Result};
use std::fmt;
use std::time::Duration;

/// Default whole-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default connect timeout
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// URL scheme used to reach the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheme {
    #[default]
    Https,
    /// Plain-text registries (local mirrors, test servers)
    Http,
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheme::Https => write!(f, "https"),
            Scheme::Http => write!(f, "http"),
        }
    }
}

/// Transport settings for a digest lookup
///
/// Every lookup builds its own HTTP client from this, so TLS settings of one
/// lookup never leak into another.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Skip TLS certificate verification
    pub insecure_skip_verify: bool,
    /// Whole-request timeout; `None` waits indefinitely
    pub timeout: Option<Duration>,
    pub connect_timeout: Duration,
    pub user_agent: String,
    pub scheme: Scheme,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            insecure_skip_verify: false,
            timeout: Some(DEFAULT_TIMEOUT),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            user_agent: format!("imgdigest/{}", env!("CARGO_PKG_VERSION")),
            scheme: Scheme::Https,
        }
    }
}

impl ResolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_insecure_skip_verify(mut self, insecure: bool) -> Self {
        self.insecure_skip_verify = insecure;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Build a fresh HTTP client for one lookup
    pub fn build_client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder()
            .user_agent(self.user_agent.clone())
            .connect_timeout(self.connect_timeout)
            .danger_accept_invalid_certs(self.insecure_skip_verify);

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        builder
            .build()
            .map_err(|e| Error::request_build(format!("failed to build HTTP client: {}", e)))
    }
}
