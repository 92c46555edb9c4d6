//! Outbound HTTP configuration shared by the news extractor and the market
//! data provider.
//!
//! Both components issue plain GET requests against endpoints we do not
//! control, so the knobs that matter are the `User-Agent` header (a real
//! looking one avoids trivial bot blocking) and the end-to-end request
//! timeout, covering connect and body read together. A timeout is always
//! present: [`FetchConfig::default`] supplies one and the CLI only ever
//! overrides its value.

use std::time::Duration;

/// Default `User-Agent`, overridable per run.
pub const DEFAULT_USER_AGENT: &str = concat!(
    "Mozilla/5.0 (compatible; market_brief/",
    env!("CARGO_PKG_VERSION"),
    ")"
);

/// Default end-to-end request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Options applied to every outbound request.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Value of the `User-Agent` header.
    pub user_agent: String,
    /// Total request timeout, from connection establishment through the
    /// last body byte.
    pub timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl FetchConfig {
    /// Build a connection-pooling [`reqwest::Client`] with these options.
    ///
    /// The client is a cheap handle to a shared pool and is safe to use
    /// from any number of concurrent requests. Pooled connections are
    /// released on every exit path, including timeouts.
    pub fn build_client(&self) -> Result<reqwest::Client, reqwest::Error> {
        reqwest::ClientBuilder::new()
            .user_agent(&self.user_agent)
            .timeout(self.timeout)
            .build()
    }
}
