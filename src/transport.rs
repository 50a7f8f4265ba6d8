// Shared transport configuration for building reqwest::Client instances.
//
// The Track client injects its Authorization header through
// `build_client_with_headers`, keeping credential handling out of the
// per-request path.

use std::time::Duration;

use crate::error::Error;

/// Transport configuration for the underlying HTTP client.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Per-request timeout. Default: 30s.
    pub timeout: Duration,

    /// `User-Agent` header sent on every request.
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: concat!("cio-track/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` with the given default headers.
    pub fn build_client_with_headers(
        &self,
        headers: reqwest::header::HeaderMap,
    ) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str())
            .default_headers(headers)
            .build()
            .map_err(Error::Transport)
    }
}
