use thiserror::Error;

/// Top-level error type for the `cio-track` crate.
///
/// Two families: precondition errors (raised synchronously, before any
/// network activity — these are programmer errors, not retryable) and
/// transport errors (connection failures, non-success statuses, bad JSON).
#[derive(Debug, Error)]
pub enum Error {
    // ── Preconditions ───────────────────────────────────────────────
    /// The Track API key was empty at construction.
    #[error("Customer.io tracking site:key combo required")]
    MissingApiKey,

    /// A customer-scoped operation was called with no identified customer.
    #[error("customer id required before calling {operation}")]
    CustomerRequired { operation: &'static str },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Non-success HTTP status from the Track API. Carries the attempted URL.
    #[error("request to {url} failed with HTTP {status}")]
    Api { status: u16, url: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this error was raised before any network call.
    ///
    /// Precondition errors indicate a caller bug — retrying the same call
    /// will fail the same way.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::MissingApiKey | Self::CustomerRequired { .. })
    }

    /// Returns `true` for connection-level or HTTP-status failures.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Api { .. } | Self::Deserialization { .. }
        )
    }

    /// Extract the HTTP status code, if this error carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
