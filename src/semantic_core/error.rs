//! Failure taxonomy for calls against the semantic core service.

use thiserror::Error;

/// Errors returned while talking to the semantic core service.
///
/// Every variant travels on the `Err` side of a `Result`; the HTTP adapter is the only place
/// these are turned into responses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemanticCoreError {
    /// Base URL failed to parse. Only raised while constructing the client.
    #[error("Invalid semantic core URL: {0}")]
    InvalidUrl(String),
    /// Transport failed before any response arrived.
    #[error("HTTP request failed: {0}")]
    Network(String),
    /// The call did not complete within the client deadline.
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout {
        /// Deadline that was exceeded, in milliseconds.
        timeout_ms: u64,
    },
    /// Upstream answered with a status outside 200-299.
    #[error("Upstream HTTP {status}")]
    Upstream {
        /// Status code returned by the upstream.
        status: u16,
        /// Raw response body, kept for diagnostics.
        body: String,
    },
    /// Body was declared as JSON but could not be decoded.
    #[error("Failed to parse JSON from upstream: {0}")]
    Parse(String),
    /// Body exceeded the configured read cap.
    #[error("Upstream response exceeded {limit} bytes")]
    BodyTooLarge {
        /// Maximum number of bytes the client is willing to buffer.
        limit: usize,
    },
}

impl SemanticCoreError {
    /// Status and body of an upstream rejection, when this is one.
    pub fn upstream_details(&self) -> Option<(u16, &str)> {
        match self {
            Self::Upstream { status, body } => Some((*status, body.as_str())),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SemanticCoreError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}
