//! Error taxonomy for outbound calls

/// Every way a gateway call can fail.
///
/// The variants stay distinguishable all the way to the controller, which
/// decides whether a failure is absorbed (background poll, pagination) or
/// surfaced (one-shot user action).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// Transport failed before any response arrived.
    #[error("network error: {0}")]
    Network(String),

    /// No response within the deadline; the call was cancelled.
    #[error("request to {endpoint} timed out after {timeout_ms} ms")]
    Timeout { endpoint: String, timeout_ms: u64 },

    /// A response arrived with a non-success status.
    #[error("HTTP {0}")]
    Http(u16),

    /// The body did not decode as the expected payload.
    #[error("unexpected response body: {0}")]
    Parse(String),

    /// HTTP success, but the backend answered `{ok: false}`.
    #[error("rejected by backend: {0}")]
    Rejected(String),
}

impl GatewayError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, GatewayError::Timeout { .. })
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            GatewayError::Http(code) => Some(*code),
            _ => None,
        }
    }
}
