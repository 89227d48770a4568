//! Gateway module - the single point of contact with the backend API
//!
//! - `transport`: the wire seam (`Transport` trait, reqwest implementation)
//! - `credentials`: where the `X-API-Key` value comes from
//! - `error`: the failure taxonomy every caller matches on

mod credentials;
mod error;
mod transport;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;

pub use credentials::{CredentialSource, SharedCredential};
pub use error::GatewayError;
pub use transport::{HttpTransport, Method, OutboundRequest, RawResponse, Transport, TransportError};

pub const API_KEY_HEADER: &str = "X-API-Key";

/// Endpoints reachable without a credential (artwork and health).
pub const PUBLIC_ENDPOINTS: &[&str] = &[
    "/api/health",
    "/api/content/cover",
    "/api/content/artist",
    "/api/content/album",
    "/api/content/art",
    "/api/content/image",
    "/api/content/thumb",
];

/// Build `path?key=value&...`, percent-encoding each value. Empty values are kept.
pub fn with_query(path: &str, params: &[(&str, String)]) -> String {
    if params.is_empty() {
        return path.to_string();
    }
    let query: Vec<String> = params
        .iter()
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
        .collect();
    format!("{}?{}", path, query.join("&"))
}

/// Issues outbound calls with a hard deadline and credential injection.
///
/// Holds no per-call state: two concurrent calls to the same endpoint get two
/// independent outcomes. Cheap to clone.
#[derive(Clone)]
pub struct RequestGateway {
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialSource>,
    default_timeout: Duration,
}

impl RequestGateway {
    pub fn new(
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialSource>,
        default_timeout: Duration,
    ) -> Self {
        Self {
            transport,
            credentials,
            default_timeout,
        }
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    pub fn requires_credential(endpoint: &str) -> bool {
        let path = endpoint.split('?').next().unwrap_or(endpoint);
        !PUBLIC_ENDPOINTS.iter().any(|prefix| path.starts_with(prefix))
    }

    /// Perform one call. `timeout` falls back to the gateway default.
    ///
    /// On deadline expiry the transport future is dropped, which cancels the
    /// in-flight call, and `GatewayError::Timeout` is returned.
    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<serde_json::Value>,
        timeout: Option<Duration>,
    ) -> Result<T, GatewayError> {
        let deadline = timeout.unwrap_or(self.default_timeout);

        let mut headers = Vec::with_capacity(1);
        if Self::requires_credential(endpoint) {
            if let Some(key) = self.credentials.credential() {
                headers.push((API_KEY_HEADER, key));
            } else {
                tracing::debug!(endpoint, "No credential available for authenticated endpoint");
            }
        }

        let request = OutboundRequest {
            method,
            path: endpoint.to_string(),
            headers,
            body,
        };

        tracing::trace!(endpoint, method = method.as_str(), timeout_ms = deadline.as_millis() as u64, "Gateway request started");

        let response = match tokio::time::timeout(deadline, self.transport.send(request)).await {
            Err(_) => {
                tracing::debug!(endpoint, timeout_ms = deadline.as_millis() as u64, "Gateway request timed out");
                return Err(GatewayError::Timeout {
                    endpoint: endpoint.to_string(),
                    timeout_ms: deadline.as_millis() as u64,
                });
            }
            Ok(Err(e)) => {
                tracing::debug!(endpoint, error = %e, "Gateway transport failed");
                return Err(GatewayError::Network(e.to_string()));
            }
            Ok(Ok(response)) => response,
        };

        if !(200..300).contains(&response.status) {
            tracing::debug!(endpoint, status = response.status, "Gateway request returned error status");
            return Err(GatewayError::Http(response.status));
        }

        serde_json::from_slice(&response.body).map_err(|e| {
            tracing::debug!(endpoint, error = %e, "Gateway response did not decode");
            GatewayError::Parse(e.to_string())
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, GatewayError> {
        self.request(endpoint, Method::Get, None, None).await
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T, GatewayError> {
        self.request(endpoint, Method::Post, body, None).await
    }
}
