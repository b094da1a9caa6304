//! HTTP transport adapter.

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::domain::entities::Locator;
use crate::domain::ports::{TransportError, TransportPort};

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Transport backed by an HTTP client. No retries; retry policy belongs to
/// whoever owns the transport.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport with the given request timeout.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(timeout_secs: u64) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| TransportError::Request(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Creates a transport with the default timeout.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn with_defaults() -> Result<Self, TransportError> {
        Self::new(DEFAULT_TIMEOUT_SECS)
    }
}

#[async_trait]
impl TransportPort for HttpTransport {
    async fn fetch(&self, locator: &Locator) -> Result<Bytes, TransportError> {
        debug!(locator = %locator, "Requesting media");

        let response = self
            .client
            .get(locator.as_str())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout
                } else {
                    TransportError::Request(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
            });
        }

        response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout
            } else {
                TransportError::Body(e.to_string())
            }
        })
    }
}
