//! Transport port definition for remote media fetches.

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::entities::Locator;

/// Errors produced by the transport collaborator.
///
/// These surface verbatim to cache callers; the cache never retries.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    /// The request could not be sent or failed mid-flight.
    #[error("request failed: {0}")]
    Request(String),
    /// The server answered with a non-success status.
    #[error("server returned HTTP {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },
    /// The response body could not be read.
    #[error("failed to read response body: {0}")]
    Body(String),
    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,
    /// The fetch was cancelled before completion. Nothing was stored.
    #[error("fetch cancelled")]
    Cancelled,
}

/// Port for fetching remote media bytes.
#[async_trait]
pub trait TransportPort: Send + Sync {
    /// Fetches the resource at `locator`, returning its bytes.
    async fn fetch(&self, locator: &Locator) -> Result<Bytes, TransportError>;
}
