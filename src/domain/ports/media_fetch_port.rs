//! Consumer contract of the media cache.

use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;

use super::transport_port::TransportError;
use crate::domain::entities::Locator;

/// Failure of a cache fetch, as seen by consumers.
///
/// Store I/O faults below the cache surface degrade to a network fetch and
/// never appear here; `Io` is the last resort when bytes arrived but no
/// local path could be produced at all.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    /// The underlying transport failed; propagated verbatim.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// No local representation could be materialized.
    #[error("io error: {0}")]
    Io(String),
}

/// Port for resolving media locators to local representations.
///
/// Every call completes with data or a typed failure; there are no silent
/// drops, so the host can always swap in content or an error placeholder.
#[async_trait]
pub trait MediaFetchPort: Send + Sync {
    /// Resolves a locator to a playable local path, fetching on a miss.
    /// Local locators pass through untouched.
    async fn fetch_path(&self, locator: &Locator) -> Result<PathBuf, FetchError>;

    /// Resolves a locator to its payload bytes, fetching on a miss.
    async fn fetch_data(&self, locator: &Locator) -> Result<Bytes, FetchError>;
}
