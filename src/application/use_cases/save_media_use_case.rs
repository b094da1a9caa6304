//! Save-to-library use case.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::entities::{MediaItem, MediaSource};
use crate::domain::ports::{
    AssetError, AssetProviderPort, FetchError, MediaFetchPort, MediaLibraryPort,
};

/// Errors surfaced when saving an item to the platform library.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SaveMediaError {
    /// The item's payload could not be fetched.
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// The platform library rejected the item or could not load it.
    #[error(transparent)]
    Asset(#[from] AssetError),
    /// The item carries no payload this crate can reach (in-memory images
    /// stay with the host).
    #[error("item has no saveable payload")]
    Unsupported,
}

/// Saves browsed items into the platform media library. Remote videos are
/// resolved to a playable local path through the media cache first.
#[derive(Clone)]
pub struct SaveMediaUseCase {
    cache: Arc<dyn MediaFetchPort>,
    assets: Arc<dyn AssetProviderPort>,
    library: Arc<dyn MediaLibraryPort>,
}

impl SaveMediaUseCase {
    /// Creates a new save use case.
    #[must_use]
    pub fn new(
        cache: Arc<dyn MediaFetchPort>,
        assets: Arc<dyn AssetProviderPort>,
        library: Arc<dyn MediaLibraryPort>,
    ) -> Self {
        Self {
            cache,
            assets,
            library,
        }
    }

    /// Saves one item.
    ///
    /// # Errors
    /// Returns error if the payload cannot be fetched or the library write
    /// fails.
    pub async fn execute(&self, item: &MediaItem) -> Result<(), SaveMediaError> {
        debug!(id = %item.id(), video = item.is_video(), "Saving media to library");

        match (item.source(), item.is_video()) {
            (MediaSource::Url(locator), true) => {
                let path = self.cache.fetch_path(locator).await.map_err(|e| {
                    warn!(id = %item.id(), error = %e, "Could not resolve playable path");
                    e
                })?;
                self.library.save_video(&path).await?;
            }
            (MediaSource::Url(locator), false) => {
                let data = self.cache.fetch_data(locator).await?;
                self.library.save_image(data).await?;
            }
            (MediaSource::Asset { .. }, true) => {
                let path = self.assets.playable_path(item.id()).await?;
                self.library.save_video(&path).await?;
            }
            (MediaSource::Asset { .. }, false) => {
                let data = self.assets.image_data(item.id(), None).await?;
                self.library.save_image(data).await?;
            }
            (MediaSource::Memory, _) => return Err(SaveMediaError::Unsupported),
        }

        info!(id = %item.id(), "Media saved to library");
        Ok(())
    }
}
