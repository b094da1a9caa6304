//! Asset provider port definition.

use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::entities::MediaId;

/// Errors produced by the platform media library collaborator.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AssetError {
    /// No asset exists for the identity.
    #[error("asset not found: {0}")]
    NotFound(String),
    /// The asset exists but its payload could not be loaded.
    #[error("failed to load asset: {0}")]
    Load(String),
    /// Saving into the platform library failed.
    #[error("failed to save media: {0}")]
    Save(String),
}

/// Port onto the platform media library: resolves item identities to
/// loadable payloads. Everything beyond this identity contract (permission
/// prompts, iCloud download progress, thumbnail sizing) is host-owned.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssetProviderPort: Send + Sync {
    /// Image bytes for a photo asset, optionally scaled to a target size.
    async fn image_data(
        &self,
        id: &MediaId,
        target_size: Option<(u32, u32)>,
    ) -> Result<Bytes, AssetError>;

    /// Local playable path for a video asset.
    async fn playable_path(&self, id: &MediaId) -> Result<PathBuf, AssetError>;

    /// Reported duration in seconds for video assets.
    async fn video_duration(&self, id: &MediaId) -> Option<f64>;
}

/// Port for writing media back into the platform library.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaLibraryPort: Send + Sync {
    /// Saves a video file into the library.
    async fn save_video(&self, path: &std::path::Path) -> Result<(), AssetError>;

    /// Saves image bytes into the library.
    async fn save_image(&self, data: Bytes) -> Result<(), AssetError>;
}
