//! Port definition for the key-addressed media store.

use std::path::PathBuf;

use bytes::Bytes;

use crate::domain::entities::CacheKey;

/// Result type for store operations.
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Errors that can occur inside a media store.
///
/// These never escape the cache's public fetch surface; a failing store read
/// or write is logged and treated as a miss.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CacheError {
    /// I/O error while reading or writing an entry.
    #[error("store io error: {0}")]
    Io(String),
}

/// Port for a key-addressed blob store with per-entry expiry and a byte cap.
///
/// Implementations must guarantee atomic entry replacement: a read racing a
/// write for the same key observes the old or the new payload, never a torn
/// one. Expired entries behave as absent.
#[async_trait::async_trait]
pub trait MediaStorePort: Send + Sync {
    /// Payload bytes for an unexpired entry, or None on miss.
    async fn data(&self, key: &CacheKey) -> Option<Bytes>;

    /// Local path of an unexpired entry, or None on miss.
    async fn path(&self, key: &CacheKey) -> Option<PathBuf>;

    /// Writes or overwrites the entry, returning its path.
    ///
    /// # Errors
    /// Returns error if the entry cannot be persisted.
    async fn put(&self, key: &CacheKey, data: &[u8]) -> CacheResult<PathBuf>;

    /// Removes a single entry. Missing entries are not an error.
    async fn remove(&self, key: &CacheKey);

    /// Returns true if an unexpired entry exists.
    async fn contains(&self, key: &CacheKey) -> bool {
        self.path(key).await.is_some()
    }

    /// Removes every entry. Idempotent.
    ///
    /// # Errors
    /// Returns error if the store cannot be enumerated.
    async fn clear(&self) -> CacheResult<()>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory store standing in for the disk tier in tests.
    pub struct MockMediaStore {
        entries: Mutex<HashMap<CacheKey, Bytes>>,
        fail_writes: bool,
    }

    impl MockMediaStore {
        /// Creates an empty mock store.
        pub fn new() -> Self {
            Self {
                entries: Mutex::new(HashMap::new()),
                fail_writes: false,
            }
        }

        /// Creates a mock whose writes always fail.
        pub fn failing_writes() -> Self {
            Self {
                entries: Mutex::new(HashMap::new()),
                fail_writes: true,
            }
        }

        fn fake_path(key: &CacheKey) -> PathBuf {
            PathBuf::from(format!("/mock-store/{}", key.file_stem()))
        }
    }

    #[async_trait::async_trait]
    impl MediaStorePort for MockMediaStore {
        async fn data(&self, key: &CacheKey) -> Option<Bytes> {
            self.entries.lock().unwrap().get(key).cloned()
        }

        async fn path(&self, key: &CacheKey) -> Option<PathBuf> {
            self.entries
                .lock()
                .unwrap()
                .contains_key(key)
                .then(|| Self::fake_path(key))
        }

        async fn put(&self, key: &CacheKey, data: &[u8]) -> CacheResult<PathBuf> {
            if self.fail_writes {
                return Err(CacheError::Io("mock write failure".into()));
            }
            self.entries
                .lock()
                .unwrap()
                .insert(key.clone(), Bytes::copy_from_slice(data));
            Ok(Self::fake_path(key))
        }

        async fn remove(&self, key: &CacheKey) {
            self.entries.lock().unwrap().remove(key);
        }

        async fn clear(&self) -> CacheResult<()> {
            self.entries.lock().unwrap().clear();
            Ok(())
        }
    }
}
