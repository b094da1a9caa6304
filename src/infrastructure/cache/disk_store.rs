//! Disk-backed media store with expiry and a size cap.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use bytes::Bytes;
use tokio::fs;
use tracing::{debug, trace, warn};

use crate::domain::entities::CacheKey;
use crate::domain::ports::{CacheError, CacheResult, MediaStorePort};

/// Maximum store size in bytes (512 MB default).
pub const DEFAULT_MAX_STORE_SIZE: u64 = 512 * 1024 * 1024;

/// Default entry time-to-live (three days).
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600 * 24 * 3);

/// Disk tier persisting raw media payloads across sessions.
///
/// Entries are one file per key, named by the key's hashed stem and keeping a
/// player-recognizable extension where the key carries one. Writes go through
/// a temp file plus rename, so a racing reader sees the old or the new
/// payload, never a torn one. Entries older than the TTL behave as absent and
/// are swept lazily.
pub struct DiskMediaStore {
    store_dir: PathBuf,
    max_size: u64,
    ttl: Duration,
    current_size: AtomicU64,
    entry_count: AtomicUsize,
}

impl DiskMediaStore {
    /// Creates a store in `store_dir`, scanning whatever survived the last
    /// session and sweeping entries past their TTL.
    ///
    /// # Errors
    /// Returns error if the store directory cannot be created or read.
    pub async fn new(store_dir: PathBuf, max_size: u64, ttl: Duration) -> CacheResult<Self> {
        fs::create_dir_all(&store_dir)
            .await
            .map_err(|e| CacheError::Io(format!("failed to create store dir: {e}")))?;

        let mut total_size = 0u64;
        let mut count = 0usize;

        let mut entries = fs::read_dir(&store_dir)
            .await
            .map_err(|e| CacheError::Io(format!("failed to read store dir: {e}")))?;

        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if Self::is_entry_file(&path)
                && let Ok(meta) = entry.metadata().await
            {
                total_size += meta.len();
                count += 1;
            }
        }

        let store = Self {
            store_dir,
            max_size,
            ttl,
            current_size: AtomicU64::new(total_size),
            entry_count: AtomicUsize::new(count),
        };

        store.sweep_expired().await;
        store.cleanup_if_needed().await;

        Ok(store)
    }

    /// Creates a store in the platform cache directory with default limits.
    ///
    /// # Errors
    /// Returns error if the store directory cannot be created.
    pub async fn default_location() -> CacheResult<Self> {
        Self::new(default_store_dir(), DEFAULT_MAX_STORE_SIZE, DEFAULT_TTL).await
    }

    /// Returns the on-disk path for a key.
    fn entry_path(&self, key: &CacheKey) -> PathBuf {
        let extension = key.playable_suffix().unwrap_or_else(|| "bin".to_string());
        self.store_dir
            .join(format!("{}.{}", key.file_stem(), extension))
    }

    /// Entry files are named by a 32-char hex stem.
    fn is_entry_file(path: &std::path::Path) -> bool {
        path.file_stem()
            .and_then(|stem| stem.to_str())
            .is_some_and(|stem| stem.len() == 32 && stem.chars().all(|c| c.is_ascii_hexdigit()))
    }

    fn is_expired(&self, meta: &std::fs::Metadata) -> bool {
        meta.modified()
            .ok()
            .and_then(|written| written.elapsed().ok())
            .is_some_and(|age| age >= self.ttl)
    }

    /// Current store size in bytes.
    #[must_use]
    pub fn current_size(&self) -> u64 {
        self.current_size.load(Ordering::Relaxed)
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entry_count.load(Ordering::Relaxed)
    }

    /// Returns true when the store holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every entry past its TTL. Runs at startup and may be called
    /// again by the host at any time.
    pub async fn sweep_expired(&self) {
        let Ok(mut entries) = fs::read_dir(&self.store_dir).await else {
            return;
        };

        let mut swept_size = 0u64;
        let mut swept_count = 0usize;

        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if !Self::is_entry_file(&path) {
                continue;
            }
            let Ok(meta) = entry.metadata().await else {
                continue;
            };
            if self.is_expired(&meta) && fs::remove_file(&path).await.is_ok() {
                swept_size += meta.len();
                swept_count += 1;
            }
        }

        if swept_count > 0 {
            self.current_size.fetch_sub(swept_size, Ordering::Relaxed);
            self.entry_count.fetch_sub(swept_count, Ordering::Relaxed);
            debug!(count = swept_count, bytes = swept_size, "Swept expired entries");
        }
    }

    /// Frees the oldest entries (by access time) when over the size cap.
    async fn cleanup_if_needed(&self) {
        let current_size = self.current_size();
        if current_size <= self.max_size {
            return;
        }

        debug!(
            current_size = current_size,
            max_size = self.max_size,
            "Store over size cap, evicting"
        );

        let Ok(mut entries) = fs::read_dir(&self.store_dir).await else {
            return;
        };

        let mut files: Vec<(PathBuf, std::time::SystemTime, u64)> = Vec::new();

        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if !Self::is_entry_file(&path) {
                continue;
            }
            if let Ok(meta) = entry.metadata().await {
                let accessed = meta.accessed().unwrap_or(std::time::SystemTime::UNIX_EPOCH);
                files.push((path, accessed, meta.len()));
            }
        }

        files.sort_by_key(|(_, accessed, _)| *accessed);

        let mut freed_size = 0u64;
        let mut freed_count = 0usize;
        let target = current_size - self.max_size + (self.max_size / 10);

        for (path, _, size) in files {
            if freed_size >= target {
                break;
            }
            if let Err(e) = fs::remove_file(&path).await {
                warn!(path = %path.display(), error = %e, "Failed to evict entry");
            } else {
                freed_size += size;
                freed_count += 1;
            }
        }

        self.current_size.fetch_sub(freed_size, Ordering::Relaxed);
        self.entry_count.fetch_sub(freed_count, Ordering::Relaxed);

        debug!(freed_size = freed_size, freed_count = freed_count, "Eviction complete");
    }
}

#[async_trait::async_trait]
impl MediaStorePort for DiskMediaStore {
    async fn data(&self, key: &CacheKey) -> Option<Bytes> {
        let path = self.path(key).await?;
        match fs::read(&path).await {
            Ok(bytes) => {
                trace!(key = %key, path = %path.display(), "Disk tier hit");
                Some(Bytes::from(bytes))
            }
            Err(e) => {
                trace!(key = %key, error = %e, "Disk tier read failed, treating as miss");
                None
            }
        }
    }

    async fn path(&self, key: &CacheKey) -> Option<PathBuf> {
        let path = self.entry_path(key);
        let meta = fs::metadata(&path).await.ok()?;
        if self.is_expired(&meta) {
            trace!(key = %key, "Entry past TTL, removing");
            self.remove(key).await;
            return None;
        }
        Some(path)
    }

    async fn put(&self, key: &CacheKey, data: &[u8]) -> CacheResult<PathBuf> {
        let path = self.entry_path(key);
        let old_size = fs::metadata(&path).await.map(|m| m.len()).ok();

        let store_dir = self.store_dir.clone();
        let target = path.clone();
        let payload = data.to_vec();

        tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            use std::io::Write;
            let mut temp = tempfile::NamedTempFile::new_in(&store_dir)?;
            temp.write_all(&payload)?;
            temp.flush()?;
            temp.persist(&target).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(|e| CacheError::Io(format!("write task panicked: {e}")))?
        .map_err(|e| CacheError::Io(format!("failed to write entry: {e}")))?;

        let new_size = data.len() as u64;
        if let Some(old) = old_size {
            if new_size > old {
                self.current_size.fetch_add(new_size - old, Ordering::Relaxed);
            } else {
                self.current_size.fetch_sub(old - new_size, Ordering::Relaxed);
            }
        } else {
            self.current_size.fetch_add(new_size, Ordering::Relaxed);
            self.entry_count.fetch_add(1, Ordering::Relaxed);
        }

        debug!(key = %key, path = %path.display(), size = data.len(), "Stored entry");

        self.cleanup_if_needed().await;

        Ok(path)
    }

    async fn remove(&self, key: &CacheKey) {
        let path = self.entry_path(key);
        let size = fs::metadata(&path).await.map(|m| m.len()).ok();
        if let Err(e) = fs::remove_file(&path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(key = %key, error = %e, "Failed to remove entry");
            }
        } else if let Some(s) = size {
            self.current_size.fetch_sub(s, Ordering::Relaxed);
            self.entry_count.fetch_sub(1, Ordering::Relaxed);
            debug!(key = %key, "Removed entry");
        }
    }

    async fn clear(&self) -> CacheResult<()> {
        let mut entries = fs::read_dir(&self.store_dir)
            .await
            .map_err(|e| CacheError::Io(format!("failed to read store dir: {e}")))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| CacheError::Io(format!("failed to read entry: {e}")))?
        {
            let path = entry.path();
            if Self::is_entry_file(&path) && fs::remove_file(&path).await.is_err() {
                warn!(path = %path.display(), "Failed to remove entry file");
            }
        }
        self.current_size.store(0, Ordering::Relaxed);
        self.entry_count.store(0, Ordering::Relaxed);
        debug!("Cleared disk tier");
        Ok(())
    }
}

/// Returns the default store directory.
fn default_store_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "photoroll", "photoroll").map_or_else(
        || std::env::temp_dir().join("photoroll").join("cache").join("media"),
        |dirs| dirs.cache_dir().join("media"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Locator;
    use tempfile::TempDir;
    use tokio_test::assert_ok;

    fn key(raw: &str) -> CacheKey {
        CacheKey::derive(&Locator::new(raw))
    }

    async fn create_test_store() -> (DiskMediaStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = DiskMediaStore::new(temp_dir.path().to_path_buf(), 1024 * 1024, DEFAULT_TTL)
            .await
            .unwrap();
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_put_and_read_back() {
        let (store, _temp) = create_test_store().await;
        let key = key("https://h/clip.mp4");

        let path = store.put(&key, b"movie bytes").await.unwrap();
        assert_eq!(path.extension().unwrap(), "mp4");

        let data = store.data(&key).await.unwrap();
        assert_eq!(&data[..], b"movie bytes");
        assert_eq!(store.path(&key).await, Some(path));
    }

    #[tokio::test]
    async fn test_miss() {
        let (store, _temp) = create_test_store().await;
        assert!(store.data(&key("https://h/nothing.mp4")).await.is_none());
        assert!(store.path(&key("https://h/nothing.mp4")).await.is_none());
    }

    #[tokio::test]
    async fn test_overwrite_is_last_writer_wins() {
        let (store, _temp) = create_test_store().await;
        let key = key("https://h/clip.mp4");

        store.put(&key, b"first").await.unwrap();
        store.put(&key, b"second").await.unwrap();

        assert_eq!(&store.data(&key).await.unwrap()[..], b"second");
        assert_eq!(store.len(), 1);
        assert_eq!(store.current_size(), 6);
    }

    #[tokio::test]
    async fn test_expired_entry_is_absent() {
        let temp_dir = TempDir::new().unwrap();
        let store =
            DiskMediaStore::new(temp_dir.path().to_path_buf(), 1024 * 1024, Duration::ZERO)
                .await
                .unwrap();
        let key = key("https://h/clip.mp4");

        store.put(&key, b"stale").await.unwrap();
        assert!(store.path(&key).await.is_none());
        assert!(store.data(&key).await.is_none());
    }

    #[tokio::test]
    async fn test_sweep_expired_updates_counters() {
        let temp_dir = TempDir::new().unwrap();
        let store =
            DiskMediaStore::new(temp_dir.path().to_path_buf(), 1024 * 1024, Duration::ZERO)
                .await
                .unwrap();

        store.put(&key("https://h/a.mp4"), b"aaaa").await.unwrap();
        store.put(&key("https://h/b.mp4"), b"bbbb").await.unwrap();
        assert_eq!(store.len(), 2);

        store.sweep_expired().await;
        assert_eq!(store.len(), 0);
        assert_eq!(store.current_size(), 0);
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let (store, _temp) = create_test_store().await;
        let a = key("https://h/a.mp4");
        let b = key("https://h/b.mp4");

        store.put(&a, b"aa").await.unwrap();
        store.put(&b, b"bb").await.unwrap();

        store.remove(&a).await;
        assert!(store.data(&a).await.is_none());
        assert_eq!(store.len(), 1);

        assert_ok!(store.clear().await);
        assert_eq!(store.len(), 0);
        assert!(store.data(&b).await.is_none());

        // clearing an already empty store is fine
        assert_ok!(store.clear().await);
    }

    #[tokio::test]
    async fn test_size_cap_evicts_oldest() {
        let temp_dir = TempDir::new().unwrap();
        let store = DiskMediaStore::new(temp_dir.path().to_path_buf(), 10, DEFAULT_TTL)
            .await
            .unwrap();

        store.put(&key("https://h/a.mp4"), b"123456").await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        store.put(&key("https://h/b.mp4"), b"123456").await.unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.current_size(), 6);
        assert!(store.data(&key("https://h/b.mp4")).await.is_some());
    }

    #[tokio::test]
    async fn test_rescan_on_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let key = key("https://h/clip.mp4");
        {
            let store =
                DiskMediaStore::new(temp_dir.path().to_path_buf(), 1024 * 1024, DEFAULT_TTL)
                    .await
                    .unwrap();
            store.put(&key, b"persisted").await.unwrap();
        }

        let reopened =
            DiskMediaStore::new(temp_dir.path().to_path_buf(), 1024 * 1024, DEFAULT_TTL)
                .await
                .unwrap();
        assert_eq!(reopened.len(), 1);
        assert_eq!(&reopened.data(&key).await.unwrap()[..], b"persisted");
    }
}
