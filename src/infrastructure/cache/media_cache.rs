//! Media cache orchestrator.
//!
//! Resolves locators through three tiers: memory, disk, network. Concurrent
//! fetches for the same key are coalesced onto one in-flight transport
//! request; later callers subscribe to its outcome instead of fetching
//! again. A background worker serves prefetch requests with bounded
//! concurrency and reports every completion over an event channel.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use tokio::sync::{Semaphore, mpsc, watch};
use tracing::{debug, error, info, trace, warn};

use crate::domain::entities::{CacheKey, Locator};
use crate::domain::ports::{FetchError, MediaFetchPort, MediaStorePort, TransportPort};

use super::memory_store::{MemoryMediaStore, MemoryStats};

/// Message sent when a prefetch finishes, successfully or not.
#[derive(Debug, Clone)]
pub struct MediaFetchedEvent {
    /// Cache key of the request.
    pub key: CacheKey,
    /// Locator the request was issued for.
    pub locator: Locator,
    /// Local path of the fetched media, or the failure.
    pub result: Result<PathBuf, FetchError>,
}

/// Configuration for the media cache.
#[derive(Debug, Clone)]
pub struct MediaCacheConfig {
    /// Maximum payloads held in the memory tier.
    pub memory_entries: usize,
    /// Maximum concurrent prefetch downloads.
    pub max_concurrent_fetches: usize,
}

impl Default for MediaCacheConfig {
    fn default() -> Self {
        Self {
            memory_entries: 10,
            max_concurrent_fetches: 4,
        }
    }
}

type FetchOutcome = Result<PathBuf, FetchError>;
type InFlightMap = HashMap<CacheKey, watch::Receiver<Option<FetchOutcome>>>;

#[derive(Debug)]
enum CacheCommand {
    Prefetch { locator: Locator },
    Cancel { key: CacheKey },
    CancelAll,
}

/// Shared tiers and transport behind both the direct fetch API and the
/// prefetch worker.
struct CacheInner {
    memory: MemoryMediaStore,
    store: Arc<dyn MediaStorePort>,
    transport: Arc<dyn TransportPort>,
    in_flight: Arc<Mutex<InFlightMap>>,
}

/// Removes the in-flight registration when the leading fetch finishes or is
/// dropped mid-flight, so no stale entry can strand later callers.
struct InFlightGuard {
    map: Arc<Mutex<InFlightMap>>,
    key: CacheKey,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut in_flight = self
            .map
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        in_flight.remove(&self.key);
    }
}

enum FetchRole {
    Leader(watch::Sender<Option<FetchOutcome>>, InFlightGuard),
    Follower(watch::Receiver<Option<FetchOutcome>>),
}

impl CacheInner {
    async fn resolve_path(&self, key: &CacheKey, locator: &Locator) -> FetchOutcome {
        if let Some(path) = self.store.path(key).await {
            return Ok(path);
        }
        self.coalesced_fetch(key, locator).await
    }

    async fn coalesced_fetch(&self, key: &CacheKey, locator: &Locator) -> FetchOutcome {
        let role = {
            let mut in_flight = self
                .in_flight
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            if let Some(rx) = in_flight.get(key) {
                FetchRole::Follower(rx.clone())
            } else {
                let (tx, rx) = watch::channel(None);
                in_flight.insert(key.clone(), rx);
                let guard = InFlightGuard {
                    map: self.in_flight.clone(),
                    key: key.clone(),
                };
                FetchRole::Leader(tx, guard)
            }
        };

        match role {
            FetchRole::Leader(tx, _guard) => {
                let result = self.fetch_and_store(key, locator).await;
                let _ = tx.send(Some(result.clone()));
                result
            }
            FetchRole::Follower(mut rx) => {
                trace!(key = %key, "Joining in-flight fetch");
                loop {
                    if let Some(result) = rx.borrow_and_update().clone() {
                        return result;
                    }
                    if rx.changed().await.is_err() {
                        // leader dropped without an outcome
                        return Err(crate::domain::ports::TransportError::Cancelled.into());
                    }
                }
            }
        }
    }

    async fn fetch_and_store(&self, key: &CacheKey, locator: &Locator) -> FetchOutcome {
        debug!(key = %key, locator = %locator, "Fetching media from network");
        let bytes = self.transport.fetch(locator).await?;

        self.memory.put(key.clone(), bytes.clone()).await;

        match self.store.put(key, &bytes).await {
            Ok(path) => Ok(path),
            Err(store_error) => {
                warn!(key = %key, error = %store_error, "Store write failed, using fallback file");
                Self::write_fallback(key, &bytes).await
            }
        }
    }

    /// Last resort when the payload arrived but the store rejected it: hand
    /// the caller an uncached temp file so the completion contract holds.
    async fn write_fallback(key: &CacheKey, bytes: &Bytes) -> FetchOutcome {
        let dir = std::env::temp_dir().join("photoroll").join("fallback");
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| FetchError::Io(format!("failed to create fallback dir: {e}")))?;

        let extension = key.playable_suffix().unwrap_or_else(|| "bin".to_string());
        let path = dir.join(format!("{}.{}", key.file_stem(), extension));
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| FetchError::Io(format!("failed to write fallback file: {e}")))?;
        Ok(path)
    }
}

/// State for the background prefetch worker.
struct WorkerState {
    inner: Arc<CacheInner>,
    event_tx: mpsc::UnboundedSender<MediaFetchedEvent>,
    semaphore: Arc<Semaphore>,
    request_rx: mpsc::UnboundedReceiver<CacheCommand>,
    running: Arc<Mutex<HashMap<CacheKey, (tokio::task::AbortHandle, Locator)>>>,
}

/// Three-tier media cache with request coalescing and prefetching.
pub struct MediaCache {
    inner: Arc<CacheInner>,
    request_tx: mpsc::UnboundedSender<CacheCommand>,
    config: MediaCacheConfig,
}

impl std::fmt::Debug for MediaCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaCache")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl MediaCache {
    /// Creates a cache over the given store and transport. Prefetch
    /// completions are reported on `event_tx`.
    #[must_use]
    pub fn new(
        config: MediaCacheConfig,
        store: Arc<dyn MediaStorePort>,
        transport: Arc<dyn TransportPort>,
        event_tx: &mpsc::UnboundedSender<MediaFetchedEvent>,
    ) -> Self {
        let inner = Arc::new(CacheInner {
            memory: MemoryMediaStore::new(config.memory_entries),
            store,
            transport,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        });

        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let worker = WorkerState {
            inner: inner.clone(),
            event_tx: event_tx.clone(),
            semaphore: Arc::new(Semaphore::new(config.max_concurrent_fetches)),
            request_rx,
            running: Arc::new(Mutex::new(HashMap::new())),
        };
        tokio::spawn(Self::run_worker_loop(worker));

        Self {
            inner,
            request_tx,
            config,
        }
    }

    /// Worker loop serving prefetch requests with bounded concurrency.
    async fn run_worker_loop(mut state: WorkerState) {
        let mut queue: std::collections::VecDeque<(CacheKey, Locator)> =
            std::collections::VecDeque::new();

        loop {
            tokio::select! {
                cmd = state.request_rx.recv() => {
                    match cmd {
                        Some(CacheCommand::Prefetch { locator }) => {
                            let key = CacheKey::derive(&locator);
                            let already_running =
                                state.running.lock().unwrap_or_else(std::sync::PoisonError::into_inner).contains_key(&key);
                            if !already_running && !queue.iter().any(|(queued, _)| *queued == key) {
                                queue.push_back((key, locator));
                            }
                        }
                        Some(CacheCommand::Cancel { key }) => {
                            Self::cancel_one(&mut queue, &state, &key);
                        }
                        Some(CacheCommand::CancelAll) => {
                            let keys: Vec<CacheKey> = queue
                                .iter()
                                .map(|(key, _)| key.clone())
                                .chain(
                                    state
                                        .running
                                        .lock()
                                        .unwrap_or_else(std::sync::PoisonError::into_inner)
                                        .keys()
                                        .cloned(),
                                )
                                .collect();
                            for key in keys {
                                Self::cancel_one(&mut queue, &state, &key);
                            }
                        }
                        None => break,
                    }
                }
                Ok(permit) = state.semaphore.clone().acquire_owned(), if !queue.is_empty() => {
                    if let Some((key, locator)) = queue.pop_front() {
                        let inner = state.inner.clone();
                        let event_tx = state.event_tx.clone();
                        let running = state.running.clone();
                        let task_key = key.clone();
                        let task_locator = locator.clone();

                        let handle = tokio::spawn(async move {
                            let result = inner.resolve_path(&task_key, &task_locator).await;
                            running
                                .lock()
                                .unwrap_or_else(std::sync::PoisonError::into_inner)
                                .remove(&task_key);
                            let _ = event_tx.send(MediaFetchedEvent {
                                key: task_key,
                                locator: task_locator,
                                result,
                            });
                            drop(permit);
                        });
                        state
                            .running
                            .lock()
                            .unwrap_or_else(std::sync::PoisonError::into_inner)
                            .insert(key, (handle.abort_handle(), locator));
                    }
                }
            }
        }
    }

    /// Drops a request from the queue or aborts it mid-flight, emitting the
    /// cancellation completion either way. An aborted fetch performs no
    /// store write.
    fn cancel_one(
        queue: &mut std::collections::VecDeque<(CacheKey, Locator)>,
        state: &WorkerState,
        key: &CacheKey,
    ) {
        let queued = queue
            .iter()
            .position(|(queued, _)| queued == key)
            .and_then(|index| queue.remove(index));
        let running = state
            .running
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remove(key);

        let locator = match (queued, running) {
            (Some((_, locator)), _) => Some(locator),
            (None, Some((abort, locator))) => {
                abort.abort();
                Some(locator)
            }
            (None, None) => None,
        };

        if let Some(locator) = locator {
            debug!(key = %key, "Cancelled prefetch");
            let _ = state.event_tx.send(MediaFetchedEvent {
                key: key.clone(),
                locator,
                result: Err(crate::domain::ports::TransportError::Cancelled.into()),
            });
        }
    }

    /// Persists a payload under the locator's key, silently overwriting any
    /// prior entry. Store faults are logged, never surfaced.
    pub async fn store(&self, data: Bytes, locator: &Locator) {
        let key = CacheKey::derive(locator);
        self.inner.memory.put(key.clone(), data.clone()).await;
        if let Err(e) = self.inner.store.put(&key, &data).await {
            warn!(key = %key, error = %e, "Failed to persist payload");
        }
    }

    /// Returns true when an unexpired entry exists for the locator.
    pub async fn contains(&self, locator: &Locator) -> bool {
        let key = CacheKey::derive(locator);
        self.inner.store.contains(&key).await
    }

    /// Queues a background fetch. The outcome arrives on the event channel;
    /// every request gets exactly one completion.
    pub fn prefetch(&self, locator: Locator) {
        if let Err(e) = self.request_tx.send(CacheCommand::Prefetch { locator }) {
            error!("Failed to queue prefetch: {e}");
        }
    }

    /// Cancels a queued or in-flight prefetch for the locator.
    pub fn cancel(&self, locator: &Locator) {
        let key = CacheKey::derive(locator);
        if let Err(e) = self.request_tx.send(CacheCommand::Cancel { key }) {
            error!("Failed to queue cancel: {e}");
        }
    }

    /// Cancels every queued and in-flight prefetch.
    pub fn cancel_all(&self) {
        if let Err(e) = self.request_tx.send(CacheCommand::CancelAll) {
            error!("Failed to queue cancel-all: {e}");
        }
    }

    /// Drops both tiers. Idempotent; errors are logged.
    pub async fn clear(&self) {
        self.inner.memory.clear().await;
        if let Err(e) = self.inner.store.clear().await {
            warn!(error = %e, "Failed to clear store");
        }
        info!("Cleared media cache");
    }

    /// Memory tier statistics.
    #[must_use]
    pub fn memory_stats(&self) -> MemoryStats {
        self.inner.memory.stats()
    }
}

#[async_trait::async_trait]
impl MediaFetchPort for MediaCache {
    async fn fetch_path(&self, locator: &Locator) -> Result<PathBuf, FetchError> {
        if let Some(path) = locator.local_path() {
            // identity passthrough, no cache interaction
            return Ok(path);
        }
        let key = CacheKey::derive(locator);
        self.inner.resolve_path(&key, locator).await
    }

    async fn fetch_data(&self, locator: &Locator) -> Result<Bytes, FetchError> {
        if let Some(path) = locator.local_path() {
            return tokio::fs::read(&path)
                .await
                .map(Bytes::from)
                .map_err(|e| FetchError::Io(format!("failed to read local media: {e}")));
        }

        let key = CacheKey::derive(locator);
        if let Some(data) = self.inner.memory.get(&key).await {
            return Ok(data);
        }
        // the memory tier is never authoritative; consult disk before
        // declaring a miss
        if let Some(data) = self.inner.store.data(&key).await {
            self.inner.memory.put(key.clone(), data.clone()).await;
            return Ok(data);
        }

        let path = self.inner.coalesced_fetch(&key, locator).await?;
        if let Some(data) = self.inner.memory.peek(&key).await {
            return Ok(data);
        }
        tokio::fs::read(&path)
            .await
            .map(Bytes::from)
            .map_err(|e| FetchError::Io(format!("failed to read fetched media: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::domain::entities::Locator;
    use crate::domain::ports::TransportError;
    use crate::domain::ports::mocks::{MockMediaStore, MockTransport};
    use crate::infrastructure::cache::disk_store::DiskMediaStore;

    const CLIP: &str = "https://example.com/v/clip.mp4";

    fn cache_with(
        store: Arc<dyn MediaStorePort>,
        transport: Arc<MockTransport>,
    ) -> (MediaCache, mpsc::UnboundedReceiver<MediaFetchedEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let cache = MediaCache::new(MediaCacheConfig::default(), store, transport, &tx);
        (cache, rx)
    }

    #[tokio::test]
    async fn test_local_locator_passes_through() {
        let transport = Arc::new(MockTransport::new());
        let (cache, _rx) = cache_with(Arc::new(MockMediaStore::new()), transport.clone());

        let path = cache
            .fetch_path(&Locator::new("file:///media/clip.mp4"))
            .await
            .unwrap();

        assert_eq!(path, PathBuf::from("/media/clip.mp4"));
        assert_eq!(transport.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_second_fetch_served_from_store() {
        let transport = Arc::new(MockTransport::new().respond(CLIP, b"movie"));
        let (cache, _rx) = cache_with(Arc::new(MockMediaStore::new()), transport.clone());
        let locator = Locator::new(CLIP);

        cache.fetch_path(&locator).await.unwrap();
        cache.fetch_path(&locator).await.unwrap();

        assert_eq!(transport.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_store_then_fetch_data_needs_no_network() {
        let transport = Arc::new(MockTransport::new());
        let (cache, _rx) = cache_with(Arc::new(MockMediaStore::new()), transport.clone());
        let locator = Locator::new(CLIP);

        cache.store(Bytes::from_static(b"stored"), &locator).await;
        let data = cache.fetch_data(&locator).await.unwrap();

        assert_eq!(&data[..], b"stored");
        assert_eq!(transport.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_store_then_fetch_path_round_trip() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let store = Arc::new(
            DiskMediaStore::new(
                temp_dir.path().to_path_buf(),
                1024 * 1024,
                crate::infrastructure::cache::DEFAULT_TTL,
            )
            .await
            .unwrap(),
        );
        let transport = Arc::new(MockTransport::new());
        let (cache, _rx) = cache_with(store, transport.clone());
        let locator = Locator::new(CLIP);

        cache.store(Bytes::from_static(b"round trip"), &locator).await;
        let path = cache.fetch_path(&locator).await.unwrap();

        let content = tokio::fs::read(&path).await.unwrap();
        assert_eq!(content, b"round trip");
        assert_eq!(transport.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_transport_error_propagates_and_nothing_is_cached() {
        let transport = Arc::new(MockTransport::new().fail(
            CLIP,
            TransportError::Status { status: 404 },
        ));
        let (cache, _rx) = cache_with(Arc::new(MockMediaStore::new()), transport.clone());
        let locator = Locator::new(CLIP);

        let result = cache.fetch_path(&locator).await;
        assert!(matches!(
            result,
            Err(FetchError::Transport(TransportError::Status { status: 404 }))
        ));
        assert!(!cache.contains(&locator).await);
    }

    #[tokio::test]
    async fn test_store_write_failure_degrades_to_fallback_path() {
        let transport = Arc::new(MockTransport::new().respond(CLIP, b"payload"));
        let (cache, _rx) = cache_with(Arc::new(MockMediaStore::failing_writes()), transport);

        let path = cache.fetch_path(&Locator::new(CLIP)).await.unwrap();
        let read_back = tokio::fs::read(&path).await.unwrap();
        assert_eq!(read_back, b"payload");
    }

    #[tokio::test]
    async fn test_concurrent_fetches_are_coalesced() {
        let transport = Arc::new(
            MockTransport::new()
                .with_delay(Duration::from_millis(50))
                .respond(CLIP, b"movie"),
        );
        let (cache, _rx) = cache_with(Arc::new(MockMediaStore::new()), transport.clone());
        let cache = Arc::new(cache);
        let locator = Locator::new(CLIP);

        let mut handles = Vec::new();
        for _ in 0..5 {
            let cache = cache.clone();
            let locator = locator.clone();
            handles.push(tokio::spawn(
                async move { cache.fetch_path(&locator).await },
            ));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(transport.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_memory_miss_still_consults_disk() {
        let store = Arc::new(MockMediaStore::new());
        let locator = Locator::new(CLIP);
        let key = CacheKey::derive(&locator);
        store.put(&key, b"disk-only").await.unwrap();

        let transport = Arc::new(MockTransport::new());
        let (cache, _rx) = cache_with(store, transport.clone());

        let data = cache.fetch_data(&locator).await.unwrap();
        assert_eq!(&data[..], b"disk-only");
        assert_eq!(transport.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_expired_entry_triggers_fresh_fetch() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let store = Arc::new(
            DiskMediaStore::new(temp_dir.path().to_path_buf(), 1024 * 1024, Duration::ZERO)
                .await
                .unwrap(),
        );
        let transport = Arc::new(MockTransport::new().respond(CLIP, b"fresh"));
        let (cache, _rx) = cache_with(store, transport.clone());
        let locator = Locator::new(CLIP);

        cache.fetch_path(&locator).await.unwrap();
        cache.fetch_path(&locator).await.unwrap();

        // everything written expires immediately, so both calls hit the wire
        assert_eq!(transport.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_clear_forces_refetch() {
        let transport = Arc::new(MockTransport::new().respond(CLIP, b"movie"));
        let (cache, _rx) = cache_with(Arc::new(MockMediaStore::new()), transport.clone());
        let locator = Locator::new(CLIP);

        cache.fetch_path(&locator).await.unwrap();
        cache.clear().await;
        cache.clear().await;
        cache.fetch_path(&locator).await.unwrap();

        assert_eq!(transport.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_prefetch_reports_completion() {
        let transport = Arc::new(MockTransport::new().respond(CLIP, b"movie"));
        let (cache, mut rx) = cache_with(Arc::new(MockMediaStore::new()), transport);

        cache.prefetch(Locator::new(CLIP));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.locator.as_str(), CLIP);
        assert!(event.result.is_ok());
    }

    #[tokio::test]
    async fn test_prefetch_failure_reports_completion() {
        let transport = Arc::new(
            MockTransport::new().fail(CLIP, TransportError::Request("unreachable".into())),
        );
        let (cache, mut rx) = cache_with(Arc::new(MockMediaStore::new()), transport);

        cache.prefetch(Locator::new(CLIP));

        let event = rx.recv().await.unwrap();
        assert!(matches!(
            event.result,
            Err(FetchError::Transport(TransportError::Request(_)))
        ));
    }

    #[tokio::test]
    async fn test_cancelled_prefetch_completes_with_cancellation() {
        let transport = Arc::new(
            MockTransport::new()
                .with_delay(Duration::from_secs(5))
                .respond(CLIP, b"movie"),
        );
        let (cache, mut rx) = cache_with(Arc::new(MockMediaStore::new()), transport);
        let locator = Locator::new(CLIP);

        cache.prefetch(locator.clone());
        tokio::time::sleep(Duration::from_millis(50)).await;
        cache.cancel(&locator);

        let event = rx.recv().await.unwrap();
        assert!(matches!(
            event.result,
            Err(FetchError::Transport(TransportError::Cancelled))
        ));
        // nothing was stored for the cancelled fetch
        assert!(!cache.contains(&locator).await);
    }
}
