//! Media caching infrastructure.
//!
//! This module provides:
//! - An entry-count-bounded memory tier
//! - A disk tier with TTL expiry and size-capped eviction
//! - The cache orchestrator with request coalescing and prefetching

pub mod disk_store;
pub mod media_cache;
pub mod memory_store;

pub use disk_store::{DEFAULT_MAX_STORE_SIZE, DEFAULT_TTL, DiskMediaStore};
pub use media_cache::{MediaCache, MediaCacheConfig, MediaFetchedEvent};
pub use memory_store::{DEFAULT_MEMORY_ENTRIES, MemoryMediaStore, MemoryStats};
