//! Host-facing configuration.

use serde::{Deserialize, Serialize};

use crate::infrastructure::cache::{
    DEFAULT_MAX_STORE_SIZE, DEFAULT_MEMORY_ENTRIES, DEFAULT_TTL, MediaCacheConfig,
};

const fn default_true() -> bool {
    true
}

fn default_max_selection() -> usize {
    6
}

fn default_max_disk_bytes() -> u64 {
    DEFAULT_MAX_STORE_SIZE
}

fn default_ttl_secs() -> u64 {
    DEFAULT_TTL.as_secs()
}

fn default_memory_entries() -> usize {
    DEFAULT_MEMORY_ENTRIES
}

fn default_concurrent_fetches() -> usize {
    MediaCacheConfig::default().max_concurrent_fetches
}

/// Feature switches for the browser, mirroring what the host builder can
/// enable.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserOptions {
    /// Show the selection-thumbnail strip.
    #[serde(default = "default_true")]
    pub support_thumbnails: bool,

    /// Show captions under items.
    #[serde(default)]
    pub support_caption: bool,

    /// Show the page-control dots.
    #[serde(default)]
    pub support_page_control: bool,

    /// Allow deleting items while previewing a selection.
    #[serde(default)]
    pub can_delete_when_previewing: bool,

    /// Maximum number of items the user may select.
    #[serde(default = "default_max_selection")]
    pub maximum_selection: usize,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            support_thumbnails: true,
            support_caption: false,
            support_page_control: false,
            can_delete_when_previewing: false,
            maximum_selection: default_max_selection(),
        }
    }
}

/// Cache sizing and expiry knobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheOptions {
    /// On-disk footprint cap in bytes.
    #[serde(default = "default_max_disk_bytes")]
    pub max_disk_bytes: u64,

    /// Entry time-to-live in seconds.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// Payloads held in the memory tier.
    #[serde(default = "default_memory_entries")]
    pub memory_entries: usize,

    /// Concurrent prefetch downloads.
    #[serde(default = "default_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
}

impl CacheOptions {
    /// Entry time-to-live as a duration.
    #[must_use]
    pub const fn ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.ttl_secs)
    }

    /// The in-memory/concurrency part of the options.
    #[must_use]
    pub const fn cache_config(&self) -> MediaCacheConfig {
        MediaCacheConfig {
            memory_entries: self.memory_entries,
            max_concurrent_fetches: self.max_concurrent_fetches,
        }
    }
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            max_disk_bytes: default_max_disk_bytes(),
            ttl_secs: default_ttl_secs(),
            memory_entries: default_memory_entries(),
            max_concurrent_fetches: default_concurrent_fetches(),
        }
    }
}

/// Root configuration handed to hosts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppOptions {
    /// Browser feature switches.
    #[serde(default)]
    pub browser: BrowserOptions,

    /// Cache sizing and expiry.
    #[serde(default)]
    pub cache: CacheOptions,
}
