//! Cache key derivation for remote media.

use super::locator::Locator;

/// Media suffixes the cache treats as directly playable.
pub const PLAYABLE_SUFFIXES: [&str; 3] = ["mp4", "m4v", "mov"];

/// Returns true if `suffix` names a playable media container.
#[must_use]
pub fn is_playable_suffix(suffix: &str) -> bool {
    PLAYABLE_SUFFIXES
        .iter()
        .any(|known| known.eq_ignore_ascii_case(suffix))
}

/// Key under which a media resource is cached.
///
/// Two locators that resolve to the same canonical remote resource derive the
/// same key. Some endpoints hide the real media path inside a query parameter
/// (`http://host/file.php?9bfc….mp4` has path suffix `php`); keying those by
/// the literal URL would collide every resource behind the dispatcher, so the
/// query component wins whenever it carries the playable suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derives the cache key for a locator.
    #[must_use]
    pub fn derive(locator: &Locator) -> Self {
        if locator.path_suffix().as_deref().is_some_and(is_playable_suffix) {
            return Self(locator.as_str().to_string());
        }
        if locator
            .trailing_suffix()
            .as_deref()
            .is_some_and(is_playable_suffix)
        {
            if let Some(query) = locator.query() {
                return Self(query.to_string());
            }
        }
        Self(locator.as_str().to_string())
    }

    /// Returns the key string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns a stable filesystem-safe stem for this key (sha256, 32 hex
    /// chars), used by disk stores to name entry files.
    #[must_use]
    pub fn file_stem(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(self.0.as_bytes());
        let digest = hasher.finalize();
        hex::encode(&digest[..16])
    }

    /// Returns the playable suffix carried by the key, if any. Disk stores
    /// use it so cached entries keep a player-recognizable extension.
    #[must_use]
    pub fn playable_suffix(&self) -> Option<String> {
        Locator::new(self.0.as_str())
            .trailing_suffix()
            .filter(|s| is_playable_suffix(s))
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("https://example.com/v/clip.mp4"; "mp4")]
    #[test_case("https://example.com/v/clip.m4v"; "m4v")]
    #[test_case("https://example.com/v/clip.MOV"; "uppercase mov")]
    fn test_playable_locator_keys_literally(raw: &str) {
        let key = CacheKey::derive(&Locator::new(raw));
        assert_eq!(key.as_str(), raw);
    }

    #[test]
    fn test_dispatcher_locator_keys_by_query() {
        let locator = Locator::new("http://host/file.php?9bfc3b16aec233d025c18042e9a2b45a.mp4");
        let key = CacheKey::derive(&locator);
        assert_eq!(key.as_str(), "9bfc3b16aec233d025c18042e9a2b45a.mp4");
    }

    #[test]
    fn test_distinct_query_resources_get_distinct_keys() {
        let a = CacheKey::derive(&Locator::new("http://host/file.php?aaa.mp4"));
        let b = CacheKey::derive(&Locator::new("http://host/file.php?bbb.mp4"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_unknown_suffix_keys_literally() {
        let raw = "https://example.com/page.html?x=1";
        let key = CacheKey::derive(&Locator::new(raw));
        assert_eq!(key.as_str(), raw);
    }

    #[test]
    fn test_same_locator_same_key() {
        let locator = Locator::new("https://example.com/v/clip.mp4");
        assert_eq!(CacheKey::derive(&locator), CacheKey::derive(&locator));
    }

    #[test]
    fn test_file_stem_is_stable_hex() {
        let key = CacheKey::derive(&Locator::new("https://example.com/v/clip.mp4"));
        let stem = key.file_stem();
        assert_eq!(stem.len(), 32);
        assert_eq!(stem, key.file_stem());
        assert!(stem.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_playable_suffix_from_key() {
        let key = CacheKey::derive(&Locator::new("https://example.com/v/clip.mp4"));
        assert_eq!(key.playable_suffix().as_deref(), Some("mp4"));

        let key = CacheKey::derive(&Locator::new("https://example.com/page.html"));
        assert_eq!(key.playable_suffix(), None);
    }
}
