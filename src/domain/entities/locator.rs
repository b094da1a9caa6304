//! Media resource locators.

use std::path::PathBuf;

/// A reference to a media resource: a remote URL or a local file path.
///
/// Locators are kept as plain strings. The cache layer only needs a handful
/// of string-level views (scheme, path suffix, query component), so no URL
/// crate is pulled in for them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator(String);

impl Locator {
    /// Creates a locator from any string-like input.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the raw locator string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true for `file://` URLs and bare filesystem paths.
    #[must_use]
    pub fn is_local(&self) -> bool {
        self.0.starts_with("file://") || !self.0.contains("://")
    }

    /// Returns the filesystem path for a local locator.
    #[must_use]
    pub fn local_path(&self) -> Option<PathBuf> {
        if !self.is_local() {
            return None;
        }
        let path = self.0.strip_prefix("file://").unwrap_or(&self.0);
        Some(PathBuf::from(path))
    }

    /// Returns the query component (the part after `?`, before any `#`).
    #[must_use]
    pub fn query(&self) -> Option<&str> {
        let without_fragment = self.without_fragment();
        without_fragment
            .split_once('?')
            .map(|(_, query)| query)
            .filter(|q| !q.is_empty())
    }

    /// Returns the lowercased suffix of the path component, excluding query
    /// and fragment. `https://host/clip.MP4?sig=x` yields `mp4`.
    #[must_use]
    pub fn path_suffix(&self) -> Option<String> {
        let without_fragment = self.without_fragment();
        let path = without_fragment
            .split_once('?')
            .map_or(without_fragment, |(path, _)| path);
        Self::suffix_of(path)
    }

    /// Returns the lowercased suffix of the locator taken as a whole string,
    /// query included. For dispatcher URLs that embed the real media path in
    /// the query (`/file.php?abc.mp4`) this sees the embedded suffix.
    #[must_use]
    pub fn trailing_suffix(&self) -> Option<String> {
        Self::suffix_of(self.without_fragment())
    }

    fn without_fragment(&self) -> &str {
        self.0
            .split_once('#')
            .map_or(self.0.as_str(), |(before, _)| before)
    }

    fn suffix_of(s: &str) -> Option<String> {
        let last_segment = s.rsplit('/').next().unwrap_or(s);
        let (stem, suffix) = last_segment.rsplit_once('.')?;
        if stem.is_empty() || suffix.is_empty() {
            return None;
        }
        Some(suffix.to_ascii_lowercase())
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Locator {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Locator {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("https://example.com/clip.mp4", false; "https url")]
    #[test_case("file:///tmp/clip.mp4", true; "file url")]
    #[test_case("/var/media/clip.mp4", true; "bare path")]
    #[test_case("relative/clip.mp4", true; "relative path")]
    fn test_is_local(raw: &str, expected: bool) {
        assert_eq!(Locator::new(raw).is_local(), expected);
    }

    #[test]
    fn test_local_path_strips_scheme() {
        let locator = Locator::new("file:///tmp/media/clip.mp4");
        assert_eq!(locator.local_path(), Some(PathBuf::from("/tmp/media/clip.mp4")));
    }

    #[test]
    fn test_local_path_is_none_for_remote() {
        assert!(Locator::new("https://example.com/clip.mp4").local_path().is_none());
    }

    #[test_case("https://host/v/clip.mp4", Some("mp4"); "plain suffix")]
    #[test_case("https://host/v/clip.MOV?sig=abc", Some("mov"); "query ignored and lowercased")]
    #[test_case("https://host/file.php?abc.mp4", Some("php"); "dispatcher suffix")]
    #[test_case("https://host/v/clip", None; "no suffix")]
    #[test_case("https://host/v/.hidden", None; "dot file")]
    fn test_path_suffix(raw: &str, expected: Option<&str>) {
        assert_eq!(Locator::new(raw).path_suffix().as_deref(), expected);
    }

    #[test]
    fn test_trailing_suffix_sees_query() {
        let locator = Locator::new("https://host/file.php?9bfc3b16aec233d025c18042e9a2b45a.mp4");
        assert_eq!(locator.trailing_suffix().as_deref(), Some("mp4"));
    }

    #[test]
    fn test_query_component() {
        let locator = Locator::new("https://host/file.php?abc.mp4#frag");
        assert_eq!(locator.query(), Some("abc.mp4"));
        assert_eq!(Locator::new("https://host/clip.mp4").query(), None);
    }
}
