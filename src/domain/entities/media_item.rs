//! Browsable media items and their identity.

use super::edit_state::CropRestoreState;
use super::locator::Locator;

/// Stable identity of a media item.
///
/// Holds a library asset identifier, a locator string, or a generated id for
/// in-memory images. List membership and cursor reconciliation compare this
/// identity only, never pixel data.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaId(String);

impl MediaId {
    /// Creates an id from any string-like input.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates an id from a locator.
    #[must_use]
    pub fn from_locator(locator: &Locator) -> Self {
        Self(locator.as_str().to_string())
    }

    /// Generates a fresh id for items with no external identity, such as
    /// in-memory images handed over by the host.
    #[must_use]
    pub fn generated() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Returns the inner string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MediaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What kind of media an item is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaKind {
    /// Still photo.
    #[default]
    Photo,
    /// Video clip.
    Video,
    /// Live photo (still plus motion component).
    LivePhoto,
}

impl MediaKind {
    /// Returns true for media that plays back over time.
    #[must_use]
    pub const fn is_video(self) -> bool {
        matches!(self, Self::Video)
    }
}

/// Where an item's payload comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    /// Reference into the platform media library.
    Asset {
        /// Platform-local asset identifier.
        local_id: String,
    },
    /// Remote or local URL.
    Url(Locator),
    /// In-memory image owned by the host; only the identity travels here.
    Memory,
}

/// Caption attached to a media item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caption {
    /// Caption body text.
    pub content: String,
    /// Optional attribution line shown under the body.
    pub signature: Option<String>,
}

impl Caption {
    /// Creates a caption with no signature.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            signature: None,
        }
    }

    /// Adds an attribution line.
    #[must_use]
    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }
}

/// One browsable unit: a library asset, a URL, or an in-memory image.
///
/// Equality is identity equality over [`MediaId`]; two items with the same id
/// are the same item regardless of caption or edit state.
#[derive(Debug, Clone)]
pub struct MediaItem {
    id: MediaId,
    source: MediaSource,
    kind: MediaKind,
    caption: Option<Caption>,
    edit_state: Option<CropRestoreState>,
}

impl MediaItem {
    /// Creates an item backed by a platform library asset.
    #[must_use]
    pub fn from_asset(local_id: impl Into<String>, kind: MediaKind) -> Self {
        let local_id = local_id.into();
        Self {
            id: MediaId::new(local_id.clone()),
            source: MediaSource::Asset { local_id },
            kind,
            caption: None,
            edit_state: None,
        }
    }

    /// Creates an item backed by a remote or local URL.
    #[must_use]
    pub fn from_url(locator: Locator, kind: MediaKind) -> Self {
        Self {
            id: MediaId::from_locator(&locator),
            source: MediaSource::Url(locator),
            kind,
            caption: None,
            edit_state: None,
        }
    }

    /// Creates an item for an in-memory image with a generated identity.
    #[must_use]
    pub fn in_memory(kind: MediaKind) -> Self {
        Self {
            id: MediaId::generated(),
            source: MediaSource::Memory,
            kind,
            caption: None,
            edit_state: None,
        }
    }

    /// Attaches a caption.
    #[must_use]
    pub fn with_caption(mut self, caption: Caption) -> Self {
        self.caption = Some(caption);
        self
    }

    /// Returns the item identity.
    #[must_use]
    pub fn id(&self) -> &MediaId {
        &self.id
    }

    /// Returns the payload source.
    #[must_use]
    pub fn source(&self) -> &MediaSource {
        &self.source
    }

    /// Returns the media kind.
    #[must_use]
    pub const fn kind(&self) -> MediaKind {
        self.kind
    }

    /// Returns true for playable media.
    #[must_use]
    pub const fn is_video(&self) -> bool {
        self.kind.is_video()
    }

    /// Returns the locator for URL-backed items.
    #[must_use]
    pub fn url(&self) -> Option<&Locator> {
        match &self.source {
            MediaSource::Url(locator) => Some(locator),
            _ => None,
        }
    }

    /// Returns the caption, if any.
    #[must_use]
    pub fn caption(&self) -> Option<&Caption> {
        self.caption.as_ref()
    }

    /// Returns the restorable edit state, if any.
    #[must_use]
    pub fn edit_state(&self) -> Option<&CropRestoreState> {
        self.edit_state.as_ref()
    }

    /// Stores edit state so a later editing session can restore it.
    pub fn set_edit_state(&mut self, state: Option<CropRestoreState>) {
        self.edit_state = state;
    }
}

impl PartialEq for MediaItem {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for MediaItem {}

/// First position of `id` in `items`. Lists hold no duplicate identities, so
/// first-match is also unique-match.
#[must_use]
pub fn first_index_of(items: &[MediaItem], id: &MediaId) -> Option<usize> {
    items.iter().position(|item| item.id() == id)
}
