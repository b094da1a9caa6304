//! Domain entity definitions.

mod cache_key;
mod edit_state;
mod locator;
mod media_item;
mod selection;

pub use cache_key::{CacheKey, PLAYABLE_SUFFIXES, is_playable_suffix};
pub use edit_state::{CropRect, CropRestoreState, RotationDegree};
pub use locator::Locator;
pub use media_item::{Caption, MediaId, MediaItem, MediaKind, MediaSource, first_index_of};
pub use selection::{SelectionError, SelectionSet};
