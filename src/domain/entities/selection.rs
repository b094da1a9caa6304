//! Ordered, bounded selection of media items.

use thiserror::Error;

use super::media_item::{MediaId, MediaItem};

/// Rejections produced by [`SelectionSet`] mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// The configured maximum is already reached; the set is unchanged.
    #[error("selection limit of {limit} reached")]
    LimitReached {
        /// Configured maximum item count.
        limit: usize,
    },
    /// The item's identity is already in the set; the set is unchanged.
    #[error("item is already selected")]
    AlreadySelected,
}

/// Ordered set of selected items; insertion order is selection order.
///
/// Identities are unique within the set, and appends past the configured
/// limit are rejected rather than truncated.
#[derive(Debug, Clone)]
pub struct SelectionSet {
    items: Vec<MediaItem>,
    limit: usize,
}

impl SelectionSet {
    /// Creates an empty set holding at most `limit` items.
    #[must_use]
    pub const fn new(limit: usize) -> Self {
        Self {
            items: Vec::new(),
            limit,
        }
    }

    /// Creates a set from pre-selected items, dropping duplicate identities
    /// (first occurrence wins) and anything past the limit.
    #[must_use]
    pub fn with_items(items: Vec<MediaItem>, limit: usize) -> Self {
        let mut set = Self::new(limit);
        for item in items {
            let _ = set.try_append(item);
        }
        set
    }

    /// Number of selected items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true when nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns true when the limit is reached.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.items.len() >= self.limit
    }

    /// Configured maximum item count.
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Item at `index`, if in range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&MediaItem> {
        self.items.get(index)
    }

    /// All selected items in selection order.
    #[must_use]
    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    /// Position of `id` in the set.
    #[must_use]
    pub fn index_of(&self, id: &MediaId) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    /// Returns true if `id` is selected.
    #[must_use]
    pub fn contains(&self, id: &MediaId) -> bool {
        self.index_of(id).is_some()
    }

    /// Appends an item, returning its position.
    ///
    /// # Errors
    /// Returns [`SelectionError::LimitReached`] when the set is full and
    /// [`SelectionError::AlreadySelected`] on a duplicate identity; the set
    /// is unchanged in both cases.
    pub fn try_append(&mut self, item: MediaItem) -> Result<usize, SelectionError> {
        if self.contains(item.id()) {
            return Err(SelectionError::AlreadySelected);
        }
        if self.is_full() {
            return Err(SelectionError::LimitReached { limit: self.limit });
        }
        self.items.push(item);
        Ok(self.items.len() - 1)
    }

    /// Removes the item with identity `id`, returning it.
    pub fn remove(&mut self, id: &MediaId) -> Option<MediaItem> {
        let index = self.index_of(id)?;
        Some(self.items.remove(index))
    }
}
