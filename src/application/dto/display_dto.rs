//! Display DTOs handed to the host UI.

use crate::domain::entities::Caption;

/// Derived, read-only display values for the browser chrome.
///
/// The core never touches views; the host renders whatever snapshot the
/// reducer currently produces.
#[derive(Debug, Clone, PartialEq)]
pub struct BrowserDisplay {
    /// Navigation bar title, `"3/12"` style; empty when browsing a single
    /// item or picking.
    pub title: String,
    /// Zero-based page for the page indicator.
    pub page: usize,
    /// Total page count.
    pub page_count: usize,
    /// One-based position of the current item inside the selection, shown on
    /// the add button; None when the current item is not selected.
    pub selection_badge: Option<usize>,
    /// Number of selected items.
    pub selection_count: usize,
    /// Whether another item may still be added to the selection.
    pub can_select_more: bool,
    /// Caption of the current item.
    pub caption: Option<Caption>,
    /// Highlighted index in the thumbnail strip.
    pub highlighted_thumbnail: Option<usize>,
    /// Whether the current item plays back over time.
    pub current_is_video: bool,
}
