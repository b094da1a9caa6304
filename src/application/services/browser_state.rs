//! Browser navigation state.
//!
//! Keeps the main paging list and the selection-thumbnail strip in lockstep.
//! Each external stimulus enters [`BrowserState::apply`] exactly once and
//! synchronously yields the side-effect commands for the host UI, so cursor
//! reconciliation can never feed back into itself.

use tracing::debug;

use crate::application::dto::BrowserDisplay;
use crate::domain::entities::{MediaId, MediaItem, SelectionSet, first_index_of};

/// External stimulus handled by the reducer.
#[derive(Debug, Clone, PartialEq)]
pub enum BrowserEvent {
    /// The main list settled on an index after a swipe.
    MainIndexSettled(usize),
    /// A thumbnail in the selection strip was tapped.
    ThumbnailTapped(usize),
    /// The add button toggled selection of the current main item.
    SelectionToggled,
    /// An item was appended to the selection by an outside collaborator.
    ItemAppended(MediaItem),
    /// An item was removed from the selection by an outside collaborator.
    ItemDeselected(MediaId),
    /// The delete button removed the currently displayed item.
    CurrentItemRemoved,
}

/// Side effect the host UI must carry out after an `apply`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserCommand {
    /// Scroll the main list to the index; the resulting scroll callback must
    /// not be fed back into the reducer.
    ScrollMainTo(usize),
    /// Refresh the thumbnail strip (contents or highlight changed).
    ReloadThumbnails,
    /// The last item was removed; dismiss the browser.
    Dismiss,
}

/// Whether the browser is picking media or only viewing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrowserMode {
    /// Viewing only.
    #[default]
    Browse,
    /// Picking items for selection.
    Select,
}

/// State machine for the browser's two synchronized cursors.
pub struct BrowserState {
    items: Vec<MediaItem>,
    selection: SelectionSet,
    main_index: usize,
    selection_cursor: Option<usize>,
    cursor_initialized: bool,
    mode: BrowserMode,
}

impl BrowserState {
    /// Creates browser state over `items`, starting at `initial_index`
    /// (clamped into range).
    #[must_use]
    pub fn new(
        items: Vec<MediaItem>,
        initial_index: usize,
        mode: BrowserMode,
        selection_limit: usize,
    ) -> Self {
        let main_index = initial_index.min(items.len().saturating_sub(1));
        Self {
            items,
            selection: SelectionSet::new(selection_limit),
            main_index,
            selection_cursor: None,
            cursor_initialized: false,
            mode,
        }
    }

    /// Seeds a pre-selected set, as when the picker re-opens the browser on
    /// already chosen items. Initializes the thumbnail cursor to the current
    /// main item's position within the set, if it is selected.
    #[must_use]
    pub fn with_selection(mut self, selected: Vec<MediaItem>) -> Self {
        let limit = self.selection.limit();
        self.selection = SelectionSet::with_items(selected, limit);
        if !self.selection.is_empty() {
            self.cursor_initialized = true;
            self.selection_cursor = self
                .current_item()
                .map(|item| item.id().clone())
                .and_then(|id| self.selection.index_of(&id));
        }
        self
    }

    /// Handles one external stimulus and returns the commands the host UI
    /// must execute. Called once per event; never re-entered.
    pub fn apply(&mut self, event: BrowserEvent) -> Vec<BrowserCommand> {
        match event {
            BrowserEvent::MainIndexSettled(index) => self.settle_main(index),
            BrowserEvent::ThumbnailTapped(index) => self.tap_thumbnail(index),
            BrowserEvent::SelectionToggled => self.toggle_current(),
            BrowserEvent::ItemAppended(item) => self.append_item(item),
            BrowserEvent::ItemDeselected(id) => self.deselect_item(&id),
            BrowserEvent::CurrentItemRemoved => self.remove_current(),
        }
    }

    /// Current index in the main list.
    #[must_use]
    pub const fn main_index(&self) -> usize {
        self.main_index
    }

    /// Highlighted index in the selection strip.
    #[must_use]
    pub const fn selection_cursor(&self) -> Option<usize> {
        self.selection_cursor
    }

    /// The currently displayed item.
    #[must_use]
    pub fn current_item(&self) -> Option<&MediaItem> {
        self.items.get(self.main_index)
    }

    /// All browsable items.
    #[must_use]
    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    /// The selection set.
    #[must_use]
    pub const fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    /// Snapshot of the derived display values.
    #[must_use]
    pub fn display(&self) -> BrowserDisplay {
        let current = self.current_item();
        let title = if self.mode == BrowserMode::Select || self.items.len() <= 1 {
            String::new()
        } else {
            format!("{}/{}", self.main_index + 1, self.items.len())
        };
        BrowserDisplay {
            title,
            page: self.main_index,
            page_count: self.items.len(),
            selection_badge: current
                .and_then(|item| self.selection.index_of(item.id()))
                .map(|position| position + 1),
            selection_count: self.selection.len(),
            can_select_more: !self.selection.is_full(),
            caption: current.and_then(|item| item.caption().cloned()),
            highlighted_thumbnail: self.selection_cursor,
            current_is_video: current.is_some_and(MediaItem::is_video),
        }
    }

    fn settle_main(&mut self, index: usize) -> Vec<BrowserCommand> {
        let mut commands = Vec::new();
        if self.items.is_empty() {
            return commands;
        }
        let index = index.min(self.items.len() - 1);
        if index == self.main_index {
            return commands;
        }
        self.main_index = index;
        self.reconcile_cursor_to_main(&mut commands);
        commands
    }

    fn tap_thumbnail(&mut self, index: usize) -> Vec<BrowserCommand> {
        let mut commands = Vec::new();
        if self.selection.is_empty() {
            return commands;
        }
        let index = index.min(self.selection.len() - 1);
        if self.selection_cursor != Some(index) {
            self.selection_cursor = Some(index);
            self.cursor_initialized = true;
            commands.push(BrowserCommand::ReloadThumbnails);
        }
        let Some(tapped_id) = self.selection.get(index).map(|item| item.id().clone()) else {
            return commands;
        };
        let already_current = self
            .current_item()
            .is_some_and(|item| *item.id() == tapped_id);
        if !already_current {
            // the scroll below echoes this same logical event; the host must
            // not feed the resulting index change back into the reducer
            if let Some(main_position) = first_index_of(&self.items, &tapped_id) {
                if main_position != self.main_index {
                    self.main_index = main_position;
                    commands.push(BrowserCommand::ScrollMainTo(main_position));
                }
            }
        }
        commands
    }

    fn toggle_current(&mut self) -> Vec<BrowserCommand> {
        let Some(item) = self.current_item().cloned() else {
            return Vec::new();
        };
        if self.selection.contains(item.id()) {
            let id = item.id().clone();
            self.deselect_item(&id)
        } else {
            self.append_item(item)
        }
    }

    fn append_item(&mut self, item: MediaItem) -> Vec<BrowserCommand> {
        let mut commands = Vec::new();
        match self.selection.try_append(item) {
            Ok(_) => self.selection_grew(&mut commands),
            Err(error) => {
                debug!(error = %error, "selection append rejected");
            }
        }
        commands
    }

    fn deselect_item(&mut self, id: &MediaId) -> Vec<BrowserCommand> {
        let mut commands = Vec::new();
        if self.selection.remove(id).is_some() {
            self.selection_shrank(&mut commands);
        }
        commands
    }

    fn remove_current(&mut self) -> Vec<BrowserCommand> {
        let mut commands = Vec::new();
        if self.items.is_empty() {
            commands.push(BrowserCommand::Dismiss);
            return commands;
        }
        self.items.remove(self.main_index);
        if self.items.is_empty() {
            self.main_index = 0;
            commands.push(BrowserCommand::Dismiss);
            return commands;
        }
        // removing index i displays the item before it; index 0 stays put
        self.main_index = self.main_index.saturating_sub(1);
        self.reconcile_cursor_to_main(&mut commands);
        commands
    }

    fn selection_grew(&mut self, commands: &mut Vec<BrowserCommand>) {
        if self.cursor_initialized {
            self.selection_cursor = Some(self.selection.len() - 1);
        } else {
            self.cursor_initialized = true;
            self.selection_cursor = self
                .current_item()
                .map(|item| item.id().clone())
                .and_then(|id| self.selection.index_of(&id));
        }
        commands.push(BrowserCommand::ReloadThumbnails);
    }

    fn selection_shrank(&mut self, commands: &mut Vec<BrowserCommand>) {
        // no ambiguous auto-pick after a removal; the strip merely unhighlights
        self.selection_cursor = None;
        commands.push(BrowserCommand::ReloadThumbnails);
    }

    fn reconcile_cursor_to_main(&mut self, commands: &mut Vec<BrowserCommand>) {
        let target = self
            .current_item()
            .map(|item| item.id().clone())
            .and_then(|id| self.selection.index_of(&id));
        if target != self.selection_cursor {
            self.selection_cursor = target;
            if self.selection_cursor.is_some() {
                self.cursor_initialized = true;
            }
            commands.push(BrowserCommand::ReloadThumbnails);
        }
    }
}
