use crate::application::dto::BrowserDisplay;

/// Playback flags for the current video item.
///
/// Pure state; the host owns the actual player. After a clip plays to its
/// end the next `play` must seek back to zero first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackState {
    playing: bool,
    seek_to_zero_before_play: bool,
}

impl PlaybackState {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            playing: false,
            seek_to_zero_before_play: false,
        }
    }

    #[must_use]
    pub const fn is_playing(&self) -> bool {
        self.playing
    }

    /// Starts playback. Returns true when the host must seek to zero before
    /// playing (the previous run reached the end of the item).
    pub fn play(&mut self) -> bool {
        let rewind = self.seek_to_zero_before_play;
        self.seek_to_zero_before_play = false;
        self.playing = true;
        rewind
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Stops playback when running. Returns true when the host must seek to
    /// zero now (pause + rewind, used when swiping away from a video).
    pub fn stop(&mut self) -> bool {
        if !self.playing {
            return false;
        }
        self.playing = false;
        true
    }

    /// The player reported the item played to its end.
    pub fn reached_end(&mut self) {
        self.playing = false;
        self.seek_to_zero_before_play = true;
    }

    /// Whether the play button applies to the display snapshot at all.
    #[must_use]
    pub fn applies_to(display: &BrowserDisplay) -> bool {
        display.current_is_video
    }
}
