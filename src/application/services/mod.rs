pub mod browser_state;
pub mod playback_state;

pub use browser_state::{BrowserCommand, BrowserEvent, BrowserMode, BrowserState};
pub use playback_state::PlaybackState;
