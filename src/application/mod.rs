//! Application layer with services, use cases and DTOs.

/// Data transfer objects.
pub mod dto;
/// Stateful services.
pub mod services;
/// Use case implementations.
pub mod use_cases;

pub use dto::BrowserDisplay;
pub use services::{BrowserCommand, BrowserEvent, BrowserMode, BrowserState, PlaybackState};
pub use use_cases::{SaveMediaError, SaveMediaUseCase};
