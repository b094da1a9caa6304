//! Use case implementations.

mod save_media_use_case;

pub use save_media_use_case::{SaveMediaError, SaveMediaUseCase};
