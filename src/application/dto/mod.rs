//! Data transfer objects for the application layer.

mod display_dto;

pub use display_dto::BrowserDisplay;
