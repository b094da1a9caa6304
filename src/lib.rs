//! photoroll - client-side media browsing core.
//!
//! This crate provides the cache and state machinery behind a mobile
//! photo/video picker and full-screen browser: a tiered remote-media cache
//! with expiry and size-capped eviction, and the reducer that keeps the
//! browser's main paging list and selection-thumbnail strip in lockstep.
//! Rendering, gestures and platform permission flows stay with the host.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing services, use cases and DTOs.
pub mod application;
/// Domain layer containing entities and port definitions.
pub mod domain;
/// Infrastructure layer containing adapters for storage and transport.
pub mod infrastructure;

/// Current version of the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = "photoroll";
