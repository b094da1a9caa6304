//! Transport adapters.

pub mod http_transport;

pub use http_transport::{DEFAULT_TIMEOUT_SECS, HttpTransport};
