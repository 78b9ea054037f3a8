//! Delivery backends.
//!
//! A delivery backend is a named sink that sends one event and reports
//! success or a classified failure. Implementations map their internal
//! errors onto [`crate::error::SendError`] before they reach the
//! recovery engine.

mod file;
mod http;
mod traits;

pub use file::FileBackend;
pub use http::HttpBackend;
pub use traits::{DeliveryBackend, DeliveryOptions};
