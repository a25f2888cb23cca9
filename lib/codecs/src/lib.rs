//! Codecs for turning a delimited byte stream into structured records.

pub mod decoding;
mod error;

pub use error::FramingError;

/// Basic error type, dynamically dispatched and safe to send across threads.
pub type Error = Box<dyn std::error::Error + Send + Sync + 'static>;
