mod json;

use std::fmt::Debug;
use std::str::Utf8Error;

use bytes::Bytes;
use serde_json::Value;

pub use json::{JsonDeserializer, JsonDeserializerConfig};

/// An error that occurred while parsing a complete frame.
#[derive(Debug)]
pub enum DeserializeError {
    Utf8(Utf8Error),
    Json(serde_json::Error),
}

impl From<Utf8Error> for DeserializeError {
    fn from(err: Utf8Error) -> Self {
        Self::Utf8(err)
    }
}

impl From<serde_json::Error> for DeserializeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl std::fmt::Display for DeserializeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeserializeError::Utf8(err) => std::fmt::Display::fmt(err, f),
            DeserializeError::Json(err) => std::fmt::Display::fmt(err, f),
        }
    }
}

impl std::error::Error for DeserializeError {}

/// Parse a structured value from a complete byte frame.
///
/// Implementations are schema-agnostic; mapping the parsed value onto a
/// domain type is the consumer's concern.
pub trait Deserializer: Clone + Debug + Send + Sync {
    /// Parses a value from bytes.
    fn parse(&self, buf: Bytes) -> Result<Value, DeserializeError>;
}
