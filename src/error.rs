use codecs::decoding::{DecodeError, StreamDecodingError};
use thiserror::Error;

use crate::event::SchemaError;

/// An error produced while pulling records off an event stream.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Framing or JSON parsing of the byte stream failed.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// A frame held valid JSON that is not a valid event record.
    #[error("record rejected: {0}")]
    Schema(#[from] SchemaError),
}

impl StreamDecodingError for IngestError {
    fn can_continue(&self) -> bool {
        match self {
            IngestError::Decode(err) => err.can_continue(),
            // The frame was isolated and parsed; the stream itself is intact.
            IngestError::Schema(_) => true,
        }
    }
}
