use std::fmt::{Display, Formatter};

use super::DeserializeError;
use crate::FramingError;

/// An error that occurs while decoding a stream
pub trait StreamDecodingError {
    /// Whether it is reasonable to keep reading from the stream in which this
    /// error occurred.
    ///
    /// A frame that fails to parse leaves the framer in a usable state: the
    /// next delimiter is still where it should be. An I/O failure means the
    /// transport is gone and no further frames can ever arrive.
    fn can_continue(&self) -> bool;
}

/// An error that occurred while decoding structured records from a byte
/// stream.
#[derive(Debug)]
pub enum DecodeError {
    /// The underlying reader failed.
    Io(std::io::Error),

    /// The error occurred while producing byte frames from the byte stream.
    Framing(FramingError),

    /// The error occurred while parsing a complete frame.
    Deserialize(DeserializeError),
}

impl StreamDecodingError for DecodeError {
    fn can_continue(&self) -> bool {
        match self {
            DecodeError::Io(_) => false,
            DecodeError::Framing(FramingError::Io(_)) => false,
            DecodeError::Deserialize(_) => true,
        }
    }
}

impl From<std::io::Error> for DecodeError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::Io(err) => write!(f, "io error {:?}", err),
            DecodeError::Framing(err) => write!(f, "framing error {:?}", err),
            DecodeError::Deserialize(err) => write!(f, "deserialize error {}", err),
        }
    }
}

impl std::error::Error for DecodeError {}
