use bytes::{Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use tokio_util::codec::Decoder;

use super::{CharacterDelimitedDecoder, Framer, FramingError};

/// Config used to build a `NulDelimitedDecoder`
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct NulDelimitedDecoderConfig {
    /// The maximum length of the byte buffer
    ///
    /// This length does *not* include the trailing delimiter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_length: Option<usize>,
}

impl NulDelimitedDecoderConfig {
    pub fn build(&self) -> NulDelimitedDecoder {
        match self.max_length {
            Some(max_length) => NulDelimitedDecoder::new_with_max_length(max_length),
            None => NulDelimitedDecoder::new(),
        }
    }
}

/// A codec for handling bytes that are delimited by the NUL byte.
///
/// This is the wire framing of the event feed: a sequence of JSON documents,
/// each terminated by `\0`, with no alignment between transport chunks and
/// frame boundaries. NUL never occurs inside a multi-byte UTF-8 sequence, so
/// splitting at the byte level cannot cut a character in half.
#[derive(Clone, Debug)]
pub struct NulDelimitedDecoder(CharacterDelimitedDecoder);

impl NulDelimitedDecoder {
    /// Creates a new `NulDelimitedDecoder`
    pub const fn new() -> Self {
        Self(CharacterDelimitedDecoder::new(b'\0'))
    }

    /// Creates a `NulDelimitedDecoder` with a maximum frame length limit.
    ///
    /// Any frames longer than `max_length` bytes will be discarded entirely
    pub const fn new_with_max_length(max_length: usize) -> Self {
        Self(CharacterDelimitedDecoder::new_with_max_length(
            b'\0', max_length,
        ))
    }
}

impl Default for NulDelimitedDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for NulDelimitedDecoder {
    type Item = Bytes;
    type Error = FramingError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        self.0.decode(src)
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        self.0.decode_eof(buf)
    }
}

impl Framer for NulDelimitedDecoder {}
