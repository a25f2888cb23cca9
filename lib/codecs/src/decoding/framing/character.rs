use bytes::{Buf, Bytes, BytesMut};
use memchr::memchr;
use serde::{Deserialize, Serialize};
use tokio_util::codec::Decoder;
use tracing::warn;

use super::{Framer, FramingError};

/// Config used to build a `CharacterDelimitedDecoder`
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct CharacterDelimitedDecoderConfig {
    /// The byte that separates frames
    delimiter: u8,

    /// The maximum length of the byte buffer
    ///
    /// This length does *not* include the trailing delimiter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_length: Option<usize>,
}

impl CharacterDelimitedDecoderConfig {
    pub fn build(&self) -> CharacterDelimitedDecoder {
        match self.max_length {
            Some(max_length) => {
                CharacterDelimitedDecoder::new_with_max_length(self.delimiter, max_length)
            }
            None => CharacterDelimitedDecoder::new(self.delimiter),
        }
    }
}

/// A decoder for handling bytes that are delimited by a single chosen byte.
///
/// The trailing undelimited segment is never emitted by `decode`; it stays
/// buffered until its delimiter arrives or the stream ends.
#[derive(Clone, Debug)]
pub struct CharacterDelimitedDecoder {
    delimiter: u8,
    max_length: usize,
}

impl CharacterDelimitedDecoder {
    /// Creates a new `CharacterDelimitedDecoder` with the given delimiter.
    pub const fn new(delimiter: u8) -> Self {
        Self {
            delimiter,
            max_length: usize::MAX,
        }
    }

    /// Creates a `CharacterDelimitedDecoder` with a maximum frame length limit.
    ///
    /// Any frames longer than `max_length` bytes will be discarded entirely
    pub const fn new_with_max_length(delimiter: u8, max_length: usize) -> Self {
        Self {
            delimiter,
            max_length,
        }
    }
}

impl Decoder for CharacterDelimitedDecoder {
    type Item = Bytes;
    type Error = FramingError;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            match memchr(self.delimiter, buf) {
                Some(pos) => {
                    let frame = buf.split_to(pos).freeze();
                    buf.advance(1);

                    if frame.len() <= self.max_length {
                        return Ok(Some(frame));
                    }

                    warn!(
                        message = "Discarding frame larger than max_length",
                        frame_len = frame.len(),
                        max_length = self.max_length
                    );
                }
                None => return Ok(None),
            }
        }
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(buf)? {
            Some(frame) => Ok(Some(frame)),
            None => {
                if buf.is_empty() {
                    return Ok(None);
                }

                // The stream ended without a trailing delimiter, what is
                // left in the buffer is the final frame.
                let frame = buf.split_to(buf.len()).freeze();
                if frame.len() > self.max_length {
                    warn!(
                        message = "Discarding frame larger than max_length",
                        frame_len = frame.len(),
                        max_length = self.max_length
                    );

                    return Ok(None);
                }

                Ok(Some(frame))
            }
        }
    }
}

impl Framer for CharacterDelimitedDecoder {}
