//! A collection of framing methods that can be used to convert from byte
//! streams with undefined boundaries to byte frames with defined ones.

mod character;
mod nul;

use std::fmt::Debug;

pub use character::{CharacterDelimitedDecoder, CharacterDelimitedDecoderConfig};
pub use nul::{NulDelimitedDecoder, NulDelimitedDecoderConfig};

use super::FramingError;

/// Produce byte frames from a byte stream.
pub trait Framer:
    tokio_util::codec::Decoder<Item = ::bytes::Bytes, Error = FramingError>
    + Clone
    + Debug
    + Send
    + Sync
{
}
