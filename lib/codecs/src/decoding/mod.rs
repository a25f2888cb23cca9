//! A collection of support structures that are used in the process of decoding
//! a delimited byte stream into structured records.

mod error;
pub mod format;
mod framing;

use bytes::{Bytes, BytesMut};
use serde_json::Value;
use tracing::warn;

pub use error::{DecodeError, StreamDecodingError};
pub use format::{DeserializeError, Deserializer, JsonDeserializer, JsonDeserializerConfig};
pub use framing::{
    CharacterDelimitedDecoder, CharacterDelimitedDecoderConfig, Framer, NulDelimitedDecoder,
    NulDelimitedDecoderConfig,
};

use crate::FramingError;

/// A decoder that produces structured records from a byte stream.
///
/// Combines a [`Framer`], which isolates complete delimiter-bounded frames
/// out of the stream, with a [`Deserializer`], which parses each frame. A
/// frame that fails to parse is reported and skipped; decoding resumes with
/// the next frame.
#[derive(Clone, Debug)]
pub struct Decoder<F = NulDelimitedDecoder, D = JsonDeserializer> {
    framer: F,
    deserializer: D,
}

impl Default for Decoder {
    fn default() -> Self {
        Self {
            framer: NulDelimitedDecoder::new(),
            deserializer: JsonDeserializer::new(true),
        }
    }
}

impl<F, D> Decoder<F, D>
where
    F: Framer,
    D: Deserializer,
{
    /// Create a new `Decoder` with framer and deserializer.
    pub fn new(framer: F, deserializer: D) -> Self {
        Self {
            framer,
            deserializer,
        }
    }

    /// Handles the framing result and parses it into a structured value, if
    /// possible.
    ///
    /// Emits logs if either framing or parsing failed.
    fn handle_framing_result(
        &mut self,
        frame: Result<Option<Bytes>, FramingError>,
    ) -> Result<Option<(Value, usize)>, DecodeError> {
        let frame = frame.map_err(|err| {
            warn!(message = "Failed framing bytes", ?err);
            DecodeError::Framing(err)
        })?;

        let frame = match frame {
            Some(frame) => frame,
            _ => return Ok(None),
        };

        let byte_size = frame.len();
        self.deserializer
            .parse(frame)
            .map(|value| Some((value, byte_size)))
            .map_err(|err| {
                warn!(message = "Failed deserializing frame", %err, byte_size);
                DecodeError::Deserialize(err)
            })
    }
}

impl<F, D> tokio_util::codec::Decoder for Decoder<F, D>
where
    F: Framer,
    D: Deserializer,
{
    type Item = (Value, usize);
    type Error = DecodeError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let frame = self.framer.decode(src);
        self.handle_framing_result(frame)
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let frame = self.framer.decode_eof(buf);
        self.handle_framing_result(frame)
    }
}

#[cfg(test)]
mod tests {
    use futures_util::StreamExt;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tokio_util::codec::FramedRead;

    use super::*;

    fn drain_active(decoder: &mut Decoder, buf: &mut BytesMut) -> Vec<Value> {
        let mut values = Vec::new();
        loop {
            match tokio_util::codec::Decoder::decode(decoder, buf) {
                Ok(Some((value, _))) => values.push(value),
                Ok(None) => return values,
                Err(err) => assert!(err.can_continue(), "unexpected fatal error: {err}"),
            }
        }
    }

    fn drain_eof(decoder: &mut Decoder, buf: &mut BytesMut) -> Vec<Value> {
        let mut values = Vec::new();
        loop {
            match tokio_util::codec::Decoder::decode_eof(decoder, buf) {
                Ok(Some((value, _))) => values.push(value),
                Ok(None) => return values,
                Err(err) => assert!(err.can_continue(), "unexpected fatal error: {err}"),
            }
        }
    }

    #[test]
    fn two_chunks_split_mid_frame() {
        let mut decoder = Decoder::default();
        let mut buf = BytesMut::new();

        buf.extend_from_slice(b"{\"id\":\"1\",\"v\":1}\0{\"id\":\"2\"");
        let values = drain_active(&mut decoder, &mut buf);
        assert_eq!(values, vec![json!({"id": "1", "v": 1})]);
        // The undelimited tail stays buffered.
        assert_eq!(buf, "{\"id\":\"2\"");

        buf.extend_from_slice(b",\"v\":2}\0");
        let values = drain_active(&mut decoder, &mut buf);
        assert_eq!(values, vec![json!({"id": "2", "v": 2})]);
        assert!(buf.is_empty());
    }

    #[test]
    fn any_chunking_yields_the_same_records() {
        // Includes a multi-byte character so some split points land inside
        // a UTF-8 sequence.
        let input = "{\"id\":\"1\",\"city\":\"Zürich\"}\0{\"id\":\"2\",\"v\":2}\0{\"id\":\"3\"}\0"
            .as_bytes();

        let mut decoder = Decoder::default();
        let mut buf = BytesMut::from(input);
        let want = drain_eof(&mut decoder, &mut buf);
        assert_eq!(want.len(), 3);

        for split in 0..=input.len() {
            let mut decoder = Decoder::default();
            let mut buf = BytesMut::new();

            buf.extend_from_slice(&input[..split]);
            let mut got = drain_active(&mut decoder, &mut buf);
            buf.extend_from_slice(&input[split..]);
            got.extend(drain_eof(&mut decoder, &mut buf));

            assert_eq!(got, want, "split at byte {split}");
        }
    }

    #[test]
    fn malformed_frame_does_not_halt_decoding() {
        let mut decoder = Decoder::default();
        let mut buf = BytesMut::from("{\"id\":\"1\"}\0not-json\0{\"id\":\"2\"}\0");

        let (value, _) = tokio_util::codec::Decoder::decode(&mut decoder, &mut buf)
            .unwrap()
            .unwrap();
        assert_eq!(value, json!({"id": "1"}));

        let err = tokio_util::codec::Decoder::decode(&mut decoder, &mut buf).unwrap_err();
        assert!(matches!(err, DecodeError::Deserialize(_)));
        assert!(err.can_continue());

        let (value, _) = tokio_util::codec::Decoder::decode(&mut decoder, &mut buf)
            .unwrap()
            .unwrap();
        assert_eq!(value, json!({"id": "2"}));
    }

    #[tokio::test]
    async fn framed_read_end_to_end() {
        let input: &[u8] = b"{\"seq\":0}\0{\"seq\":1}\0{\"seq\":2}";
        let frames = FramedRead::new(input, Decoder::default());

        let values = frames
            .map(|result| result.expect("valid frame").0)
            .collect::<Vec<_>>()
            .await;

        // The trailing undelimited frame is flushed at end of stream.
        assert_eq!(
            values,
            vec![json!({"seq": 0}), json!({"seq": 1}), json!({"seq": 2})]
        );
    }
}
