use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{DeserializeError, Deserializer};

const fn default_lossy() -> bool {
    true
}

/// Config used to build a `JsonDeserializer`
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct JsonDeserializerConfig {
    /// Determines whether or not to replace invalid UTF-8 sequences instead of failing.
    ///
    /// When true, invalid UTF-8 sequences are replaced with the [`U+FFFD REPLACEMENT CHARACTER`][U+FFFD].
    ///
    /// [U+FFFD]: https://en.wikipedia.org/wiki/Specials_(Unicode_block)#Replacement_character
    #[serde(default = "default_lossy")]
    lossy: bool,
}

impl Default for JsonDeserializerConfig {
    fn default() -> Self {
        Self {
            lossy: default_lossy(),
        }
    }
}

impl JsonDeserializerConfig {
    /// Build the `JsonDeserializer` from this configuration.
    #[inline]
    pub fn build(&self) -> JsonDeserializer {
        JsonDeserializer { lossy: self.lossy }
    }
}

/// Deserializer that parses a byte frame containing exactly one JSON document
#[derive(Clone, Debug)]
pub struct JsonDeserializer {
    lossy: bool,
}

impl JsonDeserializer {
    /// Creates a new `JsonDeserializer`
    pub const fn new(lossy: bool) -> Self {
        Self { lossy }
    }
}

impl Deserializer for JsonDeserializer {
    fn parse(&self, buf: Bytes) -> Result<Value, DeserializeError> {
        let value = if self.lossy {
            serde_json::from_str(&String::from_utf8_lossy(&buf))
        } else {
            serde_json::from_slice(&buf)
        }?;

        Ok(value)
    }
}
