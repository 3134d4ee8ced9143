//! Common types used across the platform

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Identifier of a single block.
///
/// Block ids are 64-bit and exceed the safe-integer range of JavaScript, so
/// they always travel as decimal strings. Deserialization also accepts a
/// plain JSON integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub i64);

impl BlockId {
    pub fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for BlockId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Error returned when a block id is not a decimal integer
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid block id \"{0}\"")]
pub struct InvalidBlockId(pub String);

impl FromStr for BlockId {
    type Err = InvalidBlockId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(BlockId)
            .map_err(|_| InvalidBlockId(s.to_string()))
    }
}

impl Serialize for BlockId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for BlockId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Text(String),
            Number(i64),
        }

        match Wire::deserialize(deserializer)? {
            Wire::Text(text) => text.parse().map_err(de::Error::custom),
            Wire::Number(n) => Ok(BlockId(n)),
        }
    }
}

/// Request body that may be a single object or an array of them
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

/// Plain `{ "message": ... }` acknowledgement body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            count: None,
        }
    }

    pub fn with_count(message: impl Into<String>, count: u64) -> Self {
        Self {
            message: message.into(),
            count: Some(count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_id_serializes_as_string() {
        let json = serde_json::to_string(&BlockId(9_007_199_254_740_993)).unwrap();
        assert_eq!(json, "\"9007199254740993\"");
    }

    #[test]
    fn block_id_accepts_string_and_number() {
        let from_text: BlockId = serde_json::from_str("\"42\"").unwrap();
        let from_number: BlockId = serde_json::from_str("42").unwrap();
        assert_eq!(from_text, BlockId(42));
        assert_eq!(from_number, BlockId(42));
    }

    #[test]
    fn block_id_rejects_garbage() {
        assert!(serde_json::from_str::<BlockId>("\"12abc\"").is_err());
        assert!("".parse::<BlockId>().is_err());
    }

    #[test]
    fn one_or_many_accepts_both_shapes() {
        let one: OneOrMany<u32> = serde_json::from_str("7").unwrap();
        let many: OneOrMany<u32> = serde_json::from_str("[1, 2]").unwrap();
        assert_eq!(one.into_vec(), vec![7]);
        assert_eq!(many.into_vec(), vec![1, 2]);
    }
}
