//! Proof-of-work difficulty thresholds and nonces.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::ParseError;

/// A 64-bit difficulty threshold. A nonce is valid when its work value is `>=` this.
///
/// Textual form is 16 hex digits (big-endian), e.g. `fffffff800000000`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorkDifficulty(pub u64);

impl WorkDifficulty {
    pub fn new(threshold: u64) -> Self {
        Self(threshold)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for WorkDifficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl FromStr for WorkDifficulty {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = crate::hex_serde::decode_fixed::<8>(s)?;
        Ok(Self(u64::from_be_bytes(bytes)))
    }
}

impl Serialize for WorkDifficulty {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for WorkDifficulty {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A proof-of-work nonce.
///
/// The nonce is hashed in little-endian byte order; on the wire it travels as the
/// reversed (big-endian) 8 bytes, i.e. 16 hex digits of the integer value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WorkNonce(pub u64);

impl WorkNonce {
    /// Bytes fed to the work hash.
    pub fn to_hash_bytes(&self) -> [u8; 8] {
        self.0.to_le_bytes()
    }

    /// Bytes as submitted with a block.
    pub fn to_wire_bytes(&self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    pub fn from_wire_bytes(bytes: [u8; 8]) -> Self {
        Self(u64::from_be_bytes(bytes))
    }
}

impl fmt::Display for WorkNonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.to_wire_bytes()))
    }
}

impl FromStr for WorkNonce {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::hex_serde::decode_fixed::<8>(s).map(Self::from_wire_bytes)
    }
}

impl Serialize for WorkNonce {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for WorkNonce {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
