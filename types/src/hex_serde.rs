//! Fixed-width byte arrays as upper-case hex strings, the node's JSON convention.

use crate::ParseError;

pub(crate) fn decode_fixed<const N: usize>(s: &str) -> Result<[u8; N], ParseError> {
    let bytes = hex::decode(s).map_err(|e| ParseError::InvalidHex(e.to_string()))?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| ParseError::InvalidLength {
            expected: N,
            actual: bytes.len(),
        })
}

macro_rules! impl_hex_serde {
    ($ty:ty, $len:expr) => {
        impl serde::Serialize for $ty {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&hex::encode_upper(self.0))
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
                crate::hex_serde::decode_fixed::<$len>(&s)
                    .map(Self)
                    .map_err(serde::de::Error::custom)
            }
        }

        impl std::str::FromStr for $ty {
            type Err = crate::ParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                crate::hex_serde::decode_fixed::<$len>(s).map(Self)
            }
        }
    };
}

pub(crate) use impl_hex_serde;
