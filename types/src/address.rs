//! Account address type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A checksummed account address such as `nano_1abc…`.
///
/// This type only carries the string. Encoding and checksum validation live in
/// `lattice_crypto::address`, which is the only place addresses should be built from
/// keys or parsed from user input.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Wrap a raw string without validating it.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Return the raw address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The prefix up to and including the underscore, if any.
    pub fn prefix(&self) -> Option<&str> {
        self.0.find('_').map(|i| &self.0[..=i])
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
