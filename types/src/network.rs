//! Network (coin) variant.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{ParseError, WorkDifficulty};

/// Which account-chain network a wallet targets. Affects the address prefix and the
/// configuration defaults; the block and signature formats are shared.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Nano,
    Banano,
}

impl Network {
    /// Prefix used when encoding addresses.
    pub fn address_prefix(&self) -> &'static str {
        match self {
            Self::Nano => "nano_",
            Self::Banano => "ban_",
        }
    }

    /// Public node used when no RPC endpoint is configured.
    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Self::Nano => "https://mynano.ninja/api/node",
            Self::Banano => "https://api-beta.banano.cc",
        }
    }

    /// Threshold for send and change blocks.
    pub fn default_work_difficulty(&self) -> WorkDifficulty {
        match self {
            Self::Nano => WorkDifficulty(0xffff_fff8_0000_0000),
            Self::Banano => WorkDifficulty(0xffff_fe00_0000_0000),
        }
    }

    /// Threshold for receive (and open) blocks.
    pub fn default_receive_work_difficulty(&self) -> WorkDifficulty {
        WorkDifficulty(0xffff_fe00_0000_0000)
    }

    /// Representative used for an account that has never observed or set one.
    pub fn default_representative(&self) -> &'static str {
        match self {
            Self::Nano => "nano_3gonano8jnse4zm65jaiki9tk8ry4jtgc1smarinukho6fmbc45k3icsh6en",
            Self::Banano => "ban_3gonano8jnse4zm65jaiki9tk8ry4jtgc1smarinukho6fmbc45k3icsh6en",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nano => "nano",
            Self::Banano => "banano",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nano" => Ok(Self::Nano),
            "banano" => Ok(Self::Banano),
            other => Err(ParseError::UnknownNetwork(other.to_string())),
        }
    }
}
