//! Wallet configuration with TOML file support.

use std::path::Path;

use serde::{Deserialize, Serialize};

use lattice_crypto::decode_address;
use lattice_types::{Address, Network, WorkDifficulty};
use lattice_utils::{try_init_logging, LogFormat};

use crate::WalletError;

/// Configuration for a wallet.
///
/// Network-dependent settings left unset fall back to the network's defaults
/// through the accessor methods. Can be loaded from a TOML file via
/// [`WalletConfig::from_toml_file`] or built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Which network the wallet's addresses belong to.
    #[serde(default)]
    pub network: Network,

    /// Ledger node endpoint.
    #[serde(default)]
    pub rpc_url: Option<String>,

    /// Remote work service endpoint. Work is generated locally when unset.
    #[serde(default)]
    pub work_rpc_url: Option<String>,

    /// Threshold for send and change blocks, as 16 hex digits.
    #[serde(default)]
    pub work_difficulty: Option<WorkDifficulty>,

    /// Threshold for receive blocks, as 16 hex digits.
    #[serde(default)]
    pub receive_work_difficulty: Option<WorkDifficulty>,

    /// Representative for accounts that have none yet.
    #[serde(default)]
    pub default_representative: Option<Address>,

    /// Derive accounts along the BIP39 path instead of the legacy scheme.
    #[serde(default)]
    pub bip39: bool,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            network: Network::default(),
            rpc_url: None,
            work_rpc_url: None,
            work_difficulty: None,
            receive_work_difficulty: None,
            default_representative: None,
            bip39: false,
            log_format: LogFormat::default(),
            log_level: default_log_level(),
        }
    }
}

impl WalletConfig {
    /// Defaults for the given network.
    pub fn for_network(network: Network) -> Self {
        Self {
            network,
            ..Self::default()
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, WalletError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| WalletError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, WalletError> {
        toml::from_str(s).map_err(|e| WalletError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, WalletError> {
        toml::to_string_pretty(self).map_err(|e| WalletError::Config(e.to_string()))
    }

    /// Install the global tracing subscriber from `log_format` and `log_level`.
    pub fn init_logging(&self) -> Result<(), WalletError> {
        try_init_logging(self.log_format, &self.log_level)
            .map_err(|e| WalletError::Config(e.to_string()))
    }

    pub fn rpc_url(&self) -> &str {
        self.rpc_url
            .as_deref()
            .unwrap_or_else(|| self.network.default_rpc_url())
    }

    pub fn work_difficulty(&self) -> WorkDifficulty {
        self.work_difficulty
            .unwrap_or_else(|| self.network.default_work_difficulty())
    }

    pub fn receive_work_difficulty(&self) -> WorkDifficulty {
        self.receive_work_difficulty
            .unwrap_or_else(|| self.network.default_receive_work_difficulty())
    }

    /// The configured representative, or the network's well-known default.
    /// Fails if a configured override does not decode.
    pub fn default_representative(&self) -> Result<Address, WalletError> {
        match &self.default_representative {
            Some(rep) => {
                decode_address(rep.as_str())
                    .map_err(|_| WalletError::InvalidAddress(rep.to_string()))?;
                Ok(rep.clone())
            }
            None => Ok(Address::new(self.network.default_representative())),
        }
    }
}
