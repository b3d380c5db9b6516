//! Wallet core for account-chain ledgers.
//!
//! Provides everything a wallet application needs on top of a ledger node:
//! - Deterministic account derivation from a seed or BIP39 mnemonic
//! - An account registry with gap-limit discovery
//! - Send, receive and representative-change block construction and signing
//! - Bulk reception of pending transfers
//! - Proof-of-work, raced between a remote work service and local generation

pub mod account;
pub mod config;
pub mod error;
pub mod signer;
pub mod wallet;
pub mod work;

pub use account::{Account, SendDestination};
pub use config::WalletConfig;
pub use error::WalletError;
pub use signer::{AccountSigner, DerivedAccount, Derivation, ExternalSigner, SeedSigner, SigningHandle};
pub use wallet::Wallet;
pub use work::WorkPolicy;
