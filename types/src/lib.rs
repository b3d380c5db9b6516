//! Fundamental types for the account-chain wallet engine.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! hashes, keys, addresses, raw amounts, work values, network variants and the
//! state block itself. It performs no hashing or cryptography of its own.

pub mod address;
pub mod amount;
pub mod block;
pub mod error;
pub mod hash;
pub mod keys;
pub mod network;
pub mod work;

mod hex_serde;

pub use address::Address;
pub use amount::Raw;
pub use block::{ProcessSubtype, StateBlock};
pub use error::ParseError;
pub use hash::BlockHash;
pub use keys::{KeyPair, PrivateKey, PublicKey, Seed, Signature};
pub use network::Network;
pub use work::{WorkDifficulty, WorkNonce};
