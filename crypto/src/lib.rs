//! Cryptographic primitives for account chains.
//!
//! - **Ed25519 with Blake2b-512** for key expansion, signing and verification
//! - **Blake2b** for hashing (block hashes, address checksums, legacy derivation)
//! - Address encoding with a network prefix and base32 body + checksum
//! - Seed derivation: legacy `Blake2b(seed || index)` and BIP39 / SLIP-0010 hardened paths

pub mod address;
pub mod block;
pub mod derive;
pub mod error;
pub mod hash;
pub mod keys;
pub mod mnemonic;
pub mod sign;

pub use address::{address_from_public_key, decode_address};
pub use block::hash_state_block;
pub use derive::{derive_bip39_key, derive_legacy_key};
pub use error::CryptoError;
pub use hash::{blake2b_256, blake2b_256_multi};
pub use keys::{keypair_from_private, public_from_private};
pub use mnemonic::{generate_mnemonic, seed_from_mnemonic};
pub use sign::{sign_message, verify_signature};
