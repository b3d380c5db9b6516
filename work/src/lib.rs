//! Proof-of-work for account-chain blocks.
//!
//! A block carries an 8-byte nonce whose 8-byte Blake2b hash over `nonce ‖ root`,
//! read as a little-endian integer, meets a 64-bit threshold. The root is the
//! previous block hash, or the account public key for an account's first block.

pub mod error;
pub mod generator;
pub mod validator;

pub use error::WorkError;
pub use generator::{WorkGenerator, WorkSource};
pub use validator::{validate_work, work_value};
