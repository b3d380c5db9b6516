//! BIP39 mnemonic generation and mnemonic-to-seed.

use bip39::Mnemonic;
use lattice_types::Seed;
use rand::RngCore;

use crate::CryptoError;

/// Generate a new 24-word BIP39 mnemonic from 256-bit entropy.
pub fn generate_mnemonic() -> Result<String, CryptoError> {
    let mut entropy = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut entropy);
    let mnemonic = Mnemonic::from_entropy(&entropy)
        .map_err(|e| CryptoError::Derivation(e.to_string()))?;
    Ok(mnemonic.to_string())
}

/// Derive the 64-byte BIP39 seed (PBKDF2-HMAC-SHA512, 2048 rounds) from a phrase
/// and optional password.
pub fn seed_from_mnemonic(phrase: &str, password: &str) -> Result<Seed, CryptoError> {
    let mnemonic = Mnemonic::parse_normalized(phrase)
        .map_err(|e| CryptoError::InvalidMnemonic(e.to_string()))?;
    Ok(Seed::from(mnemonic.to_seed_normalized(password)))
}
