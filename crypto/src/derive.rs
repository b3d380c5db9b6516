//! Deterministic per-index private keys from a wallet seed.
//!
//! Two schemes:
//! - legacy: `Blake2b-256(seed ‖ index_be32)` over a 32-byte seed
//! - BIP39: SLIP-0010 Ed25519 hardened path `m/44'/165'/index'` over a 64-byte BIP39 seed

use hmac::{Hmac, Mac};
use lattice_types::PrivateKey;
use sha2::Sha512;
use zeroize::Zeroize;

use crate::{blake2b_256_multi, CryptoError};

type HmacSha512 = Hmac<Sha512>;

const HARDENED: u32 = 0x8000_0000;
const PURPOSE: u32 = 44;
const COIN_TYPE: u32 = 165;
const SLIP10_ED25519_KEY: &[u8] = b"ed25519 seed";

/// Legacy derivation: hash the seed together with the big-endian index.
pub fn derive_legacy_key(seed: &[u8], index: u32) -> PrivateKey {
    PrivateKey(blake2b_256_multi(&[seed, &index.to_be_bytes()]))
}

/// BIP39 derivation along `m/44'/165'/index'`.
pub fn derive_bip39_key(seed: &[u8], index: u32) -> Result<PrivateKey, CryptoError> {
    if index >= HARDENED {
        return Err(CryptoError::IndexOutOfRange(index));
    }

    let mut node = hmac_sha512(SLIP10_ED25519_KEY, &[seed])?;
    for segment in [PURPOSE, COIN_TYPE, index] {
        let (key, chain_code) = node.split_at(32);
        let child = hmac_sha512(
            chain_code,
            &[&[0u8], key, &(segment | HARDENED).to_be_bytes()],
        )?;
        node.zeroize();
        node = child;
    }

    let mut key = [0u8; 32];
    key.copy_from_slice(&node[..32]);
    node.zeroize();
    Ok(PrivateKey(key))
}

fn hmac_sha512(key: &[u8], parts: &[&[u8]]) -> Result<[u8; 64], CryptoError> {
    let mut mac =
        HmacSha512::new_from_slice(key).map_err(|e| CryptoError::Derivation(e.to_string()))?;
    for part in parts {
        mac.update(part);
    }
    let mut out = [0u8; 64];
    out.copy_from_slice(&mac.finalize().into_bytes());
    Ok(out)
}
