//! Ed25519 key expansion with Blake2b-512.
//!
//! Account chains use Ed25519 with Blake2b-512 in place of SHA-512, both for
//! expanding the 32-byte private key and inside the signature. The dalek `hazmat`
//! layer exposes the expanded-key primitives needed for that substitution.

use blake2::{Blake2b512, Digest};
use ed25519_dalek::hazmat::ExpandedSecretKey;
use ed25519_dalek::VerifyingKey;
use lattice_types::{KeyPair, PrivateKey, PublicKey};
use zeroize::Zeroize;

/// Expand a private key into its clamped scalar and nonce prefix.
pub(crate) fn expand(private: &PrivateKey) -> ExpandedSecretKey {
    let mut digest = [0u8; 64];
    digest.copy_from_slice(&Blake2b512::digest(private.as_bytes()));
    let expanded = ExpandedSecretKey::from_bytes(&digest);
    digest.zeroize();
    expanded
}

/// Derive the public key from a private key.
pub fn public_from_private(private: &PrivateKey) -> PublicKey {
    let expanded = expand(private);
    PublicKey(VerifyingKey::from(&expanded).to_bytes())
}

/// Reconstruct a full key pair from a private key.
pub fn keypair_from_private(private: PrivateKey) -> KeyPair {
    let public = public_from_private(&private);
    KeyPair { public, private }
}
