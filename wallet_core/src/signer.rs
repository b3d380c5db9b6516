//! Key derivation and signing capability.
//!
//! A wallet owns exactly one [`AccountSigner`]. The seed-backed signer derives keys
//! locally; the external signer is the slot for a hardware device and currently
//! refuses every request.

use lattice_crypto::{derive_bip39_key, derive_legacy_key, public_from_private, sign_message};
use lattice_types::{BlockHash, PrivateKey, PublicKey, Seed, Signature};
use tracing::debug;

use crate::WalletError;

/// What an account keeps in order to have its blocks signed later.
pub struct SigningHandle {
    index: u32,
    key: Option<PrivateKey>,
}

impl SigningHandle {
    /// `key` is `None` when the private key never leaves the signer.
    pub fn new(index: u32, key: Option<PrivateKey>) -> Self {
        Self { index, key }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn private_key(&self) -> Option<&PrivateKey> {
        self.key.as_ref()
    }
}

/// Result of deriving one account.
pub struct DerivedAccount {
    pub public_key: PublicKey,
    pub handle: SigningHandle,
}

/// Derive accounts and sign block hashes.
pub trait AccountSigner: Send + Sync {
    /// Derive the key pair at `index`. Deterministic for a given signer.
    fn derive_account(&self, index: u32) -> Result<DerivedAccount, WalletError>;

    /// Sign a canonical block hash with the key behind `handle`.
    fn sign_block(&self, handle: &SigningHandle, hash: &BlockHash) -> Result<Signature, WalletError>;
}

/// Seed derivation scheme.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Derivation {
    /// `Blake2b-256(seed ‖ index)`.
    Legacy,
    /// SLIP-0010 `m/44'/165'/index'` over a BIP39 seed.
    Bip39,
}

/// Signer holding the wallet seed in memory.
pub struct SeedSigner {
    seed: Seed,
    derivation: Derivation,
}

impl SeedSigner {
    pub fn new(seed: Seed, derivation: Derivation) -> Self {
        Self { seed, derivation }
    }
}

impl AccountSigner for SeedSigner {
    fn derive_account(&self, index: u32) -> Result<DerivedAccount, WalletError> {
        let key = match self.derivation {
            Derivation::Legacy => derive_legacy_key(self.seed.as_bytes(), index),
            Derivation::Bip39 => derive_bip39_key(self.seed.as_bytes(), index)?,
        };
        let public_key = public_from_private(&key);
        debug!(index, derivation = ?self.derivation, "derived account");
        Ok(DerivedAccount {
            public_key,
            handle: SigningHandle::new(index, Some(key)),
        })
    }

    fn sign_block(&self, handle: &SigningHandle, hash: &BlockHash) -> Result<Signature, WalletError> {
        let key = handle.private_key().ok_or(WalletError::SignerUnavailable)?;
        Ok(sign_message(hash.as_bytes(), key))
    }
}

/// Placeholder for a hardware signer. Every call fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExternalSigner;

impl AccountSigner for ExternalSigner {
    fn derive_account(&self, _index: u32) -> Result<DerivedAccount, WalletError> {
        Err(WalletError::SignerUnavailable)
    }

    fn sign_block(&self, _handle: &SigningHandle, _hash: &BlockHash) -> Result<Signature, WalletError> {
        Err(WalletError::SignerUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_crypto::verify_signature;

    fn legacy() -> SeedSigner {
        SeedSigner::new(Seed::from([0u8; 32]), Derivation::Legacy)
    }

    #[test]
    fn derivation_is_deterministic() {
        let signer = legacy();
        let a = signer.derive_account(5).unwrap();
        let b = signer.derive_account(5).unwrap();
        assert_eq!(a.public_key, b.public_key);
        assert_eq!(a.handle.index(), 5);
    }

    #[test]
    fn legacy_index_zero_matches_reference() {
        let derived = legacy().derive_account(0).unwrap();
        assert_eq!(
            derived.public_key,
            "C008B814A7D269A1FA3C6528B19201A24D797912DB9996FF02A1FF356E45552B"
                .parse()
                .unwrap()
        );
    }

    #[test]
    fn signatures_verify_under_derived_key() {
        let signer = legacy();
        let derived = signer.derive_account(1).unwrap();
        let hash = BlockHash::new([7; 32]);
        let sig = signer.sign_block(&derived.handle, &hash).unwrap();
        assert!(verify_signature(hash.as_bytes(), &sig, &derived.public_key));
    }

    #[test]
    fn bip39_and_legacy_differ() {
        let seed = [4u8; 64];
        let legacy = SeedSigner::new(Seed::from(seed), Derivation::Legacy);
        let bip39 = SeedSigner::new(Seed::from(seed), Derivation::Bip39);
        assert_ne!(
            legacy.derive_account(0).unwrap().public_key,
            bip39.derive_account(0).unwrap().public_key
        );
    }

    #[test]
    fn seed_signer_needs_a_local_key() {
        let handle = SigningHandle::new(0, None);
        assert!(matches!(
            legacy().sign_block(&handle, &BlockHash::ZERO),
            Err(WalletError::SignerUnavailable)
        ));
    }

    #[test]
    fn external_signer_always_unavailable() {
        assert!(matches!(
            ExternalSigner.derive_account(0),
            Err(WalletError::SignerUnavailable)
        ));
        assert!(matches!(
            ExternalSigner.sign_block(&SigningHandle::new(0, None), &BlockHash::ZERO),
            Err(WalletError::SignerUnavailable)
        ));
    }
}
