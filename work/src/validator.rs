//! PoW validation.

use blake2::digest::consts::U8;
use blake2::{Blake2b, Digest};
use lattice_types::{WorkDifficulty, WorkNonce};

type Blake2b64 = Blake2b<U8>;

/// The 64-bit value a nonce achieves for `root`; higher is harder.
pub fn work_value(root: &[u8], nonce: WorkNonce) -> u64 {
    let mut hasher = Blake2b64::new();
    hasher.update(nonce.to_hash_bytes());
    hasher.update(root);
    let mut out = [0u8; 8];
    out.copy_from_slice(&hasher.finalize());
    u64::from_le_bytes(out)
}

/// Validate that a work nonce meets the threshold for a given root.
pub fn validate_work(root: &[u8], nonce: WorkNonce, threshold: WorkDifficulty) -> bool {
    work_value(root, nonce) >= threshold.value()
}
