//! Blake2b at the digest widths account chains use.

use blake2::digest::consts::{U32, U5};
use blake2::{Blake2b, Digest};

/// Feed `parts` through `D` in order and copy the digest into `out`.
fn digest_parts<D: Digest>(parts: &[&[u8]], out: &mut [u8]) {
    let mut hasher = D::new();
    for part in parts {
        hasher.update(part);
    }
    out.copy_from_slice(&hasher.finalize());
}

/// 256-bit Blake2b of `data`.
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    blake2b_256_multi(&[data])
}

/// 256-bit Blake2b over the concatenation of `parts`.
pub fn blake2b_256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut out = [0u8; 32];
    digest_parts::<Blake2b<U32>>(parts, &mut out);
    out
}

/// The 40-bit address checksum of a public key, in encoding order (digest reversed).
pub fn address_checksum(public_key: &[u8; 32]) -> [u8; 5] {
    let mut out = [0u8; 5];
    digest_parts::<Blake2b<U5>>(&[public_key], &mut out);
    out.reverse();
    out
}
