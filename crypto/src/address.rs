//! Account addresses.
//!
//! Format: `<prefix>` + base32(4 zero bits ‖ public_key, 52 chars) + base32(checksum, 8 chars)
//!
//! Checksum: Blake2b with a 5-byte digest over the public key, bytes reversed.
//! Base32 alphabet: `13456789abcdefghijkmnopqrstuwxyz` (avoids ambiguous chars).

use lattice_types::{Address, Network, PublicKey};

use crate::hash::address_checksum;
use crate::CryptoError;

const BASE32_ALPHABET: &[u8; 32] = b"13456789abcdefghijkmnopqrstuwxyz";

/// Reverse lookup table: ASCII byte → 5-bit value (0xFF = invalid).
const BASE32_DECODE: [u8; 128] = {
    let mut table = [0xFFu8; 128];
    let alpha = BASE32_ALPHABET;
    let mut i = 0;
    while i < 32 {
        table[alpha[i] as usize] = i as u8;
        i += 1;
    }
    table
};

/// Every prefix any supported network may produce.
const KNOWN_PREFIXES: [&str; 3] = ["nano_", "xrb_", "ban_"];
/// Public key: 260 bits (4 padding + 256) → 52 chars.
const PUBKEY_CHARS: usize = 52;
/// Checksum: 40 bits → 8 chars.
const CHECKSUM_CHARS: usize = 8;

/// Encode bytes as base32, treating the input as preceded by `lead_bits` zero bits.
fn encode_base32(bytes: &[u8], lead_bits: u32, out: &mut String) {
    let mut buffer: u64 = 0;
    let mut bits_in_buffer = lead_bits;

    for &byte in bytes {
        buffer = (buffer << 8) | byte as u64;
        bits_in_buffer += 8;
        while bits_in_buffer >= 5 {
            bits_in_buffer -= 5;
            let idx = ((buffer >> bits_in_buffer) & 0x1F) as usize;
            out.push(BASE32_ALPHABET[idx] as char);
        }
    }
}

/// Decode base32 into exactly `N` bytes, discarding `lead_bits` leading bits which
/// must be zero. Returns `None` on invalid characters, padding or length.
fn decode_base32_fixed<const N: usize>(s: &str, lead_bits: u32) -> Option<[u8; N]> {
    if s.len() * 5 != N * 8 + lead_bits as usize {
        return None;
    }
    let mut buffer: u64 = 0;
    let mut bits_in_buffer: i32 = -(lead_bits as i32);
    let mut result = [0u8; N];
    let mut pos = 0;

    for c in s.bytes() {
        let val = *BASE32_DECODE.get(c as usize)?;
        if val == 0xFF {
            return None;
        }
        buffer = (buffer << 5) | val as u64;
        bits_in_buffer += 5;
        if bits_in_buffer < 0 {
            continue;
        }
        if pos == 0 && bits_in_buffer < 5 && (buffer >> bits_in_buffer) != 0 {
            // Padding bits must be zero.
            return None;
        }
        if bits_in_buffer >= 8 {
            bits_in_buffer -= 8;
            result[pos] = (buffer >> bits_in_buffer) as u8;
            pos += 1;
        }
    }

    (pos == N).then_some(result)
}

/// Encode a public key as an address with the given network's prefix.
pub fn address_from_public_key(public_key: &PublicKey, network: Network) -> Address {
    let mut address = String::with_capacity(network.address_prefix().len() + 60);
    address.push_str(network.address_prefix());
    encode_base32(public_key.as_bytes(), 4, &mut address);
    encode_base32(&address_checksum(public_key.as_bytes()), 0, &mut address);
    Address::new(address)
}

/// Extract the public key from an address of any supported network.
pub fn decode_address(address: &str) -> Result<PublicKey, CryptoError> {
    let invalid = || CryptoError::InvalidAddress(address.to_string());

    let encoded = KNOWN_PREFIXES
        .iter()
        .find_map(|p| address.strip_prefix(p))
        .ok_or_else(invalid)?;
    if !encoded.is_ascii() || encoded.len() != PUBKEY_CHARS + CHECKSUM_CHARS {
        return Err(invalid());
    }

    let (key_part, checksum_part) = encoded.split_at(PUBKEY_CHARS);
    let key: [u8; 32] = decode_base32_fixed(key_part, 4).ok_or_else(invalid)?;
    let sum: [u8; 5] = decode_base32_fixed(checksum_part, 0).ok_or_else(invalid)?;

    if sum != address_checksum(&key) {
        return Err(invalid());
    }
    Ok(PublicKey(key))
}
