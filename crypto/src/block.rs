//! Canonical state-block hash.

use lattice_types::{BlockHash, StateBlock};

use crate::{blake2b_256_multi, decode_address, CryptoError};

/// 32-byte preamble identifying the state block type inside the hash.
const STATE_PREAMBLE: [u8; 32] = {
    let mut p = [0u8; 32];
    p[31] = 6;
    p
};

/// Hash a state block: `Blake2b-256(preamble ‖ account ‖ previous ‖ representative ‖
/// balance_be128 ‖ link)`. Signature and work are not covered.
pub fn hash_state_block(block: &StateBlock) -> Result<BlockHash, CryptoError> {
    let account = decode_address(block.account.as_str())?;
    let representative = decode_address(block.representative.as_str())?;
    let balance = block.balance.to_be_bytes();
    Ok(BlockHash::new(blake2b_256_multi(&[
        &STATE_PREAMBLE,
        account.as_bytes(),
        block.previous.as_bytes(),
        representative.as_bytes(),
        &balance,
        block.link.as_bytes(),
    ])))
}
