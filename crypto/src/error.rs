use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("derivation index {0} is outside the hardened range")]
    IndexOutOfRange(u32),

    #[error("invalid mnemonic phrase: {0}")]
    InvalidMnemonic(String),

    #[error("key derivation failed: {0}")]
    Derivation(String),
}
