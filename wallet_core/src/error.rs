use lattice_crypto::CryptoError;
use lattice_rpc::RpcError;
use lattice_types::{Address, Raw};
use lattice_work::WorkError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: Raw, available: Raw },

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("signing capability unavailable")]
    SignerUnavailable,

    #[error("account {0} has not been opened")]
    UnopenedAccount(Address),

    #[error("balance overflow")]
    BalanceOverflow,

    #[error("ledger error: {0}")]
    Ledger(#[from] RpcError),

    #[error("work error: {0}")]
    Work(#[from] WorkError),

    #[error("work task failed: {0}")]
    WorkTask(#[from] tokio::task::JoinError),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("config error: {0}")]
    Config(String),

    #[error("mnemonic error: {0}")]
    Mnemonic(String),
}
