//! The ledger boundary consumed by the wallet.

use std::collections::HashMap;
use std::future::Future;

use lattice_types::{Address, BlockHash, ProcessSubtype, Raw, StateBlock, WorkDifficulty, WorkNonce};

use crate::{AccountBalance, AccountInfo, BlockInfo, PendingMap, RpcError};

/// Request/response access to a ledger node.
///
/// Every call is a single round trip; implementations do not retry.
pub trait LedgerClient: Send + Sync {
    /// Confirmed and pending balance of one account.
    fn account_balance(
        &self,
        account: &Address,
    ) -> impl Future<Output = Result<AccountBalance, RpcError>> + Send;

    /// Balances of several accounts in one request.
    fn accounts_balances(
        &self,
        accounts: &[Address],
    ) -> impl Future<Output = Result<HashMap<Address, AccountBalance>, RpcError>> + Send;

    /// Chain state of an account, including its representative.
    /// `Ok(None)` means the account has never been opened.
    fn account_info(
        &self,
        account: &Address,
    ) -> impl Future<Output = Result<Option<AccountInfo>, RpcError>> + Send;

    /// Frontier hashes of the opened accounts among `accounts`; unopened accounts are absent.
    fn accounts_frontiers(
        &self,
        accounts: &[Address],
    ) -> impl Future<Output = Result<HashMap<Address, BlockHash>, RpcError>> + Send;

    /// Receivable entries with amount `>= threshold`, at most `count` per account
    /// (`None` for all).
    fn accounts_pending(
        &self,
        accounts: &[Address],
        count: Option<u64>,
        threshold: Raw,
    ) -> impl Future<Output = Result<HashMap<Address, PendingMap>, RpcError>> + Send;

    /// Look up a block by hash.
    fn block_info(
        &self,
        hash: &BlockHash,
    ) -> impl Future<Output = Result<BlockInfo, RpcError>> + Send;

    /// Submit a signed block with work attached; returns the block hash.
    fn process(
        &self,
        block: &StateBlock,
        subtype: ProcessSubtype,
    ) -> impl Future<Output = Result<BlockHash, RpcError>> + Send;

    /// Ask the node to compute work for `root` at `difficulty`.
    fn work_generate(
        &self,
        root: &BlockHash,
        difficulty: WorkDifficulty,
    ) -> impl Future<Output = Result<WorkNonce, RpcError>> + Send;
}
