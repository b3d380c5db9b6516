//! Nullable ledger: an in-memory node that validates what it is given.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use lattice_crypto::{address_from_public_key, blake2b_256, decode_address, hash_state_block, verify_signature};
use lattice_rpc::{AccountBalance, AccountInfo, BlockInfo, LedgerClient, Pending, PendingMap, RpcError};
use lattice_types::{
    Address, BlockHash, Network, ProcessSubtype, PublicKey, Raw, StateBlock, WorkDifficulty,
    WorkNonce,
};
use lattice_work::{validate_work, WorkGenerator};

/// How the ledger answers `work_generate`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RemoteWork {
    /// Every request fails as if the work server were down.
    #[default]
    Unreachable,
    /// Requests are served by computing the work locally.
    Generate,
}

/// A block accepted by [`NullLedger::process`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessedBlock {
    pub hash: BlockHash,
    pub block: StateBlock,
    pub subtype: ProcessSubtype,
}

struct Chain {
    frontier: BlockHash,
    balance: Raw,
    representative: Address,
    block_count: u64,
}

enum PendingEffect {
    Create(Address, Raw),
    Consume,
    None,
}

struct LedgerState {
    network: Network,
    send_difficulty: WorkDifficulty,
    receive_difficulty: WorkDifficulty,
    chains: HashMap<Address, Chain>,
    pending: HashMap<Address, PendingMap>,
    blocks: HashMap<BlockHash, BlockInfo>,
    processed: Vec<ProcessedBlock>,
    remote_work: RemoteWork,
    work_requests: Vec<BlockHash>,
    fail_process_after: Option<usize>,
    synthetic_counter: u64,
}

/// In-memory ledger implementing [`LedgerClient`].
///
/// Cloning shares the underlying state, so a test can hand one clone to a wallet
/// and keep another for assertions.
#[derive(Clone)]
pub struct NullLedger {
    state: Arc<Mutex<LedgerState>>,
}

impl NullLedger {
    /// A ledger that requires work at the given thresholds.
    pub fn new(
        network: Network,
        send_difficulty: WorkDifficulty,
        receive_difficulty: WorkDifficulty,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(LedgerState {
                network,
                send_difficulty,
                receive_difficulty,
                chains: HashMap::new(),
                pending: HashMap::new(),
                blocks: HashMap::new(),
                processed: Vec::new(),
                remote_work: RemoteWork::default(),
                work_requests: Vec::new(),
                fail_process_after: None,
                synthetic_counter: 0,
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Seed an already-opened account with a balance and representative.
    /// Returns the synthetic frontier hash.
    pub fn open_account(&self, account: &Address, balance: Raw, representative: &Address) -> BlockHash {
        let mut state = self.state();
        let frontier = state.synthetic_hash();
        state.chains.insert(
            account.clone(),
            Chain {
                frontier,
                balance,
                representative: representative.clone(),
                block_count: 1,
            },
        );
        frontier
    }

    /// Seed a receivable entry for `account` from a synthetic source block.
    /// Returns the source block hash.
    pub fn add_pending(&self, account: &Address, amount: Raw) -> BlockHash {
        let mut state = self.state();
        let source = state.synthetic_hash();
        state.insert_pending(account, source, amount, None);
        source
    }

    /// Choose how `work_generate` behaves.
    pub fn set_remote_work(&self, behaviour: RemoteWork) {
        self.state().remote_work = behaviour;
    }

    /// Accept `n` more submissions, then fail every later one.
    pub fn fail_process_after(&self, n: usize) {
        let mut state = self.state();
        state.fail_process_after = Some(state.processed.len() + n);
    }

    /// Every block accepted so far, in submission order.
    pub fn processed(&self) -> Vec<ProcessedBlock> {
        self.state().processed.clone()
    }

    /// Roots for which remote work was requested.
    pub fn work_requests(&self) -> Vec<BlockHash> {
        self.state().work_requests.clone()
    }

    /// Current frontier of an account, if opened.
    pub fn frontier(&self, account: &Address) -> Option<BlockHash> {
        self.state().chains.get(account).map(|c| c.frontier)
    }

    /// Confirmed balance of an account (zero if unopened).
    pub fn balance(&self, account: &Address) -> Raw {
        self.state()
            .chains
            .get(account)
            .map_or(Raw::ZERO, |c| c.balance)
    }

    /// Receivable entries currently waiting for an account.
    pub fn pending_for(&self, account: &Address) -> PendingMap {
        self.state().pending.get(account).cloned().unwrap_or_default()
    }
}

impl LedgerState {
    fn synthetic_hash(&mut self) -> BlockHash {
        self.synthetic_counter += 1;
        BlockHash::new(blake2b_256(&self.synthetic_counter.to_be_bytes()))
    }

    fn insert_pending(&mut self, account: &Address, source: BlockHash, amount: Raw, from: Option<Address>) {
        let block_account = from.clone().unwrap_or_else(|| account.clone());
        self.blocks.insert(
            source,
            BlockInfo {
                block_account,
                amount,
                balance: Raw::ZERO,
            },
        );
        self.pending
            .entry(account.clone())
            .or_default()
            .insert(source, Pending { amount, source: from });
    }

    fn balance_of(&self, account: &Address) -> AccountBalance {
        let balance = self.chains.get(account).map_or(Raw::ZERO, |c| c.balance);
        let pending = self
            .pending
            .get(account)
            .map(|p| p.values().fold(Raw::ZERO, |acc, e| acc.saturating_add(e.amount)))
            .unwrap_or(Raw::ZERO);
        AccountBalance { balance, pending }
    }

    fn process(&mut self, block: &StateBlock, subtype: ProcessSubtype) -> Result<BlockHash, RpcError> {
        if let Some(limit) = self.fail_process_after {
            if self.processed.len() >= limit {
                return Err(RpcError::Unavailable("scripted process failure".into()));
            }
        }

        let account_key = decode_address(block.account.as_str()).map_err(|e| RpcError::Node(e.to_string()))?;
        decode_address(block.representative.as_str()).map_err(|e| RpcError::Node(e.to_string()))?;
        let hash = hash_state_block(block).map_err(|e| RpcError::Node(e.to_string()))?;

        let signature = block.signature.ok_or_else(|| RpcError::Node("Block is not signed".into()))?;
        if !verify_signature(hash.as_bytes(), &signature, &account_key) {
            return Err(RpcError::Node("Bad signature".into()));
        }

        let (prior_balance, prior_count) = match self.chains.get(&block.account) {
            Some(chain) if chain.frontier != block.previous => {
                return Err(RpcError::Node("Fork".into()));
            }
            Some(chain) => (chain.balance, chain.block_count),
            None if !block.previous.is_zero() => {
                return Err(RpcError::Node("Gap previous block".into()));
            }
            None => (Raw::ZERO, 0),
        };

        let work = block.work.ok_or_else(|| RpcError::Node("Block work is missing".into()))?;
        let root = if block.previous.is_zero() {
            BlockHash::from(account_key)
        } else {
            block.previous
        };
        let threshold = match subtype {
            ProcessSubtype::Receive => self.receive_difficulty,
            ProcessSubtype::Send | ProcessSubtype::Change => self.send_difficulty,
        };
        if !validate_work(root.as_bytes(), work, threshold) {
            return Err(RpcError::Node("Block work is less than threshold".into()));
        }

        // Checks only; the pending map changes once the block is known to be valid.
        let effect = match subtype {
            ProcessSubtype::Send => {
                let amount = prior_balance
                    .checked_sub(block.balance)
                    .filter(|a| !a.is_zero())
                    .ok_or_else(|| RpcError::Node("Invalid send balance".into()))?;
                let destination = address_from_public_key(&PublicKey(block.link.0), self.network);
                PendingEffect::Create(destination, amount)
            }
            ProcessSubtype::Receive => {
                let entry = self
                    .pending
                    .get(&block.account)
                    .and_then(|p| p.get(&block.link))
                    .ok_or_else(|| RpcError::Node("Unreceivable".into()))?;
                if prior_balance.checked_add(entry.amount) != Some(block.balance) {
                    return Err(RpcError::Node("Balance mismatch".into()));
                }
                PendingEffect::Consume
            }
            ProcessSubtype::Change => {
                if block.balance != prior_balance || !block.link.is_zero() {
                    return Err(RpcError::Node("Invalid change block".into()));
                }
                PendingEffect::None
            }
        };

        match effect {
            PendingEffect::Create(destination, amount) => {
                self.insert_pending(&destination, hash, amount, Some(block.account.clone()));
            }
            PendingEffect::Consume => {
                if let Some(entries) = self.pending.get_mut(&block.account) {
                    entries.remove(&block.link);
                }
            }
            PendingEffect::None => {}
        }

        self.chains.insert(
            block.account.clone(),
            Chain {
                frontier: hash,
                balance: block.balance,
                representative: block.representative.clone(),
                block_count: prior_count + 1,
            },
        );
        self.processed.push(ProcessedBlock {
            hash,
            block: block.clone(),
            subtype,
        });
        debug!(%hash, %subtype, account = %block.account, "null ledger accepted block");
        Ok(hash)
    }
}

impl LedgerClient for NullLedger {
    async fn account_balance(&self, account: &Address) -> Result<AccountBalance, RpcError> {
        Ok(self.state().balance_of(account))
    }

    async fn accounts_balances(
        &self,
        accounts: &[Address],
    ) -> Result<HashMap<Address, AccountBalance>, RpcError> {
        let state = self.state();
        Ok(accounts
            .iter()
            .map(|a| (a.clone(), state.balance_of(a)))
            .collect())
    }

    async fn account_info(&self, account: &Address) -> Result<Option<AccountInfo>, RpcError> {
        Ok(self.state().chains.get(account).map(|c| AccountInfo {
            frontier: c.frontier,
            balance: c.balance,
            representative: Some(c.representative.clone()),
            block_count: c.block_count,
        }))
    }

    async fn accounts_frontiers(
        &self,
        accounts: &[Address],
    ) -> Result<HashMap<Address, BlockHash>, RpcError> {
        let state = self.state();
        Ok(accounts
            .iter()
            .filter_map(|a| state.chains.get(a).map(|c| (a.clone(), c.frontier)))
            .collect())
    }

    async fn accounts_pending(
        &self,
        accounts: &[Address],
        count: Option<u64>,
        threshold: Raw,
    ) -> Result<HashMap<Address, PendingMap>, RpcError> {
        let state = self.state();
        let limit = count.map_or(usize::MAX, |c| usize::try_from(c).unwrap_or(usize::MAX));
        Ok(accounts
            .iter()
            .map(|a| {
                let entries = state
                    .pending
                    .get(a)
                    .map(|p| {
                        p.iter()
                            .filter(|(_, e)| e.amount >= threshold)
                            .take(limit)
                            .map(|(h, e)| (*h, e.clone()))
                            .collect()
                    })
                    .unwrap_or_default();
                (a.clone(), entries)
            })
            .collect())
    }

    async fn block_info(&self, hash: &BlockHash) -> Result<BlockInfo, RpcError> {
        self.state()
            .blocks
            .get(hash)
            .cloned()
            .ok_or_else(|| RpcError::Node("Block not found".into()))
    }

    async fn process(
        &self,
        block: &StateBlock,
        subtype: ProcessSubtype,
    ) -> Result<BlockHash, RpcError> {
        self.state().process(block, subtype)
    }

    async fn work_generate(
        &self,
        root: &BlockHash,
        difficulty: WorkDifficulty,
    ) -> Result<WorkNonce, RpcError> {
        let behaviour = {
            let mut state = self.state();
            state.work_requests.push(*root);
            state.remote_work
        };
        match behaviour {
            RemoteWork::Unreachable => Err(RpcError::Unavailable("work server unreachable".into())),
            RemoteWork::Generate => WorkGenerator
                .generate(root.as_bytes(), difficulty)
                .map_err(|e| RpcError::Node(e.to_string())),
        }
    }
}
