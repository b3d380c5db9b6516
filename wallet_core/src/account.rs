//! One derived account: block construction, signing and submission.

use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use lattice_crypto::{decode_address, hash_state_block};
use lattice_rpc::{AccountInfo, LedgerClient, PendingMap};
use lattice_types::{Address, BlockHash, ProcessSubtype, PublicKey, Raw, StateBlock};

use crate::signer::SigningHandle;
use crate::wallet::WalletContext;
use crate::WalletError;

/// A destination for one block of a chained send.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SendDestination {
    pub account: Address,
    pub amount: Raw,
}

/// A wallet account.
///
/// Operations on one account are not serialised internally: callers must not
/// build two blocks for the same account concurrently.
pub struct Account<C> {
    ctx: Arc<WalletContext<C>>,
    index: u32,
    handle: SigningHandle,
    public_key: PublicKey,
    address: Address,
    representative: RwLock<Option<Address>>,
}

impl<C: LedgerClient + 'static> Account<C> {
    pub(crate) fn new(
        ctx: Arc<WalletContext<C>>,
        index: u32,
        handle: SigningHandle,
        public_key: PublicKey,
        address: Address,
    ) -> Self {
        Self {
            ctx,
            index,
            handle,
            public_key,
            address,
            representative: RwLock::new(None),
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Derivation index of the account.
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// The cached representative, if one has been observed or set.
    pub fn representative(&self) -> Option<Address> {
        self.representative
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Confirmed and pending balance.
    pub async fn balance(&self) -> Result<(Raw, Raw), WalletError> {
        let balance = self.ctx.ledger.account_balance(&self.address).await?;
        Ok((balance.balance, balance.pending))
    }

    /// Send `amount` to `destination`.
    pub async fn send(&self, destination: &str, amount: Raw) -> Result<BlockHash, WalletError> {
        let mut block = self.send_block(destination, amount).await?;
        block.work = Some(self.ctx.work.for_send(block.previous).await?);
        Ok(self.ctx.ledger.process(&block, ProcessSubtype::Send).await?)
    }

    /// Build and sign a send block without work.
    pub async fn send_block(&self, destination: &str, amount: Raw) -> Result<StateBlock, WalletError> {
        let link = decode_link(destination)?;
        let info = self.opened_info().await?;
        let representative = self.cached_representative(info.representative.as_ref());
        let balance = debit(info.balance, amount)?;

        let mut block = self.unsigned(info.frontier, representative, balance, link);
        self.sign(&mut block)?;
        Ok(block)
    }

    /// Build a chain of signed send blocks from a single ledger query.
    ///
    /// Each block's `previous` is the hash of the block before it, so no other
    /// block may be created for this account until the chain has been submitted.
    pub async fn send_blocks(
        &self,
        destinations: &[SendDestination],
    ) -> Result<Vec<StateBlock>, WalletError> {
        let info = self.opened_info().await?;
        let representative = self.cached_representative(info.representative.as_ref());

        let mut frontier = info.frontier;
        let mut balance = info.balance;
        let mut blocks = Vec::with_capacity(destinations.len());
        for destination in destinations {
            let link = decode_link(destination.account.as_str())?;
            balance = debit(balance, destination.amount)?;
            let mut block = self.unsigned(frontier, representative.clone(), balance, link);
            frontier = self.sign(&mut block)?;
            blocks.push(block);
        }
        Ok(blocks)
    }

    /// Build a chain of sends and submit it, generating work for the next block
    /// while the current one is being submitted.
    ///
    /// Stops at the first failure; blocks already submitted stay submitted.
    pub async fn send_multiple(
        &self,
        destinations: &[SendDestination],
    ) -> Result<Vec<BlockHash>, WalletError> {
        let blocks = self.send_blocks(destinations).await?;
        if blocks.is_empty() {
            return Ok(Vec::new());
        }

        let (block_tx, mut block_rx) = mpsc::channel(blocks.len());
        let (err_tx, mut err_rx) = oneshot::channel::<WalletError>();
        let ctx = Arc::clone(&self.ctx);
        let _producer = AbortOnDrop(tokio::spawn(async move {
            for mut block in blocks {
                match ctx.work.for_send(block.previous).await {
                    Ok(work) => {
                        block.work = Some(work);
                        if block_tx.send(block).await.is_err() {
                            return;
                        }
                    }
                    Err(e) => {
                        let _ = err_tx.send(e);
                        return;
                    }
                }
            }
        }));

        let mut hashes = Vec::new();
        let mut err_closed = false;
        loop {
            tokio::select! {
                biased;
                err = &mut err_rx, if !err_closed => match err {
                    Ok(e) => {
                        // Blocks worked before the failure are already queued.
                        while let Ok(block) = block_rx.try_recv() {
                            hashes.push(self.submit_chained(&block).await?);
                        }
                        debug!(account = %self.address, submitted = hashes.len(), "chained send stopped by work failure");
                        return Err(e);
                    }
                    Err(_) => err_closed = true,
                },
                next = block_rx.recv() => match next {
                    Some(block) => hashes.push(self.submit_chained(&block).await?),
                    None => break,
                },
            }
        }
        Ok(hashes)
    }

    async fn submit_chained(&self, block: &StateBlock) -> Result<BlockHash, WalletError> {
        let hash = self.ctx.ledger.process(block, ProcessSubtype::Send).await?;
        debug!(%hash, account = %self.address, "chained send submitted");
        Ok(hash)
    }

    /// Receive every pending entry of at least `threshold`.
    pub async fn receive_pendings(&self, threshold: Raw) -> Result<Vec<BlockHash>, WalletError> {
        let pendings = self.query_pendings(threshold).await?;
        self.receive_pending_map(&pendings).await
    }

    /// Receive every pending entry of at least `threshold` and return the entries.
    pub async fn receive_and_return_pendings(&self, threshold: Raw) -> Result<PendingMap, WalletError> {
        let pendings = self.query_pendings(threshold).await?;
        self.receive_pending_map(&pendings).await?;
        Ok(pendings)
    }

    /// Receive one named pending entry.
    pub async fn receive_pending(&self, source: &BlockHash) -> Result<BlockHash, WalletError> {
        let info = self.ctx.ledger.account_info(&self.address).await?;
        let source_block = self.ctx.ledger.block_info(source).await?;
        let (frontier, balance, observed) = split_info(info.as_ref());
        let balance = balance
            .checked_add(source_block.amount)
            .ok_or(WalletError::BalanceOverflow)?;
        self.receive_block(frontier, balance, *source, observed).await
    }

    /// Set the representative used by future blocks without submitting anything.
    pub fn set_rep(&self, representative: &str) -> Result<(), WalletError> {
        decode_address(representative)
            .map_err(|_| WalletError::InvalidAddress(representative.to_string()))?;
        *self
            .representative
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Address::new(representative));
        Ok(())
    }

    /// Submit a change block moving the account to `representative`.
    /// The cached representative is updated only once the ledger accepts it.
    pub async fn change_rep(&self, representative: &str) -> Result<BlockHash, WalletError> {
        decode_address(representative)
            .map_err(|_| WalletError::InvalidAddress(representative.to_string()))?;
        let info = self.opened_info().await?;
        let new_rep = Address::new(representative);

        let mut block = self.unsigned(info.frontier, new_rep.clone(), info.balance, BlockHash::ZERO);
        self.sign(&mut block)?;
        block.work = Some(self.ctx.work.for_send(info.frontier).await?);
        let hash = self.ctx.ledger.process(&block, ProcessSubtype::Change).await?;

        *self
            .representative
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(new_rep);
        info!(%hash, account = %self.address, %representative, "representative changed");
        Ok(hash)
    }

    /// Receive the given entries in map order, threading each new block's hash
    /// forward as the next `previous`.
    pub(crate) async fn receive_pending_map(
        &self,
        pendings: &PendingMap,
    ) -> Result<Vec<BlockHash>, WalletError> {
        if pendings.is_empty() {
            return Ok(Vec::new());
        }

        let info = self.ctx.ledger.account_info(&self.address).await?;
        let (mut frontier, mut balance, observed) = split_info(info.as_ref());

        let mut hashes = Vec::with_capacity(pendings.len());
        for (source, pending) in pendings {
            balance = balance
                .checked_add(pending.amount)
                .ok_or(WalletError::BalanceOverflow)?;
            let hash = self.receive_block(frontier, balance, *source, observed).await?;
            frontier = Some(hash);
            hashes.push(hash);
        }
        debug!(account = %self.address, received = hashes.len(), "pending entries received");
        Ok(hashes)
    }

    /// Build, sign, work and submit one receive block. An account without a
    /// frontier opens with a zero `previous` and work over its public key.
    async fn receive_block(
        &self,
        frontier: Option<BlockHash>,
        balance: Raw,
        source: BlockHash,
        observed_rep: Option<&Address>,
    ) -> Result<BlockHash, WalletError> {
        let representative = self.cached_representative(observed_rep);
        let (previous, root) = match frontier {
            Some(frontier) => (frontier, frontier),
            None => (BlockHash::ZERO, BlockHash::from(self.public_key)),
        };

        let mut block = self.unsigned(previous, representative, balance, source);
        self.sign(&mut block)?;
        block.work = Some(self.ctx.work.for_receive(root).await?);
        let hash = self.ctx.ledger.process(&block, ProcessSubtype::Receive).await?;
        debug!(%hash, %source, account = %self.address, open = block.is_open(), "receive submitted");
        Ok(hash)
    }

    async fn query_pendings(&self, threshold: Raw) -> Result<PendingMap, WalletError> {
        let mut pendings = self
            .ctx
            .ledger
            .accounts_pending(std::slice::from_ref(&self.address), None, threshold)
            .await?;
        Ok(pendings.remove(&self.address).unwrap_or_default())
    }

    async fn opened_info(&self) -> Result<AccountInfo, WalletError> {
        self.ctx
            .ledger
            .account_info(&self.address)
            .await?
            .ok_or_else(|| WalletError::UnopenedAccount(self.address.clone()))
    }

    /// The cached representative; on first use, adopt the observed one or the
    /// wallet default.
    fn cached_representative(&self, observed: Option<&Address>) -> Address {
        let mut cached = self
            .representative
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        cached
            .get_or_insert_with(|| {
                observed
                    .cloned()
                    .unwrap_or_else(|| self.ctx.default_representative.clone())
            })
            .clone()
    }

    fn unsigned(&self, previous: BlockHash, representative: Address, balance: Raw, link: BlockHash) -> StateBlock {
        StateBlock {
            account: self.address.clone(),
            previous,
            representative,
            balance,
            link,
            signature: None,
            work: None,
        }
    }

    /// Sign `block` in place and return its hash.
    fn sign(&self, block: &mut StateBlock) -> Result<BlockHash, WalletError> {
        let hash = hash_state_block(block)?;
        block.signature = Some(self.ctx.signer.sign_block(&self.handle, &hash)?);
        Ok(hash)
    }
}

/// Aborts the task when dropped, so an abandoned pipeline stops generating work.
struct AbortOnDrop(JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

fn decode_link(destination: &str) -> Result<BlockHash, WalletError> {
    decode_address(destination)
        .map(BlockHash::from)
        .map_err(|_| WalletError::InvalidAddress(destination.to_string()))
}

fn debit(balance: Raw, amount: Raw) -> Result<Raw, WalletError> {
    balance
        .checked_sub(amount)
        .ok_or(WalletError::InsufficientFunds {
            needed: amount,
            available: balance,
        })
}

/// Frontier, balance and representative, treating an unopened account as empty.
fn split_info(info: Option<&AccountInfo>) -> (Option<BlockHash>, Raw, Option<&Address>) {
    match info {
        Some(info) => (Some(info.frontier), info.balance, info.representative.as_ref()),
        None => (None, Raw::ZERO, None),
    }
}
