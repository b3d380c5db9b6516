//! Wallet: seed, signer and the registry of derived accounts.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use lattice_crypto::{address_from_public_key, seed_from_mnemonic};
use lattice_rpc::{LedgerClient, RpcClient};
use lattice_types::{Address, BlockHash, Network, Raw, Seed};

use crate::signer::{AccountSigner, Derivation, ExternalSigner, SeedSigner};
use crate::{Account, WalletConfig, WalletError, WorkPolicy};

/// Accounts derived per discovery batch.
const SCAN_BATCH: usize = 10;
/// Discovery ends once the used accounts stop below this batch position.
const SCAN_GAP: usize = 5;

/// State shared between a wallet and its accounts.
pub(crate) struct WalletContext<C> {
    pub(crate) ledger: C,
    pub(crate) work: WorkPolicy<C>,
    pub(crate) signer: Box<dyn AccountSigner>,
    pub(crate) network: Network,
    pub(crate) default_representative: Address,
}

struct Registry<C> {
    next_index: u32,
    accounts: HashMap<Address, Arc<Account<C>>>,
}

/// A deterministic wallet.
///
/// The registry and `next_index` sit behind one reader/writer lock, so index
/// reservation and insertion never interleave with another writer.
pub struct Wallet<C> {
    ctx: Arc<WalletContext<C>>,
    registry: RwLock<Registry<C>>,
}

impl Wallet<RpcClient> {
    /// Build a seed wallet talking to the endpoints in `config`.
    pub fn connect(seed: Seed, config: &WalletConfig) -> Result<Self, WalletError> {
        let ledger = RpcClient::new(config.rpc_url())?;
        let work = config.work_rpc_url.as_deref().map(RpcClient::new).transpose()?;
        Self::new(seed, config, ledger, work)
    }
}

impl<C: LedgerClient + 'static> Wallet<C> {
    /// A seed-backed wallet. `config.bip39` selects the derivation scheme.
    pub fn new(seed: Seed, config: &WalletConfig, ledger: C, work_client: Option<C>) -> Result<Self, WalletError> {
        let derivation = if config.bip39 {
            Derivation::Bip39
        } else {
            Derivation::Legacy
        };
        Self::with_signer(
            Box::new(SeedSigner::new(seed, derivation)),
            config,
            ledger,
            work_client,
        )
    }

    /// A wallet whose seed is derived from a BIP39 mnemonic and password.
    pub fn from_mnemonic(
        phrase: &str,
        password: &str,
        config: &WalletConfig,
        ledger: C,
        work_client: Option<C>,
    ) -> Result<Self, WalletError> {
        let seed = seed_from_mnemonic(phrase, password).map_err(|e| WalletError::Mnemonic(e.to_string()))?;
        Self::with_signer(
            Box::new(SeedSigner::new(seed, Derivation::Bip39)),
            config,
            ledger,
            work_client,
        )
    }

    /// A wallet backed by an external signer.
    pub fn external(config: &WalletConfig, ledger: C, work_client: Option<C>) -> Result<Self, WalletError> {
        Self::with_signer(Box::new(ExternalSigner), config, ledger, work_client)
    }

    /// A wallet using any signer implementation.
    pub fn with_signer(
        signer: Box<dyn AccountSigner>,
        config: &WalletConfig,
        ledger: C,
        work_client: Option<C>,
    ) -> Result<Self, WalletError> {
        let work = WorkPolicy::new(
            work_client,
            config.work_difficulty(),
            config.receive_work_difficulty(),
        );
        Self::with_work_policy(signer, config, ledger, work)
    }

    /// A wallet with a fully assembled work policy.
    pub fn with_work_policy(
        signer: Box<dyn AccountSigner>,
        config: &WalletConfig,
        ledger: C,
        work: WorkPolicy<C>,
    ) -> Result<Self, WalletError> {
        let ctx = WalletContext {
            ledger,
            work,
            signer,
            network: config.network,
            default_representative: config.default_representative()?,
        };
        Ok(Self {
            ctx: Arc::new(ctx),
            registry: RwLock::new(Registry {
                next_index: 0,
                accounts: HashMap::new(),
            }),
        })
    }

    pub fn network(&self) -> Network {
        self.ctx.network
    }

    /// The next index `new_account(None)` will derive.
    pub async fn next_index(&self) -> u32 {
        self.registry.read().await.next_index
    }

    /// Derive and register an account.
    ///
    /// Without an index, the next unused index is taken and the counter advances;
    /// an address already registered is skipped and the next index tried. With an
    /// explicit index the counter is left alone and an existing registration
    /// is returned as is.
    pub async fn new_account(&self, index: Option<u32>) -> Result<Arc<Account<C>>, WalletError> {
        let mut registry = self.registry.write().await;
        loop {
            let idx = index.unwrap_or(registry.next_index);
            let derived = self.ctx.signer.derive_account(idx)?;
            let address = address_from_public_key(&derived.public_key, self.ctx.network);
            if index.is_none() {
                registry.next_index = registry.next_index.wrapping_add(1);
            }

            if let Some(existing) = registry.accounts.get(&address) {
                if index.is_some() {
                    return Ok(Arc::clone(existing));
                }
                debug!(index = idx, %address, "address already registered, trying next index");
                continue;
            }

            let account = Arc::new(Account::new(
                Arc::clone(&self.ctx),
                idx,
                derived.handle,
                derived.public_key,
                address.clone(),
            ));
            registry.accounts.insert(address.clone(), Arc::clone(&account));
            debug!(index = idx, %address, "account registered");
            return Ok(account);
        }
    }

    pub async fn get_account(&self, address: &Address) -> Option<Arc<Account<C>>> {
        self.registry.read().await.accounts.get(address).cloned()
    }

    /// Snapshot of every registered account.
    pub async fn get_accounts(&self) -> Vec<Arc<Account<C>>> {
        self.registry.read().await.accounts.values().cloned().collect()
    }

    /// Gap-limit discovery.
    ///
    /// Derives batches of ten accounts and trims unused ones from the top of each
    /// batch, rewinding `next_index` as it goes. An account counts as used if it
    /// has a frontier or a pending balance. Discovery ends once a batch has at
    /// least five unused accounts at its top.
    pub async fn scan_for_accounts(&self) -> Result<(), WalletError> {
        loop {
            let mut batch = Vec::with_capacity(SCAN_BATCH);
            for _ in 0..SCAN_BATCH {
                batch.push(self.new_account(None).await?);
            }
            let addresses: Vec<Address> = batch.iter().map(|a| a.address().clone()).collect();
            let balances = self.ctx.ledger.accounts_balances(&addresses).await?;
            let frontiers = self.ctx.ledger.accounts_frontiers(&addresses).await?;

            let mut registry = self.registry.write().await;
            let mut stop = None;
            for (pos, account) in batch.iter().enumerate().rev() {
                let address = account.address();
                let pending = balances.get(address).is_some_and(|b| !b.pending.is_zero());
                if pending || frontiers.contains_key(address) {
                    stop = Some(pos);
                    break;
                }
                registry.next_index = account.index();
                registry.accounts.remove(address);
            }

            match stop {
                Some(pos) if pos >= SCAN_GAP => {
                    debug!(next_index = registry.next_index, "batch still in use, scanning further");
                }
                _ => {
                    info!(
                        accounts = registry.accounts.len(),
                        next_index = registry.next_index,
                        "account scan finished"
                    );
                    return Ok(());
                }
            }
        }
    }

    /// Receive every pending entry of at least `min_amount` across all accounts.
    ///
    /// Stops at the first failure; receives already submitted stay submitted.
    pub async fn receive_pendings(&self, min_amount: Raw) -> Result<Vec<BlockHash>, WalletError> {
        let accounts = self.get_accounts().await;
        if accounts.is_empty() {
            return Ok(Vec::new());
        }
        let addresses: Vec<Address> = accounts.iter().map(|a| a.address().clone()).collect();
        let mut pendings = self
            .ctx
            .ledger
            .accounts_pending(&addresses, None, min_amount)
            .await?;

        let mut ordered = accounts;
        ordered.sort_by_key(|a| a.index());
        let mut hashes = Vec::new();
        for account in ordered {
            if let Some(entries) = pendings.remove(account.address()) {
                hashes.extend(account.receive_pending_map(&entries).await?);
            }
        }
        info!(received = hashes.len(), "wallet pending entries received");
        Ok(hashes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_nullables::NullLedger;
    use lattice_types::WorkDifficulty;

    const EASY: WorkDifficulty = WorkDifficulty(0xff00_0000_0000_0000);

    fn wallet() -> Wallet<NullLedger> {
        let config = WalletConfig {
            work_difficulty: Some(EASY),
            receive_work_difficulty: Some(EASY),
            ..WalletConfig::default()
        };
        Wallet::new(
            Seed::from([0u8; 32]),
            &config,
            NullLedger::new(Network::Nano, EASY, EASY),
            None,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn new_account_advances_index() {
        let wallet = wallet();
        let a0 = wallet.new_account(None).await.unwrap();
        let a1 = wallet.new_account(None).await.unwrap();
        assert_eq!(a0.index(), 0);
        assert_eq!(a1.index(), 1);
        assert_eq!(wallet.next_index().await, 2);
        assert_eq!(
            a0.address().as_str(),
            "nano_3i1aq1cchnmbn9x5rsbap8b15akfh7wj7pwskuzi7ahz8oq6cobd99d4r3b7"
        );
    }

    #[tokio::test]
    async fn explicit_index_leaves_counter_and_reuses_registration() {
        let wallet = wallet();
        let a = wallet.new_account(Some(7)).await.unwrap();
        let b = wallet.new_account(Some(7)).await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(wallet.next_index().await, 0);
        assert_eq!(wallet.get_accounts().await.len(), 1);
    }

    #[tokio::test]
    async fn auto_index_skips_registered_address() {
        let wallet = wallet();
        wallet.new_account(Some(0)).await.unwrap();
        let next = wallet.new_account(None).await.unwrap();
        assert_eq!(next.index(), 1);
        assert_eq!(wallet.next_index().await, 2);
    }

    #[tokio::test]
    async fn lookup_by_address() {
        let wallet = wallet();
        let a = wallet.new_account(None).await.unwrap();
        assert!(wallet.get_account(a.address()).await.is_some());
        assert!(wallet
            .get_account(&Address::new("nano_unknown"))
            .await
            .is_none());
    }

    #[tokio::test]
    async fn external_wallet_cannot_derive() {
        let wallet = Wallet::external(
            &WalletConfig::default(),
            NullLedger::new(Network::Nano, EASY, EASY),
            None,
        )
        .unwrap();
        assert!(matches!(
            wallet.new_account(None).await,
            Err(WalletError::SignerUnavailable)
        ));
        assert_eq!(wallet.next_index().await, 0);
    }

    #[tokio::test]
    async fn invalid_mnemonic_rejected() {
        let result = Wallet::from_mnemonic(
            "not a mnemonic",
            "",
            &WalletConfig::default(),
            NullLedger::new(Network::Nano, EASY, EASY),
            None,
        );
        assert!(matches!(result, Err(WalletError::Mnemonic(_))));
    }
}
