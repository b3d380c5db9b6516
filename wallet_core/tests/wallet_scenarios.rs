//! End-to-end wallet behaviour against the nullable ledger.

use std::collections::HashSet;
use std::sync::Arc;

use lattice_crypto::{
    address_from_public_key, decode_address, derive_legacy_key, hash_state_block, public_from_private,
    verify_signature,
};
use lattice_nullables::{NullLedger, NullWork, RemoteWork};
use lattice_types::{Address, BlockHash, Network, ProcessSubtype, Raw, Seed, WorkDifficulty};
use lattice_wallet::{
    Account, Derivation, SeedSigner, SendDestination, Wallet, WalletConfig, WalletError, WorkPolicy,
};
use lattice_work::{validate_work, WorkError};

const EASY: WorkDifficulty = WorkDifficulty(0xff00_0000_0000_0000);
const SEED: [u8; 32] = [0x11; 32];
const REP: &str = "nano_3t6k35gi95xu6tergt6p69ck76ogmitsa8mnijtpxm9fkcm736xtoncuohr3";

fn config(network: Network) -> WalletConfig {
    WalletConfig {
        work_difficulty: Some(EASY),
        receive_work_difficulty: Some(EASY),
        ..WalletConfig::for_network(network)
    }
}

fn setup() -> (Wallet<NullLedger>, NullLedger) {
    let ledger = NullLedger::new(Network::Nano, EASY, EASY);
    let wallet = Wallet::new(Seed::from(SEED), &config(Network::Nano), ledger.clone(), None).unwrap();
    (wallet, ledger)
}

fn address_at(index: u32) -> Address {
    let key = derive_legacy_key(&SEED, index);
    address_from_public_key(&public_from_private(&key), Network::Nano)
}

async fn funded(wallet: &Wallet<NullLedger>, ledger: &NullLedger, balance: u128) -> Arc<Account<NullLedger>> {
    let account = wallet.new_account(None).await.unwrap();
    ledger.open_account(account.address(), Raw::new(balance), &Address::new(REP));
    account
}

#[tokio::test]
async fn first_receive_opens_the_account() {
    let (wallet, ledger) = setup();
    let a0 = wallet.new_account(None).await.unwrap();
    let source = ledger.add_pending(a0.address(), Raw::new(1000));

    let hashes = a0.receive_pendings(Raw::ZERO).await.unwrap();

    let processed = ledger.processed();
    assert_eq!(processed.len(), 1);
    assert_eq!(hashes, vec![processed[0].hash]);
    let block = &processed[0].block;
    assert_eq!(processed[0].subtype, ProcessSubtype::Receive);
    assert_eq!(block.previous, BlockHash::ZERO);
    assert_eq!(block.balance, Raw::new(1000));
    assert_eq!(block.link, source);
    assert_eq!(
        block.representative.as_str(),
        Network::Nano.default_representative()
    );
    let root = BlockHash::from(*a0.public_key());
    assert!(validate_work(root.as_bytes(), block.work.unwrap(), EASY));

    let hash = hash_state_block(block).unwrap();
    assert!(verify_signature(hash.as_bytes(), &block.signature.unwrap(), a0.public_key()));
}

#[tokio::test]
async fn send_exact_balance_and_overdraw() {
    let (wallet, ledger) = setup();
    let account = funded(&wallet, &ledger, 500).await;
    let destination = address_at(1);

    let block = account.send_block(destination.as_str(), Raw::new(500)).await.unwrap();
    assert_eq!(block.balance, Raw::ZERO);

    let err = account
        .send_block(destination.as_str(), Raw::new(501))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WalletError::InsufficientFunds { needed, available }
            if needed == Raw::new(501) && available == Raw::new(500)
    ));
    assert!(ledger.processed().is_empty());
}

#[tokio::test]
async fn send_then_destination_receives() {
    let (wallet, ledger) = setup();
    let sender = funded(&wallet, &ledger, 1000).await;
    let receiver = wallet.new_account(None).await.unwrap();
    let frontier = ledger.frontier(sender.address()).unwrap();

    let send_hash = sender.send(receiver.address().as_str(), Raw::new(300)).await.unwrap();
    let processed = ledger.processed();
    assert_eq!(processed[0].subtype, ProcessSubtype::Send);
    assert_eq!(processed[0].block.previous, frontier);
    assert_eq!(processed[0].block.link, BlockHash::from(*receiver.public_key()));
    assert_eq!(processed[0].block.representative.as_str(), REP);
    assert!(validate_work(frontier.as_bytes(), processed[0].block.work.unwrap(), EASY));

    let receive_hash = receiver.receive_pending(&send_hash).await.unwrap();
    assert_eq!(ledger.balance(sender.address()), Raw::new(700));
    assert_eq!(ledger.balance(receiver.address()), Raw::new(300));
    assert_eq!(ledger.frontier(receiver.address()), Some(receive_hash));
}

#[tokio::test]
async fn invalid_destination_is_rejected_before_anything_happens() {
    let (wallet, ledger) = setup();
    let account = funded(&wallet, &ledger, 500).await;
    let err = account.send("nano_notanaddress", Raw::new(1)).await.unwrap_err();
    assert!(matches!(err, WalletError::InvalidAddress(_)));
    assert!(ledger.processed().is_empty());
}

#[tokio::test]
async fn sending_from_an_unopened_account_fails() {
    let (wallet, _ledger) = setup();
    let account = wallet.new_account(None).await.unwrap();
    let err = account.send_block(REP, Raw::new(1)).await.unwrap_err();
    assert!(matches!(err, WalletError::UnopenedAccount(a) if &a == account.address()));
}

#[tokio::test]
async fn bulk_receive_threads_the_chain_and_is_idempotent() {
    let (wallet, ledger) = setup();
    let account = wallet.new_account(None).await.unwrap();
    for amount in [10, 20, 30] {
        ledger.add_pending(account.address(), Raw::new(amount));
    }

    let first = account.receive_pendings(Raw::ZERO).await.unwrap();
    assert_eq!(first.len(), 3);
    let processed = ledger.processed();
    assert_eq!(processed[0].block.previous, BlockHash::ZERO);
    for pair in processed.windows(2) {
        assert_eq!(pair[1].block.previous, pair[0].hash);
        assert!(pair[0].block.link < pair[1].block.link);
    }
    assert_eq!(processed[2].block.balance, Raw::new(60));

    let second = account.receive_pendings(Raw::ZERO).await.unwrap();
    assert!(second.is_empty());
    assert_eq!(ledger.processed().len(), 3);
}

#[tokio::test]
async fn receive_and_return_pendings_reports_sources() {
    let (wallet, ledger) = setup();
    let account = wallet.new_account(None).await.unwrap();
    let small = ledger.add_pending(account.address(), Raw::new(5));
    let large = ledger.add_pending(account.address(), Raw::new(500));

    let received = account.receive_and_return_pendings(Raw::new(100)).await.unwrap();
    assert_eq!(received.keys().copied().collect::<Vec<_>>(), vec![large]);
    assert!(ledger.pending_for(account.address()).contains_key(&small));
}

#[tokio::test]
async fn wallet_receive_honours_min_amount_across_accounts() {
    let (wallet, ledger) = setup();
    let a = wallet.new_account(None).await.unwrap();
    let b = wallet.new_account(None).await.unwrap();
    ledger.add_pending(a.address(), Raw::new(5));
    ledger.add_pending(a.address(), Raw::new(200));
    ledger.add_pending(b.address(), Raw::new(300));

    let hashes = wallet.receive_pendings(Raw::new(100)).await.unwrap();
    assert_eq!(hashes.len(), 2);
    assert_eq!(ledger.balance(a.address()), Raw::new(200));
    assert_eq!(ledger.balance(b.address()), Raw::new(300));
    assert_eq!(ledger.pending_for(a.address()).len(), 1);
}

#[tokio::test]
async fn send_blocks_chain_offline() {
    let (wallet, ledger) = setup();
    let account = funded(&wallet, &ledger, 1000).await;
    let frontier = ledger.frontier(account.address()).unwrap();
    let destinations = vec![
        SendDestination { account: address_at(1), amount: Raw::new(100) },
        SendDestination { account: address_at(2), amount: Raw::new(200) },
        SendDestination { account: address_at(3), amount: Raw::new(300) },
    ];

    let blocks = account.send_blocks(&destinations).await.unwrap();
    assert_eq!(blocks[0].previous, frontier);
    assert_eq!(blocks[1].previous, hash_state_block(&blocks[0]).unwrap());
    assert_eq!(blocks[2].previous, hash_state_block(&blocks[1]).unwrap());
    let balances: Vec<Raw> = blocks.iter().map(|b| b.balance).collect();
    assert_eq!(balances, vec![Raw::new(900), Raw::new(700), Raw::new(400)]);
    assert!(blocks.iter().all(|b| b.signature.is_some() && b.work.is_none()));
    assert!(ledger.processed().is_empty());
}

#[tokio::test]
async fn send_blocks_overdraw_anywhere_in_the_chain_fails() {
    let (wallet, ledger) = setup();
    let account = funded(&wallet, &ledger, 250).await;
    let destinations = vec![
        SendDestination { account: address_at(1), amount: Raw::new(200) },
        SendDestination { account: address_at(2), amount: Raw::new(100) },
    ];
    let err = account.send_blocks(&destinations).await.unwrap_err();
    assert!(matches!(err, WalletError::InsufficientFunds { .. }));
}

#[tokio::test]
async fn send_multiple_submits_the_whole_chain() {
    let (wallet, ledger) = setup();
    let account = funded(&wallet, &ledger, 1000).await;
    let destinations: Vec<SendDestination> = (1..=4)
        .map(|i| SendDestination { account: address_at(i), amount: Raw::new(100) })
        .collect();

    let hashes = account.send_multiple(&destinations).await.unwrap();
    assert_eq!(hashes.len(), 4);
    let processed = ledger.processed();
    assert_eq!(processed.iter().map(|p| p.hash).collect::<Vec<_>>(), hashes);
    assert_eq!(ledger.balance(account.address()), Raw::new(600));
    assert_eq!(ledger.pending_for(&address_at(3)).len(), 1);
}

#[tokio::test]
async fn send_multiple_stops_at_first_failure() {
    let (wallet, ledger) = setup();
    let account = funded(&wallet, &ledger, 1000).await;
    let destinations: Vec<SendDestination> = (1..=3)
        .map(|i| SendDestination { account: address_at(i), amount: Raw::new(100) })
        .collect();
    ledger.fail_process_after(1);

    let err = account.send_multiple(&destinations).await.unwrap_err();
    assert!(matches!(err, WalletError::Ledger(_)));
    assert_eq!(ledger.processed().len(), 1);
    assert_eq!(ledger.balance(account.address()), Raw::new(900));
}

#[tokio::test]
async fn send_multiple_stops_when_work_fails() {
    let ledger = NullLedger::new(Network::Nano, EASY, EASY);
    let local = NullWork::new();
    local.fail_after(1);
    let work = WorkPolicy::new(None, EASY, EASY).with_local_source(Arc::new(local.clone()));
    let wallet = Wallet::with_work_policy(
        Box::new(SeedSigner::new(Seed::from(SEED), Derivation::Legacy)),
        &config(Network::Nano),
        ledger.clone(),
        work,
    )
    .unwrap();
    let account = funded(&wallet, &ledger, 1000).await;
    let destinations: Vec<SendDestination> = (1..=3)
        .map(|i| SendDestination { account: address_at(i), amount: Raw::new(100) })
        .collect();

    let err = account.send_multiple(&destinations).await.unwrap_err();
    assert!(matches!(err, WalletError::Work(WorkError::Cancelled)));
    let processed = ledger.processed();
    assert_eq!(processed.len(), 1);
    assert_eq!(processed[0].block.link, BlockHash::from(decode_address(address_at(1).as_str()).unwrap()));
    assert_eq!(ledger.balance(account.address()), Raw::new(900));
    assert_eq!(local.outcomes().len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_new_account_takes_distinct_indices() {
    let (wallet, _ledger) = setup();
    let wallet = Arc::new(wallet);
    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..16 {
        let wallet = Arc::clone(&wallet);
        tasks.spawn(async move { wallet.new_account(None).await.unwrap().index() });
    }

    let mut indices = HashSet::new();
    while let Some(index) = tasks.join_next().await {
        assert!(indices.insert(index.unwrap()));
    }
    assert_eq!(indices, (0..16).collect::<HashSet<u32>>());
    assert_eq!(wallet.next_index().await, 16);
    assert_eq!(wallet.get_accounts().await.len(), 16);
}

#[tokio::test]
async fn send_multiple_with_no_destinations_is_a_no_op() {
    let (wallet, ledger) = setup();
    let account = funded(&wallet, &ledger, 1000).await;
    assert!(account.send_multiple(&[]).await.unwrap().is_empty());
    assert!(ledger.processed().is_empty());
}

#[tokio::test]
async fn change_rep_submits_and_updates_cache() {
    let (wallet, ledger) = setup();
    let account = funded(&wallet, &ledger, 1000).await;
    let frontier = ledger.frontier(account.address()).unwrap();
    let new_rep = address_at(9);

    let hash = account.change_rep(new_rep.as_str()).await.unwrap();
    assert_eq!(account.representative(), Some(new_rep.clone()));

    let change = &ledger.processed()[0];
    assert_eq!(change.hash, hash);
    assert_eq!(change.subtype, ProcessSubtype::Change);
    assert_eq!(change.block.previous, frontier);
    assert_eq!(change.block.link, BlockHash::ZERO);
    assert_eq!(change.block.balance, Raw::new(1000));
    assert_eq!(change.block.representative, new_rep);
}

#[tokio::test]
async fn rejected_change_rep_keeps_cache() {
    let (wallet, ledger) = setup();
    let account = funded(&wallet, &ledger, 1000).await;
    ledger.fail_process_after(0);

    assert!(account.change_rep(address_at(9).as_str()).await.is_err());
    assert_ne!(account.representative(), Some(address_at(9)));
    assert!(ledger.processed().is_empty());
}

#[tokio::test]
async fn set_rep_validates_and_applies_to_later_blocks() {
    let (wallet, ledger) = setup();
    let account = wallet.new_account(None).await.unwrap();
    assert!(matches!(
        account.set_rep("nano_invalid"),
        Err(WalletError::InvalidAddress(_))
    ));
    assert!(account.representative().is_none());

    account.set_rep(REP).unwrap();
    ledger.add_pending(account.address(), Raw::new(1));
    account.receive_pendings(Raw::ZERO).await.unwrap();
    assert_eq!(ledger.processed()[0].block.representative.as_str(), REP);
    assert!(ledger.processed().iter().all(|p| p.subtype == ProcessSubtype::Receive));
}

#[tokio::test]
async fn scan_with_nothing_used_keeps_nothing() {
    let (wallet, _ledger) = setup();
    wallet.scan_for_accounts().await.unwrap();
    assert!(wallet.get_accounts().await.is_empty());
    assert_eq!(wallet.next_index().await, 0);
}

#[tokio::test]
async fn scan_stops_early_in_batch() {
    let (wallet, ledger) = setup();
    ledger.open_account(&address_at(3), Raw::new(1), &Address::new(REP));
    wallet.scan_for_accounts().await.unwrap();

    let mut indices: Vec<u32> = wallet.get_accounts().await.iter().map(|a| a.index()).collect();
    indices.sort_unstable();
    assert_eq!(indices, vec![0, 1, 2, 3]);
    assert_eq!(wallet.next_index().await, 4);
}

#[tokio::test]
async fn scan_keeps_pending_account_and_checks_another_batch() {
    let (wallet, ledger) = setup();
    ledger.add_pending(&address_at(7), Raw::new(1));
    wallet.scan_for_accounts().await.unwrap();

    let mut indices: Vec<u32> = wallet.get_accounts().await.iter().map(|a| a.index()).collect();
    indices.sort_unstable();
    assert_eq!(indices, (0..=7).collect::<Vec<_>>());
    assert_eq!(wallet.next_index().await, 8);
}

#[tokio::test]
async fn scan_follows_usage_across_batches() {
    let (wallet, ledger) = setup();
    ledger.open_account(&address_at(8), Raw::new(1), &Address::new(REP));
    ledger.open_account(&address_at(12), Raw::new(1), &Address::new(REP));
    wallet.scan_for_accounts().await.unwrap();

    assert_eq!(wallet.next_index().await, 13);
    assert!(wallet.get_account(&address_at(12)).await.is_some());
    assert!(wallet.get_account(&address_at(13)).await.is_none());
}

#[tokio::test]
async fn remote_work_is_requested_and_used() {
    let ledger = NullLedger::new(Network::Nano, EASY, EASY);
    let work_server = NullLedger::new(Network::Nano, EASY, EASY);
    work_server.set_remote_work(RemoteWork::Generate);
    let wallet = Wallet::new(
        Seed::from(SEED),
        &config(Network::Nano),
        ledger.clone(),
        Some(work_server.clone()),
    )
    .unwrap();
    let account = wallet.new_account(None).await.unwrap();
    ledger.add_pending(account.address(), Raw::new(42));

    account.receive_pendings(Raw::ZERO).await.unwrap();
    assert_eq!(work_server.work_requests(), vec![BlockHash::from(*account.public_key())]);
    assert_eq!(ledger.balance(account.address()), Raw::new(42));
}

#[tokio::test]
async fn unreachable_work_server_falls_back_to_local() {
    let ledger = NullLedger::new(Network::Nano, EASY, EASY);
    let work_server = NullLedger::new(Network::Nano, EASY, EASY);
    let wallet = Wallet::new(
        Seed::from(SEED),
        &config(Network::Nano),
        ledger.clone(),
        Some(work_server.clone()),
    )
    .unwrap();
    let account = funded(&wallet, &ledger, 10).await;

    account.send(REP, Raw::new(1)).await.unwrap();
    assert_eq!(work_server.work_requests().len(), 1);
    assert_eq!(ledger.processed().len(), 1);
}

#[tokio::test]
async fn banano_wallet_uses_its_prefix_and_representative() {
    let ledger = NullLedger::new(Network::Banano, EASY, EASY);
    let wallet = Wallet::new(Seed::from(SEED), &config(Network::Banano), ledger.clone(), None).unwrap();
    let account = wallet.new_account(None).await.unwrap();
    assert!(account.address().as_str().starts_with("ban_"));

    ledger.add_pending(account.address(), Raw::new(1));
    account.receive_pendings(Raw::ZERO).await.unwrap();
    assert!(ledger.processed()[0]
        .block
        .representative
        .as_str()
        .starts_with("ban_"));
}

#[tokio::test]
async fn mnemonic_wallets_are_reproducible() {
    let phrase = lattice_crypto::generate_mnemonic().unwrap();
    let ledger = NullLedger::new(Network::Nano, EASY, EASY);
    let cfg = config(Network::Nano);

    let a = Wallet::from_mnemonic(&phrase, "pw", &cfg, ledger.clone(), None).unwrap();
    let b = Wallet::from_mnemonic(&phrase, "pw", &cfg, ledger.clone(), None).unwrap();
    let c = Wallet::from_mnemonic(&phrase, "other", &cfg, ledger, None).unwrap();

    let a0 = a.new_account(Some(3)).await.unwrap();
    let b0 = b.new_account(Some(3)).await.unwrap();
    let c0 = c.new_account(Some(3)).await.unwrap();
    assert_eq!(a0.address(), b0.address());
    assert_ne!(a0.address(), c0.address());
}

#[tokio::test]
async fn balance_passthrough() {
    let (wallet, ledger) = setup();
    let account = funded(&wallet, &ledger, 77).await;
    ledger.add_pending(account.address(), Raw::new(3));
    assert_eq!(account.balance().await.unwrap(), (Raw::new(77), Raw::new(3)));
}
