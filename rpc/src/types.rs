//! Typed views of node responses.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};

use lattice_types::{Address, BlockHash, Raw};

/// Confirmed and pending balance of one account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct AccountBalance {
    pub balance: Raw,
    #[serde(alias = "receivable")]
    pub pending: Raw,
}

/// Chain state of an opened account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AccountInfo {
    /// Hash of the latest block in the account chain.
    pub frontier: BlockHash,
    pub balance: Raw,
    /// Present when the node was asked to include it.
    #[serde(default)]
    pub representative: Option<Address>,
    #[serde(default, deserialize_with = "u64_from_str")]
    pub block_count: u64,
}

/// One receivable entry, keyed by its source block hash in a [`PendingMap`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Pending {
    pub amount: Raw,
    #[serde(default)]
    pub source: Option<Address>,
}

/// Receivable entries of one account, ordered by source block hash.
pub type PendingMap = BTreeMap<BlockHash, Pending>;

/// Summary of a block looked up by hash.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BlockInfo {
    pub block_account: Address,
    /// Amount moved by the block.
    pub amount: Raw,
    pub balance: Raw,
}

/// Nodes encode integers as decimal strings; accept bare numbers as well.
fn u64_from_str<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Num(u64),
        Str(String),
    }

    match Repr::deserialize(deserializer)? {
        Repr::Num(n) => Ok(n),
        Repr::Str(s) => s.parse().map_err(serde::de::Error::custom),
    }
}
