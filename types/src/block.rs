//! State block: the single block format submitted to the ledger.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Address, BlockHash, Raw, Signature, WorkNonce};

/// A state block. Every block carries the account's full resulting state, so the
/// meaning of a block (send, receive, change) follows from comparing it with the
/// previous block and from `link`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateBlock {
    /// The account this block belongs to.
    pub account: Address,

    /// Hash of the previous block in this account's chain (zero for the first block).
    pub previous: BlockHash,

    /// The account's representative after this block.
    pub representative: Address,

    /// Balance after this block.
    pub balance: Raw,

    /// Link field:
    /// - send: destination public key
    /// - receive: source block hash
    /// - change: zero
    pub link: BlockHash,

    /// Signature over the canonical block hash. `None` until signed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<Signature>,

    /// Proof-of-work nonce. `None` until work has been attached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work: Option<WorkNonce>,
}

impl StateBlock {
    /// Whether this block opens its account chain.
    pub fn is_open(&self) -> bool {
        self.previous.is_zero()
    }
}

/// Subtype tag sent with a block on submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessSubtype {
    Send,
    Receive,
    Change,
}

impl ProcessSubtype {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Send => "send",
            Self::Receive => "receive",
            Self::Change => "change",
        }
    }
}

impl fmt::Display for ProcessSubtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
