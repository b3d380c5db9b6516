//! Nullable infrastructure for deterministic testing.
//!
//! Provides an in-memory ledger that speaks the same [`LedgerClient`] interface as a
//! real node, so wallet logic can be exercised end to end without a network:
//! - submitted blocks are checked for chain linkage, signature and work
//! - sends create receivable entries, receives consume them
//! - failures and remote work behaviour can be scripted
//! - local work searches can be observed and made to fail
//!
//! [`LedgerClient`]: lattice_rpc::LedgerClient

pub mod ledger;
pub mod work;

pub use ledger::{NullLedger, ProcessedBlock, RemoteWork};
pub use work::NullWork;
