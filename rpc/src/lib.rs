//! Ledger node client.
//!
//! The wallet talks to a node through the [`LedgerClient`] trait:
//! - account balances, info and frontiers
//! - pending (receivable) entries above a threshold
//! - block lookup by hash
//! - block submission with a subtype tag
//! - optional remote proof-of-work
//!
//! [`RpcClient`] implements it over the node's JSON-RPC HTTP interface.

pub mod client;
pub mod error;
pub mod http;
pub mod types;

pub use client::LedgerClient;
pub use error::RpcError;
pub use http::RpcClient;
pub use types::{AccountBalance, AccountInfo, BlockInfo, Pending, PendingMap};
