//! JSON-RPC over HTTP.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use lattice_types::{
    Address, BlockHash, ProcessSubtype, Raw, StateBlock, WorkDifficulty, WorkNonce,
};

use crate::{AccountBalance, AccountInfo, BlockInfo, LedgerClient, PendingMap, RpcError};

const ACCOUNT_NOT_FOUND: &str = "Account not found";

/// HTTP client for a node's JSON-RPC endpoint.
///
/// Wraps `reqwest::Client` with the node URL. Every request is a POST of a JSON
/// object carrying an `action` field.
#[derive(Clone)]
pub struct RpcClient {
    http: reqwest::Client,
    url: String,
}

impl RpcClient {
    /// Create a client targeting the given URL (e.g. `http://[::1]:7076`).
    pub fn new(url: impl Into<String>) -> Result<Self, RpcError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    /// Send a request and return the decoded body without interpreting it.
    async fn call(&self, action: &str, params: Value) -> Result<Value, RpcError> {
        let mut body = params;
        body.as_object_mut()
            .ok_or_else(|| RpcError::InvalidResponse("params must be a JSON object".into()))?
            .insert("action".to_string(), json!(action));

        debug!(action, url = %self.url, "rpc request");
        let response = self.http.post(&self.url).json(&body).send().await?;

        if !response.status().is_success() {
            return Err(RpcError::Unavailable(format!(
                "node returned HTTP {}",
                response.status()
            )));
        }

        Ok(response.json().await?)
    }

    /// Send a request, failing on a node-reported `error` field.
    async fn rpc_call(&self, action: &str, params: Value) -> Result<Value, RpcError> {
        let value = self.call(action, params).await?;
        check_error(value)
    }
}

impl LedgerClient for RpcClient {
    async fn account_balance(&self, account: &Address) -> Result<AccountBalance, RpcError> {
        let value = self
            .rpc_call("account_balance", json!({ "account": account }))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn accounts_balances(
        &self,
        accounts: &[Address],
    ) -> Result<HashMap<Address, AccountBalance>, RpcError> {
        let value = self
            .rpc_call("accounts_balances", json!({ "accounts": accounts }))
            .await?;
        parse_balances(value)
    }

    async fn account_info(&self, account: &Address) -> Result<Option<AccountInfo>, RpcError> {
        let value = self
            .call(
                "account_info",
                json!({ "account": account, "representative": true }),
            )
            .await?;
        parse_account_info(value)
    }

    async fn accounts_frontiers(
        &self,
        accounts: &[Address],
    ) -> Result<HashMap<Address, BlockHash>, RpcError> {
        let value = self
            .rpc_call("accounts_frontiers", json!({ "accounts": accounts }))
            .await?;
        parse_frontiers(value)
    }

    async fn accounts_pending(
        &self,
        accounts: &[Address],
        count: Option<u64>,
        threshold: Raw,
    ) -> Result<HashMap<Address, PendingMap>, RpcError> {
        let count = count.map_or(-1, |c| i64::try_from(c).unwrap_or(i64::MAX));
        let value = self
            .rpc_call(
                "accounts_pending",
                json!({
                    "accounts": accounts,
                    "count": count,
                    "threshold": threshold,
                    "source": true,
                }),
            )
            .await?;
        parse_pending(value)
    }

    async fn block_info(&self, hash: &BlockHash) -> Result<BlockInfo, RpcError> {
        let value = self
            .rpc_call("block_info", json!({ "hash": hash, "json_block": true }))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn process(
        &self,
        block: &StateBlock,
        subtype: ProcessSubtype,
    ) -> Result<BlockHash, RpcError> {
        let value = self
            .rpc_call(
                "process",
                json!({
                    "json_block": true,
                    "subtype": subtype,
                    "block": WireBlock::from(block),
                }),
            )
            .await?;
        let resp: HashResponse = serde_json::from_value(value)?;
        debug!(hash = %resp.hash, %subtype, "block processed");
        Ok(resp.hash)
    }

    async fn work_generate(
        &self,
        root: &BlockHash,
        difficulty: WorkDifficulty,
    ) -> Result<WorkNonce, RpcError> {
        let value = self
            .rpc_call(
                "work_generate",
                json!({ "hash": root, "difficulty": difficulty }),
            )
            .await?;
        let resp: WorkResponse = serde_json::from_value(value)?;
        Ok(resp.work)
    }
}

/// A state block as the node expects it inside `process`.
#[derive(Serialize)]
struct WireBlock<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(flatten)]
    block: &'a StateBlock,
}

impl<'a> From<&'a StateBlock> for WireBlock<'a> {
    fn from(block: &'a StateBlock) -> Self {
        Self { kind: "state", block }
    }
}

#[derive(Deserialize)]
struct HashResponse {
    hash: BlockHash,
}

#[derive(Deserialize)]
struct WorkResponse {
    work: WorkNonce,
}

/// Nodes send an empty string in place of an empty map.
#[derive(Deserialize)]
#[serde(untagged)]
enum OrEmpty<T> {
    Value(T),
    Empty(String),
}

impl<T: Default> OrEmpty<T> {
    fn into_value(self) -> T {
        match self {
            OrEmpty::Value(v) => v,
            OrEmpty::Empty(_) => T::default(),
        }
    }
}

fn node_error(value: &Value) -> Option<&str> {
    value.get("error").and_then(Value::as_str)
}

fn check_error(value: Value) -> Result<Value, RpcError> {
    match node_error(&value) {
        Some(err) => Err(RpcError::Node(err.to_string())),
        None => Ok(value),
    }
}

fn parse_account_info(value: Value) -> Result<Option<AccountInfo>, RpcError> {
    if node_error(&value) == Some(ACCOUNT_NOT_FOUND) {
        return Ok(None);
    }
    let value = check_error(value)?;
    Ok(Some(serde_json::from_value(value)?))
}

fn parse_balances(value: Value) -> Result<HashMap<Address, AccountBalance>, RpcError> {
    #[derive(Deserialize)]
    struct Resp {
        balances: OrEmpty<HashMap<Address, AccountBalance>>,
    }
    let resp: Resp = serde_json::from_value(value)?;
    Ok(resp.balances.into_value())
}

fn parse_frontiers(value: Value) -> Result<HashMap<Address, BlockHash>, RpcError> {
    #[derive(Deserialize)]
    struct Resp {
        #[serde(default)]
        frontiers: Option<OrEmpty<HashMap<Address, BlockHash>>>,
    }
    let resp: Resp = serde_json::from_value(value)?;
    Ok(resp.frontiers.map(OrEmpty::into_value).unwrap_or_default())
}

fn parse_pending(value: Value) -> Result<HashMap<Address, PendingMap>, RpcError> {
    #[derive(Deserialize)]
    struct Resp {
        #[serde(default)]
        blocks: Option<OrEmpty<HashMap<Address, OrEmpty<PendingMap>>>>,
    }
    let resp: Resp = serde_json::from_value(value)?;
    Ok(resp
        .blocks
        .map(OrEmpty::into_value)
        .unwrap_or_default()
        .into_iter()
        .map(|(account, pendings)| (account, pendings.into_value()))
        .collect())
}
