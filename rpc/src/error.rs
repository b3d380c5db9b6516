//! RPC error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("node error: {0}")]
    Node(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("service unavailable: {0}")]
    Unavailable(String),
}

impl From<serde_json::Error> for RpcError {
    fn from(e: serde_json::Error) -> Self {
        RpcError::InvalidResponse(e.to_string())
    }
}
