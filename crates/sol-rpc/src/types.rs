//! JSON-RPC 2.0 envelopes and Solana response payloads.

use serde::{Deserialize, Serialize};

use chain_sol::Blockhash;

use crate::config::Commitment;
use crate::error::LedgerError;

/// Outgoing JSON-RPC request.
#[derive(Debug, Serialize)]
pub(crate) struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: serde_json::Value,
}

impl<'a> RpcRequest<'a> {
    pub(crate) fn new(id: u64, method: &'a str, params: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method,
            params,
        }
    }
}

/// Incoming JSON-RPC response. Exactly one of the two fields is expected.
#[derive(Debug, Deserialize)]
pub(crate) struct RpcResponse<T> {
    pub result: Option<T>,
    pub error: Option<RpcErrorBody>,
}

/// The `error` member. Nodes send `{code, message}`; some proxies send a
/// bare string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RpcErrorBody {
    Object {
        #[serde(default)]
        code: i64,
        message: String,
    },
    Text(String),
}

impl From<RpcErrorBody> for LedgerError {
    fn from(body: RpcErrorBody) -> Self {
        match body {
            RpcErrorBody::Object { code, message } => LedgerError::Rpc { code, message },
            RpcErrorBody::Text(message) => LedgerError::Rpc { code: 0, message },
        }
    }
}

/// `{ context, value }` wrapper used by most Solana read methods.
#[derive(Debug, Deserialize)]
pub(crate) struct WithContext<T> {
    pub value: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BlockhashValue {
    pub blockhash: String,
    #[serde(default)]
    pub last_valid_block_height: u64,
}

/// `sendTransaction` returns the signature directly; tolerate a wrapped form.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum SendResult {
    Plain(String),
    Wrapped { value: String },
}

impl SendResult {
    pub(crate) fn into_signature(self) -> String {
        match self {
            SendResult::Plain(sig) | SendResult::Wrapped { value: sig } => sig,
        }
    }
}

/// A fresh blockhash and the last block height at which it is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatestBlockhash {
    pub blockhash: Blockhash,
    pub last_valid_block_height: u64,
}

impl TryFrom<BlockhashValue> for LatestBlockhash {
    type Error = LedgerError;

    fn try_from(value: BlockhashValue) -> Result<Self, Self::Error> {
        let blockhash = value
            .blockhash
            .parse()
            .map_err(|e| LedgerError::Malformed(format!("getLatestBlockhash: {e}")))?;
        Ok(Self {
            blockhash,
            last_valid_block_height: value.last_valid_block_height,
        })
    }
}

/// Processing status of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureStatus {
    pub slot: u64,
    /// `None` once the block is rooted.
    pub confirmations: Option<u64>,
    /// Execution error, if the transaction failed on-chain.
    pub err: Option<serde_json::Value>,
    pub confirmation_status: Option<Commitment>,
}

impl SignatureStatus {
    /// Landed without an execution error.
    pub fn is_success(&self) -> bool {
        self.err.is_none()
    }

    pub fn is_finalized(&self) -> bool {
        self.confirmation_status == Some(Commitment::Finalized)
    }
}
