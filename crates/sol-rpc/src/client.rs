//! Ledger client trait and its HTTP JSON-RPC implementation.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, info, instrument};

use chain_sol::{Address, Balance};

use crate::config::RpcConfig;
use crate::error::LedgerError;
use crate::types::{
    BlockhashValue, LatestBlockhash, RpcRequest, RpcResponse, SendResult, SignatureStatus,
    WithContext,
};

/// Longest HTTP error body kept in [`LedgerError::HttpStatus`].
const MAX_ERROR_BODY: usize = 256;

/// Remote ledger operations.
///
/// Implementations hold no secret material and must be safe to share across
/// tasks. Each call is a single round trip with no retry.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Current balance of `address`. Accounts that do not exist yet have a
    /// zero balance, not an error.
    async fn get_balance(&self, address: &Address) -> Result<Balance, LedgerError>;

    /// A fresh blockhash for building one transaction.
    async fn get_latest_blockhash(&self) -> Result<LatestBlockhash, LedgerError>;

    /// Submit a fully signed wire transaction and return its signature.
    ///
    /// Not safe to retry blindly: check [`LedgerClient::get_signature_status`]
    /// first or the transfer may land twice.
    async fn submit_transaction(&self, signed_tx: &[u8]) -> Result<String, LedgerError>;

    /// Status of a previously submitted transaction, `None` if the ledger
    /// has not seen it.
    async fn get_signature_status(
        &self,
        signature: &str,
    ) -> Result<Option<SignatureStatus>, LedgerError>;
}

/// [`LedgerClient`] over Solana's HTTP JSON-RPC API.
pub struct HttpLedgerClient {
    config: RpcConfig,
    http_client: reqwest::Client,
    next_id: AtomicU64,
}

impl HttpLedgerClient {
    /// Creates a client for the configured endpoint.
    pub fn new(config: RpcConfig) -> Result<Self, LedgerError> {
        config.validate()?;

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LedgerError::InvalidConfig(format!("HTTP client: {e}")))?;

        Ok(Self {
            config,
            http_client,
            next_id: AtomicU64::new(1),
        })
    }

    /// Makes one JSON-RPC call and decodes its `result`.
    async fn rpc_call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T, LedgerError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest::new(id, method, params);
        debug!(method, id, "RPC request");

        let response = self
            .http_client
            .post(&self.config.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            // Some gateways pair a JSON-RPC error object with a 4xx/5xx status.
            let parsed: Result<RpcResponse<serde_json::Value>, _> = serde_json::from_str(&body);
            if let Ok(RpcResponse {
                error: Some(error), ..
            }) = parsed
            {
                return Err(error.into());
            }
            debug!(method, status = status.as_u16(), "RPC HTTP error");
            return Err(LedgerError::HttpStatus {
                status: status.as_u16(),
                body: truncate(body),
            });
        }

        let parsed: RpcResponse<T> = serde_json::from_str(&body)
            .map_err(|e| LedgerError::Malformed(format!("{method}: {e}")))?;

        match parsed {
            RpcResponse {
                error: Some(error), ..
            } => {
                let error = LedgerError::from(error);
                debug!(method, %error, "RPC error");
                Err(error)
            }
            RpcResponse {
                result: Some(result),
                ..
            } => Ok(result),
            RpcResponse { .. } => Err(LedgerError::Malformed(format!(
                "{method}: response has neither result nor error"
            ))),
        }
    }

    fn transport_error(&self, e: reqwest::Error) -> LedgerError {
        if e.is_timeout() {
            LedgerError::Timeout(self.config.timeout)
        } else {
            // The endpoint URL may embed an API key.
            LedgerError::Transport(e.without_url().to_string())
        }
    }
}

#[async_trait]
impl LedgerClient for HttpLedgerClient {
    #[instrument(skip(self))]
    async fn get_balance(&self, address: &Address) -> Result<Balance, LedgerError> {
        let response: WithContext<Option<u64>> = self
            .rpc_call(
                "getBalance",
                json!([address.to_string(), { "commitment": self.config.commitment }]),
            )
            .await?;

        let balance = Balance::from_lamports(response.value.unwrap_or(0));
        debug!(lamports = balance.lamports(), "balance");
        Ok(balance)
    }

    #[instrument(skip(self))]
    async fn get_latest_blockhash(&self) -> Result<LatestBlockhash, LedgerError> {
        let response: WithContext<BlockhashValue> = self
            .rpc_call(
                "getLatestBlockhash",
                json!([{ "commitment": self.config.commitment }]),
            )
            .await?;

        response.value.try_into()
    }

    #[instrument(skip(self, signed_tx), fields(len = signed_tx.len()))]
    async fn submit_transaction(&self, signed_tx: &[u8]) -> Result<String, LedgerError> {
        let encoded = BASE64.encode(signed_tx);
        let response: SendResult = self
            .rpc_call(
                "sendTransaction",
                json!([
                    encoded,
                    {
                        "encoding": "base64",
                        "preflightCommitment": self.config.commitment,
                    }
                ]),
            )
            .await?;

        let signature = response.into_signature();
        info!(%signature, "transaction submitted");
        Ok(signature)
    }

    #[instrument(skip(self))]
    async fn get_signature_status(
        &self,
        signature: &str,
    ) -> Result<Option<SignatureStatus>, LedgerError> {
        let response: WithContext<Vec<Option<SignatureStatus>>> = self
            .rpc_call(
                "getSignatureStatuses",
                json!([[signature], { "searchTransactionHistory": true }]),
            )
            .await?;

        Ok(response.value.into_iter().next().flatten())
    }
}

fn truncate(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY {
        let mut end = MAX_ERROR_BODY;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body.truncate(end);
    }
    body
}
