//! SOL transfers: validate, pre-check balance, build, sign, submit.
//!
//! The balance pre-check is best-effort. The balance can change between the
//! check and submission, and the ledger stays authoritative; a transfer that
//! passes here can still be rejected with an RPC error.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, instrument, warn};

use chain_sol::{
    build_sol_transfer, sol_to_lamports, sign_transaction, Address, Balance, Keypair,
    MessageVersion,
};
use sol_rpc::{LedgerClient, LedgerError};

use crate::error::{ErrorKind, WalletError};

/// A request to move `amount` SOL from `sender` to `recipient`.
#[derive(Debug)]
pub struct TransferRequest {
    pub sender: Keypair,
    pub recipient: Address,
    /// Whole SOL, must be positive.
    pub amount: f64,
}

impl TransferRequest {
    pub fn new(sender: Keypair, recipient: Address, amount: f64) -> Self {
        Self {
            sender,
            recipient,
            amount,
        }
    }
}

/// A transfer the ledger accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    /// Transaction signature returned by the ledger.
    pub signature: String,
    pub recipient: Address,
    pub lamports: u64,
}

/// A transfer that did not go through, or whose outcome is unknown.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{error}")]
pub struct TransferFailure {
    pub error: WalletError,
    /// Set once submission was attempted: the signature the transaction
    /// would land under. Look it up before sending again.
    pub pending_signature: Option<String>,
}

impl TransferFailure {
    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }

    pub fn message(&self) -> String {
        self.error.to_string()
    }

    /// A fresh `send` cannot double-spend and may succeed.
    pub fn is_retry_safe(&self) -> bool {
        self.pending_signature.is_none() && self.kind().is_retry_safe()
    }
}

impl From<WalletError> for TransferFailure {
    fn from(error: WalletError) -> Self {
        Self {
            error,
            pending_signature: None,
        }
    }
}

pub type TransferResult = Result<TransferReceipt, TransferFailure>;

/// Tuning for [`TransferService`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferOptions {
    /// Deadline applied to each ledger call on top of the transport timeout.
    pub timeout: Option<Duration>,
    pub message_version: MessageVersion,
}

/// Orchestrates a single transfer against a [`LedgerClient`].
///
/// Holds no per-transfer state, so one service can run any number of
/// concurrent `send` calls.
pub struct TransferService<L: ?Sized> {
    ledger: Arc<L>,
    options: TransferOptions,
}

impl<L: LedgerClient + ?Sized> TransferService<L> {
    pub fn new(ledger: Arc<L>) -> Self {
        Self::with_options(ledger, TransferOptions::default())
    }

    pub fn with_options(ledger: Arc<L>, options: TransferOptions) -> Self {
        Self { ledger, options }
    }

    pub fn options(&self) -> &TransferOptions {
        &self.options
    }

    /// Send a transfer.
    pub async fn send(&self, request: TransferRequest) -> TransferResult {
        self.send_with_cancel(request, std::future::pending()).await
    }

    /// Send a transfer, giving up if `cancel` resolves before submission.
    ///
    /// Cancellation is checked during the balance and blockhash steps. Once
    /// the transaction is handed to the ledger it is not interrupted.
    #[instrument(
        skip_all,
        fields(from = %request.sender.pubkey(), to = %request.recipient, amount = request.amount)
    )]
    pub async fn send_with_cancel<C>(&self, request: TransferRequest, cancel: C) -> TransferResult
    where
        C: Future<Output = ()> + Send,
    {
        let TransferRequest {
            sender,
            recipient,
            amount,
        } = request;

        let lamports = amount_to_lamports(amount)?;
        let from = sender.pubkey();

        tokio::pin!(cancel);

        let balance = self
            .step(self.ledger.get_balance(&from), cancel.as_mut())
            .await?;
        if balance.lamports() < lamports {
            warn!(balance = balance.lamports(), lamports, "insufficient funds");
            return Err(WalletError::InsufficientFunds {
                balance,
                requested: Balance::from_lamports(lamports),
            }
            .into());
        }

        let latest = self
            .step(self.ledger.get_latest_blockhash(), cancel.as_mut())
            .await?;

        let tx = build_sol_transfer(&from, &recipient, lamports, &latest.blockhash)
            .map_err(WalletError::from)?;
        let signed = sign_transaction(&tx, self.options.message_version, &sender)
            .map_err(WalletError::from)?;
        drop(sender);

        let pending = signed.signature();
        match with_timeout(self.options.timeout, self.ledger.submit_transaction(signed.wire())).await
        {
            Ok(signature) => {
                if signature != pending {
                    warn!(%signature, expected = %pending, "ledger returned a different signature");
                }
                info!(%signature, lamports, "transfer submitted");
                Ok(TransferReceipt {
                    signature,
                    recipient,
                    lamports,
                })
            }
            Err(error) => {
                warn!(%error, signature = %pending, "submission failed");
                Err(TransferFailure {
                    error,
                    pending_signature: Some(pending),
                })
            }
        }
    }

    async fn step<T, F, C>(&self, call: F, cancel: Pin<&mut C>) -> Result<T, WalletError>
    where
        F: Future<Output = Result<T, LedgerError>>,
        C: Future<Output = ()>,
    {
        tokio::select! {
            biased;
            _ = cancel => Err(WalletError::Cancelled),
            result = with_timeout(self.options.timeout, call) => result,
        }
    }
}

/// Await a ledger call, bounded by `limit` when set.
pub(crate) async fn with_timeout<T, F>(limit: Option<Duration>, call: F) -> Result<T, WalletError>
where
    F: Future<Output = Result<T, LedgerError>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .map_err(|_| WalletError::Timeout(limit))?
            .map_err(WalletError::from),
        None => call.await.map_err(WalletError::from),
    }
}

/// The one place a floating-point amount becomes lamports.
fn amount_to_lamports(amount: f64) -> Result<u64, WalletError> {
    let lamports = sol_to_lamports(amount)?;
    if lamports == 0 {
        return Err(WalletError::AmountPrecision(format!(
            "{amount} SOL rounds to zero lamports"
        )));
    }
    Ok(lamports)
}
