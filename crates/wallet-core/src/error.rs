use std::time::Duration;

use thiserror::Error;

use chain_sol::{Balance, SolError};
use sol_rpc::LedgerError;

/// Machine-distinguishable failure categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidKey,
    AddressParse,
    InvalidAmount,
    AmountPrecision,
    InsufficientFunds,
    Network,
    Timeout,
    Rpc,
    Encoding,
    Config,
    Cancelled,
}

impl ErrorKind {
    /// Whether repeating a read (balance, blockhash, status) may help.
    ///
    /// Submissions are judged by [`crate::TransferFailure::is_retry_safe`].
    pub fn is_retry_safe(self) -> bool {
        matches!(self, ErrorKind::Network | ErrorKind::Timeout | ErrorKind::Rpc)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WalletError {
    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    #[error("Invalid address: {0}")]
    AddressParse(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Amount not representable in lamports: {0}")]
    AmountPrecision(String),

    #[error("Insufficient funds: balance is {balance}, tried to send {requested}")]
    InsufficientFunds { balance: Balance, requested: Balance },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("RPC error: {message}")]
    Rpc { code: Option<i64>, message: String },

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cancelled before submission")]
    Cancelled,
}

impl WalletError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WalletError::InvalidKey(_) => ErrorKind::InvalidKey,
            WalletError::AddressParse(_) => ErrorKind::AddressParse,
            WalletError::InvalidAmount(_) => ErrorKind::InvalidAmount,
            WalletError::AmountPrecision(_) => ErrorKind::AmountPrecision,
            WalletError::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            WalletError::Network(_) => ErrorKind::Network,
            WalletError::Timeout(_) => ErrorKind::Timeout,
            WalletError::Rpc { .. } => ErrorKind::Rpc,
            WalletError::Encoding(_) => ErrorKind::Encoding,
            WalletError::Config(_) => ErrorKind::Config,
            WalletError::Cancelled => ErrorKind::Cancelled,
        }
    }
}

impl From<SolError> for WalletError {
    fn from(e: SolError) -> Self {
        match e {
            SolError::InvalidPrivateKey(msg) => WalletError::InvalidKey(msg),
            SolError::InvalidAddress(msg) => WalletError::AddressParse(msg),
            SolError::InvalidAmount(msg) => WalletError::InvalidAmount(msg),
            SolError::AmountPrecision(msg) => WalletError::AmountPrecision(msg),
            // Blockhashes only ever come from the ledger.
            SolError::InvalidBlockhash(msg) => WalletError::Rpc {
                code: None,
                message: format!("invalid blockhash: {msg}"),
            },
            other => WalletError::Encoding(other.to_string()),
        }
    }
}

impl From<LedgerError> for WalletError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::Transport(msg) => WalletError::Network(msg),
            LedgerError::Timeout(after) => WalletError::Timeout(after),
            LedgerError::Rpc { code, message } => WalletError::Rpc {
                code: Some(code),
                message,
            },
            e @ (LedgerError::HttpStatus { .. } | LedgerError::Malformed(_)) => WalletError::Rpc {
                code: None,
                message: e.to_string(),
            },
            LedgerError::InvalidConfig(msg) => WalletError::Config(msg),
        }
    }
}
