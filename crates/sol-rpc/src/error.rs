use std::time::Duration;

use thiserror::Error;

/// Ledger RPC errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// The request never produced a response (DNS, refused, reset).
    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Structured JSON-RPC rejection from the node.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// Non-success HTTP status without a JSON-RPC error body.
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
