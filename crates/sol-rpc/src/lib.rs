//! JSON-RPC access to a Solana ledger.
//!
//! [`LedgerClient`] is the seam the transfer logic talks to;
//! [`HttpLedgerClient`] implements it over HTTP with `reqwest`. Calls are
//! never retried here: balance and blockhash reads are safe for the caller
//! to retry, transaction submission is not.

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::{HttpLedgerClient, LedgerClient};
pub use config::{Cluster, Commitment, RpcConfig};
pub use error::LedgerError;
pub use types::{LatestBlockhash, SignatureStatus};
