//! Wallet operations on top of `chain-sol` and `sol-rpc`.
//!
//! [`WalletClient`] takes strings from a front end (encoded keys, base58
//! addresses, SOL amounts) and returns typed results. [`TransferService`]
//! runs the transfer flow against any [`LedgerClient`], which is how tests
//! drive it without a node.

pub mod error;
pub mod transfer;
pub mod wallet;

pub use error::{ErrorKind, WalletError};
pub use transfer::{
    TransferFailure, TransferOptions, TransferReceipt, TransferRequest, TransferResult,
    TransferService,
};
pub use wallet::{generate_wallet, GeneratedWallet, WalletClient};

pub use chain_sol::{Address, Balance, EncodedPrivateKey, Keypair, MessageVersion};
pub use sol_rpc::{Cluster, Commitment, LedgerClient, RpcConfig, SignatureStatus};
