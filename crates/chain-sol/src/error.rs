use thiserror::Error;

/// Solana primitive errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SolError {
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid blockhash: {0}")]
    InvalidBlockhash(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("amount not representable in lamports: {0}")]
    AmountPrecision(String),

    #[error("transaction build error: {0}")]
    TransactionBuildError(String),

    #[error("signature verification failed: {0}")]
    SignatureMismatch(String),

    #[error("serialization error: {0}")]
    SerializationError(String),
}
