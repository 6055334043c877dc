//! Solana primitives for the wallet client.
//!
//! Key management, address and blockhash types, SOL/lamport conversion and
//! the transaction wire format, implemented by hand on top of
//! `ed25519-dalek` and `bs58` rather than `solana-sdk`.

pub mod address;
pub mod amount;
pub mod error;
pub mod keypair;
pub mod transaction;

// Re-export key public types for ergonomic imports.
pub use address::Address;
pub use amount::{
    format_sol, lamports_to_sol, parse_sol_amount, sol_to_lamports, Balance, LAMPORTS_PER_SOL,
};
pub use error::SolError;
pub use keypair::{decode, encode, generate, verify, EncodedPrivateKey, Keypair, SECRET_KEY_LEN};
pub use transaction::{
    build_sol_transfer, compile_transaction, decode_compact_u16, encode_compact_u16,
    serialize_message, sign_transaction, verify_transaction, Blockhash, CompiledInstruction,
    MessageVersion, SignedTransaction, SolAccountMeta, SolInstruction, SolTransaction,
    SYSTEM_PROGRAM_ID,
};
