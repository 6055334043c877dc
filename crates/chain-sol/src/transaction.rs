//! Solana transaction wire format and signing.
//!
//! Transactions are built by hand, no `solana-sdk`. Layout:
//!
//! ```text
//! Transaction:
//!   num_signatures          compact-u16
//!   signatures              64 bytes * num_signatures
//!   message:
//!     [version prefix]      u8, 0x80 | version (v0 only)
//!     num_required_sigs     u8
//!     num_readonly_signed   u8
//!     num_readonly_unsigned u8
//!     num_accounts          compact-u16
//!     account_keys          32 bytes * num_accounts
//!     recent_blockhash      32 bytes
//!     num_instructions      compact-u16
//!     instructions[]        (see below)
//!     [num_lookups]         compact-u16 (v0 only, always 0 here)
//!
//! Instruction:
//!   program_id_index        u8
//!   num_accounts            compact-u16
//!   account_indices         u8 * num_accounts
//!   data_len                compact-u16
//!   data                    u8 * data_len
//! ```

use std::fmt;
use std::str::FromStr;

use crate::address::Address;
use crate::error::SolError;
use crate::keypair::{self, Keypair};

// ---------------------------------------------------------------------------
// Solana System Program
// ---------------------------------------------------------------------------

/// The Solana System Program public key: 32 zero bytes.
/// Base58: `11111111111111111111111111111111`
pub const SYSTEM_PROGRAM_ID: Address = Address::new([0u8; 32]);

/// System Program `Transfer` instruction index (little-endian u32).
const SYSTEM_TRANSFER_IX_INDEX: u32 = 2;

/// High bit set on the first message byte marks a versioned message.
const VERSION_PREFIX_MASK: u8 = 0x80;

// ---------------------------------------------------------------------------
// Blockhash
// ---------------------------------------------------------------------------

/// A recent blockhash, the anti-replay token every transaction must carry.
///
/// It expires after a ledger-defined number of blocks, so it is fetched per
/// transaction and never cached.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Blockhash([u8; 32]);

impl Blockhash {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl FromStr for Blockhash {
    type Err = SolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| SolError::InvalidBlockhash(format!("base58 decode failed: {e}")))?;
        let arr: [u8; 32] = bytes.try_into().map_err(|v: Vec<u8>| {
            SolError::InvalidBlockhash(format!("expected 32 bytes, got {}", v.len()))
        })?;
        Ok(Self(arr))
    }
}

impl fmt::Display for Blockhash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Blockhash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Blockhash({self})")
    }
}

// ---------------------------------------------------------------------------
// Compact-u16 encoding
// ---------------------------------------------------------------------------

/// Encode a `u16` value in Solana's compact-u16 format.
///
/// - Values 0..0x7f       -> 1 byte
/// - Values 0x80..0x3fff  -> 2 bytes
/// - Values 0x4000..      -> 3 bytes
pub fn encode_compact_u16(value: u16) -> Vec<u8> {
    let mut val = value as u32;
    let mut out = Vec::with_capacity(3);

    loop {
        let mut byte = (val & 0x7f) as u8;
        val >>= 7;
        if val > 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if val == 0 {
            break;
        }
    }

    out
}

/// Decode a compact-u16 value from a byte slice.
///
/// Returns `(value, bytes_consumed)` or an error if the data is truncated.
pub fn decode_compact_u16(data: &[u8]) -> Result<(u16, usize), SolError> {
    let mut value: u32 = 0;
    let mut consumed = 0usize;

    loop {
        let byte = *data.get(consumed).ok_or_else(|| {
            SolError::SerializationError("unexpected end of data while decoding compact-u16".into())
        })?;
        value |= ((byte & 0x7f) as u32) << (7 * consumed);
        consumed += 1;

        if byte & 0x80 == 0 || consumed >= 3 {
            break;
        }
    }

    if value > u16::MAX as u32 {
        return Err(SolError::SerializationError(
            "compact-u16 value overflow".into(),
        ));
    }

    Ok((value as u16, consumed))
}

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// Message encoding accepted by the ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MessageVersion {
    /// Unversioned message, the pre-v0 layout.
    Legacy,
    /// Versioned message v0 with an (empty) address-table-lookup list.
    #[default]
    V0,
}

/// A single account reference in a Solana instruction.
#[derive(Debug, Clone)]
pub struct SolAccountMeta {
    pub pubkey: Address,
    pub is_signer: bool,
    pub is_writable: bool,
}

/// A Solana instruction (before it is compiled into a transaction).
#[derive(Debug, Clone)]
pub struct SolInstruction {
    pub program_id: Address,
    pub accounts: Vec<SolAccountMeta>,
    pub data: Vec<u8>,
}

/// A compiled, unsigned Solana transaction message.
#[derive(Debug, Clone)]
pub struct SolTransaction {
    /// All account keys referenced by this transaction, in canonical order:
    ///   1. writable signers
    ///   2. read-only signers
    ///   3. writable non-signers
    ///   4. read-only non-signers
    pub account_keys: Vec<Address>,

    /// Number of required signatures (first N accounts are signers).
    pub num_required_signatures: u8,
    /// How many of the signing accounts are read-only.
    pub num_readonly_signed: u8,
    /// How many of the non-signing accounts are read-only.
    pub num_readonly_unsigned: u8,

    pub recent_blockhash: Blockhash,

    /// Compiled instructions (account references replaced with indices).
    pub compiled_instructions: Vec<CompiledInstruction>,
}

/// A compiled instruction where account references are replaced by u8 indices
/// into the transaction's `account_keys` array.
#[derive(Debug, Clone)]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    pub account_indices: Vec<u8>,
    pub data: Vec<u8>,
}

/// A fully signed transaction ready for `sendTransaction`.
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    wire: Vec<u8>,
    signature: [u8; 64],
}

impl SignedTransaction {
    /// Serialized wire bytes.
    pub fn wire(&self) -> &[u8] {
        &self.wire
    }

    pub fn into_wire(self) -> Vec<u8> {
        self.wire
    }

    /// The fee payer's signature, which is also the transaction id.
    pub fn signature(&self) -> String {
        bs58::encode(self.signature).into_string()
    }

    pub fn signature_bytes(&self) -> &[u8; 64] {
        &self.signature
    }
}

// ---------------------------------------------------------------------------
// Transaction building
// ---------------------------------------------------------------------------

/// Build a native SOL transfer transaction.
///
/// Creates a System Program `Transfer` instruction that moves `lamports`
/// from `from` to `to`, with `from` paying the fee.
pub fn build_sol_transfer(
    from: &Address,
    to: &Address,
    lamports: u64,
    recent_blockhash: &Blockhash,
) -> Result<SolTransaction, SolError> {
    if lamports == 0 {
        return Err(SolError::TransactionBuildError(
            "lamports must be > 0".into(),
        ));
    }

    let instruction = build_system_transfer_instruction(from, to, lamports);
    compile_transaction(&[instruction], from, recent_blockhash)
}

/// Build a transaction from a set of instructions with a single fee payer.
///
/// The fee payer is always the first signer and is placed at index 0 in the
/// account keys.
pub fn compile_transaction(
    instructions: &[SolInstruction],
    fee_payer: &Address,
    recent_blockhash: &Blockhash,
) -> Result<SolTransaction, SolError> {
    struct AccountEntry {
        pubkey: Address,
        is_signer: bool,
        is_writable: bool,
    }

    let mut entries: Vec<AccountEntry> = Vec::new();

    let mut upsert = |pubkey: Address, signer: bool, writable: bool| {
        if let Some(entry) = entries.iter_mut().find(|e| e.pubkey == pubkey) {
            entry.is_signer |= signer;
            entry.is_writable |= writable;
        } else {
            entries.push(AccountEntry {
                pubkey,
                is_signer: signer,
                is_writable: writable,
            });
        }
    };

    // Fee payer is always signer + writable.
    upsert(*fee_payer, true, true);

    for ix in instructions {
        for meta in &ix.accounts {
            upsert(meta.pubkey, meta.is_signer, meta.is_writable);
        }
        // Program IDs are non-signer, read-only accounts.
        upsert(ix.program_id, false, false);
    }

    if entries.len() > u8::MAX as usize {
        return Err(SolError::TransactionBuildError(format!(
            "too many accounts: {}",
            entries.len()
        )));
    }

    // Stable sort keeps insertion order inside each category, so the fee
    // payer stays at index 0 of the writable signers.
    entries.sort_by_key(|e| match (e.is_signer, e.is_writable) {
        (true, true) => 0u8,
        (true, false) => 1,
        (false, true) => 2,
        (false, false) => 3,
    });

    let num_signers = entries.iter().filter(|e| e.is_signer).count() as u8;
    let num_readonly_signed = entries
        .iter()
        .filter(|e| e.is_signer && !e.is_writable)
        .count() as u8;
    let num_readonly_unsigned = entries
        .iter()
        .filter(|e| !e.is_signer && !e.is_writable)
        .count() as u8;

    let account_keys: Vec<Address> = entries.iter().map(|e| e.pubkey).collect();

    let index_of = |key: &Address, what: &str| -> Result<u8, SolError> {
        account_keys
            .iter()
            .position(|k| k == key)
            .map(|i| i as u8)
            .ok_or_else(|| SolError::TransactionBuildError(format!("{what} not in account keys")))
    };

    let mut compiled = Vec::with_capacity(instructions.len());
    for ix in instructions {
        let program_id_index = index_of(&ix.program_id, "program_id")?;
        let account_indices = ix
            .accounts
            .iter()
            .map(|meta| index_of(&meta.pubkey, "account"))
            .collect::<Result<Vec<_>, _>>()?;

        compiled.push(CompiledInstruction {
            program_id_index,
            account_indices,
            data: ix.data.clone(),
        });
    }

    Ok(SolTransaction {
        account_keys,
        num_required_signatures: num_signers,
        num_readonly_signed,
        num_readonly_unsigned,
        recent_blockhash: *recent_blockhash,
        compiled_instructions: compiled,
    })
}

/// Serialize the transaction message (the bytes that get signed).
pub fn serialize_message(
    tx: &SolTransaction,
    version: MessageVersion,
) -> Result<Vec<u8>, SolError> {
    let mut buf = Vec::with_capacity(256);

    if version == MessageVersion::V0 {
        buf.push(VERSION_PREFIX_MASK);
    }

    buf.push(tx.num_required_signatures);
    buf.push(tx.num_readonly_signed);
    buf.push(tx.num_readonly_unsigned);

    buf.extend_from_slice(&encode_compact_u16(compact_len(tx.account_keys.len())?));
    for key in &tx.account_keys {
        buf.extend_from_slice(key.as_bytes());
    }

    buf.extend_from_slice(tx.recent_blockhash.as_bytes());

    buf.extend_from_slice(&encode_compact_u16(compact_len(
        tx.compiled_instructions.len(),
    )?));
    for ix in &tx.compiled_instructions {
        buf.push(ix.program_id_index);

        buf.extend_from_slice(&encode_compact_u16(compact_len(ix.account_indices.len())?));
        buf.extend_from_slice(&ix.account_indices);

        buf.extend_from_slice(&encode_compact_u16(compact_len(ix.data.len())?));
        buf.extend_from_slice(&ix.data);
    }

    if version == MessageVersion::V0 {
        // No address lookup tables.
        buf.extend_from_slice(&encode_compact_u16(0));
    }

    Ok(buf)
}

/// Sign a single-signer transaction and serialize it into wire format.
///
/// `signer` must be the fee payer (account index 0).
pub fn sign_transaction(
    tx: &SolTransaction,
    version: MessageVersion,
    signer: &Keypair,
) -> Result<SignedTransaction, SolError> {
    if tx.num_required_signatures != 1 {
        return Err(SolError::TransactionBuildError(format!(
            "expected 1 required signature, got {}",
            tx.num_required_signatures
        )));
    }
    if tx.account_keys.first() != Some(&signer.pubkey()) {
        return Err(SolError::TransactionBuildError(
            "signer is not the fee payer".into(),
        ));
    }

    let message_bytes = serialize_message(tx, version)?;
    let signature = signer.sign(&message_bytes);

    let mut wire = Vec::with_capacity(1 + 64 + message_bytes.len());
    wire.extend_from_slice(&encode_compact_u16(1));
    wire.extend_from_slice(&signature);
    wire.extend_from_slice(&message_bytes);

    Ok(SignedTransaction { wire, signature })
}

/// Parse a wire transaction and verify every signature against its signer.
///
/// Accepts legacy and v0 messages.
pub fn verify_transaction(wire: &[u8]) -> Result<(), SolError> {
    let truncated = |what: &str| SolError::SerializationError(format!("truncated {what}"));

    let (num_sigs, sig_prefix) = decode_compact_u16(wire)?;
    if num_sigs == 0 {
        return Err(SolError::SerializationError(
            "transaction carries no signatures".into(),
        ));
    }
    let sigs_end = sig_prefix + num_sigs as usize * 64;
    let message = wire.get(sigs_end..).ok_or_else(|| truncated("signatures"))?;

    let mut offset = 0;
    if let Some(&first) = message.first() {
        if first & VERSION_PREFIX_MASK != 0 {
            let version = first & !VERSION_PREFIX_MASK;
            if version != 0 {
                return Err(SolError::SerializationError(format!(
                    "unsupported message version {version}"
                )));
            }
            offset = 1;
        }
    }

    let num_required = *message.get(offset).ok_or_else(|| truncated("header"))? as u16;
    if num_required != num_sigs {
        return Err(SolError::SerializationError(format!(
            "{num_sigs} signatures for {num_required} required signers"
        )));
    }

    let accounts_at = offset + 3;
    let (num_accounts, accounts_prefix) =
        decode_compact_u16(message.get(accounts_at..).ok_or_else(|| truncated("header"))?)?;
    if num_accounts < num_required {
        return Err(SolError::SerializationError(
            "fewer account keys than signers".into(),
        ));
    }
    let keys_start = accounts_at + accounts_prefix;

    for i in 0..num_sigs as usize {
        let key: [u8; 32] = message
            .get(keys_start + i * 32..keys_start + (i + 1) * 32)
            .ok_or_else(|| truncated("account keys"))?
            .try_into()
            .map_err(|_| truncated("account keys"))?;
        let sig_start = sig_prefix + i * 64;
        let signature: [u8; 64] = wire[sig_start..sig_start + 64]
            .try_into()
            .map_err(|_| truncated("signatures"))?;
        keypair::verify(&Address::new(key), message, &signature)?;
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn compact_len(len: usize) -> Result<u16, SolError> {
    u16::try_from(len)
        .map_err(|_| SolError::SerializationError(format!("length {len} exceeds compact-u16")))
}

/// Build a System Program `Transfer` instruction.
fn build_system_transfer_instruction(from: &Address, to: &Address, lamports: u64) -> SolInstruction {
    // Instruction data: u32 LE instruction index (2 = Transfer) + u64 LE lamports.
    let mut data = Vec::with_capacity(12);
    data.extend_from_slice(&SYSTEM_TRANSFER_IX_INDEX.to_le_bytes());
    data.extend_from_slice(&lamports.to_le_bytes());

    SolInstruction {
        program_id: SYSTEM_PROGRAM_ID,
        accounts: vec![
            SolAccountMeta {
                pubkey: *from,
                is_signer: true,
                is_writable: true,
            },
            SolAccountMeta {
                pubkey: *to,
                is_signer: false,
                is_writable: true,
            },
        ],
        data,
    }
}
