//! Ed25519 key management.
//!
//! A Solana keypair is exported as 64 bytes, `seed(32) || pubkey(32)`, the
//! same layout the Solana CLI writes. The portable text form is the Base58
//! encoding of those 64 bytes.

use std::fmt;

use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use rand_core::OsRng;
use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroizing;

use crate::address::Address;
use crate::error::SolError;

/// Length of the exported secret: 32-byte seed followed by the public key.
pub const SECRET_KEY_LEN: usize = 64;

/// An Ed25519 signing keypair.
///
/// The signing key is zeroized on drop. `Debug` only shows the public half.
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Rebuild a keypair from its 64 secret bytes.
    ///
    /// The trailing 32 bytes must be the public key derived from the leading
    /// seed, otherwise the bytes are rejected.
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self, SolError> {
        let arr: &[u8; SECRET_KEY_LEN] = bytes.try_into().map_err(|_| {
            SolError::InvalidPrivateKey(format!(
                "expected {SECRET_KEY_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;

        let signing_key = SigningKey::from_keypair_bytes(arr).map_err(|_| {
            SolError::InvalidPrivateKey("public key does not match secret seed".into())
        })?;

        Ok(Self { signing_key })
    }

    /// The account address controlled by this keypair.
    pub fn pubkey(&self) -> Address {
        Address::new(self.signing_key.verifying_key().to_bytes())
    }

    /// The 64 secret bytes, wiped when the returned buffer is dropped.
    pub fn to_secret_bytes(&self) -> Zeroizing<[u8; SECRET_KEY_LEN]> {
        Zeroizing::new(self.signing_key.to_keypair_bytes())
    }

    /// Sign `message` and return the 64-byte Ed25519 signature.
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }

    /// Encode the secret bytes as Base58 text.
    pub fn encode(&self) -> EncodedPrivateKey {
        EncodedPrivateKey::from_secret(&self.to_secret_bytes()[..])
    }
}

impl PartialEq for Keypair {
    fn eq(&self, other: &Self) -> bool {
        *self.to_secret_bytes() == *other.to_secret_bytes()
    }
}

impl Eq for Keypair {}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("pubkey", &self.pubkey())
            .finish_non_exhaustive()
    }
}

/// Base58 text of a keypair's 64 secret bytes.
///
/// Kept distinct from [`Address`] so the two can never be swapped. The text
/// is held in a [`SecretString`] and never shown by `Debug`.
pub struct EncodedPrivateKey(SecretString);

impl EncodedPrivateKey {
    /// Wrap user-supplied text. Validation happens in [`decode`].
    pub fn new(text: impl Into<String>) -> Self {
        Self(SecretString::from(text.into()))
    }

    fn from_secret(secret: &[u8]) -> Self {
        Self::new(bs58::encode(secret).into_string())
    }

    /// Borrow the encoded text.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for EncodedPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EncodedPrivateKey([REDACTED])")
    }
}

/// Generate a fresh keypair from the operating system's CSPRNG.
pub fn generate() -> Keypair {
    Keypair {
        signing_key: SigningKey::generate(&mut OsRng),
    }
}

/// Base58-encode raw secret key bytes.
///
/// Fails with [`SolError::Encoding`] unless `secret` is exactly 64 bytes.
pub fn encode(secret: &[u8]) -> Result<EncodedPrivateKey, SolError> {
    if secret.len() != SECRET_KEY_LEN {
        return Err(SolError::Encoding(format!(
            "secret key must be {SECRET_KEY_LEN} bytes, got {}",
            secret.len()
        )));
    }
    Ok(EncodedPrivateKey::from_secret(secret))
}

/// Decode Base58 text back into a keypair.
///
/// Fails with [`SolError::InvalidPrivateKey`] if the text is not Base58,
/// decodes to the wrong length, or carries a mismatched public half.
pub fn decode(text: &EncodedPrivateKey) -> Result<Keypair, SolError> {
    let bytes = Zeroizing::new(
        bs58::decode(text.expose().trim())
            .into_vec()
            .map_err(|e| SolError::InvalidPrivateKey(format!("base58 decode failed: {e}")))?,
    );
    Keypair::from_secret_bytes(&bytes)
}

/// Verify an Ed25519 signature made by `signer` over `message`.
pub fn verify(signer: &Address, message: &[u8], signature: &[u8; 64]) -> Result<(), SolError> {
    let key = VerifyingKey::from_bytes(signer.as_bytes())
        .map_err(|e| SolError::SignatureMismatch(format!("invalid signer key: {e}")))?;
    key.verify_strict(message, &Signature::from_bytes(signature))
        .map_err(|_| SolError::SignatureMismatch(format!("bad signature for {signer}")))
}
