//! # Cryptographic Error Types
//!
//! Structured errors for signature parsing and recovery. The verifier turns
//! these into a `Verification failed: ...` reason instead of aborting.

use thiserror::Error;

/// Errors from signature and key operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Signature or key text is not valid hex.
    #[error("hex decode error: {0}")]
    HexDecode(String),

    /// Signature is not 65 bytes (`r || s || v`).
    #[error("invalid signature length: expected 65 bytes, got {0}")]
    InvalidSignatureLength(usize),

    /// `v` byte is not one of 0, 1, 27, 28.
    #[error("invalid recovery id: {0}")]
    InvalidRecoveryId(u8),

    /// `r`/`s` are not valid scalars.
    #[error("malformed signature: {0}")]
    MalformedSignature(String),

    /// No public key could be recovered from the signature.
    #[error("public key recovery failed: {0}")]
    RecoveryFailed(String),

    /// Private key bytes are not a valid secp256k1 scalar.
    #[error("invalid private key: {0}")]
    InvalidKey(String),
}
