//! # Verification Error Types
//!
//! Two tiers, kept apart on purpose:
//!
//! - [`VerifyError`] aborts the pipeline. The input could not be understood
//!   (not a JWT or Cacao, missing sections, issuer without an address).
//! - [`VerifierError`] comes from a single signature check. It never leaves
//!   the pipeline as an error; it becomes a `valid: false` status whose
//!   reason starts with `Verification failed:`.

use thiserror::Error;
use wca_crypto::CryptoError;

/// Structural failure decoding or interpreting a credential.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    /// Input is neither a JWT nor a Cacao object, or a Cacao object is
    /// missing one of its sections.
    #[error("{0}")]
    Format(String),

    /// Cacao issuer does not carry an address segment.
    #[error("Invalid Cacao issuer: {0}")]
    IssuerFormat(String),
}

impl VerifyError {
    pub(crate) fn invalid_token() -> Self {
        Self::Format("Invalid token format. Expected JWT or Cacao object.".to_string())
    }

    pub(crate) fn invalid_cacao(detail: impl std::fmt::Display) -> Self {
        Self::Format(format!("Invalid Cacao structure: {detail}"))
    }
}

/// Failure of one signature check against one address.
#[derive(Error, Debug)]
pub enum VerifierError {
    /// Signature bytes could not be parsed or recovered.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// The chain node could not answer the contract-wallet check.
    #[error("RPC call to {endpoint} failed: {reason}")]
    Rpc {
        /// Endpoint URL.
        endpoint: String,
        /// Transport, HTTP or JSON-RPC error message.
        reason: String,
    },
}
