//! # wca-verify: Credential Verification Pipeline
//!
//! ```text
//! token ─▶ decoder ─▶ [siwe: rebuild message] ─▶ verifier ─▶ report ─▶ render
//! ```
//!
//! - [`decoder`]: classify a token as JWT or Cacao via an ordered parser
//!   chain.
//! - [`siwe`]: EIP-4361 message text, built forward for signing and
//!   reconstructed from Cacao payloads that do not embed it.
//! - [`verifier`]: the [`MessageVerifier`] seam with local ecrecover and
//!   an EIP-1271-aware JSON-RPC implementation.
//! - [`report`] / [`render`]: the structured result and its JSON, YAML and
//!   table renderings.
//!
//! ## Security Invariant
//!
//! A JWT is never cryptographically checked. A `did:pkh` issuer earns a
//! `valid: true, tentative: true` status that callers must not treat as
//! authentication.
//!
//! ## Crate Policy
//!
//! - Structural problems are [`VerifyError`]s. Signature problems are
//!   `valid: false` statuses.
//! - No global state. Verifying the same input twice yields the same status.

pub mod credential;
pub mod decoder;
pub mod error;
pub mod render;
pub mod report;
pub mod siwe;
pub mod verifier;

pub use credential::{
    CacaoCredential, CacaoHeader, CacaoPayload, CacaoSignature, Credential, CredentialKind,
    JwtCredential,
};
pub use decoder::decode;
pub use error::{VerifierError, VerifyError};
pub use render::{render_report, render_value, RenderError};
pub use report::{VerificationReport, VerificationStatus};
pub use siwe::{reconstruct_message, SiweMessage};
pub use verifier::{
    verify_credential, verify_signature, LocalVerifier, MessageVerifier, RpcVerifier,
    DEFAULT_RPC_URL,
};

/// Decode `token` and verify it, producing the full report.
pub async fn verify_token(
    token: &str,
    verifier: &dyn MessageVerifier,
) -> Result<VerificationReport, VerifyError> {
    let credential = decode(token)?;
    let status = verify_credential(&credential, verifier).await?;
    tracing::info!(
        kind = credential.kind().as_str(),
        valid = status.valid,
        "verification complete"
    );
    Ok(VerificationReport::new(&credential, status))
}
