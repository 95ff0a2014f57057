//! # Signature Verifier
//!
//! [`MessageVerifier`] is the seam between the pipeline and whatever can
//! answer "did `address` sign `message`?":
//!
//! - [`LocalVerifier`] does EIP-191 ecrecover in-process. No I/O.
//! - [`RpcVerifier`] does the same first. When that fails and the address
//!   holds contract code, it makes one EIP-1271 `isValidSignature` call
//!   against a JSON-RPC node. No retry and no timeout beyond the transport
//!   default.
//!
//! [`verify_credential`] drives the whole check for a decoded credential.
//! Signature problems come back as `valid: false`; only structural issuer
//! problems are errors.

use async_trait::async_trait;
use serde_json::{json, Value};
use wca_core::{EthAddress, PkhDid};
use wca_crypto::hash_personal_message;

use crate::credential::{CacaoCredential, Credential, JwtCredential};
use crate::error::{VerifierError, VerifyError};
use crate::report::VerificationStatus;
use crate::siwe::reconstruct_message;

/// Public endpoint used when none is configured.
pub const DEFAULT_RPC_URL: &str = "https://eth.merkle.io";

/// `bytes4(keccak256("isValidSignature(bytes32,bytes)"))`. Also the magic
/// value a contract returns for a valid signature.
const EIP1271_MAGIC: &str = "1626ba7e";

/// Reason reported for a JWT whose issuer is not a `did:pkh` DID.
pub const JWT_NOT_DID_REASON: &str =
    "Issuer is not a DID, cannot infer public key for verification";

/// Reason reported for a `did:pkh` JWT, which is accepted without any
/// signature check.
pub const JWT_TENTATIVE_REASON: &str = "Tentatively valid: issuer is a did:pkh DID. \
     The JWT signature was NOT checked; full verification needs public-key resolution";

/// Answers whether `address` signed `message` with `signature`.
#[async_trait]
pub trait MessageVerifier: Send + Sync {
    /// `Ok(false)` for a well-formed signature by someone else; `Err` when
    /// the check could not be carried out.
    async fn verify_message(
        &self,
        address: &str,
        message: &str,
        signature: &str,
    ) -> Result<bool, VerifierError>;
}

/// In-process EIP-191 recovery.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalVerifier;

#[async_trait]
impl MessageVerifier for LocalVerifier {
    async fn verify_message(
        &self,
        address: &str,
        message: &str,
        signature: &str,
    ) -> Result<bool, VerifierError> {
        Ok(wca_crypto::verify_personal_message(
            address, message, signature,
        )?)
    }
}

/// Local recovery with an EIP-1271 fallback for contract wallets.
#[derive(Debug, Clone)]
pub struct RpcVerifier {
    client: reqwest::Client,
    endpoint: String,
}

impl RpcVerifier {
    /// Build a verifier against a JSON-RPC endpoint.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, VerifierError> {
        let endpoint = endpoint.into();
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| VerifierError::Rpc {
                endpoint: endpoint.clone(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client, endpoint })
    }

    /// Verifier against [`DEFAULT_RPC_URL`].
    pub fn mainnet() -> Result<Self, VerifierError> {
        Self::new(DEFAULT_RPC_URL)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn rpc_error(&self, reason: impl Into<String>) -> VerifierError {
        VerifierError::Rpc {
            endpoint: self.endpoint.clone(),
            reason: reason.into(),
        }
    }

    async fn rpc_call(&self, method: &str, params: Value) -> Result<Value, VerifierError> {
        let body = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });

        let resp = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.rpc_error(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(self.rpc_error(format!("HTTP {}", resp.status())));
        }

        let json: Value = resp
            .json()
            .await
            .map_err(|e| self.rpc_error(format!("invalid JSON response: {e}")))?;

        if let Some(error) = json.get("error") {
            let msg = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown RPC error");
            return Err(self.rpc_error(msg));
        }

        json.get("result")
            .cloned()
            .ok_or_else(|| self.rpc_error("JSON-RPC response missing 'result' field"))
    }

    async fn has_code(&self, address: &EthAddress) -> Result<bool, VerifierError> {
        let result = self
            .rpc_call("eth_getCode", json!([address.to_hex(), "latest"]))
            .await?;
        let code = result.as_str().unwrap_or("0x");
        Ok(!matches!(code, "" | "0x" | "0x0"))
    }

    async fn is_valid_contract_signature(
        &self,
        address: &EthAddress,
        message: &str,
        signature: &[u8],
    ) -> Result<bool, VerifierError> {
        let data = encode_is_valid_signature(&hash_personal_message(message.as_bytes()), signature);
        let result = self
            .rpc_call(
                "eth_call",
                json!([{ "to": address.to_hex(), "data": data }, "latest"]),
            )
            .await?;
        let returned = result.as_str().unwrap_or_default();
        Ok(returned
            .strip_prefix("0x")
            .is_some_and(|hex| hex.to_ascii_lowercase().starts_with(EIP1271_MAGIC)))
    }
}

#[async_trait]
impl MessageVerifier for RpcVerifier {
    async fn verify_message(
        &self,
        address: &str,
        message: &str,
        signature: &str,
    ) -> Result<bool, VerifierError> {
        let local = wca_crypto::verify_personal_message(address, message, signature);
        if matches!(local, Ok(true)) {
            return Ok(true);
        }

        let Ok(account) = EthAddress::parse(address) else {
            return Ok(local?);
        };
        let Ok(signature_bytes) = hex::decode(signature.trim().trim_start_matches("0x")) else {
            return Ok(local?);
        };

        match self.has_code(&account).await {
            Ok(true) => {
                tracing::debug!(address = %account, "contract wallet, checking EIP-1271");
                self.is_valid_contract_signature(&account, message, &signature_bytes)
                    .await
            }
            Ok(false) => Ok(local?),
            Err(e) => {
                tracing::warn!(error = %e, "contract code lookup failed, using local recovery result");
                Ok(local?)
            }
        }
    }
}

/// ABI calldata for `isValidSignature(bytes32 hash, bytes signature)`.
fn encode_is_valid_signature(hash: &[u8; 32], signature: &[u8]) -> String {
    let padded_len = signature.len().div_ceil(32) * 32;
    let mut data = Vec::with_capacity(4 + 32 * 3 + padded_len);
    data.extend_from_slice(&[0x16, 0x26, 0xba, 0x7e]);
    data.extend_from_slice(hash);
    data.extend_from_slice(&abi_word(0x40));
    data.extend_from_slice(&abi_word(signature.len() as u64));
    data.extend_from_slice(signature);
    data.resize(4 + 32 * 3 + padded_len, 0);
    format!("0x{}", hex::encode(data))
}

fn abi_word(value: u64) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Check `signature` over `message` against `claimed_address`.
///
/// Never fails: a mismatch or an error inside the verifier becomes
/// `valid: false` with the cause in `reason`.
pub async fn verify_signature(
    verifier: &dyn MessageVerifier,
    message: &str,
    claimed_address: &str,
    signature: &str,
) -> VerificationStatus {
    match verifier
        .verify_message(claimed_address, message, signature)
        .await
    {
        Ok(true) => VerificationStatus::valid(claimed_address, "Signature valid"),
        Ok(false) => VerificationStatus::invalid("Signature invalid"),
        Err(e) => VerificationStatus::invalid(format!("Verification failed: {e}")),
    }
}

/// Structural assessment of a JWT. No signature is checked.
pub fn jwt_status(jwt: &JwtCredential) -> VerificationStatus {
    match jwt.issuer.as_deref().and_then(PkhDid::trailing_segment) {
        Some(address) => VerificationStatus::tentative(address, JWT_TENTATIVE_REASON),
        None => VerificationStatus::invalid(JWT_NOT_DID_REASON),
    }
}

/// Verify a Cacao: embedded message if present, otherwise the SIWE text
/// rebuilt from the payload.
pub async fn cacao_status(
    cacao: &CacaoCredential,
    verifier: &dyn MessageVerifier,
) -> Result<VerificationStatus, VerifyError> {
    let did = PkhDid::parse(&cacao.payload.issuer)
        .map_err(|e| VerifyError::IssuerFormat(e.to_string()))?;
    let message = match cacao.embedded_message() {
        Some(message) => message.to_string(),
        None => {
            tracing::debug!("no embedded message, reconstructing SIWE text");
            reconstruct_message(&cacao.payload)?
        }
    };
    Ok(verify_signature(verifier, &message, did.address(), &cacao.signature.value).await)
}

/// Verification status for any decoded credential.
pub async fn verify_credential(
    credential: &Credential,
    verifier: &dyn MessageVerifier,
) -> Result<VerificationStatus, VerifyError> {
    match credential {
        Credential::Jwt(jwt) => Ok(jwt_status(jwt)),
        Credential::Cacao(cacao) => cacao_status(cacao, verifier).await,
    }
}
