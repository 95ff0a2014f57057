//! # Authentication Request Flows
//!
//! Drive a [`WalletConnector`] through connect → build SIWE text →
//! `personal_sign`. The Cacao flow wraps the result in a CAIP-74 object
//! with the signed text embedded, so `wc-auth verify` accepts it as-is.

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Serialize;
use serde_json::{json, Value};
use wca_core::{AccountId, ChainId, PkhDid, Timestamp};
use wca_verify::{CacaoCredential, CacaoHeader, CacaoSignature, SiweMessage};

use crate::connector::{ConnectParams, WalletConnector, EIP155};
use crate::error::WalletError;

/// Example ReCap granting chat read/write, used when no resources are given.
pub const DEFAULT_RECAP: &str =
    "urn:recap:eyJhdHQiOnsiY2hhdCI6eyJhY3Rpb25zIjpbInJlYWQiLCJ3cml0ZSJdfX19";

/// Statement used for Cacao requests when none is given.
pub const DEFAULT_CACAO_STATEMENT: &str = "Sign in with Cacao capability";

const NONCE_LEN: usize = 12;

/// Parameters shared by both request flows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthRequest {
    pub chain: ChainId,
    pub domain: String,
    /// Sign-in URI; `https://<domain>` when unset.
    pub uri: Option<String>,
    pub statement: Option<String>,
    /// Random when unset.
    pub nonce: Option<String>,
    pub resources: Vec<String>,
}

impl AuthRequest {
    pub fn new(chain: ChainId, domain: impl Into<String>) -> Self {
        Self {
            chain,
            domain: domain.into(),
            uri: None,
            statement: None,
            nonce: None,
            resources: Vec::new(),
        }
    }
}

/// Result of a SIWE request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiweOutcome {
    pub account: String,
    pub address: String,
    pub message: String,
    pub signature: String,
}

/// Result of a Cacao request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacaoOutcome {
    pub address: String,
    pub cacao: CacaoCredential,
    /// Base64 form accepted by `wc-auth verify`.
    pub token: String,
}

/// 12 random alphanumeric characters.
pub fn generate_nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LEN)
        .map(char::from)
        .collect()
}

/// Connect, sign a SIWE message, return the signed message.
pub async fn request_siwe(
    wallet: &dyn WalletConnector,
    request: &AuthRequest,
) -> Result<SiweOutcome, WalletError> {
    let (account, message, signature) = sign_in(wallet, request, request.statement.clone()).await?;
    Ok(SiweOutcome {
        account: account.to_string(),
        address: message.address.clone(),
        message: message.to_string(),
        signature,
    })
}

/// Connect, sign a SIWE message with resources, wrap it as a Cacao.
pub async fn request_cacao(
    wallet: &dyn WalletConnector,
    request: &AuthRequest,
) -> Result<CacaoOutcome, WalletError> {
    let mut request = request.clone();
    if request.resources.is_empty() {
        request.resources.push(DEFAULT_RECAP.to_string());
    }
    let statement = request
        .statement
        .clone()
        .or_else(|| Some(DEFAULT_CACAO_STATEMENT.to_string()));
    let (account, message, signature) = sign_in(wallet, &request, statement).await?;

    let issuer = PkhDid::for_account(&account);
    let cacao = CacaoCredential {
        header: CacaoHeader {
            kind: "eip4361".to_string(),
        },
        payload: message.to_cacao_payload(&issuer),
        signature: CacaoSignature {
            kind: "eip191".to_string(),
            value: signature,
            message: Some(message.to_string()),
        },
    };
    let token = cacao.to_base64()?;
    Ok(CacaoOutcome {
        address: account.address,
        cacao,
        token,
    })
}

async fn sign_in(
    wallet: &dyn WalletConnector,
    request: &AuthRequest,
    statement: Option<String>,
) -> Result<(AccountId, SiweMessage, String), WalletError> {
    let session = wallet
        .connect(ConnectParams::eip155(&request.chain, &["personal_sign"]))
        .await?;
    let account = session.first_account(EIP155)?;
    tracing::info!(account = %account, "wallet connected");

    let message = SiweMessage {
        domain: request.domain.clone(),
        address: account.address.clone(),
        statement: statement.filter(|s| !s.is_empty()),
        uri: request
            .uri
            .clone()
            .unwrap_or_else(|| format!("https://{}", request.domain)),
        version: "1".to_string(),
        chain_id: account.chain.reference.clone(),
        nonce: request.nonce.clone().unwrap_or_else(generate_nonce),
        issued_at: Timestamp::now().to_iso8601(),
        resources: request.resources.clone(),
        ..Default::default()
    };
    let text = message.to_string();

    let response = wallet
        .request("personal_sign", json!([text, account.address]))
        .await?;
    let signature = match response {
        Value::String(sig) => sig,
        other => {
            return Err(WalletError::UnexpectedResponse(format!(
                "personal_sign returned {other}"
            )))
        }
    };
    Ok((account, message, signature))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nonce_is_twelve_alphanumerics() {
        let nonce = generate_nonce();
        assert_eq!(nonce.len(), NONCE_LEN);
        assert!(nonce.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(nonce, generate_nonce());
    }

    #[test]
    fn request_defaults() {
        let request = AuthRequest::new(ChainId::mainnet(), "wc-auth.cli");
        assert!(request.uri.is_none());
        assert!(request.nonce.is_none());
        assert!(request.resources.is_empty());
    }
}
