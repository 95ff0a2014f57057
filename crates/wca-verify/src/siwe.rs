//! # SIWE Message Text
//!
//! Builds the EIP-4361 plain-text sign-in message. Used in two directions:
//! the request flows render it before asking a wallet to `personal_sign`,
//! and the verifier rebuilds it from a Cacao payload that does not embed the
//! signed text.
//!
//! Reconstruction is best-effort. A signer that laid the text out
//! differently (whitespace, field order, optional fields) produces a
//! signature that reports `invalid` here even if the credential is
//! semantically sound.

use std::fmt;

use wca_core::PkhDid;

use crate::credential::CacaoPayload;
use crate::error::VerifyError;

/// Fields of a SIWE message in render order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SiweMessage {
    pub domain: String,
    pub address: String,
    pub statement: Option<String>,
    pub uri: String,
    pub version: String,
    pub chain_id: String,
    pub nonce: String,
    pub issued_at: String,
    pub expiration_time: Option<String>,
    pub not_before: Option<String>,
    pub request_id: Option<String>,
    pub resources: Vec<String>,
}

impl SiweMessage {
    /// Message fields carried by a Cacao payload. The address and chain id
    /// come from the `did:pkh` issuer.
    pub fn from_cacao_payload(payload: &CacaoPayload) -> Result<Self, VerifyError> {
        let did = PkhDid::parse(&payload.issuer)
            .map_err(|e| VerifyError::IssuerFormat(e.to_string()))?;
        Ok(Self {
            domain: payload.domain.clone(),
            address: did.address().to_string(),
            statement: payload.statement.clone().filter(|s| !s.is_empty()),
            uri: payload.audience.clone(),
            version: payload.version.clone(),
            chain_id: did.chain_id().to_string(),
            nonce: payload.nonce.clone(),
            issued_at: payload.issued_at.clone(),
            expiration_time: payload.expiration_time.clone(),
            not_before: payload.not_before.clone(),
            request_id: payload.request_id.clone(),
            resources: payload.resources.clone().unwrap_or_default(),
        })
    }

    /// Cacao payload for this message under the given issuer DID.
    pub fn to_cacao_payload(&self, issuer: &PkhDid) -> CacaoPayload {
        CacaoPayload {
            issuer: issuer.to_string(),
            domain: self.domain.clone(),
            audience: self.uri.clone(),
            version: self.version.clone(),
            nonce: self.nonce.clone(),
            issued_at: self.issued_at.clone(),
            not_before: self.not_before.clone(),
            expiration_time: self.expiration_time.clone(),
            statement: self.statement.clone(),
            request_id: self.request_id.clone(),
            resources: (!self.resources.is_empty()).then(|| self.resources.clone()),
        }
    }
}

impl fmt::Display for SiweMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} wants you to sign in with your Ethereum account:",
            self.domain
        )?;
        writeln!(f, "{}", self.address)?;
        writeln!(f)?;
        if let Some(statement) = &self.statement {
            writeln!(f, "{statement}")?;
            writeln!(f)?;
        }
        writeln!(f, "URI: {}", self.uri)?;
        writeln!(f, "Version: {}", self.version)?;
        writeln!(f, "Chain ID: {}", self.chain_id)?;
        writeln!(f, "Nonce: {}", self.nonce)?;
        write!(f, "Issued At: {}", self.issued_at)?;
        if let Some(exp) = &self.expiration_time {
            write!(f, "\nExpiration Time: {exp}")?;
        }
        if let Some(nbf) = &self.not_before {
            write!(f, "\nNot Before: {nbf}")?;
        }
        if let Some(id) = &self.request_id {
            write!(f, "\nRequest ID: {id}")?;
        }
        if !self.resources.is_empty() {
            write!(f, "\nResources:")?;
            for resource in &self.resources {
                write!(f, "\n- {resource}")?;
            }
        }
        Ok(())
    }
}

/// Rebuild the signed text for a Cacao payload that does not embed it.
pub fn reconstruct_message(payload: &CacaoPayload) -> Result<String, VerifyError> {
    Ok(SiweMessage::from_cacao_payload(payload)?.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> CacaoPayload {
        CacaoPayload {
            issuer: "did:pkh:eip155:1:0xAbC0000000000000000000000000000000000001".into(),
            domain: "example.com".into(),
            audience: "https://example.com/login".into(),
            version: "1".into(),
            nonce: "32891756".into(),
            issued_at: "2021-09-30T16:25:24Z".into(),
            ..Default::default()
        }
    }

    #[test]
    fn minimal_message_layout() {
        let text = reconstruct_message(&payload()).unwrap();
        assert_eq!(
            text,
            "example.com wants you to sign in with your Ethereum account:\n\
             0xAbC0000000000000000000000000000000000001\n\
             \n\
             URI: https://example.com/login\n\
             Version: 1\n\
             Chain ID: 1\n\
             Nonce: 32891756\n\
             Issued At: 2021-09-30T16:25:24Z"
        );
    }

    #[test]
    fn statement_and_resources() {
        let mut p = payload();
        p.statement = Some("I accept the ExampleOrg Terms of Service".into());
        p.resources = Some(vec![
            "ipfs://bafybeiemxf5abjwjbikoz4mc3a3dla6ual3jsgpdr4cjr3oz3evfyavhwq/".into(),
            "https://example.com/my-web2-claim.json".into(),
        ]);
        let text = reconstruct_message(&p).unwrap();
        assert!(text.contains(
            "0xAbC0000000000000000000000000000000000001\n\nI accept the ExampleOrg Terms of Service\n\nURI:"
        ));
        assert!(text.ends_with(
            "Resources:\n- ipfs://bafybeiemxf5abjwjbikoz4mc3a3dla6ual3jsgpdr4cjr3oz3evfyavhwq/\n- https://example.com/my-web2-claim.json"
        ));
    }

    #[test]
    fn empty_statement_and_resources_are_omitted() {
        let mut p = payload();
        p.statement = Some(String::new());
        p.resources = Some(vec![]);
        assert_eq!(
            reconstruct_message(&p).unwrap(),
            reconstruct_message(&payload()).unwrap()
        );
    }

    #[test]
    fn optional_time_fields_follow_issued_at() {
        let mut p = payload();
        p.expiration_time = Some("2021-10-01T16:25:24Z".into());
        p.not_before = Some("2021-09-30T16:30:00Z".into());
        p.request_id = Some("req-7".into());
        let text = reconstruct_message(&p).unwrap();
        assert!(text.ends_with(
            "Issued At: 2021-09-30T16:25:24Z\n\
             Expiration Time: 2021-10-01T16:25:24Z\n\
             Not Before: 2021-09-30T16:30:00Z\n\
             Request ID: req-7"
        ));
    }

    #[test]
    fn chain_id_is_second_to_last_segment() {
        let mut p = payload();
        p.issuer = "did:pkh:eip155:8453:0x1111111111111111111111111111111111111111".into();
        assert!(reconstruct_message(&p).unwrap().contains("\nChain ID: 8453\n"));
    }

    #[test]
    fn issuer_without_address_is_issuer_error() {
        let mut p = payload();
        p.issuer = "did:pkh:eip155".into();
        assert!(matches!(
            reconstruct_message(&p),
            Err(VerifyError::IssuerFormat(_))
        ));
    }

    #[test]
    fn payload_round_trips_through_builder() {
        let mut p = payload();
        p.statement = Some("Sign in".into());
        p.resources = Some(vec!["urn:recap:eyJhdHQiOnt9fQ".into()]);
        let message = SiweMessage::from_cacao_payload(&p).unwrap();
        let did = PkhDid::parse(&p.issuer).unwrap();
        assert_eq!(message.to_cacao_payload(&did), p);
    }
}
