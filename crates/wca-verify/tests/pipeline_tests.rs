//! # Verification Pipeline Properties
//!
//! End-to-end checks of decode → reconstruct → verify → report using real
//! keys and the in-process verifier.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use proptest::prelude::*;
use serde_json::{json, Value};
use wca_core::{AccountId, ChainId, PkhDid};
use wca_crypto::{to_checksum_address, EthSigningKey};
use wca_verify::{
    decode, reconstruct_message, verify_token, CacaoCredential, CacaoHeader, CacaoSignature,
    Credential, LocalVerifier, SiweMessage, VerifyError,
};

fn jwt(header: &Value, payload: &Value) -> String {
    format!(
        "{}.{}.c2lnbmF0dXJl",
        URL_SAFE_NO_PAD.encode(header.to_string()),
        URL_SAFE_NO_PAD.encode(payload.to_string())
    )
}

fn siwe_for(key: &EthSigningKey, statement: Option<&str>) -> (PkhDid, SiweMessage) {
    let address = to_checksum_address(&key.address());
    let did = PkhDid::for_account(&AccountId::new(ChainId::mainnet(), address.clone()));
    let message = SiweMessage {
        domain: "example.com".into(),
        address,
        statement: statement.map(str::to_string),
        uri: "https://example.com".into(),
        version: "1".into(),
        chain_id: "1".into(),
        nonce: "12345678".into(),
        issued_at: "2024-05-01T12:00:00.000Z".into(),
        ..Default::default()
    };
    (did, message)
}

fn signed_cacao(key: &EthSigningKey, embed: bool) -> CacaoCredential {
    let (did, message) = siwe_for(key, Some("Sign in to example"));
    let text = message.to_string();
    let signature = key.sign_personal_message(&text).unwrap();
    CacaoCredential {
        header: CacaoHeader {
            kind: "eip4361".into(),
        },
        payload: message.to_cacao_payload(&did),
        signature: CacaoSignature {
            kind: "eip191".into(),
            value: signature.to_hex(),
            message: embed.then_some(text),
        },
    }
}

#[tokio::test]
async fn urn_issuer_jwt_is_not_verified() {
    let token = jwt(
        &json!({"alg": "HS256"}),
        &json!({"iss": "urn:example:issuer", "iat": 1_716_000_000, "urn:example:claim": true}),
    );
    let report = verify_token(&token, &LocalVerifier).await.unwrap();
    let out = serde_json::to_value(&report).unwrap();
    assert_eq!(out["type"], "JWT");
    assert_eq!(out["payload"]["iss"], "urn:example:issuer");
    assert_eq!(out["payload"]["iat"], 1_716_000_000);
    assert!(out["payload"]["iat_iso"].is_string());
    assert_eq!(out["verification"]["valid"], false);
}

#[tokio::test]
async fn did_pkh_jwt_is_tentative() {
    let token = jwt(
        &json!({"alg": "ES256K"}),
        &json!({"iss": "did:pkh:eip155:1:0xABCDEF0123456789ABCDEF0123456789ABCDEF01"}),
    );
    let report = verify_token(&token, &LocalVerifier).await.unwrap();
    assert!(report.verification.valid);
    assert!(report.verification.tentative);
    assert_eq!(
        report.verification.address.as_deref(),
        Some("0xABCDEF0123456789ABCDEF0123456789ABCDEF01")
    );
}

#[tokio::test]
async fn jwt_without_issuer_is_invalid() {
    let token = jwt(&json!({"alg": "none"}), &json!({"sub": "alice"}));
    let report = verify_token(&token, &LocalVerifier).await.unwrap();
    assert!(!report.verification.valid);
    assert_eq!(report.issuer, None);
}

#[tokio::test]
async fn mock_cacao_is_invalid_without_error() {
    let cacao = json!({
        "h": { "t": "eip4361" },
        "p": {
            "iss": "did:pkh:eip155:1:0x123",
            "domain": "example.com",
            "aud": "https://example.com",
            "version": "1",
            "nonce": "12345678",
            "iat": "2024-05-01T12:00:00.000Z"
        },
        "s": { "t": "eip191", "s": "0xsignature", "m": "mock message" }
    });
    let token = STANDARD.encode(cacao.to_string());
    let report = verify_token(&token, &LocalVerifier).await.unwrap();
    let out = serde_json::to_value(&report).unwrap();
    assert_eq!(out["type"], "Cacao");
    assert_eq!(out["payload"]["iss"], "did:pkh:eip155:1:0x123");
    assert_eq!(out["verification"]["valid"], false);
    assert!(report
        .verification
        .reason
        .starts_with("Verification failed: "));
}

#[tokio::test]
async fn genuinely_signed_cacao_is_valid() {
    let key = EthSigningKey::generate();
    let token = signed_cacao(&key, true).to_base64().unwrap();
    let report = verify_token(&token, &LocalVerifier).await.unwrap();
    assert!(report.verification.valid);
    assert_eq!(report.verification.reason, "Signature valid");
    assert_eq!(
        report.verification.address,
        Some(to_checksum_address(&key.address()))
    );
}

#[tokio::test]
async fn reconstructed_message_round_trips() {
    let key = EthSigningKey::generate();
    let cacao = signed_cacao(&key, false);
    assert_eq!(cacao.signature.message, None);
    let token = serde_json::to_string(&cacao).unwrap();
    let report = verify_token(&token, &LocalVerifier).await.unwrap();
    assert!(report.verification.valid, "{}", report.verification.reason);
}

#[tokio::test]
async fn embedded_message_equal_to_reconstruction_verifies() {
    let key = EthSigningKey::generate();
    let mut cacao = signed_cacao(&key, false);
    let rebuilt = reconstruct_message(&cacao.payload).unwrap();
    cacao.signature.message = Some(rebuilt);
    let report = verify_token(&cacao.to_base64().unwrap(), &LocalVerifier)
        .await
        .unwrap();
    assert!(report.verification.valid);
}

#[tokio::test]
async fn signature_from_other_key_is_invalid() {
    let signer = EthSigningKey::generate();
    let claimed = EthSigningKey::generate();
    let mut cacao = signed_cacao(&claimed, true);
    let text = cacao.signature.message.clone().unwrap();
    cacao.signature.value = signer.sign_personal_message(&text).unwrap().to_hex();
    let report = verify_token(&cacao.to_base64().unwrap(), &LocalVerifier)
        .await
        .unwrap();
    assert!(!report.verification.valid);
    assert_eq!(report.verification.reason, "Signature invalid");
    assert_eq!(report.verification.address, None);
}

#[tokio::test]
async fn issuer_without_address_is_fatal() {
    let mut cacao = signed_cacao(&EthSigningKey::generate(), true);
    cacao.payload.issuer = "did:pkh:eip155".into();
    let err = verify_token(&cacao.to_base64().unwrap(), &LocalVerifier)
        .await
        .unwrap_err();
    assert!(matches!(err, VerifyError::IssuerFormat(_)));
}

#[tokio::test]
async fn verification_is_idempotent() {
    let key = EthSigningKey::generate();
    let token = signed_cacao(&key, true).to_base64().unwrap();
    let first = verify_token(&token, &LocalVerifier).await.unwrap();
    let second = verify_token(&token, &LocalVerifier).await.unwrap();
    assert_eq!(first, second);
}

proptest! {
    #[test]
    fn well_formed_jwts_always_decode(
        alg in "[A-Z]{2}[0-9]{3}",
        sub in "[a-zA-Z0-9 _.-]{0,40}",
        iat in 0i64..4_000_000_000,
        sig in "[A-Za-z0-9_-]{1,86}",
    ) {
        let token = format!(
            "{}.{}.{sig}",
            URL_SAFE_NO_PAD.encode(json!({"alg": alg, "typ": "JWT"}).to_string()),
            URL_SAFE_NO_PAD.encode(json!({"sub": sub, "iat": iat}).to_string()),
        );
        match decode(&token) {
            Ok(Credential::Jwt(jwt)) => {
                prop_assert_eq!(jwt.header["alg"].as_str(), Some(alg.as_str()));
                prop_assert_eq!(jwt.payload["iat"].as_i64(), Some(iat));
            }
            other => prop_assert!(false, "unexpected {:?}", other),
        }
    }

    #[test]
    fn cacao_missing_any_section_fails(drop_mask in 1u8..8) {
        let mut value = json!({
            "h": { "t": "eip4361" },
            "p": { "iss": "did:pkh:eip155:1:0x0000000000000000000000000000000000000001" },
            "s": { "t": "eip191", "s": "0x00" }
        });
        let object = value.as_object_mut().unwrap();
        for (bit, key) in ["h", "p", "s"].iter().enumerate() {
            if drop_mask & (1 << bit) != 0 {
                object.remove(*key);
            }
        }
        let err = decode(&STANDARD.encode(value.to_string())).unwrap_err();
        prop_assert!(err.to_string().starts_with("Invalid Cacao structure"));
    }

    #[test]
    fn arbitrary_signature_never_errors(sig in proptest::collection::vec(any::<u8>(), 0..80)) {
        let mut cacao = signed_cacao(&EthSigningKey::from_hex(
            "0x0000000000000000000000000000000000000000000000000000000000000002"
        ).unwrap(), true);
        cacao.signature.value = format!("0x{}", hex::encode(&sig));
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let report = runtime
            .block_on(verify_token(&cacao.to_base64().unwrap(), &LocalVerifier))
            .unwrap();
        prop_assert!(!report.verification.valid);
    }
}
