//! # Integration Tests for the JSON-RPC Verifier
//!
//! Runs [`RpcVerifier`] against a wiremock JSON-RPC node to check request
//! construction, the EIP-1271 contract-wallet path and the fallbacks to
//! local recovery, without touching a live chain.

use serde_json::json;
use wca_crypto::EthSigningKey;
use wca_verify::{verify_signature, MessageVerifier, RpcVerifier, VerifierError};
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CONTRACT: &str = "0x1111111111111111111111111111111111111111";

fn rpc_result(result: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "jsonrpc": "2.0", "id": 1, "result": result }))
}

fn contract_signature() -> String {
    format!("0x{}", "ab".repeat(65))
}

async fn mount_get_code(server: &MockServer, code: &str, times: u64) {
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "eth_getCode" })))
        .respond_with(rpc_result(json!(code)))
        .expect(times)
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn local_match_makes_no_rpc_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(rpc_result(json!("0x")))
        .expect(0)
        .mount(&server)
        .await;

    let key = EthSigningKey::generate();
    let sig = key.sign_personal_message("hello").unwrap().to_hex();
    let verifier = RpcVerifier::new(server.uri()).unwrap();
    let ok = verifier
        .verify_message(&key.address().to_hex(), "hello", &sig)
        .await
        .unwrap();
    assert!(ok);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn eoa_mismatch_is_invalid() {
    let server = MockServer::start().await;
    mount_get_code(&server, "0x", 1).await;

    let signer = EthSigningKey::generate();
    let claimed = EthSigningKey::generate();
    let sig = signer.sign_personal_message("hello").unwrap().to_hex();
    let verifier = RpcVerifier::new(server.uri()).unwrap();
    let status = verify_signature(&verifier, "hello", &claimed.address().to_hex(), &sig).await;
    assert!(!status.valid);
    assert_eq!(status.reason, "Signature invalid");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn contract_wallet_magic_value_is_valid() {
    let server = MockServer::start().await;
    mount_get_code(&server, "0x6080604052", 1).await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "method": "eth_call",
            "params": [{ "to": CONTRACT }, "latest"]
        })))
        .respond_with(rpc_result(json!(format!("0x1626ba7e{}", "00".repeat(28)))))
        .expect(1)
        .mount(&server)
        .await;

    let verifier = RpcVerifier::new(server.uri()).unwrap();
    let status = verify_signature(&verifier, "hello", CONTRACT, &contract_signature()).await;
    assert!(status.valid, "{}", status.reason);
    assert_eq!(status.address.as_deref(), Some(CONTRACT));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn contract_wallet_rejection_is_invalid() {
    let server = MockServer::start().await;
    mount_get_code(&server, "0x6080604052", 1).await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "eth_call" })))
        .respond_with(rpc_result(json!(format!("0x{}", "00".repeat(32)))))
        .expect(1)
        .mount(&server)
        .await;

    let verifier = RpcVerifier::new(server.uri()).unwrap();
    let status = verify_signature(&verifier, "hello", CONTRACT, &contract_signature()).await;
    assert!(!status.valid);
    assert_eq!(status.reason, "Signature invalid");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn contract_call_error_is_reported() {
    let server = MockServer::start().await;
    mount_get_code(&server, "0x6080604052", 2).await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "eth_call" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": 3, "message": "execution reverted" }
        })))
        .mount(&server)
        .await;

    let verifier = RpcVerifier::new(server.uri()).unwrap();
    let err = verifier
        .verify_message(CONTRACT, "hello", &contract_signature())
        .await
        .unwrap_err();
    assert!(matches!(err, VerifierError::Rpc { ref reason, .. } if reason == "execution reverted"));

    let status = verify_signature(&verifier, "hello", CONTRACT, &contract_signature()).await;
    assert!(status.reason.starts_with("Verification failed: RPC call to"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn node_outage_falls_back_to_local_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .expect(1)
        .mount(&server)
        .await;

    let signer = EthSigningKey::generate();
    let sig = signer.sign_personal_message("hello").unwrap().to_hex();
    let verifier = RpcVerifier::new(server.uri()).unwrap();
    let status = verify_signature(&verifier, "hello", CONTRACT, &sig).await;
    assert!(!status.valid);
    assert_eq!(status.reason, "Signature invalid");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn malformed_inputs_skip_the_node() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(rpc_result(json!("0x")))
        .expect(0)
        .mount(&server)
        .await;

    let verifier = RpcVerifier::new(server.uri()).unwrap();
    // Not hex.
    let status = verify_signature(&verifier, "hello", CONTRACT, "0xsignature").await;
    assert!(status.reason.starts_with("Verification failed: hex decode error"));
    // Not a 20-byte address.
    let status = verify_signature(&verifier, "hello", "0x123", &contract_signature()).await;
    assert!(!status.valid);
}
