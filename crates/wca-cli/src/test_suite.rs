//! # Test Subcommand
//!
//! Runs a YAML or JSON suite of tokens through the verification pipeline
//! and checks each report against the case's expectations.
//!
//! ```yaml
//! description: Release smoke test
//! cases:
//!   - name: wallet cacao
//!     token: eyJoIjp7...
//!     expectations:
//!       type: Cacao
//!       valid: true
//!       address: "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf"
//!       chainId: eip155:1
//!       maxResponseTimeMs: 2000
//! ```
//!
//! A case whose token does not decode fails with the decoder's message.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Deserialize;
use serde_json::Value;

use wca_core::{CliConfig, PkhDid};
use wca_verify::{verify_token, MessageVerifier, VerificationReport};

/// Arguments for `wc-auth test`.
#[derive(Args, Debug)]
pub struct TestArgs {
    /// Suite file (.yaml, .yml or .json).
    #[arg(long, short)]
    pub file: PathBuf,

    /// JSON-RPC endpoint for contract-wallet checks.
    #[arg(long)]
    pub rpc_url: Option<String>,

    /// Local signature recovery only.
    #[arg(long, conflicts_with = "rpc_url")]
    pub offline: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TestSuite {
    #[serde(default)]
    pub description: Option<String>,
    pub cases: Vec<TestCase>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TestCase {
    pub name: String,
    pub token: String,
    #[serde(default)]
    pub expectations: Expectations,
}

/// Every field is optional; an empty block only requires a clean decode.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expectations {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub valid: Option<bool>,
    pub address: Option<String>,
    pub chain_id: Option<String>,
    pub max_response_time_ms: Option<u64>,
}

/// Result of one case. `failure` is `None` when it passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseOutcome {
    pub name: String,
    pub failure: Option<String>,
}

impl CaseOutcome {
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }

    /// `✓ name` or `✗ name: reason`.
    pub fn line(&self) -> String {
        match &self.failure {
            None => format!("✓ {}", self.name),
            Some(reason) => format!("✗ {}: {reason}", self.name),
        }
    }
}

/// Load a suite, choosing the parser by file extension.
pub fn load_suite(path: &Path) -> Result<TestSuite> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let content = || {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read suite {}", path.display()))
    };
    let suite: TestSuite = match ext.as_deref() {
        Some("json") => serde_json::from_str(&content()?)
            .with_context(|| format!("invalid suite {}", path.display()))?,
        Some("yaml" | "yml") => serde_yaml::from_str(&content()?)
            .with_context(|| format!("invalid suite {}", path.display()))?,
        _ => bail!(
            "unsupported suite file {}: use .json, .yaml or .yml",
            path.display()
        ),
    };
    Ok(suite)
}

/// Run every case in order.
pub async fn run_suite(suite: &TestSuite, verifier: &dyn MessageVerifier) -> Vec<CaseOutcome> {
    let mut outcomes = Vec::with_capacity(suite.cases.len());
    for case in &suite.cases {
        let started = Instant::now();
        let result = verify_token(&case.token, verifier).await;
        let elapsed_ms = started.elapsed().as_millis();
        let failure = match result {
            Ok(report) => check(&case.expectations, &report, elapsed_ms).err(),
            Err(e) => Some(e.to_string()),
        };
        tracing::debug!(case = %case.name, elapsed_ms = elapsed_ms as u64, passed = failure.is_none(), "case finished");
        outcomes.push(CaseOutcome {
            name: case.name.clone(),
            failure,
        });
    }
    outcomes
}

fn check(
    expect: &Expectations,
    report: &VerificationReport,
    elapsed_ms: u128,
) -> Result<(), String> {
    if let Some(kind) = &expect.kind {
        let actual = report.kind.as_str();
        if !kind.eq_ignore_ascii_case(actual) {
            return Err(format!("expected type {kind}, got {actual}"));
        }
    }
    if let Some(valid) = expect.valid {
        if report.verification.valid != valid {
            return Err(format!(
                "expected valid={valid}, got valid={} ({})",
                report.verification.valid, report.verification.reason
            ));
        }
    }
    if let Some(address) = &expect.address {
        let actual = report
            .verification
            .address
            .as_deref()
            .or_else(|| issuer_of(report).and_then(PkhDid::trailing_segment));
        match actual {
            Some(actual) if actual.eq_ignore_ascii_case(address) => {}
            Some(actual) => return Err(format!("expected address {address}, got {actual}")),
            None => return Err(format!("expected address {address}, report has none")),
        }
    }
    if let Some(chain) = &expect.chain_id {
        let issuer = issuer_of(report).unwrap_or_default();
        if !chain_matches(chain, issuer) {
            return Err(format!("expected chain {chain}, issuer is {issuer:?}"));
        }
    }
    if let Some(limit) = expect.max_response_time_ms {
        if elapsed_ms > u128::from(limit) {
            return Err(format!("took {elapsed_ms}ms, limit {limit}ms"));
        }
    }
    Ok(())
}

/// Issuer of the credential behind `report`. A Cacao report carries it in
/// the payload rather than at the top level.
fn issuer_of(report: &VerificationReport) -> Option<&str> {
    report
        .issuer
        .as_deref()
        .or_else(|| report.payload.get("iss").and_then(Value::as_str))
}

/// `8453` matches the chain reference; `eip155:8453` must match the
/// namespace too.
fn chain_matches(expected: &str, issuer: &str) -> bool {
    let Ok(did) = PkhDid::parse(issuer) else {
        return false;
    };
    match expected.split_once(':') {
        None => did.chain_id() == expected,
        Some((_, reference)) => {
            reference == did.chain_id() && issuer.contains(&format!(":{expected}:"))
        }
    }
}

/// Execute `wc-auth test`. Exit code 1 when any case fails.
pub fn run_test(args: &TestArgs, config: &CliConfig) -> Result<u8> {
    let suite = load_suite(&args.file)?;
    println!(
        "Loaded {}: {}",
        args.file.display(),
        suite.description.as_deref().unwrap_or("No description")
    );
    println!("Found {} test cases.", suite.cases.len());

    let verifier = crate::build_verifier(args.rpc_url.as_deref(), args.offline, config)?;
    let rt = crate::runtime()?;
    let outcomes = rt.block_on(run_suite(&suite, verifier.as_ref()));

    for outcome in &outcomes {
        println!("{}", outcome.line());
    }
    let failed = outcomes.iter().filter(|o| !o.passed()).count();
    println!(
        "Test summary: {} passed, {failed} failed",
        outcomes.len() - failed
    );
    Ok(if failed == 0 { 0 } else { 1 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wca_verify::{CredentialKind, VerificationStatus};

    const DID: &str = "did:pkh:eip155:8453:0xabc0000000000000000000000000000000000001";

    #[test]
    fn chain_reference_or_full_id() {
        assert!(chain_matches("8453", DID));
        assert!(chain_matches("eip155:8453", DID));
        assert!(!chain_matches("eip155:1", DID));
        assert!(!chain_matches("solana:8453", DID));
        assert!(!chain_matches("8453", "urn:example:issuer"));
    }

    fn cacao_report(issuer: &str) -> VerificationReport {
        VerificationReport {
            kind: CredentialKind::Cacao,
            header: json!({"t": "eip4361"}),
            payload: json!({"iss": issuer, "domain": "example.com"}),
            issuer: None,
            signature: Some(json!({"t": "eip191", "s": "0x00"})),
            verification: VerificationStatus::valid(
                "0xabc0000000000000000000000000000000000001",
                "Signature valid",
            ),
        }
    }

    #[test]
    fn cacao_issuer_read_from_payload() {
        let report = cacao_report(DID);
        assert_eq!(issuer_of(&report), Some(DID));

        let expect = Expectations {
            chain_id: Some("eip155:8453".into()),
            ..Default::default()
        };
        assert_eq!(check(&expect, &report, 1), Ok(()));

        let expect = Expectations {
            chain_id: Some("eip155:1".into()),
            ..Default::default()
        };
        let err = check(&expect, &report, 1).unwrap_err();
        assert!(err.contains(DID), "{err}");
    }

    #[test]
    fn expectations_use_camel_case() {
        let yaml = "type: JWT\nvalid: false\nchainId: '1'\nmaxResponseTimeMs: 50\n";
        let expect: Expectations = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(expect.kind.as_deref(), Some("JWT"));
        assert_eq!(expect.valid, Some(false));
        assert_eq!(expect.chain_id.as_deref(), Some("1"));
        assert_eq!(expect.max_response_time_ms, Some(50));
    }

    #[test]
    fn unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("suite.toml");
        std::fs::write(&path, "cases = []").unwrap();
        let err = load_suite(&path).unwrap_err();
        assert!(err.to_string().contains("use .json, .yaml or .yml"));
    }

    #[test]
    fn json_suite_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("suite.json");
        std::fs::write(
            &path,
            r#"{"cases":[{"name":"a","token":"x"},{"name":"b","token":"y","expectations":{"valid":true}}]}"#,
        )
        .unwrap();
        let suite = load_suite(&path).unwrap();
        assert!(suite.description.is_none());
        assert_eq!(suite.cases.len(), 2);
        assert_eq!(suite.cases[1].expectations.valid, Some(true));
    }

    #[test]
    fn outcome_lines() {
        let ok = CaseOutcome {
            name: "a".into(),
            failure: None,
        };
        let bad = CaseOutcome {
            name: "b".into(),
            failure: Some("expected valid=true".into()),
        };
        assert_eq!(ok.line(), "✓ a");
        assert_eq!(bad.line(), "✗ b: expected valid=true");
    }
}
