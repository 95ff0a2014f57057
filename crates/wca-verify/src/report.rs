//! # Verification Report
//!
//! The output contract of `wc-auth verify`:
//!
//! ```json
//! { "type": "JWT" | "Cacao", "header": {..}, "payload": {..},
//!   "issuer" | "signature": .., "verification": { "valid", "address", "reason" } }
//! ```
//!
//! Building a report is a projection. It adds `<claim>_iso` siblings to the
//! JWT timestamp claims and never touches the verification status.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use wca_core::Timestamp;

use crate::credential::{Credential, CredentialKind};

/// JWT claims holding Unix-second timestamps.
pub const TIMESTAMP_CLAIMS: [&str; 3] = ["iat", "exp", "nbf"];

/// Outcome of one verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationStatus {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub reason: String,
    /// Set when `valid` rests on issuer structure alone and no signature
    /// was checked. Such a result must not gate access.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub tentative: bool,
}

impl VerificationStatus {
    pub fn valid(address: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            valid: true,
            address: Some(address.into()),
            reason: reason.into(),
            tentative: false,
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            address: None,
            reason: reason.into(),
            tentative: false,
        }
    }

    pub fn tentative(address: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            tentative: true,
            ..Self::valid(address, reason)
        }
    }
}

/// Structured result of the verify pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationReport {
    #[serde(rename = "type")]
    pub kind: CredentialKind,
    pub header: Value,
    pub payload: Value,
    /// JWT only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    /// Cacao only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<Value>,
    pub verification: VerificationStatus,
}

impl VerificationReport {
    pub fn new(credential: &Credential, verification: VerificationStatus) -> Self {
        match credential {
            Credential::Jwt(jwt) => Self {
                kind: CredentialKind::Jwt,
                header: Value::Object(jwt.header.clone()),
                payload: Value::Object(annotate_timestamps(&jwt.payload)),
                issuer: jwt.issuer.clone(),
                signature: None,
                verification,
            },
            Credential::Cacao(cacao) => Self {
                kind: CredentialKind::Cacao,
                header: to_value(&cacao.header),
                payload: to_value(&cacao.payload),
                issuer: None,
                signature: Some(to_value(&cacao.signature)),
                verification,
            },
        }
    }
}

// Plain derived structs with string keys always serialize.
fn to_value<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// Copy of `claims` with a `<claim>_iso` sibling for each numeric
/// timestamp claim. Claims that are not numbers, or are out of range, are
/// left alone.
pub fn annotate_timestamps(claims: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::with_capacity(claims.len() + TIMESTAMP_CLAIMS.len());
    for (key, value) in claims {
        out.insert(key.clone(), value.clone());
        if !TIMESTAMP_CLAIMS.contains(&key.as_str()) {
            continue;
        }
        let iso = value
            .as_f64()
            .and_then(Timestamp::from_epoch_secs_f64)
            .map(|ts| ts.to_iso8601());
        if let Some(iso) = iso {
            out.insert(format!("{key}_iso"), Value::String(iso));
        }
    }
    out
}
