//! # Credential Data Model
//!
//! A decoded token is either a [`JwtCredential`] or a [`CacaoCredential`].
//! Neither is trusted: decoding only establishes shape.
//!
//! Cacao objects serialize with the compact CAIP-74 keys (`h`/`p`/`s`,
//! `iss`, `aud`, `iat`, ...). The long names some encoders emit (`header`,
//! `issuer`, `issuedAt`, `signatureValue`, ...) are accepted on input.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Which encoding a credential arrived in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CredentialKind {
    /// Three-segment JSON Web Token.
    #[serde(rename = "JWT")]
    Jwt,
    /// CAIP-74 capability object.
    Cacao,
}

impl CredentialKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jwt => "JWT",
            Self::Cacao => "Cacao",
        }
    }
}

/// A decoded credential.
#[derive(Debug, Clone, PartialEq)]
pub enum Credential {
    Jwt(JwtCredential),
    Cacao(CacaoCredential),
}

impl Credential {
    pub fn kind(&self) -> CredentialKind {
        match self {
            Self::Jwt(_) => CredentialKind::Jwt,
            Self::Cacao(_) => CredentialKind::Cacao,
        }
    }

    /// The issuer string, when the credential names one.
    pub fn issuer(&self) -> Option<&str> {
        match self {
            Self::Jwt(jwt) => jwt.issuer.as_deref(),
            Self::Cacao(cacao) => Some(cacao.payload.issuer.as_str()),
        }
    }
}

/// Header and claims of a JWT. The signature segment is kept verbatim and
/// never checked.
#[derive(Debug, Clone, PartialEq)]
pub struct JwtCredential {
    pub header: Map<String, Value>,
    pub payload: Map<String, Value>,
    /// `payload.iss` when it is a string.
    pub issuer: Option<String>,
    pub signature_segment: String,
}

impl JwtCredential {
    pub fn new(header: Map<String, Value>, payload: Map<String, Value>, signature: &str) -> Self {
        let issuer = payload
            .get("iss")
            .and_then(Value::as_str)
            .map(str::to_string);
        Self {
            header,
            payload,
            issuer,
            signature_segment: signature.to_string(),
        }
    }
}

/// CAIP-74 capability object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacaoCredential {
    #[serde(rename = "h", alias = "header")]
    pub header: CacaoHeader,
    #[serde(rename = "p", alias = "payload")]
    pub payload: CacaoPayload,
    #[serde(rename = "s", alias = "signature")]
    pub signature: CacaoSignature,
}

impl CacaoCredential {
    /// Compact JSON, standard base64. This is the form `decode` accepts.
    pub fn to_base64(&self) -> Result<String, serde_json::Error> {
        Ok(STANDARD.encode(serde_json::to_vec(self)?))
    }

    /// The text the signature covers, when the encoder embedded it.
    pub fn embedded_message(&self) -> Option<&str> {
        self.signature
            .message
            .as_deref()
            .filter(|m| !m.is_empty())
    }
}

/// `h` section.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CacaoHeader {
    /// Message format tag, e.g. `eip4361`.
    #[serde(rename = "t", alias = "type", default)]
    pub kind: String,
}

/// `p` section. Every field is optional on input so that reconstruction can
/// proceed with whatever the encoder supplied.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CacaoPayload {
    /// `did:pkh:<namespace>:<chain>:<address>`.
    #[serde(rename = "iss", alias = "issuer", default)]
    pub issuer: String,
    #[serde(default)]
    pub domain: String,
    /// Sign-in URI.
    #[serde(rename = "aud", alias = "audience", default)]
    pub audience: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub version: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub nonce: String,
    #[serde(rename = "iat", alias = "issuedAt", default)]
    pub issued_at: String,
    #[serde(
        rename = "nbf",
        alias = "notBefore",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub not_before: Option<String>,
    #[serde(
        rename = "exp",
        alias = "expirationTime",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub expiration_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement: Option<String>,
    #[serde(
        rename = "requestId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<String>>,
}

/// `s` section.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CacaoSignature {
    /// Signature scheme tag, e.g. `eip191`.
    #[serde(rename = "t", alias = "type", default)]
    pub kind: String,
    /// Hex signature.
    #[serde(rename = "s", alias = "signatureValue", default)]
    pub value: String,
    /// Exact signed text, when embedded.
    #[serde(
        rename = "m",
        alias = "originalMessage",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub message: Option<String>,
}

// Some encoders emit `version: 1` or a numeric nonce.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}
