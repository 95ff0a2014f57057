//! # Credential Decoder
//!
//! Classifies an opaque token by running an ordered chain of parsers. Each
//! parser answers one of three ways:
//!
//! - `Ok(Some(credential))`: recognised, stop.
//! - `Ok(None)`: not this shape, try the next parser.
//! - `Err(..)`: recognised but structurally broken, abort.
//!
//! Order: three-segment JWT, base64-wrapped Cacao JSON, raw Cacao JSON.
//! Nothing here inspects signatures.

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::credential::{CacaoCredential, Credential, JwtCredential};
use crate::error::VerifyError;

type ParseStep = fn(&str) -> Result<Option<Credential>, VerifyError>;

const PARSERS: [(&str, ParseStep); 3] = [
    ("jwt", parse_jwt),
    ("base64-cacao", parse_base64_cacao),
    ("json-cacao", parse_json_cacao),
];

/// Decode a token into a [`Credential`].
pub fn decode(input: &str) -> Result<Credential, VerifyError> {
    let input = input.trim();
    for (name, parser) in PARSERS {
        if let Some(credential) = parser(input)? {
            tracing::debug!(parser = name, "token recognised");
            return Ok(credential);
        }
        tracing::trace!(parser = name, "token shape not matched");
    }
    Err(VerifyError::invalid_token())
}

fn parse_jwt(input: &str) -> Result<Option<Credential>, VerifyError> {
    let segments: Vec<&str> = input.split('.').collect();
    if segments.len() != 3 || segments.iter().any(|s| s.is_empty()) {
        return Ok(None);
    }
    let (Some(header), Some(payload)) = (
        decode_jwt_segment(segments[0]),
        decode_jwt_segment(segments[1]),
    ) else {
        return Ok(None);
    };
    Ok(Some(Credential::Jwt(JwtCredential::new(
        header,
        payload,
        segments[2],
    ))))
}

fn decode_jwt_segment(segment: &str) -> Option<Map<String, Value>> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment.trim_end_matches('='))
        .ok()?;
    match serde_json::from_slice(&bytes).ok()? {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

fn parse_base64_cacao(input: &str) -> Result<Option<Credential>, VerifyError> {
    let Some(bytes) = decode_base64_any(input) else {
        return Ok(None);
    };
    let Ok(text) = String::from_utf8(bytes) else {
        return Ok(None);
    };
    let text = text.trim();
    if !text.starts_with('{') {
        return Ok(None);
    }
    match serde_json::from_str::<Value>(text) {
        Ok(value) => cacao_from_value(&value).map(Some),
        Err(e) => {
            tracing::debug!(error = %e, "base64 payload is not JSON");
            Ok(None)
        }
    }
}

fn parse_json_cacao(input: &str) -> Result<Option<Credential>, VerifyError> {
    match serde_json::from_str::<Value>(input) {
        Ok(value @ Value::Object(_)) => cacao_from_value(&value).map(Some),
        _ => Ok(None),
    }
}

fn decode_base64_any(input: &str) -> Option<Vec<u8>> {
    [STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD]
        .iter()
        .find_map(|engine| engine.decode(input).ok())
}

/// Validate the three sections, then type them.
fn cacao_from_value(value: &Value) -> Result<Credential, VerifyError> {
    let Value::Object(object) = value else {
        return Err(VerifyError::invalid_cacao("expected a JSON object"));
    };
    let header = section(object, "h", "header")?;
    let payload = section(object, "p", "payload")?;
    let signature = section(object, "s", "signature")?;

    Ok(Credential::Cacao(CacaoCredential {
        header: typed(header, "header")?,
        payload: typed(payload, "payload")?,
        signature: typed(signature, "signature")?,
    }))
}

fn section<'a>(
    object: &'a Map<String, Value>,
    short: &str,
    long: &str,
) -> Result<&'a Value, VerifyError> {
    let value = object
        .get(short)
        .or_else(|| object.get(long))
        .filter(|v| !v.is_null())
        .ok_or_else(|| VerifyError::invalid_cacao(format!("missing {long}")))?;
    if !value.is_object() {
        return Err(VerifyError::invalid_cacao(format!("{long} is not an object")));
    }
    Ok(value)
}

fn typed<T: DeserializeOwned>(value: &Value, name: &str) -> Result<T, VerifyError> {
    serde_json::from_value(value.clone())
        .map_err(|e| VerifyError::invalid_cacao(format!("{name}: {e}")))
}
