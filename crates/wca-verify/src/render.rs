//! # Report Rendering
//!
//! `json` and `yaml` serialize the report as-is, keeping typed values.
//! `pretty` prints two-column tables for header and payload, the signature
//! block as indented text and the verdict last.

use serde::Serialize;
use serde_json::Value;
use wca_core::OutputFormat;

use crate::report::{VerificationReport, VerificationStatus};

/// Rendering failed (serializer error).
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Render any serializable value in a structured format, or as indented
/// key/value text for `pretty`.
pub fn render_value<T: Serialize>(value: &T, format: OutputFormat) -> Result<String, RenderError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
        OutputFormat::Pretty => Ok(indented(&serde_json::to_value(value)?, 0)),
    }
}

/// Render a verification report.
pub fn render_report(
    report: &VerificationReport,
    format: OutputFormat,
) -> Result<String, RenderError> {
    match format {
        OutputFormat::Pretty => Ok(pretty_report(report)),
        structured => render_value(report, structured),
    }
}

fn pretty_report(report: &VerificationReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} decoded\n", report.kind.as_str()));

    out.push_str("\nHeader:\n");
    out.push_str(&table(&report.header));

    out.push_str("\nPayload:\n");
    out.push_str(&table(&report.payload));

    if let Some(signature) = &report.signature {
        out.push_str("\nSignature:\n");
        out.push_str(&indented(signature, 1));
        out.push('\n');
    }
    if let Some(issuer) = &report.issuer {
        out.push_str(&format!("\nIssuer: {issuer}\n"));
    }

    out.push_str("\nVerification:\n");
    out.push_str(&verdict(&report.verification));
    out
}

fn verdict(status: &VerificationStatus) -> String {
    let label = match (status.valid, status.tentative) {
        (true, true) => "VALID (tentative)",
        (true, false) => "VALID",
        (false, _) => "INVALID",
    };
    let mut out = format!("  Status:  {label}\n");
    if let Some(address) = &status.address {
        out.push_str(&format!("  Address: {address}\n"));
    }
    out.push_str(&format!("  Reason:  {}\n", status.reason));
    out
}

/// Plain cell text: strings unquoted, everything else compact JSON.
fn cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Two-column `Key | Value` table over the entries of an object.
fn table(value: &Value) -> String {
    let rows: Vec<(String, String)> = match value {
        Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), cell(v))).collect(),
        other => vec![("value".to_string(), cell(other))],
    };

    let key_width = rows
        .iter()
        .map(|(k, _)| k.chars().count())
        .chain(std::iter::once("Key".len()))
        .max()
        .unwrap_or(3);
    let value_width = rows
        .iter()
        .map(|(_, v)| v.chars().count())
        .chain(std::iter::once("Value".len()))
        .max()
        .unwrap_or(5);

    let rule = format!("+{}+{}+\n", "-".repeat(key_width + 2), "-".repeat(value_width + 2));
    let line = |k: &str, v: &str| {
        format!(
            "| {k}{} | {v}{} |\n",
            " ".repeat(key_width - k.chars().count()),
            " ".repeat(value_width - v.chars().count())
        )
    };

    let mut out = String::new();
    out.push_str(&rule);
    out.push_str(&line("Key", "Value"));
    out.push_str(&rule);
    for (k, v) in &rows {
        out.push_str(&line(k, v));
    }
    out.push_str(&rule);
    out
}

/// Nested `key: value` text, two spaces per level.
fn indented(value: &Value, depth: usize) -> String {
    let pad = "  ".repeat(depth);
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| match v {
                Value::Object(_) | Value::Array(_) => {
                    format!("{pad}{k}:\n{}", indented(v, depth + 1))
                }
                scalar => format!("{pad}{k}: {}", multiline(&cell(scalar), &pad)),
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| match v {
                Value::Object(_) | Value::Array(_) => {
                    format!("{pad}[{i}]\n{}", indented(v, depth + 1))
                }
                scalar => format!("{pad}[{i}] {}", cell(scalar)),
            })
            .collect::<Vec<_>>()
            .join("\n"),
        scalar => format!("{pad}{}", cell(scalar)),
    }
}

// Signed SIWE text spans lines; keep continuation lines under their key.
fn multiline(text: &str, pad: &str) -> String {
    if !text.contains('\n') {
        return text.to_string();
    }
    let inner = format!("\n{pad}  | ");
    format!("|{inner}{}", text.split('\n').collect::<Vec<_>>().join(&inner))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::{Credential, JwtCredential};
    use serde_json::{json, Map};

    fn jwt_report() -> VerificationReport {
        let Value::Object(header) = json!({"alg": "HS256", "typ": "JWT"}) else {
            unreachable!()
        };
        let Value::Object(payload) = json!({"iss": "urn:example:issuer", "iat": 1_700_000_000})
        else {
            unreachable!()
        };
        let jwt = JwtCredential::new(header, payload, "sig");
        VerificationReport::new(
            &Credential::Jwt(jwt),
            VerificationStatus::invalid("Issuer is not a DID"),
        )
    }

    #[test]
    fn json_keeps_typed_values() {
        let text = render_report(&jwt_report(), OutputFormat::Json).unwrap();
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["payload"]["iat"], 1_700_000_000);
        assert_eq!(parsed["verification"]["valid"], false);
    }

    #[test]
    fn yaml_parses_back() {
        let text = render_report(&jwt_report(), OutputFormat::Yaml).unwrap();
        let parsed: serde_yaml::Value = serde_yaml::from_str(&text).unwrap();
        assert_eq!(parsed["type"].as_str(), Some("JWT"));
        assert_eq!(parsed["payload"]["iat"].as_i64(), Some(1_700_000_000));
    }

    #[test]
    fn pretty_has_tables_and_verdict() {
        let text = render_report(&jwt_report(), OutputFormat::Pretty).unwrap();
        assert!(text.starts_with("JWT decoded\n"));
        assert!(text.contains("| Key | Value |"));
        assert!(text.contains("| alg | HS256 |"));
        assert!(text.contains("| iat_iso | 2023-11-14T22:13:20.000Z |"));
        assert!(text.contains("Issuer: urn:example:issuer"));
        assert!(text.contains("  Status:  INVALID\n"));
        assert!(text.contains("  Reason:  Issuer is not a DID\n"));
    }

    #[test]
    fn table_pads_to_widest_cell() {
        let text = table(&json!({"a": "x", "long_key": "value-that-is-long"}));
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines.iter().all(|l| l.chars().count() == lines[0].chars().count()));
    }

    #[test]
    fn indented_signature_block() {
        let text = indented(&json!({"t": "eip191", "s": "0x01", "m": "line one\nline two"}), 1);
        assert!(text.contains("  t: eip191"));
        assert!(text.contains("  m: |\n    | line one\n    | line two"));
    }

    #[test]
    fn render_value_pretty_nested() {
        let text = render_value(
            &json!({"session": {"accounts": ["eip155:1:0xabc"]}}),
            OutputFormat::Pretty,
        )
        .unwrap();
        assert_eq!(text, "session:\n  accounts:\n    [0] eip155:1:0xabc");
    }

    #[test]
    fn empty_object_table() {
        let text = table(&Value::Object(Map::new()));
        assert_eq!(text.lines().count(), 4);
    }
}
