//! # Verify Subcommand
//!
//! Decodes a JWT or Cacao token, verifies the Cacao signature (or the JWT
//! issuer shape) and prints the report.
//!
//! ## Security Invariant
//!
//! A JWT is reported `valid` only tentatively, on issuer structure. The
//! pretty output labels it `VALID (tentative)` and the JSON/YAML output
//! carries `tentative: true`.

use std::io::Read;

use anyhow::{Context, Result};
use clap::Args;

use wca_core::{CliConfig, OutputFormat};
use wca_verify::{render_report, verify_token};

/// Arguments for `wc-auth verify`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// JWT, base64 Cacao, or raw Cacao JSON. `-` reads from stdin.
    #[arg(value_name = "TOKEN")]
    pub token: String,

    /// Output format: json, yaml or pretty.
    #[arg(long, short)]
    pub output: Option<OutputFormat>,

    /// JSON-RPC endpoint for contract-wallet (EIP-1271) checks.
    #[arg(long)]
    pub rpc_url: Option<String>,

    /// Use local signature recovery only; never contact a node.
    #[arg(long, conflicts_with = "rpc_url")]
    pub offline: bool,
}

/// Execute `wc-auth verify`.
pub fn run_verify(args: &VerifyArgs, config: &CliConfig) -> Result<u8> {
    let rendered = verify_output(args, config)?;
    println!("{rendered}");
    Ok(0)
}

/// Run the pipeline and render the report without printing it.
pub fn verify_output(args: &VerifyArgs, config: &CliConfig) -> Result<String> {
    let token = read_token(&args.token)?;
    let format = args.output.unwrap_or(config.output);
    let verifier = crate::build_verifier(args.rpc_url.as_deref(), args.offline, config)?;

    let rt = crate::runtime()?;
    let report = rt.block_on(verify_token(&token, verifier.as_ref()))?;
    Ok(render_report(&report, format)?)
}

fn read_token(arg: &str) -> Result<String> {
    if arg != "-" {
        return Ok(arg.to_string());
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("failed to read token from stdin")?;
    Ok(buf.trim().to_string())
}
