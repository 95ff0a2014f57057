//! # wca-cli: the `wc-auth` Command-Line Tool
//!
//! ## Subcommands
//!
//! - `wc-auth verify <token>`: decode a JWT or Cacao and check its signature.
//! - `wc-auth request siwe|cacao`: run a sign-in request against a wallet.
//! - `wc-auth link <wc-uri>`: universal and deep links for a pairing URI.
//! - `wc-auth config show|get|set|reset|path`: manage the config file.
//! - `wc-auth test --file <suite>`: run a YAML/JSON suite of tokens with
//!   expectations.
//!
//! Handlers return the process exit code. Output goes to stdout; logs go to
//! stderr so `--output json` stays machine-readable.

pub mod config;
pub mod link;
pub mod request;
pub mod test_suite;
pub mod verify;

use anyhow::{Context, Result};
use wca_core::CliConfig;
use wca_verify::{LocalVerifier, MessageVerifier, RpcVerifier, DEFAULT_RPC_URL};

/// Single-threaded runtime for one command.
pub fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")
}

/// Pick the signature verifier: local-only when `offline`, otherwise the
/// RPC verifier against the flag, the configured endpoint, or the default.
pub fn build_verifier(
    rpc_url: Option<&str>,
    offline: bool,
    config: &CliConfig,
) -> Result<Box<dyn MessageVerifier>> {
    if offline {
        tracing::debug!("offline: local signature recovery only");
        return Ok(Box::new(LocalVerifier));
    }
    let endpoint = rpc_url
        .or(config.rpc_url.as_deref())
        .unwrap_or(DEFAULT_RPC_URL);
    tracing::debug!(endpoint, "using JSON-RPC verifier");
    let verifier = RpcVerifier::new(endpoint)
        .with_context(|| format!("failed to set up RPC verifier for {endpoint}"))?;
    Ok(Box::new(verifier))
}
