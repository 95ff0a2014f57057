//! # Request Subcommand
//!
//! `wc-auth request siwe` and `wc-auth request cacao` run a sign-in request
//! against a [`LoopbackWallet`]. The wallet key comes from `--private-key`
//! or `WC_AUTH_PRIVATE_KEY`; without either an ephemeral key is generated.
//!
//! The Cacao output includes a base64 token that `wc-auth verify` accepts.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use wca_core::{ChainId, CliConfig, OutputFormat};
use wca_crypto::EthSigningKey;
use wca_verify::render_value;
use wca_wallet::{
    request_cacao, request_siwe, AuthRequest, LoopbackWallet, WalletConnector, WalletEvent,
};

/// Arguments for `wc-auth request`.
#[derive(Args, Debug)]
pub struct RequestArgs {
    #[command(subcommand)]
    pub command: RequestCommand,
}

/// Request flows.
#[derive(Subcommand, Debug)]
pub enum RequestCommand {
    /// Sign-In with Ethereum (EIP-4361).
    Siwe(AuthFlags),
    /// CAIP-74 Cacao with an embedded SIWE message.
    Cacao(AuthFlags),
}

/// Flags shared by both flows.
#[derive(Args, Debug, Clone)]
pub struct AuthFlags {
    /// CAIP-2 chain, e.g. eip155:8453. Defaults to the configured chain.
    #[arg(long, short)]
    pub chain: Option<String>,

    /// Domain requesting the signature. Defaults to the configured domain.
    #[arg(long, short)]
    pub domain: Option<String>,

    /// Sign-in URI. Defaults to https://<domain>.
    #[arg(long)]
    pub uri: Option<String>,

    /// Human-readable statement placed in the message.
    #[arg(long)]
    pub statement: Option<String>,

    /// Nonce. Random 12-character alphanumeric when omitted.
    #[arg(long)]
    pub nonce: Option<String>,

    /// Resource URI; repeat for several.
    #[arg(long = "resource", value_name = "URI")]
    pub resources: Vec<String>,

    /// Hex private key of the loopback wallet.
    #[arg(long, env = "WC_AUTH_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,

    /// Output format: json, yaml or pretty.
    #[arg(long, short)]
    pub output: Option<OutputFormat>,
}

impl AuthFlags {
    fn auth_request(&self, config: &CliConfig) -> Result<AuthRequest> {
        let chain_text = self.chain.as_deref().unwrap_or(&config.chain);
        let chain = ChainId::parse(chain_text)
            .with_context(|| format!("invalid --chain {chain_text:?}"))?;
        let domain = self.domain.clone().unwrap_or_else(|| config.domain.clone());
        Ok(AuthRequest {
            chain,
            domain,
            uri: self.uri.clone(),
            statement: self.statement.clone(),
            nonce: self.nonce.clone(),
            resources: self.resources.clone(),
        })
    }

    fn wallet(&self) -> Result<LoopbackWallet> {
        let key = match &self.private_key {
            Some(hex) => EthSigningKey::from_hex(hex).context("invalid --private-key")?,
            None => {
                tracing::warn!("no --private-key given, signing with an ephemeral key");
                EthSigningKey::generate()
            }
        };
        Ok(LoopbackWallet::create(key))
    }
}

/// Execute `wc-auth request`.
pub fn run_request(args: &RequestArgs, config: &CliConfig) -> Result<u8> {
    let rendered = request_output(args, config)?;
    println!("{rendered}");
    Ok(0)
}

/// Run the requested flow and render its outcome.
pub fn request_output(args: &RequestArgs, config: &CliConfig) -> Result<String> {
    let flags = match &args.command {
        RequestCommand::Siwe(flags) | RequestCommand::Cacao(flags) => flags,
    };
    let request = flags.auth_request(config)?;
    let format = flags.output.unwrap_or(config.output);
    let wallet = flags.wallet()?;
    wallet.subscribe(Arc::new(log_event));

    let rt = crate::runtime()?;
    rt.block_on(run_and_dispose(&args.command, &wallet, &request, format))
}

/// Run the flow, then dispose the wallet whether or not the flow succeeded.
async fn run_and_dispose(
    command: &RequestCommand,
    wallet: &dyn WalletConnector,
    request: &AuthRequest,
    format: OutputFormat,
) -> Result<String> {
    let rendered = run_flow(command, wallet, request, format).await;
    let disposed = wallet.dispose().await;
    let rendered = rendered?;
    disposed?;
    Ok(rendered)
}

async fn run_flow(
    command: &RequestCommand,
    wallet: &dyn WalletConnector,
    request: &AuthRequest,
    format: OutputFormat,
) -> Result<String> {
    match command {
        RequestCommand::Siwe(_) => {
            let outcome = request_siwe(wallet, request)
                .await
                .context("SIWE request failed")?;
            Ok(render_value(&outcome, format)?)
        }
        RequestCommand::Cacao(_) => {
            let outcome = request_cacao(wallet, request)
                .await
                .context("Cacao request failed")?;
            Ok(render_value(&outcome, format)?)
        }
    }
}

fn log_event(event: &WalletEvent) {
    match event {
        WalletEvent::DisplayUri(uri) => tracing::info!(%uri, "pairing URI"),
        WalletEvent::SessionEstablished { topic } => tracing::info!(%topic, "session established"),
        WalletEvent::SessionRequest { topic, method } => {
            tracing::info!(%topic, %method, "session request")
        }
        WalletEvent::SessionDelete { topic } => tracing::info!(%topic, "session deleted"),
    }
}
