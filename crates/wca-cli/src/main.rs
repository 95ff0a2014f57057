//! # wc-auth CLI entry point
//!
//! Parses command-line arguments, loads the configuration file, and
//! dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use wca_cli::config::{run_config, ConfigArgs};
use wca_cli::link::{run_link, LinkArgs};
use wca_cli::request::{run_request, RequestArgs};
use wca_cli::test_suite::{run_test, TestArgs};
use wca_cli::verify::{run_verify, VerifyArgs};
use wca_core::CliConfig;

/// wc-auth: WalletConnect authentication toolkit.
///
/// Decodes and verifies JWT and Cacao credentials, runs SIWE and Cacao
/// sign-in requests, and builds wallet links for pairing URIs.
#[derive(Parser, Debug)]
#[command(name = "wc-auth", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a JWT or Cacao token and verify its signature.
    Verify(VerifyArgs),

    /// Request a SIWE message or Cacao from a wallet.
    Request(RequestArgs),

    /// Universal and deep links for a WalletConnect URI.
    Link(LinkArgs),

    /// Show or edit the configuration file.
    Config(ConfigArgs),

    /// Run a YAML/JSON suite of tokens with expectations.
    Test(TestArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("wc-auth v{} starting", env!("CARGO_PKG_VERSION"));

    match dispatch(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

fn dispatch(cli: Cli) -> Result<u8> {
    let path = CliConfig::resolve_path(cli.config.as_deref())?;
    let config = CliConfig::load(&path)?.with_env_overrides();
    tracing::debug!(path = %path.display(), "loaded configuration");

    match cli.command {
        Commands::Verify(args) => run_verify(&args, &config),
        Commands::Request(args) => run_request(&args, &config),
        Commands::Link(args) => run_link(&args, &config),
        Commands::Config(args) => run_config(&args, &path, &config),
        Commands::Test(args) => run_test(&args, &config),
    }
}
