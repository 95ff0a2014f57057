//! # Link Subcommand
//!
//! Turns a WalletConnect pairing URI into links a phone can open: the
//! universal link, or a deep link for one named wallet.

use anyhow::Result;
use clap::Args;

use wca_core::{CliConfig, OutputFormat};
use wca_verify::render_value;
use wca_wallet::{all_links, deep_link, universal_link, WalletLink};

/// Arguments for `wc-auth link`.
#[derive(Args, Debug)]
pub struct LinkArgs {
    /// WalletConnect pairing URI (`wc:...`).
    #[arg(value_name = "WC_URI")]
    pub uri: String,

    /// Deep link for one wallet (metamask, rainbow, coinbase, ...).
    #[arg(long, short, conflicts_with = "universal")]
    pub wallet: Option<String>,

    /// Only the universal link.
    #[arg(long, short)]
    pub universal: bool,

    /// Output format: json, yaml or pretty.
    #[arg(long, short)]
    pub output: Option<OutputFormat>,
}

/// Execute `wc-auth link`.
pub fn run_link(args: &LinkArgs, config: &CliConfig) -> Result<u8> {
    println!("{}", link_output(args, config)?);
    Ok(0)
}

/// Build and render the requested links.
pub fn link_output(args: &LinkArgs, config: &CliConfig) -> Result<String> {
    let links = select_links(args)?;
    match args.output.unwrap_or(config.output) {
        OutputFormat::Pretty => {
            let width = links.iter().map(|l| l.wallet.len()).max().unwrap_or(0);
            Ok(links
                .iter()
                .map(|l| format!("{:<width$}  {}", l.wallet, l.url))
                .collect::<Vec<_>>()
                .join("\n"))
        }
        format => Ok(render_value(&links, format)?),
    }
}

fn select_links(args: &LinkArgs) -> Result<Vec<WalletLink>> {
    if let Some(wallet) = &args.wallet {
        return Ok(vec![WalletLink {
            wallet: wallet.trim().to_ascii_lowercase(),
            url: deep_link(&args.uri, wallet)?,
        }]);
    }
    if args.universal {
        return Ok(vec![WalletLink {
            wallet: "universal".to_string(),
            url: universal_link(&args.uri)?,
        }]);
    }
    Ok(all_links(&args.uri)?)
}
