//! # Config Subcommand
//!
//! `wc-auth config show|get|set|reset|path` manages the YAML settings file.
//! `set` validates the value before anything is written.

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use wca_core::{CliConfig, OutputFormat};
use wca_verify::render_value;

/// Arguments for `wc-auth config`.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration.
    Show {
        #[arg(long, short)]
        output: Option<OutputFormat>,
    },
    /// Print one value.
    Get { key: String },
    /// Validate and store one value.
    Set { key: String, value: String },
    /// Restore the defaults.
    Reset,
    /// Print the config file location.
    Path,
}

/// Execute `wc-auth config`.
pub fn run_config(args: &ConfigArgs, path: &Path, config: &CliConfig) -> Result<u8> {
    if let Some(text) = config_output(args, path, config)? {
        println!("{text}");
    }
    Ok(0)
}

/// Apply the subcommand; returns the text to print, if any.
pub fn config_output(args: &ConfigArgs, path: &Path, config: &CliConfig) -> Result<Option<String>> {
    match &args.command {
        ConfigCommand::Show { output } => {
            let format = output.unwrap_or(OutputFormat::Yaml);
            Ok(Some(render_value(config, format)?.trim_end().to_string()))
        }
        ConfigCommand::Get { key } => {
            let value = config.get(key)?;
            Ok(Some(value.unwrap_or_default()))
        }
        ConfigCommand::Set { key, value } => {
            // Edit the stored file, not the env-overridden view.
            let mut stored = CliConfig::load(path)?;
            stored.set(key, value)?;
            stored
                .save(path)
                .with_context(|| format!("failed to save {}", path.display()))?;
            tracing::info!(key = %key, path = %path.display(), "config updated");
            Ok(None)
        }
        ConfigCommand::Reset => {
            CliConfig::default().save(path)?;
            tracing::info!(path = %path.display(), "config reset to defaults");
            Ok(None)
        }
        ConfigCommand::Path => Ok(Some(path.display().to_string())),
    }
}
