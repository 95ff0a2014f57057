//! # CLI Configuration
//!
//! Persistent user settings stored as YAML. Resolution order for the file
//! location: explicit `--config` path, then `$WC_AUTH_CONFIG`, then
//! `<config_dir>/wc-auth/config.yaml`. A missing file yields defaults.
//!
//! `WC_AUTH_RPC_URL` overrides the stored RPC endpoint at load time;
//! command-line flags override both.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::identity::ChainId;

/// Environment variable naming an alternate config file.
pub const CONFIG_PATH_ENV: &str = "WC_AUTH_CONFIG";

/// Environment variable overriding `rpc_url`.
pub const RPC_URL_ENV: &str = "WC_AUTH_RPC_URL";

/// Keys accepted by [`CliConfig::get`] and [`CliConfig::set`].
pub const CONFIG_KEYS: [&str; 4] = ["rpc_url", "chain", "domain", "output"];

/// Render mode for command output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty-printed JSON.
    Json,
    /// YAML document.
    Yaml,
    /// Human-readable tables.
    #[default]
    Pretty,
}

impl OutputFormat {
    /// Lowercase name as accepted on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Pretty => "pretty",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "pretty" => Ok(Self::Pretty),
            other => Err(format!(
                "unknown output format {other:?}; expected json, yaml or pretty"
            )),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User settings persisted between invocations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// JSON-RPC endpoint used for contract-wallet signature checks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<String>,
    /// Default CAIP-2 chain for authentication requests.
    pub chain: String,
    /// Default domain placed in SIWE messages.
    pub domain: String,
    /// Default output format.
    pub output: OutputFormat,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            rpc_url: None,
            chain: ChainId::mainnet().to_string(),
            domain: "wc-auth.cli".to_string(),
            output: OutputFormat::Pretty,
        }
    }
}

impl CliConfig {
    /// Resolve the config file location.
    pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }
        dirs::config_dir()
            .map(|dir| dir.join("wc-auth").join("config.yaml"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load the file at `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file absent, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply environment overrides on top of file values.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(RPC_URL_ENV) {
            if !url.trim().is_empty() {
                self.rpc_url = Some(url);
            }
        }
        self
    }

    /// Write the config to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read a single key. `Ok(None)` for an unset optional key.
    pub fn get(&self, key: &str) -> Result<Option<String>, ConfigError> {
        match key {
            "rpc_url" => Ok(self.rpc_url.clone()),
            "chain" => Ok(Some(self.chain.clone())),
            "domain" => Ok(Some(self.domain.clone())),
            "output" => Ok(Some(self.output.to_string())),
            other => Err(unknown_key(other)),
        }
    }

    /// Validate and set a single key.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidValue {
            key: key.to_string(),
            reason,
        };
        match key {
            "rpc_url" => {
                let parsed = url::Url::parse(value).map_err(|e| invalid(e.to_string()))?;
                if !matches!(parsed.scheme(), "http" | "https") {
                    return Err(invalid(format!(
                        "scheme must be http or https, got {}",
                        parsed.scheme()
                    )));
                }
                self.rpc_url = Some(value.to_string());
            }
            "chain" => {
                ChainId::parse(value).map_err(|e| invalid(e.to_string()))?;
                self.chain = value.to_string();
            }
            "domain" => {
                if value.trim().is_empty() || value.contains(char::is_whitespace) {
                    return Err(invalid("domain must be a non-empty host".to_string()));
                }
                self.domain = value.to_string();
            }
            "output" => {
                self.output = value.parse().map_err(invalid)?;
            }
            other => return Err(unknown_key(other)),
        }
        Ok(())
    }
}

fn unknown_key(key: &str) -> ConfigError {
    ConfigError::UnknownKey {
        key: key.to_string(),
        known: CONFIG_KEYS.join(", "),
    }
}
