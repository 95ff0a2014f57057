//! # Error Types
//!
//! Errors raised while parsing identifiers and handling the configuration
//! file. All errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.

use std::path::PathBuf;

use thiserror::Error;

/// Error parsing a chain, account, address, or DID identifier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// The issuer does not carry an address segment.
    #[error("issuer {issuer:?} must have at least three ':'-separated segments ending in a 0x address")]
    MissingAddress {
        /// The issuer string as received.
        issuer: String,
    },

    /// Not `0x` followed by 40 hex characters.
    #[error("invalid Ethereum address {0:?}: expected 0x followed by 40 hex characters")]
    InvalidAddress(String),

    /// Not a CAIP-2 `namespace:reference` chain identifier.
    #[error("invalid chain id {0:?}: expected <namespace>:<reference>, e.g. eip155:1")]
    InvalidChain(String),

    /// Not a CAIP-10 `namespace:reference:address` account identifier.
    #[error("invalid account id {0:?}: expected <namespace>:<reference>:<address>")]
    InvalidAccount(String),
}

/// Error loading, saving, or editing the CLI configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Reading or writing the file failed.
    #[error("config file {path}: {source}")]
    Io {
        /// File that was being accessed.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },

    /// The file exists but is not valid YAML for the config schema.
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        /// File that failed to parse.
        path: PathBuf,
        /// YAML parser error.
        source: serde_yaml::Error,
    },

    /// Serializing the config back to YAML failed.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_yaml::Error),

    /// The platform exposes no configuration directory.
    #[error("no configuration directory available; set WC_AUTH_CONFIG or pass --config")]
    NoConfigDir,

    /// `get`/`set` on a key the config does not have.
    #[error("unknown config key {key:?}; known keys: {known}")]
    UnknownKey {
        /// The rejected key.
        key: String,
        /// Comma-separated list of accepted keys.
        known: String,
    },

    /// A value that fails validation for its key.
    #[error("invalid value for {key}: {reason}")]
    InvalidValue {
        /// The key being set.
        key: String,
        /// Why the value was rejected.
        reason: String,
    },
}
