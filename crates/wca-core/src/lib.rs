//! # wca-core: Foundational Types for wc-auth
//!
//! Leaf crate of the workspace. Defines the identifier newtypes shared by
//! every other crate, the UTC timestamp helpers used when rendering token
//! claims, and the on-disk CLI configuration.
//!
//! ## Key Design Principles
//!
//! 1. **Newtypes for identifiers.** `EthAddress`, `PkhDid`, `ChainId` and
//!    `AccountId` are parsed once at the boundary. No bare `split(':')`
//!    scattered through command handlers.
//!
//! 2. **UTC-only timestamps.** `Timestamp` always renders with a `Z` suffix
//!    and millisecond precision, the shape wallets put in SIWE messages.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `wca-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod config;
pub mod error;
pub mod identity;
pub mod temporal;

pub use config::{CliConfig, OutputFormat};
pub use error::{ConfigError, IdentityError};
pub use identity::{AccountId, ChainId, EthAddress, PkhDid};
pub use temporal::Timestamp;
