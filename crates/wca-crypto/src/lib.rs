//! # wca-crypto: Ethereum Signature Primitives
//!
//! - **Keccak-256** and the **EIP-191** personal-message hash
//!   (`"\x19Ethereum Signed Message:\n" || len || message`).
//! - **secp256k1** public-key recovery from 65-byte `r || s || v`
//!   signatures and derivation of the signer's Ethereum address.
//! - **EIP-55** mixed-case checksum rendering.
//! - [`EthSigningKey`], a local key for wallets that sign in-process.
//!
//! ## Crate Policy
//!
//! - Depends only on `wca-core` internally.
//! - No network access. Contract-wallet checks live in `wca-verify`.
//! - No mocking of cryptographic operations in tests: every test signs with a
//!   real key and recovers with real curve arithmetic.

pub mod eip191;
pub mod error;
pub mod secp256k1;

pub use eip191::{hash_personal_message, keccak256};
pub use error::CryptoError;
pub use secp256k1::{
    address_of, recover_personal_signer, to_checksum_address, verify_personal_message,
    EthSigningKey, RecoverableSignature,
};
