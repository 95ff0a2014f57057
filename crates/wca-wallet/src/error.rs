//! Wallet-side error taxonomy.

use thiserror::Error;
use wca_core::IdentityError;
use wca_crypto::CryptoError;

/// Errors from wallet connection, signing requests and link generation.
#[derive(Error, Debug)]
pub enum WalletError {
    /// The connector was disposed; construct a new one.
    #[error("wallet connector has been disposed")]
    Disposed,

    /// A request was made before `connect` established a session.
    #[error("no active wallet session")]
    NotConnected,

    /// The session has no account in the requested namespace.
    #[error("no accounts found in namespace {namespace}")]
    NoAccounts { namespace: String },

    /// The wallet does not implement the requested method.
    #[error("unsupported method: {0}")]
    UnsupportedMethod(String),

    /// Proposal or request parameters are malformed.
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// The wallet returned something other than what the method promises.
    #[error("unexpected wallet response: {0}")]
    UnexpectedResponse(String),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error("signing failed: {0}")]
    Signing(#[from] CryptoError),

    /// Not a `wc:` pairing URI.
    #[error("invalid WalletConnect URI {0:?}: must start with \"wc:\"")]
    InvalidUri(String),

    #[error("unknown wallet {name:?}; known wallets: {known}")]
    UnknownWallet { name: String, known: String },

    #[error("failed to encode Cacao: {0}")]
    Encode(#[from] serde_json::Error),
}
