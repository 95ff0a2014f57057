//! # wca-wallet: Wallet Collaborator
//!
//! The wallet side of the authentication flows, kept behind the
//! [`WalletConnector`] trait so the request flows never depend on a
//! particular transport.
//!
//! - [`connector`]: the trait, session types and event subscription.
//! - [`loopback`]: [`LoopbackWallet`], an in-process wallet with a local
//!   key.
//! - [`auth`]: `request_siwe` / `request_cacao`.
//! - [`links`]: universal and deep links for `wc:` pairing URIs.

pub mod auth;
pub mod connector;
pub mod error;
pub mod links;
pub mod loopback;

pub use auth::{
    generate_nonce, request_cacao, request_siwe, AuthRequest, CacaoOutcome, SiweOutcome,
    DEFAULT_RECAP,
};
pub use connector::{
    ConnectParams, EventListener, ProposalNamespace, Session, SessionNamespace, SubscriptionId,
    WalletConnector, WalletEvent,
};
pub use error::WalletError;
pub use links::{all_links, deep_link, universal_link, WalletLink, WALLET_SCHEMES};
pub use loopback::LoopbackWallet;
