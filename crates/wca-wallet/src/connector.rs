//! # Wallet Connector
//!
//! The dApp-side view of a wallet connection. A connector is an explicitly
//! constructed object with an explicit end of life ([`WalletConnector::dispose`]).
//! It is passed into whatever flow needs it; there is no process-wide
//! instance.
//!
//! Session lifecycle notifications are delivered to listeners registered
//! with [`WalletConnector::subscribe`]. Listeners run synchronously on the
//! thread that triggered the event and must not block.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use wca_core::{AccountId, ChainId};

use crate::error::WalletError;

/// Namespace key for EVM chains.
pub const EIP155: &str = "eip155";

/// Methods, chains and events requested for one namespace.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProposalNamespace {
    pub methods: Vec<String>,
    pub chains: Vec<String>,
    pub events: Vec<String>,
}

/// Session proposal.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConnectParams {
    pub namespaces: BTreeMap<String, ProposalNamespace>,
}

impl ConnectParams {
    /// Proposal for a single EVM chain with the standard account events.
    pub fn eip155(chain: &ChainId, methods: &[&str]) -> Self {
        let namespace = ProposalNamespace {
            methods: methods.iter().map(|m| m.to_string()).collect(),
            chains: vec![chain.to_string()],
            events: vec!["chainChanged".to_string(), "accountsChanged".to_string()],
        };
        Self {
            namespaces: BTreeMap::from([(EIP155.to_string(), namespace)]),
        }
    }
}

/// What the wallet approved for one namespace.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionNamespace {
    /// CAIP-10 accounts, e.g. `eip155:1:0xab…`.
    pub accounts: Vec<String>,
    pub methods: Vec<String>,
    pub events: Vec<String>,
}

/// An approved session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub topic: String,
    pub namespaces: BTreeMap<String, SessionNamespace>,
}

impl Session {
    /// First account of `namespace`, parsed.
    pub fn first_account(&self, namespace: &str) -> Result<AccountId, WalletError> {
        let raw = self
            .namespaces
            .get(namespace)
            .and_then(|ns| ns.accounts.first())
            .ok_or_else(|| WalletError::NoAccounts {
                namespace: namespace.to_string(),
            })?;
        Ok(AccountId::parse(raw)?)
    }
}

/// Notifications about the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    /// A pairing URI is available for the user to scan or open.
    DisplayUri(String),
    SessionEstablished { topic: String },
    SessionRequest { topic: String, method: String },
    SessionDelete { topic: String },
}

/// Handle returned by [`WalletConnector::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Event callback.
pub type EventListener = Arc<dyn Fn(&WalletEvent) + Send + Sync>;

/// A connection to a wallet that can sign on request.
#[async_trait]
pub trait WalletConnector: Send + Sync {
    /// Propose a session and wait for approval.
    async fn connect(&self, params: ConnectParams) -> Result<Session, WalletError>;

    /// The active session, if any.
    fn session(&self) -> Option<Session>;

    /// Send a JSON-RPC request to the wallet over the active session.
    async fn request(&self, method: &str, params: Value) -> Result<Value, WalletError>;

    /// Register an event listener.
    fn subscribe(&self, listener: EventListener) -> SubscriptionId;

    /// Remove a listener. Returns `false` if the id was unknown.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;

    /// End the session and release the connector. Further calls fail with
    /// [`WalletError::Disposed`].
    async fn dispose(&self) -> Result<(), WalletError>;
}
