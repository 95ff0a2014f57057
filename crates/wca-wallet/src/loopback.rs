//! # Loopback Wallet
//!
//! An in-process [`WalletConnector`] backed by a local secp256k1 key. It
//! approves every proposal for the `eip155` namespace, signs
//! `personal_sign` requests immediately, and emits the same session events
//! a relay-backed wallet would. Used by the CLI request commands and by
//! tests that need real signatures without a phone in the loop.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::RngCore;
use serde_json::Value;
use wca_core::ChainId;
use wca_crypto::{to_checksum_address, EthSigningKey};

use crate::connector::{
    ConnectParams, EventListener, Session, SessionNamespace, SubscriptionId, WalletConnector,
    WalletEvent, EIP155,
};
use crate::error::WalletError;

/// Methods this wallet can serve.
pub const SUPPORTED_METHODS: [&str; 1] = ["personal_sign"];

/// A wallet that lives in the same process as the dApp.
pub struct LoopbackWallet {
    key: EthSigningKey,
    state: Mutex<LoopbackState>,
}

#[derive(Default)]
struct LoopbackState {
    session: Option<Session>,
    listeners: Vec<(SubscriptionId, EventListener)>,
    next_subscription: u64,
    disposed: bool,
}

impl LoopbackWallet {
    /// Construct a wallet around `key`.
    pub fn create(key: EthSigningKey) -> Self {
        tracing::debug!(address = %key.address(), "loopback wallet created");
        Self {
            key,
            state: Mutex::new(LoopbackState::default()),
        }
    }

    /// EIP-55 address of the wallet key.
    pub fn address(&self) -> String {
        to_checksum_address(&self.key.address())
    }

    fn emit(&self, event: WalletEvent) {
        // Clone out so listeners may call back into the wallet.
        let listeners: Vec<EventListener> = self
            .state
            .lock()
            .listeners
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        tracing::trace!(?event, listeners = listeners.len(), "wallet event");
        for listener in listeners {
            listener(&event);
        }
    }

    fn ensure_live(&self) -> Result<(), WalletError> {
        if self.state.lock().disposed {
            return Err(WalletError::Disposed);
        }
        Ok(())
    }

    fn personal_sign(&self, params: &Value) -> Result<Value, WalletError> {
        let (message, address) = match params.as_array().map(Vec::as_slice) {
            Some([Value::String(message), Value::String(address)]) => (message, address),
            _ => {
                return Err(WalletError::InvalidParams(
                    "personal_sign expects [message, address]".to_string(),
                ))
            }
        };
        if !self.key.address().matches(address) {
            return Err(WalletError::InvalidParams(format!(
                "address {address} is not an account of this session"
            )));
        }
        let signature = self.key.sign_personal_message(message)?;
        Ok(Value::String(signature.to_hex()))
    }
}

/// Random 32-byte topic, hex encoded.
fn random_topic() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// A `wc:` pairing URI in the v2 format.
pub fn pairing_uri(topic: &str) -> String {
    let mut sym_key = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut sym_key);
    format!(
        "wc:{topic}@2?relay-protocol=irn&symKey={}",
        hex::encode(sym_key)
    )
}

#[async_trait]
impl WalletConnector for LoopbackWallet {
    async fn connect(&self, params: ConnectParams) -> Result<Session, WalletError> {
        self.ensure_live()?;
        let proposal = params.namespaces.get(EIP155).ok_or_else(|| {
            WalletError::InvalidParams(format!("proposal has no {EIP155} namespace"))
        })?;
        if let Some(method) = proposal
            .methods
            .iter()
            .find(|m| !SUPPORTED_METHODS.contains(&m.as_str()))
        {
            return Err(WalletError::UnsupportedMethod(method.clone()));
        }
        if proposal.chains.is_empty() {
            return Err(WalletError::InvalidParams("proposal names no chains".to_string()));
        }

        let address = self.address();
        let accounts = proposal
            .chains
            .iter()
            .map(|chain| -> Result<String, WalletError> {
                Ok(format!("{}:{address}", ChainId::parse(chain)?))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let topic = random_topic();
        self.emit(WalletEvent::DisplayUri(pairing_uri(&topic)));

        let session = Session {
            topic: topic.clone(),
            namespaces: BTreeMap::from([(
                EIP155.to_string(),
                SessionNamespace {
                    accounts,
                    methods: proposal.methods.clone(),
                    events: proposal.events.clone(),
                },
            )]),
        };
        self.state.lock().session = Some(session.clone());
        tracing::info!(topic = %topic, "session established");
        self.emit(WalletEvent::SessionEstablished { topic });
        Ok(session)
    }

    fn session(&self) -> Option<Session> {
        self.state.lock().session.clone()
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, WalletError> {
        self.ensure_live()?;
        let session = self.session().ok_or(WalletError::NotConnected)?;
        let approved = session
            .namespaces
            .get(EIP155)
            .is_some_and(|ns| ns.methods.iter().any(|m| m == method));
        if !approved {
            return Err(WalletError::UnsupportedMethod(method.to_string()));
        }

        self.emit(WalletEvent::SessionRequest {
            topic: session.topic.clone(),
            method: method.to_string(),
        });
        match method {
            "personal_sign" => self.personal_sign(&params),
            other => Err(WalletError::UnsupportedMethod(other.to_string())),
        }
    }

    fn subscribe(&self, listener: EventListener) -> SubscriptionId {
        let mut state = self.state.lock();
        state.next_subscription += 1;
        let id = SubscriptionId(state.next_subscription);
        state.listeners.push((id, listener));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut state = self.state.lock();
        let before = state.listeners.len();
        state.listeners.retain(|(existing, _)| *existing != id);
        state.listeners.len() != before
    }

    async fn dispose(&self) -> Result<(), WalletError> {
        let session = {
            let mut state = self.state.lock();
            if state.disposed {
                return Ok(());
            }
            state.disposed = true;
            state.session.take()
        };
        if let Some(session) = session {
            self.emit(WalletEvent::SessionDelete {
                topic: session.topic,
            });
        }
        self.state.lock().listeners.clear();
        tracing::debug!("loopback wallet disposed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn wallet() -> LoopbackWallet {
        LoopbackWallet::create(EthSigningKey::generate())
    }

    fn recorder(wallet: &LoopbackWallet) -> (SubscriptionId, Arc<Mutex<Vec<WalletEvent>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let id = wallet.subscribe(Arc::new(move |e: &WalletEvent| sink.lock().push(e.clone())));
        (id, events)
    }

    #[tokio::test]
    async fn connect_emits_uri_then_established() {
        let wallet = wallet();
        let (_, events) = recorder(&wallet);
        let session = wallet
            .connect(ConnectParams::eip155(&ChainId::mainnet(), &["personal_sign"]))
            .await
            .unwrap();

        let account = session.first_account(EIP155).unwrap();
        assert_eq!(account.address, wallet.address());

        let events = events.lock();
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], WalletEvent::DisplayUri(uri) if uri.starts_with("wc:")));
        assert_eq!(
            events[1],
            WalletEvent::SessionEstablished {
                topic: session.topic.clone()
            }
        );
    }

    #[tokio::test]
    async fn personal_sign_recovers_to_wallet() {
        let wallet = wallet();
        wallet
            .connect(ConnectParams::eip155(&ChainId::mainnet(), &["personal_sign"]))
            .await
            .unwrap();
        let sig = wallet
            .request(
                "personal_sign",
                serde_json::json!(["hello", wallet.address()]),
            )
            .await
            .unwrap();
        let recovered =
            wca_crypto::recover_personal_signer("hello", sig.as_str().unwrap()).unwrap();
        assert!(recovered.matches(&wallet.address()));
    }

    #[tokio::test]
    async fn request_before_connect_fails() {
        let err = wallet()
            .request("personal_sign", serde_json::json!(["m", "0x00"]))
            .await
            .unwrap_err();
        assert!(matches!(err, WalletError::NotConnected));
    }

    #[tokio::test]
    async fn unsupported_method_rejected_at_connect() {
        let err = wallet()
            .connect(ConnectParams::eip155(
                &ChainId::mainnet(),
                &["eth_sendTransaction"],
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, WalletError::UnsupportedMethod(m) if m == "eth_sendTransaction"));
    }

    #[tokio::test]
    async fn sign_for_foreign_address_rejected() {
        let wallet = wallet();
        wallet
            .connect(ConnectParams::eip155(&ChainId::mainnet(), &["personal_sign"]))
            .await
            .unwrap();
        let err = wallet
            .request(
                "personal_sign",
                serde_json::json!(["m", "0x0000000000000000000000000000000000000001"]),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, WalletError::InvalidParams(_)));
    }

    #[tokio::test]
    async fn unsubscribed_listener_is_silent() {
        let wallet = wallet();
        let (id, events) = recorder(&wallet);
        assert!(wallet.unsubscribe(id));
        assert!(!wallet.unsubscribe(id));
        wallet
            .connect(ConnectParams::eip155(&ChainId::mainnet(), &["personal_sign"]))
            .await
            .unwrap();
        assert!(events.lock().is_empty());
    }

    #[tokio::test]
    async fn dispose_deletes_session_and_blocks_reuse() {
        let wallet = wallet();
        let (_, events) = recorder(&wallet);
        let session = wallet
            .connect(ConnectParams::eip155(&ChainId::mainnet(), &["personal_sign"]))
            .await
            .unwrap();
        wallet.dispose().await.unwrap();

        assert_eq!(
            events.lock().last(),
            Some(&WalletEvent::SessionDelete {
                topic: session.topic
            })
        );
        assert!(wallet.session().is_none());
        assert!(matches!(
            wallet
                .connect(ConnectParams::eip155(&ChainId::mainnet(), &["personal_sign"]))
                .await,
            Err(WalletError::Disposed)
        ));
        wallet.dispose().await.unwrap();
    }

    #[test]
    fn pairing_uri_shape() {
        let uri = pairing_uri("abcd");
        assert!(uri.starts_with("wc:abcd@2?relay-protocol=irn&symKey="));
        assert_eq!(uri.rsplit('=').next().unwrap().len(), 64);
    }
}
