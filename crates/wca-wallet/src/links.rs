//! # WalletConnect Links
//!
//! Turns a `wc:` pairing URI into links a phone can open: the universal
//! link served by `app.walletconnect.org`, or a deep link straight into a
//! known wallet app.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;

use crate::error::WalletError;

/// Universal-link endpoint.
pub const UNIVERSAL_LINK_BASE: &str = "https://app.walletconnect.org/wc";

/// Wallet name → URL scheme of its app.
pub const WALLET_SCHEMES: [(&str, &str); 9] = [
    ("metamask", "metamask"),
    ("rainbow", "rainbow"),
    ("trust", "trust"),
    ("zerion", "zerion"),
    ("uniswap", "uniswap"),
    ("coinbase", "cbwallet"),
    ("imtoken", "imtokenv2"),
    ("spot", "spot"),
    ("omni", "omni"),
];

/// One generated link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalletLink {
    /// `universal` or a wallet name.
    pub wallet: String,
    pub url: String,
}

/// Characters left bare by a URI component encoding.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

fn encode_component(s: &str) -> String {
    utf8_percent_encode(s, COMPONENT).to_string()
}

fn validated(uri: &str) -> Result<&str, WalletError> {
    let uri = uri.trim();
    if !uri.starts_with("wc:") {
        return Err(WalletError::InvalidUri(uri.to_string()));
    }
    Ok(uri)
}

/// Names of the wallets with known schemes.
pub fn known_wallets() -> Vec<&'static str> {
    WALLET_SCHEMES.iter().map(|(name, _)| *name).collect()
}

/// Scheme for a wallet name, case-insensitive.
pub fn wallet_scheme(name: &str) -> Result<&'static str, WalletError> {
    let wanted = name.trim().to_ascii_lowercase();
    WALLET_SCHEMES
        .iter()
        .find(|(known, _)| *known == wanted)
        .map(|(_, scheme)| *scheme)
        .ok_or_else(|| WalletError::UnknownWallet {
            name: name.to_string(),
            known: known_wallets().join(", "),
        })
}

/// `https://app.walletconnect.org/wc?uri=<encoded>`.
pub fn universal_link(uri: &str) -> Result<String, WalletError> {
    let uri = validated(uri)?;
    Ok(format!("{UNIVERSAL_LINK_BASE}?uri={}", encode_component(uri)))
}

/// `<scheme>://wc?uri=<encoded>` for a named wallet.
pub fn deep_link(uri: &str, wallet: &str) -> Result<String, WalletError> {
    let uri = validated(uri)?;
    let scheme = wallet_scheme(wallet)?;
    Ok(format!("{scheme}://wc?uri={}", encode_component(uri)))
}

/// The universal link followed by a deep link for every known wallet.
pub fn all_links(uri: &str) -> Result<Vec<WalletLink>, WalletError> {
    let mut links = vec![WalletLink {
        wallet: "universal".to_string(),
        url: universal_link(uri)?,
    }];
    for (name, _) in WALLET_SCHEMES {
        links.push(WalletLink {
            wallet: name.to_string(),
            url: deep_link(uri, name)?,
        });
    }
    Ok(links)
}
