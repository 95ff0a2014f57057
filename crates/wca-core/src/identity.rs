//! # Identifier Newtypes
//!
//! Chain, account, address and DID identifiers used by the authentication
//! flows. Each type is parsed once with a validated constructor so the
//! verification pipeline never re-splits raw strings.
//!
//! - [`ChainId`]: CAIP-2, e.g. `eip155:1`.
//! - [`AccountId`]: CAIP-10, e.g. `eip155:1:0xab…`, as returned in wallet
//!   session namespaces.
//! - [`PkhDid`]: `did:pkh:<namespace>:<reference>:<address>`, the issuer
//!   format of Cacao payloads and DID-issued JWTs.
//! - [`EthAddress`]: a strict 20-byte Ethereum address.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::IdentityError;

/// A 20-byte Ethereum account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EthAddress(pub [u8; 20]);

impl EthAddress {
    /// Create an address from raw bytes.
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Return the raw 20 bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Parse `0x` + 40 hex characters. Mixed case is accepted; the EIP-55
    /// checksum is not enforced.
    pub fn parse(s: &str) -> Result<Self, IdentityError> {
        let hex_part = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| IdentityError::InvalidAddress(s.to_string()))?;
        if hex_part.len() != 40 {
            return Err(IdentityError::InvalidAddress(s.to_string()));
        }
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(hex_part, &mut bytes)
            .map_err(|_| IdentityError::InvalidAddress(s.to_string()))?;
        Ok(Self(bytes))
    }

    /// Lowercase `0x`-prefixed hex rendering.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Compare against a textual address ignoring case.
    pub fn matches(&self, other: &str) -> bool {
        self.to_hex().eq_ignore_ascii_case(other.trim())
    }
}

impl FromStr for EthAddress {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Debug for EthAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EthAddress({})", self.to_hex())
    }
}

impl fmt::Display for EthAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// CAIP-2 chain identifier (`<namespace>:<reference>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChainId {
    /// Chain namespace, e.g. `eip155`.
    pub namespace: String,
    /// Chain reference within the namespace, e.g. `1` or `8453`.
    pub reference: String,
}

impl ChainId {
    /// Ethereum mainnet.
    pub fn mainnet() -> Self {
        Self {
            namespace: "eip155".to_string(),
            reference: "1".to_string(),
        }
    }

    /// Parse `namespace:reference`.
    pub fn parse(s: &str) -> Result<Self, IdentityError> {
        match s.split(':').collect::<Vec<_>>().as_slice() {
            [namespace, reference] if !namespace.is_empty() && !reference.is_empty() => {
                Ok(Self {
                    namespace: namespace.to_string(),
                    reference: reference.to_string(),
                })
            }
            _ => Err(IdentityError::InvalidChain(s.to_string())),
        }
    }
}

impl FromStr for ChainId {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.reference)
    }
}

/// CAIP-10 account identifier (`<namespace>:<reference>:<address>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId {
    /// Chain the account lives on.
    pub chain: ChainId,
    /// Account address as reported by the wallet.
    pub address: String,
}

impl AccountId {
    /// Build an account identifier for an address on a chain.
    pub fn new(chain: ChainId, address: impl Into<String>) -> Self {
        Self {
            chain,
            address: address.into(),
        }
    }

    /// Parse `namespace:reference:address`.
    pub fn parse(s: &str) -> Result<Self, IdentityError> {
        match s.split(':').collect::<Vec<_>>().as_slice() {
            [namespace, reference, address]
                if !namespace.is_empty() && !reference.is_empty() && !address.is_empty() =>
            {
                Ok(Self {
                    chain: ChainId {
                        namespace: namespace.to_string(),
                        reference: reference.to_string(),
                    },
                    address: address.to_string(),
                })
            }
            _ => Err(IdentityError::InvalidAccount(s.to_string())),
        }
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chain, self.address)
    }
}

/// A `did:pkh` issuer that has been checked for an address segment.
///
/// Parsing is deliberately loose about everything but the tail: any string
/// with at least three `:`-separated segments whose last segment starts with
/// `0x` is accepted. The last segment is the address, the one before it the
/// chain reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PkhDid {
    raw: String,
    chain_id: String,
    address: String,
}

impl PkhDid {
    /// Method prefix of the DID scheme.
    pub const PREFIX: &'static str = "did:pkh:";

    /// Parse an issuer string, enforcing the address-segment invariant.
    pub fn parse(issuer: &str) -> Result<Self, IdentityError> {
        let segments: Vec<&str> = issuer.split(':').collect();
        let missing = || IdentityError::MissingAddress {
            issuer: issuer.to_string(),
        };
        if segments.len() < 3 {
            return Err(missing());
        }
        let address = segments[segments.len() - 1];
        if !address.starts_with("0x") {
            return Err(missing());
        }
        Ok(Self {
            raw: issuer.to_string(),
            chain_id: segments[segments.len() - 2].to_string(),
            address: address.to_string(),
        })
    }

    /// Build the DID for a wallet account.
    pub fn for_account(account: &AccountId) -> Self {
        Self {
            raw: format!("{}{account}", Self::PREFIX),
            chain_id: account.chain.reference.clone(),
            address: account.address.clone(),
        }
    }

    /// Trailing segment of a `did:pkh:` string, or `None` when the string
    /// does not use the `did:pkh:` method or ends in an empty segment.
    pub fn trailing_segment(issuer: &str) -> Option<&str> {
        if !issuer.starts_with(Self::PREFIX) {
            return None;
        }
        issuer.rsplit(':').next().filter(|s| !s.is_empty())
    }

    /// Chain reference (second-to-last segment).
    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    /// Address (last segment), exactly as written by the issuer.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// The full issuer string.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for PkhDid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
