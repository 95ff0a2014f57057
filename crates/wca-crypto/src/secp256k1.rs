//! # secp256k1 Recovery and Signing
//!
//! Ethereum signatures are 65 bytes: `r (32) || s (32) || v (1)`, with `v`
//! either the raw recovery id (0/1) or the legacy `27 + id`. Recovery
//! yields the signer's public key; the address is the last 20 bytes of the
//! Keccak-256 hash of the uncompressed key without its `0x04` tag.
//!
//! High-`s` signatures are normalized (flipping the recovery parity) before
//! recovery so that signers that do not enforce EIP-2 still verify.

use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use wca_core::EthAddress;

use crate::eip191::{hash_personal_message, keccak256};
use crate::error::CryptoError;

/// A 65-byte recoverable ECDSA signature.
#[derive(Clone, PartialEq, Eq)]
pub struct RecoverableSignature {
    rs: [u8; 64],
    v: u8,
}

impl RecoverableSignature {
    /// Parse raw `r || s || v` bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != 65 {
            return Err(CryptoError::InvalidSignatureLength(bytes.len()));
        }
        let mut rs = [0u8; 64];
        rs.copy_from_slice(&bytes[..64]);
        Ok(Self { rs, v: bytes[64] })
    }

    /// Parse a hex string, `0x` prefix optional.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let trimmed = s.trim();
        let hex_part = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = hex::decode(hex_part).map_err(|e| CryptoError::HexDecode(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// `0x`-prefixed lowercase hex, `v` as stored.
    pub fn to_hex(&self) -> String {
        format!("0x{}{:02x}", hex::encode(self.rs), self.v)
    }

    /// Recovery id normalized to 0 or 1.
    pub fn recovery_byte(&self) -> Result<u8, CryptoError> {
        match self.v {
            0 | 1 => Ok(self.v),
            27 | 28 => Ok(self.v - 27),
            other => Err(CryptoError::InvalidRecoveryId(other)),
        }
    }

    /// Recover the signer's address from a 32-byte prehash.
    pub fn recover_address(&self, prehash: &[u8; 32]) -> Result<EthAddress, CryptoError> {
        let mut signature = Signature::from_slice(&self.rs)
            .map_err(|e| CryptoError::MalformedSignature(e.to_string()))?;
        let mut recovery_id = RecoveryId::from_byte(self.recovery_byte()?)
            .ok_or(CryptoError::InvalidRecoveryId(self.v))?;

        if let Some(normalized) = signature.normalize_s() {
            signature = normalized;
            recovery_id = RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced());
        }

        let key = VerifyingKey::recover_from_prehash(prehash, &signature, recovery_id)
            .map_err(|e| CryptoError::RecoveryFailed(e.to_string()))?;
        Ok(address_of(&key))
    }
}

impl std::fmt::Debug for RecoverableSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RecoverableSignature({}...)", &self.to_hex()[..10])
    }
}

impl std::fmt::Display for RecoverableSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Ethereum address of a secp256k1 public key.
pub fn address_of(key: &VerifyingKey) -> EthAddress {
    let point = key.to_encoded_point(false);
    let digest = keccak256(&point.as_bytes()[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&digest[12..]);
    EthAddress::from_bytes(address)
}

/// EIP-55 mixed-case checksum rendering.
pub fn to_checksum_address(address: &EthAddress) -> String {
    let lower = hex::encode(address.as_bytes());
    let digest = keccak256(lower.as_bytes());
    let checksummed: String = lower
        .chars()
        .enumerate()
        .map(|(i, c)| {
            let nibble = (digest[i / 2] >> if i % 2 == 0 { 4 } else { 0 }) & 0x0f;
            if c.is_ascii_alphabetic() && nibble >= 8 {
                c.to_ascii_uppercase()
            } else {
                c
            }
        })
        .collect();
    format!("0x{checksummed}")
}

/// Recover the address that produced a `personal_sign` signature.
pub fn recover_personal_signer(message: &str, signature_hex: &str) -> Result<EthAddress, CryptoError> {
    let signature = RecoverableSignature::from_hex(signature_hex)?;
    signature.recover_address(&hash_personal_message(message.as_bytes()))
}

/// Check a `personal_sign` signature against a claimed address.
///
/// Returns `Ok(false)` on a well-formed signature from another key and
/// `Err` when the signature cannot be parsed or recovered at all. The
/// address comparison ignores case.
pub fn verify_personal_message(
    address: &str,
    message: &str,
    signature_hex: &str,
) -> Result<bool, CryptoError> {
    let recovered = recover_personal_signer(message, signature_hex)?;
    Ok(recovered.matches(address))
}

/// A secp256k1 private key held in-process.
pub struct EthSigningKey {
    inner: SigningKey,
}

impl EthSigningKey {
    /// Generate a fresh random key.
    pub fn generate() -> Self {
        Self {
            inner: SigningKey::random(&mut rand::rngs::OsRng),
        }
    }

    /// Parse a 32-byte key from hex, `0x` prefix optional.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let trimmed = s.trim();
        let hex_part = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = hex::decode(hex_part).map_err(|e| CryptoError::HexDecode(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(CryptoError::InvalidKey(format!(
                "private key must be 32 bytes, got {}",
                bytes.len()
            )));
        }
        let inner =
            SigningKey::from_slice(&bytes).map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        Ok(Self { inner })
    }

    /// `0x`-prefixed private key hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.inner.to_bytes()))
    }

    /// Address controlled by this key.
    pub fn address(&self) -> EthAddress {
        address_of(self.inner.verifying_key())
    }

    /// Sign a 32-byte prehash, producing `v` in the legacy 27/28 form.
    pub fn sign_prehash(&self, prehash: &[u8; 32]) -> Result<RecoverableSignature, CryptoError> {
        let (signature, recovery_id) = self
            .inner
            .sign_prehash_recoverable(prehash)
            .map_err(|e| CryptoError::MalformedSignature(e.to_string()))?;
        let mut rs = [0u8; 64];
        rs.copy_from_slice(&signature.to_bytes());
        Ok(RecoverableSignature {
            rs,
            v: 27 + recovery_id.to_byte(),
        })
    }

    /// `personal_sign` over a text message.
    pub fn sign_personal_message(&self, message: &str) -> Result<RecoverableSignature, CryptoError> {
        self.sign_prehash(&hash_personal_message(message.as_bytes()))
    }
}

impl std::fmt::Debug for EthSigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EthSigningKey(<private>)")
    }
}
