//! Hardware wallet surface
//!
//! The device never exposes private keys. It derives public keys along a
//! BIP44 path and signs the unsigned bytes it is shown; transport (USB, HID,
//! WebHID) is up to the implementor.

use async_trait::async_trait;
use thiserror::Error;

use crate::types::Bip44Path;

/// Failure reported by the device or its transport; the message is passed through untouched
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct LedgerError {
    message: String,
}

impl LedgerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[async_trait]
pub trait LedgerDevice: Send + Sync {
    /// Compressed secp256k1 public key at `m/44'/coin_type'/account'/change/index`
    async fn public_key(&self, path: Bip44Path) -> Result<[u8; 33], LedgerError>;

    /// 64-byte compact signature over SHA256 of `sign_bytes`
    async fn sign(&self, path: Bip44Path, sign_bytes: &[u8]) -> Result<Vec<u8>, LedgerError>;
}
