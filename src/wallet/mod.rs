//! External wallet capability, the adapter around it, and software keys

mod keplr;
mod keys;
mod ledger;
mod local;
mod signer;

pub use keplr::Keplr;
pub use keys::{bech32_address, SoftwareKey};
pub use ledger::{LedgerDevice, LedgerError};
pub use local::LocalExtension;
pub use signer::TransactionSigner;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chain::{ChainInfo, SignDoc};

/// Key material handed out by the extension
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Key {
    pub name: String,
    pub algo: String,
    pub pub_key: Vec<u8>,
    pub address: Vec<u8>,
    pub bech32_address: String,
    pub is_nano_ledger: bool,
}

/// Account as reported by an offline signer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountData {
    pub address: String,
    pub algo: String,
    pub pubkey: Vec<u8>,
}

/// Failure raised by the extension itself; the message is passed through untouched
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ExtensionError {
    message: String,
}

impl ExtensionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn chain_not_found() -> Self {
        Self::new("Chain not found")
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_chain_not_found(&self) -> bool {
        self.message == "Chain not found"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    /// No extension instance was injected into the host
    #[error("wallet extension not detected")]
    NotDetected,

    #[error(transparent)]
    Extension(#[from] ExtensionError),
}

/// Signer obtained from the extension for one chain
#[async_trait]
pub trait OfflineSigner: Send + Sync {
    async fn get_accounts(&self) -> Result<Vec<AccountData>, ExtensionError>;

    /// Direct-mode signature (64 bytes, compact) over `doc`
    async fn sign_direct(&self, signer_address: &str, doc: &SignDoc) -> Result<Vec<u8>, ExtensionError>;
}

/// Surface of the injected wallet extension this crate relies on
#[async_trait]
pub trait ExtensionWallet: Send + Sync {
    async fn enable(&self, chain_id: &str) -> Result<(), ExtensionError>;

    async fn get_key(&self, chain_id: &str) -> Result<Key, ExtensionError>;

    async fn experimental_suggest_chain(&self, chain_info: &ChainInfo) -> Result<(), ExtensionError>;

    async fn get_offline_signer_auto(&self, chain_id: &str) -> Result<Box<dyn OfflineSigner>, ExtensionError>;
}
