//! In-process extension backed by a software key
//!
//! Behaves like the browser extension towards the adapter: chains must be
//! known (home chain or suggested) and enabled before keys are handed out,
//! and unknown chain ids fail with "Chain not found".

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::chain::{ChainInfo, SignDoc};
use crate::wallet::{
    bech32_address, AccountData, ExtensionError, ExtensionWallet, Key, OfflineSigner, SoftwareKey,
};

const KEY_ALGO: &str = "secp256k1";

pub struct LocalExtension {
    name: String,
    home_chain_id: String,
    home_prefix: String,
    key: Arc<SoftwareKey>,
    /// chain id -> account prefix of suggested chains
    suggested: RwLock<HashMap<String, String>>,
    enabled: RwLock<HashSet<String>>,
}

impl LocalExtension {
    pub fn new(name: &str, home_chain_id: &str, home_prefix: &str, key: SoftwareKey) -> Self {
        Self {
            name: name.to_string(),
            home_chain_id: home_chain_id.to_string(),
            home_prefix: home_prefix.to_string(),
            key: Arc::new(key),
            suggested: RwLock::new(HashMap::new()),
            enabled: RwLock::new(HashSet::new()),
        }
    }

    async fn prefix_for(&self, chain_id: &str) -> Result<String, ExtensionError> {
        if chain_id == self.home_chain_id {
            return Ok(self.home_prefix.clone());
        }
        self.suggested
            .read()
            .await
            .get(chain_id)
            .cloned()
            .ok_or_else(ExtensionError::chain_not_found)
    }

    async fn require_enabled(&self, chain_id: &str) -> Result<String, ExtensionError> {
        let prefix = self.prefix_for(chain_id).await?;
        if !self.enabled.read().await.contains(chain_id) {
            return Err(ExtensionError::new(format!("Chain {chain_id} is not enabled")));
        }
        Ok(prefix)
    }

    pub async fn is_enabled(&self, chain_id: &str) -> bool {
        self.enabled.read().await.contains(chain_id)
    }
}

#[async_trait]
impl ExtensionWallet for LocalExtension {
    async fn enable(&self, chain_id: &str) -> Result<(), ExtensionError> {
        self.prefix_for(chain_id).await?;
        self.enabled.write().await.insert(chain_id.to_string());
        info!(chain_id, "Chain enabled");
        Ok(())
    }

    async fn get_key(&self, chain_id: &str) -> Result<Key, ExtensionError> {
        let prefix = self.require_enabled(chain_id).await?;
        let pub_key = self.key.public_key_bytes();
        let bech32_address = bech32_address(&prefix, &pub_key)
            .map_err(|e| ExtensionError::new(e.to_string()))?;

        Ok(Key {
            name: self.name.clone(),
            algo: KEY_ALGO.to_string(),
            pub_key: pub_key.to_vec(),
            address: self.key.address_bytes().to_vec(),
            bech32_address,
            is_nano_ledger: false,
        })
    }

    async fn experimental_suggest_chain(&self, chain_info: &ChainInfo) -> Result<(), ExtensionError> {
        let prefix = &chain_info.bech32_config.bech32_prefix_acc_addr;
        bech32::Hrp::parse(prefix)
            .map_err(|e| ExtensionError::new(format!("Invalid bech32 prefix {prefix}: {e}")))?;

        debug!(chain_id = %chain_info.chain_id, prefix = %prefix, "Chain suggested");
        self.suggested
            .write()
            .await
            .insert(chain_info.chain_id.clone(), prefix.clone());
        Ok(())
    }

    async fn get_offline_signer_auto(&self, chain_id: &str) -> Result<Box<dyn OfflineSigner>, ExtensionError> {
        let prefix = self.require_enabled(chain_id).await?;
        let address = bech32_address(&prefix, &self.key.public_key_bytes())
            .map_err(|e| ExtensionError::new(e.to_string()))?;

        Ok(Box::new(LocalOfflineSigner {
            chain_id: chain_id.to_string(),
            address,
            key: self.key.clone(),
        }))
    }
}

struct LocalOfflineSigner {
    chain_id: String,
    address: String,
    key: Arc<SoftwareKey>,
}

#[async_trait]
impl OfflineSigner for LocalOfflineSigner {
    async fn get_accounts(&self) -> Result<Vec<AccountData>, ExtensionError> {
        Ok(vec![AccountData {
            address: self.address.clone(),
            algo: KEY_ALGO.to_string(),
            pubkey: self.key.public_key_bytes().to_vec(),
        }])
    }

    async fn sign_direct(&self, signer_address: &str, doc: &SignDoc) -> Result<Vec<u8>, ExtensionError> {
        if signer_address != self.address {
            return Err(ExtensionError::new(format!("Unknown signer {signer_address}")));
        }
        if doc.chain_id != self.chain_id {
            return Err(ExtensionError::chain_not_found());
        }
        self.key
            .sign(doc)
            .map_err(|e| ExtensionError::new(e.to_string()))
    }
}
