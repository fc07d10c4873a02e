//! Adapter around an injected Keplr-compatible extension
//!
//! The extension may be missing from the host. Every call that needs it
//! fails with `WalletError::NotDetected` in that case; failures raised by the
//! extension come back as `WalletError::Extension` carrying the original
//! message.

use std::sync::Arc;
use tracing::debug;

use crate::chain::{Chain, ChainInfo, ChainInfoConfig};
use crate::wallet::{ExtensionWallet, Key, OfflineSigner, WalletError};

pub struct Keplr {
    chain: Chain,
    chain_info_config: ChainInfoConfig,
    instance: Option<Arc<dyn ExtensionWallet>>,
}

impl Keplr {
    /// `instance` is `None` when no extension was injected
    pub fn new(chain: Chain, instance: Option<Arc<dyn ExtensionWallet>>) -> Self {
        Self {
            chain,
            chain_info_config: ChainInfoConfig::default(),
            instance,
        }
    }

    pub fn with_chain_info_config(mut self, config: ChainInfoConfig) -> Self {
        self.chain_info_config = config;
        self
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    pub fn chain_info_config(&self) -> &ChainInfoConfig {
        &self.chain_info_config
    }

    pub fn instance(&self) -> Option<&Arc<dyn ExtensionWallet>> {
        self.instance.as_ref()
    }

    pub fn detect(&self) -> bool {
        self.instance.is_some()
    }

    fn require_instance(&self) -> Result<&Arc<dyn ExtensionWallet>, WalletError> {
        self.instance.as_ref().ok_or(WalletError::NotDetected)
    }

    /// Descriptor sent by `suggest_chain`
    pub fn chain_info(&self) -> ChainInfo {
        ChainInfo::from_chain(&self.chain, &self.chain_info_config)
    }

    pub async fn suggest_chain(&self) -> Result<bool, WalletError> {
        let instance = self.require_instance()?;
        let chain_info = self.chain_info();
        debug!(chain_id = %chain_info.chain_id, "Suggesting chain to extension");
        instance.experimental_suggest_chain(&chain_info).await?;
        Ok(true)
    }

    pub async fn enable(&self) -> Result<bool, WalletError> {
        let instance = self.require_instance()?;
        instance.enable(&self.chain.id).await?;
        Ok(true)
    }

    pub async fn get_key(&self) -> Result<Key, WalletError> {
        let instance = self.require_instance()?;
        Ok(instance.get_key(&self.chain.id).await?)
    }

    pub async fn offline_signer(&self) -> Result<Box<dyn OfflineSigner>, WalletError> {
        let instance = self.require_instance()?;
        Ok(instance.get_offline_signer_auto(&self.chain.id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{Currency, Network, SignDoc};
    use crate::wallet::{AccountData, ExtensionError};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Enable(String),
        GetKey(String),
        SuggestChain(Box<ChainInfo>),
        OfflineSigner(String),
    }

    struct NoopSigner;

    #[async_trait]
    impl OfflineSigner for NoopSigner {
        async fn get_accounts(&self) -> Result<Vec<AccountData>, ExtensionError> {
            Ok(vec![])
        }

        async fn sign_direct(&self, _: &str, _: &SignDoc) -> Result<Vec<u8>, ExtensionError> {
            Ok(vec![0; 64])
        }
    }

    struct MockExtension {
        chain_id: String,
        key: Key,
        calls: Mutex<Vec<Call>>,
    }

    impl MockExtension {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl ExtensionWallet for MockExtension {
        async fn enable(&self, chain_id: &str) -> Result<(), ExtensionError> {
            self.record(Call::Enable(chain_id.to_string()));
            Ok(())
        }

        async fn get_key(&self, chain_id: &str) -> Result<Key, ExtensionError> {
            self.record(Call::GetKey(chain_id.to_string()));
            Ok(self.key.clone())
        }

        async fn experimental_suggest_chain(&self, chain_info: &ChainInfo) -> Result<(), ExtensionError> {
            self.record(Call::SuggestChain(Box::new(chain_info.clone())));
            Ok(())
        }

        async fn get_offline_signer_auto(&self, chain_id: &str) -> Result<Box<dyn OfflineSigner>, ExtensionError> {
            self.record(Call::OfflineSigner(chain_id.to_string()));
            if chain_id != self.chain_id {
                return Err(ExtensionError::chain_not_found());
            }
            Ok(Box::new(NoopSigner))
        }
    }

    fn mock_chain() -> Chain {
        Chain {
            account_index: 0,
            alias: "Namada Testnet".to_string(),
            id: "anoma-test.fd58c789bc11e6c6392".to_string(),
            network: Network {
                protocol: "http".to_string(),
                ws_protocol: "ws".to_string(),
                url: "localhost".to_string(),
                port: 26657,
            },
        }
    }

    fn mock_key() -> Key {
        Key {
            name: "keyName".to_string(),
            algo: "algo".to_string(),
            pub_key: vec![],
            address: vec![],
            bech32_address: "cosmos1qjnyxraddqgzg91ezty2x3n5t31eur9dsxx4fp".to_string(),
            is_nano_ledger: false,
        }
    }

    fn setup() -> (Arc<MockExtension>, Keplr) {
        let extension = Arc::new(MockExtension {
            chain_id: mock_chain().id,
            key: mock_key(),
            calls: Mutex::new(vec![]),
        });
        let keplr = Keplr::new(mock_chain(), Some(extension.clone() as Arc<dyn ExtensionWallet>));
        (extension, keplr)
    }

    #[test]
    fn test_detects_extension() {
        let (_, keplr) = setup();
        assert!(keplr.detect());

        let missing = Keplr::new(mock_chain(), None);
        assert!(!missing.detect());
        assert!(missing.instance().is_none());
    }

    #[tokio::test]
    async fn test_suggest_chain() {
        let (extension, keplr) = setup();
        assert!(keplr.suggest_chain().await.unwrap());

        let currency = Currency {
            coin_denom: "ATOM".to_string(),
            coin_minimal_denom: "uatom".to_string(),
            coin_decimals: 6,
            coin_gecko_id: Some("cosmos".to_string()),
        };
        let calls = extension.calls();
        assert_eq!(calls.len(), 1);
        match &calls[0] {
            Call::SuggestChain(info) => {
                assert_eq!(info.rpc, "http://localhost:26657");
                assert_eq!(info.rest, "http://localhost:1317");
                assert_eq!(info.chain_id, "anoma-test.fd58c789bc11e6c6392");
                assert_eq!(info.chain_name, "Namada Testnet");
                assert_eq!(info.stake_currency, currency);
                assert_eq!(info.currencies, vec![currency.clone()]);
                assert_eq!(info.fee_currencies, vec![currency]);
                assert_eq!(info.bip44.coin_type, 118);
                assert_eq!(info.bech32_config.bech32_prefix_val_addr, "namadavaloper");
                assert_eq!(info.gas_price_step.average, 0.025);
            }
            other => panic!("unexpected call {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_enable() {
        let (extension, keplr) = setup();
        assert!(keplr.enable().await.unwrap());
        assert_eq!(
            extension.calls(),
            vec![Call::Enable("anoma-test.fd58c789bc11e6c6392".to_string())]
        );
    }

    #[tokio::test]
    async fn test_get_key_is_passthrough() {
        let (extension, keplr) = setup();
        let key = keplr.get_key().await.unwrap();
        assert_eq!(key, mock_key());
        assert_eq!(
            extension.calls(),
            vec![Call::GetKey("anoma-test.fd58c789bc11e6c6392".to_string())]
        );
    }

    #[test]
    fn test_exposes_chain_config() {
        let (_, keplr) = setup();
        assert_eq!(keplr.chain(), &mock_chain());
    }

    #[tokio::test]
    async fn test_offline_signer_unknown_chain() {
        let (_, keplr) = setup();
        let instance = keplr.instance().unwrap();

        let err = instance
            .get_offline_signer_auto("anoma-test.008d3ba61b7bb1852c9")
            .await
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "Chain not found");

        assert!(keplr.offline_signer().await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_extension_fails_distinctly() {
        let keplr = Keplr::new(mock_chain(), None);

        assert_eq!(keplr.enable().await.unwrap_err(), WalletError::NotDetected);
        assert_eq!(keplr.get_key().await.unwrap_err(), WalletError::NotDetected);
        assert_eq!(keplr.suggest_chain().await.unwrap_err(), WalletError::NotDetected);
        assert!(matches!(keplr.offline_signer().await, Err(WalletError::NotDetected)));
    }

    #[tokio::test]
    async fn test_extension_errors_pass_through() {
        let extension = Arc::new(MockExtension {
            chain_id: "other-chain".to_string(),
            key: mock_key(),
            calls: Mutex::new(vec![]),
        });
        let keplr = Keplr::new(mock_chain(), Some(extension as Arc<dyn ExtensionWallet>));

        let err = keplr.offline_signer().await.err().unwrap();
        assert_eq!(err.to_string(), "Chain not found");
        assert!(matches!(err, WalletError::Extension(ref e) if e.is_chain_not_found()));
    }
}
