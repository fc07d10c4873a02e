use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::chain::{Chain, ChainInfoConfig, ClientConfig};

/// Mnemonic for the software keystore. Never stored in the config file.
pub const MNEMONIC_ENV: &str = "WALLET_MNEMONIC";
/// Optional BIP39 passphrase
pub const PASSPHRASE_ENV: &str = "WALLET_PASSPHRASE";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    pub chain: Chain,
    #[serde(default)]
    pub chain_info: ChainInfoConfig,
    #[serde(default)]
    pub client: ClientConfig,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.chain.id.trim().is_empty() {
            bail!("chain.id must not be empty");
        }
        if self.chain.network.url.trim().is_empty() {
            bail!("chain.network.url must not be empty");
        }
        if self.chain.network.port == 0 || self.chain_info.rest_port == 0 {
            bail!("ports must be non-zero");
        }
        if bech32::Hrp::parse(&self.chain_info.bech32_prefix).is_err() {
            bail!("invalid bech32 prefix {:?}", self.chain_info.bech32_prefix);
        }
        let steps = &self.chain_info.gas_price_step;
        if !(steps.low <= steps.average && steps.average <= steps.high) {
            bail!("gas price steps must satisfy low <= average <= high");
        }
        if !self.client.rest_endpoint.starts_with("http://")
            && !self.client.rest_endpoint.starts_with("https://")
        {
            bail!("client.rest_endpoint must be an http(s) URL");
        }
        if self.client.request_timeout == 0 {
            bail!("client.request_timeout must be at least one second");
        }
        Ok(())
    }

    /// `<config dir>/namada-wallet/config.toml`, or `config.toml` when the
    /// platform has no config dir
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|dir| dir.join("namada-wallet").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}

/// Secret material read from the environment
pub struct Secrets {
    pub mnemonic: String,
    pub passphrase: String,
}

impl Secrets {
    pub fn from_env() -> Result<Self> {
        let mnemonic = std::env::var(MNEMONIC_ENV)
            .with_context(|| format!("{} must be set", MNEMONIC_ENV))?;
        let passphrase = std::env::var(PASSPHRASE_ENV).unwrap_or_default();
        Ok(Self {
            mnemonic,
            passphrase,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.chain.id, "anoma-test.fd58c789bc11e6c6392");
        assert_eq!(config.client.rest_endpoint, "http://localhost:1317");
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir()
            .join(format!("namada-wallet-{}", uuid::Uuid::new_v4()))
            .join("config.toml");
        let mut config = Config::default();
        config.chain.alias = "Local".to_string();
        config.chain_info.bech32_prefix = "atest".to_string();
        config.save(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("[chain.network]"));
        assert!(content.contains("[chain_info]"));
        assert_eq!(Config::load(&path).unwrap(), config);

        std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_optional_tables_default() {
        let content = r#"
            [chain]
            accountIndex = 0
            alias = "Namada Testnet"
            id = "anoma-test.fd58c789bc11e6c6392"

            [chain.network]
            protocol = "http"
            wsProtocol = "ws"
            url = "localhost"
            port = 26657
        "#;
        let config: Config = toml::from_str(content).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.chain.id = " ".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.client.rest_endpoint = "localhost:1317".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.chain_info.gas_price_step.low = 1.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.client.request_timeout = 0;
        assert!(config.validate().is_err());
    }
}
