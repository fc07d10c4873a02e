//! Chain configuration and the chain-info descriptor handed to the extension
//!
//! Field names of `ChainInfo` follow the extension's `experimentalSuggestChain`
//! schema exactly; they are part of the wire contract.

use serde::{Deserialize, Serialize};

/// Transport endpoint of a chain node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    pub protocol: String,
    pub ws_protocol: String,
    pub url: String,
    pub port: u16,
}

/// A blockchain network the wallet can target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chain {
    pub account_index: u32,
    pub alias: String,
    pub id: String,
    pub network: Network,
}

impl Chain {
    /// Tendermint RPC endpoint, e.g. `http://localhost:26657`
    pub fn rpc_url(&self) -> String {
        format!("{}://{}:{}", self.network.protocol, self.network.url, self.network.port)
    }

    pub fn websocket_url(&self) -> String {
        format!(
            "{}://{}:{}/websocket",
            self.network.ws_protocol, self.network.url, self.network.port
        )
    }

    /// REST (LCD) endpoint on the same host
    pub fn rest_url(&self, rest_port: u16) -> String {
        format!("{}://{}:{}", self.network.protocol, self.network.url, rest_port)
    }
}

impl Default for Chain {
    fn default() -> Self {
        Self {
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
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Currency {
    pub coin_denom: String,
    pub coin_minimal_denom: String,
    pub coin_decimals: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coin_gecko_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GasPriceStep {
    pub low: f64,
    pub average: f64,
    pub high: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bip44 {
    pub coin_type: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bech32Config {
    pub bech32_prefix_acc_addr: String,
    pub bech32_prefix_acc_pub: String,
    pub bech32_prefix_val_addr: String,
    pub bech32_prefix_val_pub: String,
    pub bech32_prefix_cons_addr: String,
    pub bech32_prefix_cons_pub: String,
}

impl Bech32Config {
    /// Standard Cosmos prefix family derived from the account prefix
    pub fn from_prefix(prefix: &str) -> Self {
        Self {
            bech32_prefix_acc_addr: prefix.to_string(),
            bech32_prefix_acc_pub: format!("{prefix}pub"),
            bech32_prefix_val_addr: format!("{prefix}valoper"),
            bech32_prefix_val_pub: format!("{prefix}valoperpub"),
            bech32_prefix_cons_addr: format!("{prefix}valcons"),
            bech32_prefix_cons_pub: format!("{prefix}valconspub"),
        }
    }
}

/// Descriptor registered with the extension via `experimentalSuggestChain`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainInfo {
    pub rpc: String,
    pub rest: String,
    pub chain_id: String,
    pub chain_name: String,
    pub stake_currency: Currency,
    pub bip44: Bip44,
    pub bech32_config: Bech32Config,
    pub currencies: Vec<Currency>,
    pub fee_currencies: Vec<Currency>,
    pub gas_price_step: GasPriceStep,
}

/// Everything besides `Chain` needed to describe the chain to the extension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainInfoConfig {
    pub rest_port: u16,
    pub bech32_prefix: String,
    pub coin_type: u32,
    pub currency: Currency,
    pub gas_price_step: GasPriceStep,
}

impl Default for ChainInfoConfig {
    fn default() -> Self {
        Self {
            rest_port: 1317,
            bech32_prefix: "namada".to_string(),
            coin_type: 118,
            currency: Currency {
                coin_denom: "ATOM".to_string(),
                coin_minimal_denom: "uatom".to_string(),
                coin_decimals: 6,
                coin_gecko_id: Some("cosmos".to_string()),
            },
            gas_price_step: GasPriceStep {
                low: 0.01,
                average: 0.025,
                high: 0.03,
            },
        }
    }
}

impl ChainInfo {
    pub fn from_chain(chain: &Chain, config: &ChainInfoConfig) -> Self {
        Self {
            rpc: chain.rpc_url(),
            rest: chain.rest_url(config.rest_port),
            chain_id: chain.id.clone(),
            chain_name: chain.alias.clone(),
            stake_currency: config.currency.clone(),
            bip44: Bip44 {
                coin_type: config.coin_type,
            },
            bech32_config: Bech32Config::from_prefix(&config.bech32_prefix),
            currencies: vec![config.currency.clone()],
            fee_currencies: vec![config.currency.clone()],
            gas_price_step: config.gas_price_step,
        }
    }
}
