use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

use crate::chain::proto::TxRaw;

/// Configuration for the chain REST client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// REST (LCD) endpoint, e.g. "http://localhost:1317"
    pub rest_endpoint: String,
    /// Request timeout in seconds
    pub request_timeout: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            rest_endpoint: "http://localhost:1317".to_string(),
            request_timeout: 30,
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected account payload from {url}: {message}")]
    Account { url: String, message: String },

    #[error("{url} responded with {status}: {body}")]
    Status { url: String, status: u16, body: String },

    #[error("transaction {txhash} rejected with code {code}: {raw_log}")]
    Rejected {
        txhash: String,
        code: u32,
        raw_log: String,
    },
}

/// Result of a broadcast as reported by the node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxResponse {
    pub txhash: String,
    #[serde(default)]
    pub code: u32,
    #[serde(default)]
    pub raw_log: String,
}

impl TxResponse {
    /// Non-zero codes mean the node refused the transaction
    pub fn into_result(self) -> Result<TxResponse, ClientError> {
        if self.code != 0 {
            return Err(ClientError::Rejected {
                txhash: self.txhash,
                code: self.code,
                raw_log: self.raw_log,
            });
        }
        Ok(self)
    }
}

/// On-chain state of a signing account
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccountState {
    pub account_number: u64,
    /// Next sequence the chain expects from this account
    pub sequence: u64,
    pub public_key_revealed: bool,
}

/// Node access needed by the submit pipeline
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn broadcast(&self, tx: &TxRaw) -> Result<TxResponse, ClientError>;

    /// Unknown accounts report the default state (number 0, sequence 0, unrevealed)
    async fn account_state(&self, address: &str) -> Result<AccountState, ClientError>;

    /// Whether `address` still has to publish its public key on chain
    async fn is_reveal_pk_needed(&self, address: &str) -> Result<bool, ClientError> {
        Ok(!self.account_state(address).await?.public_key_revealed)
    }
}

#[derive(Debug, Deserialize)]
struct BroadcastEnvelope {
    tx_response: TxResponse,
}

#[derive(Debug, Deserialize)]
struct AccountEnvelope {
    account: Value,
}

/// `ChainClient` over the Cosmos REST gateway
#[derive(Clone)]
pub struct HttpChainClient {
    client: Client,
    base_url: String,
}

impl HttpChainClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .build()?;

        Ok(Self {
            client,
            base_url: config.rest_endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn broadcast_url(&self) -> String {
        format!("{}/cosmos/tx/v1beta1/txs", self.base_url)
    }

    fn account_url(&self, address: &str) -> String {
        format!("{}/cosmos/auth/v1beta1/accounts/{}", self.base_url, address)
    }
}

#[async_trait]
impl ChainClient for HttpChainClient {
    async fn broadcast(&self, tx: &TxRaw) -> Result<TxResponse, ClientError> {
        let url = self.broadcast_url();
        let body = json!({
            "tx_bytes": STANDARD.encode(tx.to_bytes()),
            "mode": "BROADCAST_MODE_SYNC",
        });

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(ClientError::Status {
                url,
                status: status.as_u16(),
                body,
            });
        }

        let envelope: BroadcastEnvelope = response.json().await?;
        log::info!(
            "Broadcast accepted: txhash={}, code={}",
            envelope.tx_response.txhash,
            envelope.tx_response.code
        );
        Ok(envelope.tx_response)
    }

    async fn account_state(&self, address: &str) -> Result<AccountState, ClientError> {
        let url = self.account_url(address);
        let response = self.client.get(&url).send().await?;

        // Unknown accounts have never sent anything
        if response.status() == StatusCode::NOT_FOUND {
            log::debug!("Account {} not found on chain", address);
            return Ok(AccountState::default());
        }
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(ClientError::Status {
                url,
                status: status.as_u16(),
                body,
            });
        }

        let envelope: AccountEnvelope = response.json().await?;
        parse_account_state(&envelope.account)
            .map_err(|message| ClientError::Account { url, message })
    }
}

/// Fields of a plain account, or of the base account inside a wrapped
/// (vesting/eth) one
fn account_field<'a>(account: &'a Value, name: &str) -> Option<&'a Value> {
    let direct = account.get(name).filter(|v| !v.is_null());
    direct.or_else(|| {
        account
            .get("base_account")
            .and_then(|base| base.get(name))
            .filter(|v| !v.is_null())
    })
}

fn account_pub_key(account: &Value) -> Option<&Value> {
    account_field(account, "pub_key")
}

/// REST encodes uint64 as strings; accept plain numbers too
fn parse_u64_field(account: &Value, name: &str) -> Result<u64, String> {
    match account_field(account, name) {
        None => Ok(0),
        Some(Value::String(s)) => s.parse().map_err(|e| format!("{name} {s:?}: {e}")),
        Some(value) => value.as_u64().ok_or_else(|| format!("{name} is not a number")),
    }
}

fn parse_account_state(account: &Value) -> Result<AccountState, String> {
    Ok(AccountState {
        account_number: parse_u64_field(account, "account_number")?,
        sequence: parse_u64_field(account, "sequence")?,
        public_key_revealed: account_pub_key(account).is_some(),
    })
}
