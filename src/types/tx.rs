//! Transaction envelope and per-operation property bundles
//!
//! Bundles are plain data handed across the `Signer` boundary. Each one knows
//! how to check its own shape (`TxPayload::validate`) and which address has
//! to sign for it.

use chrono::Utc;
use cosmwasm_std::Uint128;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Numeric transaction kinds understood by the SDK
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxType {
    Bond = 1,
    Unbond = 2,
    Withdraw = 3,
    Transfer = 4,
    IbcTransfer = 5,
    EthBridgeTransfer = 6,
    RevealPk = 7,
    VoteProposal = 8,
}

impl TxType {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        let tx_type = match code {
            1 => TxType::Bond,
            2 => TxType::Unbond,
            3 => TxType::Withdraw,
            4 => TxType::Transfer,
            5 => TxType::IbcTransfer,
            6 => TxType::EthBridgeTransfer,
            7 => TxType::RevealPk,
            8 => TxType::VoteProposal,
            _ => return None,
        };
        Some(tx_type)
    }

    /// Type URL of the `Any` carrying this kind's message
    pub fn type_url(self) -> &'static str {
        match self {
            TxType::Bond => "/namada.tx.v1.Bond",
            TxType::Unbond => "/namada.tx.v1.Unbond",
            TxType::Withdraw => "/namada.tx.v1.Withdraw",
            TxType::Transfer => "/namada.tx.v1.Transfer",
            TxType::IbcTransfer => "/namada.tx.v1.IbcTransfer",
            TxType::EthBridgeTransfer => "/namada.tx.v1.EthBridgeTransfer",
            TxType::RevealPk => "/namada.tx.v1.RevealPk",
            TxType::VoteProposal => "/namada.tx.v1.VoteProposal",
        }
    }

    pub fn from_type_url(type_url: &str) -> Option<Self> {
        (1..=8)
            .filter_map(TxType::from_code)
            .find(|tx_type| tx_type.type_url() == type_url)
    }
}

/// A property bundle failed structural validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Transaction envelope shared by every submit operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxProps {
    /// Fee token address
    pub token: String,
    pub fee_amount: Uint128,
    pub gas_limit: u64,
    pub chain_id: String,
    /// Hex public key of the fee payer, when it differs from the signer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

impl TxProps {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.chain_id.trim().is_empty() {
            return Err(ValidationError::new("chain_id", "must not be empty"));
        }
        if self.token.trim().is_empty() {
            return Err(ValidationError::new("token", "must not be empty"));
        }
        if self.gas_limit == 0 {
            return Err(ValidationError::new("gas_limit", "must be greater than zero"));
        }
        if let Some(public_key) = &self.public_key {
            hex::decode(public_key)
                .map_err(|e| ValidationError::new("public_key", e.to_string()))?;
        }
        Ok(())
    }
}

/// Operation-specific payload that can be turned into a transaction body
pub trait TxPayload: Serialize + Send + Sync {
    const TX_TYPE: TxType;

    /// Structural checks; does not touch chain state
    fn validate(&self) -> Result<(), ValidationError>;

    /// Address whose key signs the transaction
    fn signer_address(&self) -> &str;

    /// Message placed in the transaction body
    fn message(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitBondProps {
    pub source: String,
    pub validator: String,
    pub amount: Uint128,
    pub native_token: String,
}

impl TxPayload for SubmitBondProps {
    const TX_TYPE: TxType = TxType::Bond;

    fn validate(&self) -> Result<(), ValidationError> {
        validate_address("source", &self.source)?;
        validate_address("validator", &self.validator)?;
        validate_address("native_token", &self.native_token)?;
        validate_amount("amount", self.amount)
    }

    fn signer_address(&self) -> &str {
        &self.source
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitUnbondProps {
    pub source: String,
    pub validator: String,
    pub amount: Uint128,
}

impl TxPayload for SubmitUnbondProps {
    const TX_TYPE: TxType = TxType::Unbond;

    fn validate(&self) -> Result<(), ValidationError> {
        validate_address("source", &self.source)?;
        validate_address("validator", &self.validator)?;
        validate_amount("amount", self.amount)
    }

    fn signer_address(&self) -> &str {
        &self.source
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitWithdrawProps {
    pub source: String,
    pub validator: String,
}

impl TxPayload for SubmitWithdrawProps {
    const TX_TYPE: TxType = TxType::Withdraw;

    fn validate(&self) -> Result<(), ValidationError> {
        validate_address("source", &self.source)?;
        validate_address("validator", &self.validator)
    }

    fn signer_address(&self) -> &str {
        &self.source
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferProps {
    pub source: String,
    pub target: String,
    pub token: String,
    pub amount: Uint128,
    pub native_token: String,
}

impl TxPayload for TransferProps {
    const TX_TYPE: TxType = TxType::Transfer;

    fn validate(&self) -> Result<(), ValidationError> {
        validate_address("source", &self.source)?;
        validate_address("target", &self.target)?;
        validate_address("token", &self.token)?;
        validate_address("native_token", &self.native_token)?;
        validate_amount("amount", self.amount)
    }

    fn signer_address(&self) -> &str {
        &self.source
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IbcTransferProps {
    pub source: String,
    /// Address on the counterparty chain, any encoding
    pub receiver: String,
    pub token: String,
    pub amount: Uint128,
    pub port_id: String,
    pub channel_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_height: Option<u64>,
    /// Seconds from build time after which the packet times out
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_sec_offset: Option<u64>,
}

impl TxPayload for IbcTransferProps {
    const TX_TYPE: TxType = TxType::IbcTransfer;

    fn validate(&self) -> Result<(), ValidationError> {
        validate_address("source", &self.source)?;
        validate_address("token", &self.token)?;
        validate_amount("amount", self.amount)?;
        validate_non_empty("receiver", &self.receiver)?;
        validate_non_empty("port_id", &self.port_id)?;
        validate_non_empty("channel_id", &self.channel_id)
    }

    fn signer_address(&self) -> &str {
        &self.source
    }

    fn message(&self) -> Result<Value, serde_json::Error> {
        let mut message = serde_json::to_value(self)?;
        if let (Some(offset), Some(object)) = (self.timeout_sec_offset, message.as_object_mut()) {
            let offset = i64::try_from(offset).unwrap_or(i64::MAX);
            let timeout = Utc::now().timestamp().saturating_add(offset);
            object.insert("timeoutTimestamp".to_string(), Value::from(timeout));
        }
        Ok(message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vote {
    Yay,
    Nay,
    Abstain,
}

impl std::str::FromStr for Vote {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "yay" => Ok(Vote::Yay),
            "nay" => Ok(Vote::Nay),
            "abstain" => Ok(Vote::Abstain),
            other => Err(ValidationError::new(
                "vote",
                format!("expected yay, nay or abstain, got {other}"),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitVoteProposalProps {
    pub signer: String,
    pub vote: Vote,
    pub proposal_id: u64,
}

impl TxPayload for SubmitVoteProposalProps {
    const TX_TYPE: TxType = TxType::VoteProposal;

    fn validate(&self) -> Result<(), ValidationError> {
        validate_address("signer", &self.signer)
    }

    fn signer_address(&self) -> &str {
        &self.signer
    }
}

/// Transfer into the Ethereum bridge pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeTransferProps {
    /// Non-usable token (wrapped form) instead of the ERC20 itself
    pub nut: bool,
    /// ERC20 contract address on Ethereum
    pub asset: String,
    /// Ethereum recipient
    pub recipient: String,
    pub sender: String,
    pub amount: Uint128,
    pub fee_amount: Uint128,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_payer: Option<String>,
    pub fee_token: String,
}

impl TxPayload for BridgeTransferProps {
    const TX_TYPE: TxType = TxType::EthBridgeTransfer;

    fn validate(&self) -> Result<(), ValidationError> {
        validate_eth_address("asset", &self.asset)?;
        validate_eth_address("recipient", &self.recipient)?;
        validate_address("sender", &self.sender)?;
        validate_address("fee_token", &self.fee_token)?;
        if let Some(fee_payer) = &self.fee_payer {
            validate_address("fee_payer", fee_payer)?;
        }
        validate_amount("amount", self.amount)
    }

    fn signer_address(&self) -> &str {
        &self.sender
    }
}

/// Body of the reveal-public-key transaction sent before an account's first use
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealPkProps {
    pub address: String,
    pub public_key: String,
}

impl TxPayload for RevealPkProps {
    const TX_TYPE: TxType = TxType::RevealPk;

    fn validate(&self) -> Result<(), ValidationError> {
        validate_address("address", &self.address)?;
        hex::decode(&self.public_key)
            .map(|_| ())
            .map_err(|e| ValidationError::new("public_key", e.to_string()))
    }

    fn signer_address(&self) -> &str {
        &self.address
    }
}

fn validate_non_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    Ok(())
}

fn validate_address(field: &'static str, value: &str) -> Result<(), ValidationError> {
    validate_non_empty(field, value)?;
    bech32::decode(value)
        .map(|_| ())
        .map_err(|e| ValidationError::new(field, format!("not a bech32 address: {e}")))
}

fn validate_amount(field: &'static str, amount: Uint128) -> Result<(), ValidationError> {
    if amount.is_zero() {
        return Err(ValidationError::new(field, "must be greater than zero"));
    }
    Ok(())
}

fn validate_eth_address(field: &'static str, value: &str) -> Result<(), ValidationError> {
    let digits = value
        .strip_prefix("0x")
        .ok_or_else(|| ValidationError::new(field, "missing 0x prefix"))?;
    if digits.len() != 40 || hex::decode(digits).is_err() {
        return Err(ValidationError::new(field, "expected 20 hex-encoded bytes"));
    }
    Ok(())
}
