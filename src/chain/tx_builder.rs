//! Transaction builder shared by every signer backend
//!
//! Transactions use the Cosmos SDK `SIGN_MODE_DIRECT` layout: a protobuf body
//! (one message, memo) and auth info (fee, signer public key, sequence). The
//! message itself travels as an `Any` whose type URL names the transaction
//! kind and whose value is the JSON-encoded props. The signed payload is the
//! protobuf `SignDoc`, which additionally binds the chain id and the account
//! number.

use cosmwasm_std::Uint128;
use prost::Message;
use serde_json::Value;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::chain::proto::{self, mode_info, Any, TxRaw};
use crate::types::{TxPayload, TxProps, TxType};

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed protobuf: {0}")]
    Proto(#[from] prost::DecodeError),

    #[error("malformed message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Invalid(String),
}

/// Decoded view of `TxBody.body_bytes`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxBody {
    pub tx_type: TxType,
    pub message: Value,
    pub memo: String,
}

impl TxBody {
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        let body = proto::TxBody {
            messages: vec![Any {
                type_url: self.tx_type.type_url().to_string(),
                value: serde_json::to_vec(&self.message)?,
            }],
            memo: self.memo.clone(),
            timeout_height: 0,
        };
        Ok(body.encode_to_vec())
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let body = proto::TxBody::decode(bytes)?;
        let message = body
            .messages
            .into_iter()
            .next()
            .ok_or_else(|| DecodeError::Invalid("body carries no message".to_string()))?;
        let tx_type = TxType::from_type_url(&message.type_url)
            .ok_or_else(|| DecodeError::Invalid(format!("unknown message type {}", message.type_url)))?;

        Ok(Self {
            tx_type,
            message: serde_json::from_slice(&message.value)?,
            memo: body.memo,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fee {
    pub token: String,
    pub amount: Uint128,
    pub gas_limit: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerInfo {
    /// Compressed secp256k1 key
    pub public_key: Vec<u8>,
    pub sequence: u64,
}

/// Decoded view of `TxBody.auth_info_bytes`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthInfo {
    pub signer_infos: Vec<SignerInfo>,
    pub fee: Fee,
}

impl AuthInfo {
    pub fn to_bytes(&self) -> Vec<u8> {
        let signer_infos = self
            .signer_infos
            .iter()
            .map(|info| proto::SignerInfo {
                public_key: Some(Any {
                    type_url: proto::SECP256K1_PUBKEY_TYPE_URL.to_string(),
                    value: proto::PubKey {
                        key: info.public_key.clone(),
                    }
                    .encode_to_vec(),
                }),
                mode_info: Some(proto::ModeInfo {
                    sum: Some(mode_info::Sum::Single(mode_info::Single {
                        mode: proto::SIGN_MODE_DIRECT,
                    })),
                }),
                sequence: info.sequence,
            })
            .collect();

        let auth_info = proto::AuthInfo {
            signer_infos,
            fee: Some(proto::Fee {
                amount: vec![proto::Coin {
                    denom: self.fee.token.clone(),
                    amount: self.fee.amount.to_string(),
                }],
                gas_limit: self.fee.gas_limit,
                payer: String::new(),
                granter: String::new(),
            }),
        };
        auth_info.encode_to_vec()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let auth_info = proto::AuthInfo::decode(bytes)?;

        let mut signer_infos = Vec::with_capacity(auth_info.signer_infos.len());
        for info in auth_info.signer_infos {
            let public_key = info
                .public_key
                .ok_or_else(|| DecodeError::Invalid("signer info without public key".to_string()))?;
            signer_infos.push(SignerInfo {
                public_key: proto::PubKey::decode(public_key.value.as_slice())?.key,
                sequence: info.sequence,
            });
        }

        let fee = auth_info
            .fee
            .ok_or_else(|| DecodeError::Invalid("auth info without fee".to_string()))?;
        let coin = fee
            .amount
            .into_iter()
            .next()
            .ok_or_else(|| DecodeError::Invalid("fee without amount".to_string()))?;
        let amount: u128 = coin
            .amount
            .parse()
            .map_err(|e| DecodeError::Invalid(format!("fee amount {}: {}", coin.amount, e)))?;

        Ok(Self {
            signer_infos,
            fee: Fee {
                token: coin.denom,
                amount: Uint128::new(amount),
                gas_limit: fee.gas_limit,
            },
        })
    }
}

/// Payload a signer commits to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignDoc {
    pub body_bytes: Vec<u8>,
    pub auth_info_bytes: Vec<u8>,
    pub chain_id: String,
    pub account_number: u64,
}

impl SignDoc {
    /// Canonical bytes that get hashed and signed; also what a hardware
    /// wallet is shown
    pub fn sign_bytes(&self) -> Vec<u8> {
        proto::SignDoc {
            body_bytes: self.body_bytes.clone(),
            auth_info_bytes: self.auth_info_bytes.clone(),
            chain_id: self.chain_id.clone(),
            account_number: self.account_number,
        }
        .encode_to_vec()
    }

    /// SHA256 of `sign_bytes`
    pub fn sign_hash(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.sign_bytes());
        hasher.finalize().into()
    }

    pub fn body(&self) -> Result<TxBody, DecodeError> {
        TxBody::from_bytes(&self.body_bytes)
    }

    pub fn auth_info(&self) -> Result<AuthInfo, DecodeError> {
        AuthInfo::from_bytes(&self.auth_info_bytes)
    }

    /// Attach a signature produced elsewhere (extension, hardware wallet)
    pub fn into_tx_raw(self, signature: Vec<u8>) -> TxRaw {
        TxRaw {
            body_bytes: self.body_bytes,
            auth_info_bytes: self.auth_info_bytes,
            signatures: vec![signature],
        }
    }
}

/// Builds sign docs from a `TxProps` envelope and the signer's account state
#[derive(Debug, Clone)]
pub struct TxBuilder {
    chain_id: String,
    account_number: u64,
    sequence: u64,
    fee: Fee,
    memo: String,
}

impl TxBuilder {
    pub fn new(tx_props: &TxProps, account_number: u64, sequence: u64) -> Self {
        Self {
            chain_id: tx_props.chain_id.clone(),
            account_number,
            sequence,
            fee: Fee {
                token: tx_props.token.clone(),
                amount: tx_props.fee_amount,
                gas_limit: tx_props.gas_limit,
            },
            memo: tx_props.memo.clone().unwrap_or_default(),
        }
    }

    /// Override the gas limit taken from the envelope
    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.fee.gas_limit = gas_limit;
        self
    }

    /// Build the sign doc for `payload`, signed by `public_key`
    pub fn build<P: TxPayload>(
        &self,
        payload: &P,
        public_key: &[u8],
    ) -> Result<SignDoc, serde_json::Error> {
        let body = TxBody {
            tx_type: P::TX_TYPE,
            message: payload.message()?,
            memo: self.memo.clone(),
        };

        let auth_info = AuthInfo {
            signer_infos: vec![SignerInfo {
                public_key: public_key.to_vec(),
                sequence: self.sequence,
            }],
            fee: self.fee.clone(),
        };

        Ok(SignDoc {
            body_bytes: body.to_bytes()?,
            auth_info_bytes: auth_info.to_bytes(),
            chain_id: self.chain_id.clone(),
            account_number: self.account_number,
        })
    }
}
