//! `Signer` capability and its backends
//!
//! Callers pick the backend by `AccountType` (see `SignerSet`). Submit
//! operations resolve with `()` on success; confirmation has to be obtained
//! separately from chain state.

mod extension;
mod keystore;
mod ledger;
pub(crate) mod pipeline;
mod set;

pub use extension::ExtensionSigner;
pub use keystore::{Keystore, KeystoreSigner};
pub use ledger::LedgerSigner;
pub use set::SignerSet;

use async_trait::async_trait;
use thiserror::Error;

use crate::chain::ClientError;
use crate::types::{
    Account, AccountType, BridgeTransferProps, IbcTransferProps, SubmitBondProps,
    SubmitUnbondProps, SubmitVoteProposalProps, SubmitWithdrawProps, TransferProps, TxProps,
    ValidationError,
};
use crate::wallet::{LedgerError, WalletError};

#[derive(Debug, Error)]
pub enum SignerError {
    #[error("account type {0} is not supported by this signer")]
    UnsupportedAccountType(AccountType),

    #[error(transparent)]
    InvalidProps(#[from] ValidationError),

    #[error("chain id mismatch: session is {expected}, transaction targets {actual}")]
    ChainMismatch { expected: String, actual: String },

    #[error("no {account_type} account with address {address}")]
    AccountNotFound {
        address: String,
        account_type: AccountType,
    },

    #[error("keystore is locked")]
    Locked,

    #[error("fee payer {public_key} is not the signer; wrapper signing is not supported")]
    UnsupportedFeePayer { public_key: String },

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("failed to encode transaction: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error("hardware wallet: {0}")]
    Hardware(#[from] LedgerError),

    #[error(transparent)]
    Network(#[from] ClientError),
}

#[async_trait]
pub trait Signer: Send + Sync {
    /// Account types this backend can sign for
    fn account_types(&self) -> &[AccountType];

    /// `None`: no accounts available at all. `Some(vec![])`: loaded, none match.
    async fn accounts(&self, chain_id: Option<&str>) -> Result<Option<Vec<Account>>, SignerError>;

    async fn default_account(&self, chain_id: Option<&str>) -> Result<Option<Account>, SignerError>;

    async fn submit_bond(
        &self,
        args: &SubmitBondProps,
        tx_args: &TxProps,
        account_type: AccountType,
    ) -> Result<(), SignerError>;

    async fn submit_unbond(
        &self,
        args: &SubmitUnbondProps,
        tx_args: &TxProps,
        account_type: AccountType,
    ) -> Result<(), SignerError>;

    async fn submit_withdraw(
        &self,
        args: &SubmitWithdrawProps,
        tx_args: &TxProps,
        account_type: AccountType,
    ) -> Result<(), SignerError>;

    async fn submit_transfer(
        &self,
        args: &TransferProps,
        tx_args: &TxProps,
        account_type: AccountType,
    ) -> Result<(), SignerError>;

    async fn submit_ibc_transfer(
        &self,
        args: &IbcTransferProps,
        tx_args: &TxProps,
        account_type: AccountType,
    ) -> Result<(), SignerError>;

    async fn submit_vote_proposal(
        &self,
        args: &SubmitVoteProposalProps,
        tx_args: &TxProps,
        account_type: AccountType,
    ) -> Result<(), SignerError>;

    async fn submit_eth_bridge_transfer(
        &self,
        args: &BridgeTransferProps,
        tx_args: &TxProps,
        account_type: AccountType,
    ) -> Result<(), SignerError>;
}

#[cfg(test)]
pub(crate) mod test_support {
    use async_trait::async_trait;
    use cosmwasm_std::Uint128;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    use crate::chain::{AccountState, AuthInfo, ChainClient, ClientError, SignDoc, TxBody, TxRaw, TxResponse};
    use crate::signer::Signer;
    use crate::types::{
        AccountType, BridgeTransferProps, IbcTransferProps, SubmitBondProps, SubmitUnbondProps,
        SubmitVoteProposalProps, SubmitWithdrawProps, TransferProps, TxProps, TxType, Vote,
    };
    use crate::wallet::bech32_address;

    pub const CHAIN_ID: &str = "anoma-test.fd58c789bc11e6c6392";
    pub const MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
    pub const ACCOUNT_NUMBER: u64 = 7;

    /// Chain client that records broadcasts and tracks revealed keys and
    /// sequences per address
    pub struct RecordingClient {
        pub reveal_required: bool,
        pub response_code: u32,
        revealed: Mutex<HashSet<String>>,
        sequences: Mutex<HashMap<String, u64>>,
        broadcasts: Mutex<Vec<TxRaw>>,
    }

    impl RecordingClient {
        pub fn new() -> Self {
            Self {
                reveal_required: false,
                response_code: 0,
                revealed: Mutex::new(HashSet::new()),
                sequences: Mutex::new(HashMap::new()),
                broadcasts: Mutex::new(vec![]),
            }
        }

        pub fn requiring_reveal() -> Self {
            Self {
                reveal_required: true,
                ..Self::new()
            }
        }

        pub fn rejecting(code: u32) -> Self {
            Self {
                response_code: code,
                ..Self::new()
            }
        }

        pub fn broadcasts(&self) -> Vec<TxRaw> {
            self.broadcasts.lock().unwrap().clone()
        }

        pub fn bodies(&self) -> Vec<TxBody> {
            self.broadcasts()
                .iter()
                .map(|tx| TxBody::from_bytes(&tx.body_bytes).unwrap())
                .collect()
        }

        pub fn tx_types(&self) -> Vec<TxType> {
            self.bodies().iter().map(|body| body.tx_type).collect()
        }

        pub fn auth_infos(&self) -> Vec<AuthInfo> {
            self.broadcasts()
                .iter()
                .map(|tx| AuthInfo::from_bytes(&tx.auth_info_bytes).unwrap())
                .collect()
        }

        /// Rebuild the sign doc a broadcast was signed over
        pub fn sign_doc(&self, index: usize) -> SignDoc {
            let tx = &self.broadcasts()[index];
            SignDoc {
                body_bytes: tx.body_bytes.clone(),
                auth_info_bytes: tx.auth_info_bytes.clone(),
                chain_id: CHAIN_ID.to_string(),
                account_number: ACCOUNT_NUMBER,
            }
        }
    }

    #[async_trait]
    impl ChainClient for RecordingClient {
        async fn broadcast(&self, tx: &TxRaw) -> Result<TxResponse, ClientError> {
            let mut broadcasts = self.broadcasts.lock().unwrap();
            broadcasts.push(tx.clone());
            let response = TxResponse {
                txhash: format!("{:064X}", broadcasts.len()),
                code: self.response_code,
                raw_log: if self.response_code == 0 { String::new() } else { "rejected".to_string() },
            };
            if self.response_code != 0 {
                return Ok(response);
            }

            let body = TxBody::from_bytes(&tx.body_bytes).unwrap();
            if body.tx_type == TxType::RevealPk {
                let address = body.message["address"].as_str().unwrap_or_default().to_string();
                self.revealed.lock().unwrap().insert(address);
            }
            let auth_info = AuthInfo::from_bytes(&tx.auth_info_bytes).unwrap();
            let public_key: [u8; 33] = auth_info.signer_infos[0].public_key.as_slice().try_into().unwrap();
            let signer = bech32_address("namada", &public_key).unwrap();
            *self.sequences.lock().unwrap().entry(signer).or_default() += 1;
            Ok(response)
        }

        async fn account_state(&self, address: &str) -> Result<AccountState, ClientError> {
            Ok(AccountState {
                account_number: ACCOUNT_NUMBER,
                sequence: self.sequences.lock().unwrap().get(address).copied().unwrap_or_default(),
                public_key_revealed: !self.reveal_required
                    || self.revealed.lock().unwrap().contains(address),
            })
        }
    }

    pub fn address(byte: u8) -> String {
        let hrp = bech32::Hrp::parse("namada").unwrap();
        bech32::encode::<bech32::Bech32>(hrp, &[byte; 20]).unwrap()
    }

    pub fn tx_props() -> TxProps {
        TxProps {
            token: address(9),
            fee_amount: Uint128::new(5000),
            gas_limit: 20_000,
            chain_id: CHAIN_ID.to_string(),
            public_key: None,
            memo: None,
        }
    }

    pub fn transfer_from(source: &str) -> TransferProps {
        TransferProps {
            source: source.to_string(),
            target: address(2),
            token: address(9),
            amount: Uint128::new(1_000_000),
            native_token: address(9),
        }
    }

    /// Run every submit operation once for `source`, in `TxType` code order
    pub async fn submit_all(signer: &dyn Signer, source: &str, account_type: AccountType) {
        let tx = tx_props();
        let bond = SubmitBondProps {
            source: source.to_string(),
            validator: address(4),
            amount: Uint128::new(10),
            native_token: address(9),
        };
        signer.submit_bond(&bond, &tx, account_type).await.unwrap();

        let unbond = SubmitUnbondProps {
            source: source.to_string(),
            validator: address(4),
            amount: Uint128::new(5),
        };
        signer.submit_unbond(&unbond, &tx, account_type).await.unwrap();

        let withdraw = SubmitWithdrawProps {
            source: source.to_string(),
            validator: address(4),
        };
        signer.submit_withdraw(&withdraw, &tx, account_type).await.unwrap();

        signer
            .submit_transfer(&transfer_from(source), &tx, account_type)
            .await
            .unwrap();

        let ibc = IbcTransferProps {
            source: source.to_string(),
            receiver: "cosmos1receiver".to_string(),
            token: address(9),
            amount: Uint128::new(3),
            port_id: "transfer".to_string(),
            channel_id: "channel-0".to_string(),
            timeout_height: None,
            timeout_sec_offset: Some(600),
        };
        signer.submit_ibc_transfer(&ibc, &tx, account_type).await.unwrap();

        let bridge = BridgeTransferProps {
            nut: false,
            asset: format!("0x{}", "ab".repeat(20)),
            recipient: format!("0x{}", "01".repeat(20)),
            sender: source.to_string(),
            amount: Uint128::new(8),
            fee_amount: Uint128::new(1),
            fee_payer: None,
            fee_token: address(9),
        };
        signer
            .submit_eth_bridge_transfer(&bridge, &tx, account_type)
            .await
            .unwrap();

        let vote = SubmitVoteProposalProps {
            signer: source.to_string(),
            vote: Vote::Nay,
            proposal_id: 2,
        };
        signer.submit_vote_proposal(&vote, &tx, account_type).await.unwrap();
    }

    pub const ALL_SUBMIT_TYPES: [TxType; 7] = [
        TxType::Bond,
        TxType::Unbond,
        TxType::Withdraw,
        TxType::Transfer,
        TxType::IbcTransfer,
        TxType::EthBridgeTransfer,
        TxType::VoteProposal,
    ];
}
