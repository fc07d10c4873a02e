//! Software signer over an in-memory keystore
//!
//! Supports mnemonic-derived and imported private-key accounts. The keystore
//! is handed over at construction; a signer built without one is locked and
//! reports no accounts at all.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::chain::ChainClient;
use crate::signer::pipeline::{check_request, sign_and_broadcast};
use crate::signer::{Signer, SignerError};
use crate::types::{
    Account, AccountType, Bip44Path, BridgeTransferProps, IbcTransferProps, SubmitBondProps,
    SubmitUnbondProps, SubmitVoteProposalProps, SubmitWithdrawProps, TransferProps, TxPayload,
    TxProps,
};
use crate::wallet::SoftwareKey;

const SUPPORTED: [AccountType; 2] = [AccountType::Mnemonic, AccountType::PrivateKey];

struct Entry {
    account: Account,
    key: SoftwareKey,
}

/// Accounts and their keys, never persisted
pub struct Keystore {
    prefix: String,
    coin_type: u32,
    entries: Vec<Entry>,
}

impl Keystore {
    pub fn new(prefix: &str, coin_type: u32) -> Self {
        Self {
            prefix: prefix.to_string(),
            coin_type,
            entries: Vec::new(),
        }
    }

    /// Derive an account from a mnemonic at `path`
    pub fn add_mnemonic(
        &mut self,
        alias: &str,
        mnemonic: &str,
        passphrase: &str,
        path: Bip44Path,
        chain_id: Option<&str>,
    ) -> Result<&Account> {
        let key = SoftwareKey::from_mnemonic(mnemonic, passphrase, &self.prefix, self.coin_type, path)?;
        Ok(self.insert(alias, key, AccountType::Mnemonic, chain_id))
    }

    pub fn add_private_key(
        &mut self,
        alias: &str,
        private_key_hex: &str,
        chain_id: Option<&str>,
    ) -> Result<&Account> {
        let key = SoftwareKey::from_private_key_hex(private_key_hex, &self.prefix)?;
        Ok(self.insert(alias, key, AccountType::PrivateKey, chain_id))
    }

    fn insert(
        &mut self,
        alias: &str,
        key: SoftwareKey,
        account_type: AccountType,
        chain_id: Option<&str>,
    ) -> &Account {
        let account = Account {
            id: uuid::Uuid::new_v4().to_string(),
            alias: alias.to_string(),
            address: key.address.clone(),
            public_key: hex::encode(key.public_key_bytes()),
            account_type,
            chain_id: chain_id.map(str::to_string),
            path: key.path,
        };
        self.entries.push(Entry { account, key });
        &self.entries[self.entries.len() - 1].account
    }

    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.entries.iter().map(|entry| &entry.account)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn find(&self, address: &str, account_type: AccountType, chain_id: &str) -> Option<&Entry> {
        self.entries.iter().find(|entry| {
            entry.account.address == address
                && entry.account.account_type == account_type
                && entry.account.matches_chain(Some(chain_id))
        })
    }
}

pub struct KeystoreSigner {
    chain_id: String,
    keystore: Option<Keystore>,
    client: Arc<dyn ChainClient>,
}

impl KeystoreSigner {
    pub fn new(chain_id: &str, keystore: Keystore, client: Arc<dyn ChainClient>) -> Self {
        Self {
            chain_id: chain_id.to_string(),
            keystore: Some(keystore),
            client,
        }
    }

    /// Signer whose keystore has not been unlocked
    pub fn locked(chain_id: &str, client: Arc<dyn ChainClient>) -> Self {
        Self {
            chain_id: chain_id.to_string(),
            keystore: None,
            client,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.keystore.is_none()
    }

    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    async fn submit<P: TxPayload>(
        &self,
        props: &P,
        tx_props: &TxProps,
        account_type: AccountType,
    ) -> Result<(), SignerError> {
        if !SUPPORTED.contains(&account_type) {
            return Err(SignerError::UnsupportedAccountType(account_type));
        }
        check_request(&self.chain_id, props, tx_props)?;

        let keystore = self.keystore.as_ref().ok_or(SignerError::Locked)?;
        let address = props.signer_address();
        let entry = keystore
            .find(address, account_type, &self.chain_id)
            .ok_or_else(|| SignerError::AccountNotFound {
                address: address.to_string(),
                account_type,
            })?;

        info!(tx_type = ?P::TX_TYPE, account = %entry.account.alias, "Submitting transaction");
        sign_and_broadcast(self.client.as_ref(), &entry.key, props, tx_props).await?;
        Ok(())
    }
}

#[async_trait]
impl Signer for KeystoreSigner {
    fn account_types(&self) -> &[AccountType] {
        &SUPPORTED
    }

    async fn accounts(&self, chain_id: Option<&str>) -> Result<Option<Vec<Account>>, SignerError> {
        Ok(self.keystore.as_ref().map(|keystore| {
            keystore
                .accounts()
                .filter(|account| account.matches_chain(chain_id))
                .cloned()
                .collect()
        }))
    }

    async fn default_account(&self, chain_id: Option<&str>) -> Result<Option<Account>, SignerError> {
        let accounts = self.accounts(chain_id).await?;
        Ok(accounts.and_then(|accounts| accounts.into_iter().next()))
    }

    async fn submit_bond(
        &self,
        args: &SubmitBondProps,
        tx_args: &TxProps,
        account_type: AccountType,
    ) -> Result<(), SignerError> {
        self.submit(args, tx_args, account_type).await
    }

    async fn submit_unbond(
        &self,
        args: &SubmitUnbondProps,
        tx_args: &TxProps,
        account_type: AccountType,
    ) -> Result<(), SignerError> {
        self.submit(args, tx_args, account_type).await
    }

    async fn submit_withdraw(
        &self,
        args: &SubmitWithdrawProps,
        tx_args: &TxProps,
        account_type: AccountType,
    ) -> Result<(), SignerError> {
        self.submit(args, tx_args, account_type).await
    }

    async fn submit_transfer(
        &self,
        args: &TransferProps,
        tx_args: &TxProps,
        account_type: AccountType,
    ) -> Result<(), SignerError> {
        self.submit(args, tx_args, account_type).await
    }

    async fn submit_ibc_transfer(
        &self,
        args: &IbcTransferProps,
        tx_args: &TxProps,
        account_type: AccountType,
    ) -> Result<(), SignerError> {
        self.submit(args, tx_args, account_type).await
    }

    async fn submit_vote_proposal(
        &self,
        args: &SubmitVoteProposalProps,
        tx_args: &TxProps,
        account_type: AccountType,
    ) -> Result<(), SignerError> {
        self.submit(args, tx_args, account_type).await
    }

    async fn submit_eth_bridge_transfer(
        &self,
        args: &BridgeTransferProps,
        tx_args: &TxProps,
        account_type: AccountType,
    ) -> Result<(), SignerError> {
        self.submit(args, tx_args, account_type).await
    }
}
