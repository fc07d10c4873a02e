use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::signer::{Signer, SignerError};
use crate::types::{
    Account, AccountType, BridgeTransferProps, IbcTransferProps, SubmitBondProps,
    SubmitUnbondProps, SubmitVoteProposalProps, SubmitWithdrawProps, TransferProps, TxProps,
};

/// Routes each call to the backend registered for its `AccountType`
#[derive(Default)]
pub struct SignerSet {
    backends: Vec<Arc<dyn Signer>>,
    by_type: HashMap<AccountType, usize>,
    account_types: Vec<AccountType>,
}

impl SignerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `signer` for every account type it supports; later registrations win
    pub fn register(mut self, signer: Arc<dyn Signer>) -> Self {
        let index = self.backends.len();
        for account_type in signer.account_types() {
            if self.by_type.insert(*account_type, index).is_none() {
                self.account_types.push(*account_type);
            }
        }
        self.backends.push(signer);
        self
    }

    pub fn backend(&self, account_type: AccountType) -> Result<&Arc<dyn Signer>, SignerError> {
        self.by_type
            .get(&account_type)
            .map(|index| &self.backends[*index])
            .ok_or(SignerError::UnsupportedAccountType(account_type))
    }
}

#[async_trait]
impl Signer for SignerSet {
    fn account_types(&self) -> &[AccountType] {
        &self.account_types
    }

    /// `None` only when no backend has accounts available
    async fn accounts(&self, chain_id: Option<&str>) -> Result<Option<Vec<Account>>, SignerError> {
        let mut merged: Option<Vec<Account>> = None;
        for backend in &self.backends {
            if let Some(accounts) = backend.accounts(chain_id).await? {
                merged.get_or_insert_with(Vec::new).extend(accounts);
            }
        }
        Ok(merged)
    }

    async fn default_account(&self, chain_id: Option<&str>) -> Result<Option<Account>, SignerError> {
        for backend in &self.backends {
            if let Some(account) = backend.default_account(chain_id).await? {
                return Ok(Some(account));
            }
        }
        Ok(None)
    }

    async fn submit_bond(
        &self,
        args: &SubmitBondProps,
        tx_args: &TxProps,
        account_type: AccountType,
    ) -> Result<(), SignerError> {
        self.backend(account_type)?
            .submit_bond(args, tx_args, account_type)
            .await
    }

    async fn submit_unbond(
        &self,
        args: &SubmitUnbondProps,
        tx_args: &TxProps,
        account_type: AccountType,
    ) -> Result<(), SignerError> {
        self.backend(account_type)?
            .submit_unbond(args, tx_args, account_type)
            .await
    }

    async fn submit_withdraw(
        &self,
        args: &SubmitWithdrawProps,
        tx_args: &TxProps,
        account_type: AccountType,
    ) -> Result<(), SignerError> {
        self.backend(account_type)?
            .submit_withdraw(args, tx_args, account_type)
            .await
    }

    async fn submit_transfer(
        &self,
        args: &TransferProps,
        tx_args: &TxProps,
        account_type: AccountType,
    ) -> Result<(), SignerError> {
        self.backend(account_type)?
            .submit_transfer(args, tx_args, account_type)
            .await
    }

    async fn submit_ibc_transfer(
        &self,
        args: &IbcTransferProps,
        tx_args: &TxProps,
        account_type: AccountType,
    ) -> Result<(), SignerError> {
        self.backend(account_type)?
            .submit_ibc_transfer(args, tx_args, account_type)
            .await
    }

    async fn submit_vote_proposal(
        &self,
        args: &SubmitVoteProposalProps,
        tx_args: &TxProps,
        account_type: AccountType,
    ) -> Result<(), SignerError> {
        self.backend(account_type)?
            .submit_vote_proposal(args, tx_args, account_type)
            .await
    }

    async fn submit_eth_bridge_transfer(
        &self,
        args: &BridgeTransferProps,
        tx_args: &TxProps,
        account_type: AccountType,
    ) -> Result<(), SignerError> {
        self.backend(account_type)?
            .submit_eth_bridge_transfer(args, tx_args, account_type)
            .await
    }
}
