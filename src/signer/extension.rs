use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::chain::ChainClient;
use crate::signer::pipeline::{check_request, sign_and_broadcast, ExtensionKey};
use crate::signer::{Signer, SignerError};
use crate::types::{
    Account, AccountType, Bip44Path, BridgeTransferProps, IbcTransferProps, SubmitBondProps,
    SubmitUnbondProps, SubmitVoteProposalProps, SubmitWithdrawProps, TransferProps, TxPayload,
    TxProps,
};
use crate::wallet::Keplr;

const SUPPORTED: [AccountType; 1] = [AccountType::Extension];

/// Signer backed by the browser extension behind a `Keplr` adapter
pub struct ExtensionSigner {
    keplr: Keplr,
    client: Arc<dyn ChainClient>,
}

impl ExtensionSigner {
    pub fn new(keplr: Keplr, client: Arc<dyn ChainClient>) -> Self {
        Self { keplr, client }
    }

    pub fn keplr(&self) -> &Keplr {
        &self.keplr
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
        check_request(&self.keplr.chain().id, props, tx_props)?;

        self.keplr.enable().await?;
        let signer = self.keplr.offline_signer().await?;
        let address = props.signer_address();
        let account = signer
            .get_accounts()
            .await
            .map_err(|e| SignerError::Wallet(e.into()))?
            .into_iter()
            .find(|account| account.address == address)
            .ok_or_else(|| SignerError::AccountNotFound {
                address: address.to_string(),
                account_type,
            })?;

        info!(tx_type = ?P::TX_TYPE, address, "Submitting transaction through extension");
        let key = ExtensionKey { signer, account };
        sign_and_broadcast(self.client.as_ref(), &key, props, tx_props).await?;
        Ok(())
    }
}

#[async_trait]
impl Signer for ExtensionSigner {
    fn account_types(&self) -> &[AccountType] {
        &SUPPORTED
    }

    async fn accounts(&self, chain_id: Option<&str>) -> Result<Option<Vec<Account>>, SignerError> {
        if !self.keplr.detect() {
            return Ok(None);
        }
        let chain = self.keplr.chain();
        if chain_id.is_some_and(|id| id != chain.id) {
            return Ok(Some(vec![]));
        }

        self.keplr.enable().await?;
        let key = self.keplr.get_key().await?;
        let signer = self.keplr.offline_signer().await?;
        let accounts = signer
            .get_accounts()
            .await
            .map_err(|e| SignerError::Wallet(e.into()))?
            .into_iter()
            .map(|data| Account {
                id: data.address.clone(),
                alias: key.name.clone(),
                address: data.address,
                public_key: hex::encode(&data.pubkey),
                account_type: AccountType::Extension,
                chain_id: Some(chain.id.clone()),
                path: Bip44Path {
                    account: chain.account_index,
                    ..Bip44Path::default()
                },
            })
            .collect();
        Ok(Some(accounts))
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
