//! Hardware wallet signer
//!
//! Accounts are the device keys at the configured BIP44 paths. Nothing is
//! stored locally; every call asks the device again.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use crate::chain::ChainClient;
use crate::signer::pipeline::{check_request, sign_and_broadcast, LedgerKey};
use crate::signer::{Signer, SignerError};
use crate::types::{
    Account, AccountType, Bip44Path, BridgeTransferProps, IbcTransferProps, SubmitBondProps,
    SubmitUnbondProps, SubmitVoteProposalProps, SubmitWithdrawProps, TransferProps, TxPayload,
    TxProps,
};
use crate::wallet::{bech32_address, LedgerDevice};

const SUPPORTED: [AccountType; 1] = [AccountType::Ledger];

pub struct LedgerSigner {
    chain_id: String,
    prefix: String,
    device: Arc<dyn LedgerDevice>,
    paths: Vec<Bip44Path>,
    client: Arc<dyn ChainClient>,
}

impl LedgerSigner {
    pub fn new(
        chain_id: &str,
        prefix: &str,
        device: Arc<dyn LedgerDevice>,
        paths: Vec<Bip44Path>,
        client: Arc<dyn ChainClient>,
    ) -> Self {
        Self {
            chain_id: chain_id.to_string(),
            prefix: prefix.to_string(),
            device,
            paths,
            client,
        }
    }

    async fn key_at(&self, path: Bip44Path) -> Result<LedgerKey, SignerError> {
        let public_key = self.device.public_key(path).await?;
        let address = bech32_address(&self.prefix, &public_key)
            .map_err(|e| SignerError::Signing(e.to_string()))?;
        Ok(LedgerKey {
            device: self.device.clone(),
            path,
            address,
            public_key,
        })
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

        let address = props.signer_address();
        let mut found = None;
        for path in &self.paths {
            let key = self.key_at(*path).await?;
            if key.address == address {
                found = Some(key);
                break;
            }
        }
        let key = found.ok_or_else(|| SignerError::AccountNotFound {
            address: address.to_string(),
            account_type,
        })?;

        info!(tx_type = ?P::TX_TYPE, path = ?key.path, "Submitting transaction, confirm on device");
        sign_and_broadcast(self.client.as_ref(), &key, props, tx_props)
            .await
            .inspect_err(|e| warn!(error = %e, "Hardware signing flow failed"))?;
        Ok(())
    }
}

#[async_trait]
impl Signer for LedgerSigner {
    fn account_types(&self) -> &[AccountType] {
        &SUPPORTED
    }

    async fn accounts(&self, chain_id: Option<&str>) -> Result<Option<Vec<Account>>, SignerError> {
        if chain_id.is_some_and(|wanted| wanted != self.chain_id) {
            return Ok(Some(vec![]));
        }
        let mut accounts = Vec::with_capacity(self.paths.len());
        for path in &self.paths {
            let key = self.key_at(*path).await?;
            accounts.push(Account {
                id: format!("ledger/{}/{}/{}", path.account, path.change, path.index),
                alias: format!("Ledger {}", path.account),
                address: key.address,
                public_key: hex::encode(key.public_key),
                account_type: AccountType::Ledger,
                chain_id: Some(self.chain_id.clone()),
                path: *path,
            });
        }
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signer::test_support::*;
    use crate::types::TxType;
    use crate::wallet::{LedgerError, SoftwareKey, TransactionSigner};
    use sha2::{Digest, Sha256};
    use std::sync::Mutex;

    /// Device backed by software keys; records every payload it is asked to sign
    struct FakeDevice {
        corrupt: bool,
        signed: Mutex<Vec<Vec<u8>>>,
    }

    impl FakeDevice {
        fn new() -> Self {
            Self {
                corrupt: false,
                signed: Mutex::new(vec![]),
            }
        }

        fn key(path: Bip44Path) -> SoftwareKey {
            SoftwareKey::from_mnemonic(MNEMONIC, "", "namada", 118, path).unwrap()
        }
    }

    #[async_trait]
    impl LedgerDevice for FakeDevice {
        async fn public_key(&self, path: Bip44Path) -> Result<[u8; 33], LedgerError> {
            Ok(Self::key(path).public_key_bytes())
        }

        async fn sign(&self, path: Bip44Path, sign_bytes: &[u8]) -> Result<Vec<u8>, LedgerError> {
            self.signed.lock().unwrap().push(sign_bytes.to_vec());
            let hash: [u8; 32] = if self.corrupt {
                Sha256::digest(b"something else").into()
            } else {
                Sha256::digest(sign_bytes).into()
            };
            let private_key = Self::key(path).private_key().unwrap();
            TransactionSigner::new()
                .sign_hash(&hash, &private_key)
                .map_err(|e| LedgerError::new(e.to_string()))
        }
    }

    /// Device that is unplugged
    struct Disconnected;

    #[async_trait]
    impl LedgerDevice for Disconnected {
        async fn public_key(&self, _path: Bip44Path) -> Result<[u8; 33], LedgerError> {
            Err(LedgerError::new("device not connected"))
        }

        async fn sign(&self, _path: Bip44Path, _sign_bytes: &[u8]) -> Result<Vec<u8>, LedgerError> {
            Err(LedgerError::new("device not connected"))
        }
    }

    fn paths() -> Vec<Bip44Path> {
        vec![
            Bip44Path::default(),
            Bip44Path { account: 1, change: 0, index: 0 },
        ]
    }

    fn ledger_signer(device: Arc<dyn LedgerDevice>, client: Arc<RecordingClient>) -> LedgerSigner {
        LedgerSigner::new(CHAIN_ID, "namada", device, paths(), client)
    }

    #[tokio::test]
    async fn test_accounts_come_from_device() {
        let signer = ledger_signer(Arc::new(FakeDevice::new()), Arc::new(RecordingClient::new()));

        let accounts = signer.accounts(Some(CHAIN_ID)).await.unwrap().unwrap();
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[1].address, FakeDevice::key(paths()[1]).address);
        assert!(accounts.iter().all(|a| a.account_type == AccountType::Ledger));
        assert_eq!(accounts[1].path, paths()[1]);

        let elsewhere = signer.accounts(Some("anoma-test.008d3ba61b7bb1852c9")).await.unwrap();
        assert_eq!(elsewhere, Some(vec![]));
    }

    #[tokio::test]
    async fn test_device_signs_exact_sign_bytes() {
        let device = Arc::new(FakeDevice::new());
        let client = Arc::new(RecordingClient::requiring_reveal());
        let signer = ledger_signer(device.clone(), client.clone());
        let source = FakeDevice::key(paths()[1]).address.clone();

        signer
            .submit_transfer(&transfer_from(&source), &tx_props(), AccountType::Ledger)
            .await
            .unwrap();

        assert_eq!(client.tx_types(), vec![TxType::RevealPk, TxType::Transfer]);
        let signed = device.signed.lock().unwrap().clone();
        assert_eq!(signed.len(), 2);
        assert_eq!(signed[1], client.sign_doc(1).sign_bytes());

        let public_key = secp256k1::PublicKey::from_slice(&FakeDevice::key(paths()[1]).public_key_bytes()).unwrap();
        let signature = &client.broadcasts()[1].signatures[0];
        assert!(TransactionSigner::new()
            .verify_doc(&client.sign_doc(1), signature, &public_key)
            .unwrap());
    }

    #[tokio::test]
    async fn test_bad_device_signature_is_not_broadcast() {
        let device = Arc::new(FakeDevice {
            corrupt: true,
            ..FakeDevice::new()
        });
        let client = Arc::new(RecordingClient::new());
        let signer = ledger_signer(device, client.clone());
        let source = FakeDevice::key(paths()[0]).address.clone();

        let err = signer
            .submit_transfer(&transfer_from(&source), &tx_props(), AccountType::Ledger)
            .await
            .unwrap_err();
        assert!(matches!(err, SignerError::Signing(_)));
        assert!(client.broadcasts().is_empty());
    }

    #[tokio::test]
    async fn test_device_errors_pass_through() {
        let signer = ledger_signer(Arc::new(Disconnected), Arc::new(RecordingClient::new()));

        let err = signer.accounts(None).await.unwrap_err();
        assert!(matches!(err, SignerError::Hardware(ref e) if e.message() == "device not connected"));

        let err = signer
            .submit_transfer(&transfer_from(&address(1)), &tx_props(), AccountType::Ledger)
            .await
            .unwrap_err();
        assert!(matches!(err, SignerError::Hardware(_)));
    }

    #[tokio::test]
    async fn test_rejects_unknown_address_and_other_types() {
        let client = Arc::new(RecordingClient::new());
        let signer = ledger_signer(Arc::new(FakeDevice::new()), client.clone());

        let err = signer
            .submit_transfer(&transfer_from(&address(3)), &tx_props(), AccountType::Ledger)
            .await
            .unwrap_err();
        assert!(matches!(err, SignerError::AccountNotFound { .. }));

        let source = FakeDevice::key(paths()[0]).address.clone();
        let err = signer
            .submit_transfer(&transfer_from(&source), &tx_props(), AccountType::Mnemonic)
            .await
            .unwrap_err();
        assert!(matches!(err, SignerError::UnsupportedAccountType(AccountType::Mnemonic)));
        assert!(client.broadcasts().is_empty());
    }
}
