//! Submit pipeline shared by the signer backends
//!
//! check request -> look up account number and sequence -> reveal public key
//! if the chain has not seen it -> build sign doc -> sign -> broadcast.
//! Nothing is retried.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use crate::chain::{ChainClient, SignDoc, TxBuilder, TxResponse};
use crate::signer::SignerError;
use crate::types::{Bip44Path, RevealPkProps, TxPayload, TxProps};
use crate::wallet::{AccountData, LedgerDevice, OfflineSigner, SoftwareKey, TransactionSigner, WalletError};

/// A key able to sign for one address
#[async_trait]
pub(crate) trait SigningKey: Send + Sync {
    fn address(&self) -> &str;

    fn public_key(&self) -> Vec<u8>;

    async fn sign(&self, doc: &SignDoc) -> Result<Vec<u8>, SignerError>;
}

#[async_trait]
impl SigningKey for SoftwareKey {
    fn address(&self) -> &str {
        &self.address
    }

    fn public_key(&self) -> Vec<u8> {
        self.public_key_bytes().to_vec()
    }

    async fn sign(&self, doc: &SignDoc) -> Result<Vec<u8>, SignerError> {
        SoftwareKey::sign(self, doc).map_err(|e| SignerError::Signing(e.to_string()))
    }
}

/// Account held by an extension, signed via its offline signer
pub(crate) struct ExtensionKey {
    pub signer: Box<dyn OfflineSigner>,
    pub account: AccountData,
}

#[async_trait]
impl SigningKey for ExtensionKey {
    fn address(&self) -> &str {
        &self.account.address
    }

    fn public_key(&self) -> Vec<u8> {
        self.account.pubkey.clone()
    }

    async fn sign(&self, doc: &SignDoc) -> Result<Vec<u8>, SignerError> {
        self.signer
            .sign_direct(&self.account.address, doc)
            .await
            .map_err(|e| SignerError::Wallet(WalletError::from(e)))
    }
}

/// Key on a hardware wallet. The device gets the unsigned sign bytes and
/// hands back a signature, which is checked before it is attached.
pub(crate) struct LedgerKey {
    pub device: Arc<dyn LedgerDevice>,
    pub path: Bip44Path,
    pub address: String,
    pub public_key: [u8; 33],
}

#[async_trait]
impl SigningKey for LedgerKey {
    fn address(&self) -> &str {
        &self.address
    }

    fn public_key(&self) -> Vec<u8> {
        self.public_key.to_vec()
    }

    async fn sign(&self, doc: &SignDoc) -> Result<Vec<u8>, SignerError> {
        let signature = self.device.sign(self.path, &doc.sign_bytes()).await?;

        let public_key = secp256k1::PublicKey::from_slice(&self.public_key)
            .map_err(|e| SignerError::Signing(e.to_string()))?;
        let valid = TransactionSigner::new()
            .verify_doc(doc, &signature, &public_key)
            .map_err(|e| SignerError::Signing(e.to_string()))?;
        if !valid {
            return Err(SignerError::Signing(
                "device signature does not match the sign doc".to_string(),
            ));
        }
        Ok(signature)
    }
}

/// Structural checks plus the session chain invariant
pub(crate) fn check_request<P: TxPayload>(
    session_chain_id: &str,
    props: &P,
    tx_props: &TxProps,
) -> Result<(), SignerError> {
    props.validate()?;
    tx_props.validate()?;
    if tx_props.chain_id != session_chain_id {
        return Err(SignerError::ChainMismatch {
            expected: session_chain_id.to_string(),
            actual: tx_props.chain_id.clone(),
        });
    }
    Ok(())
}

/// Only the signer pays fees; a separate wrapper signature is never produced
fn check_fee_payer(key: &dyn SigningKey, tx_props: &TxProps) -> Result<(), SignerError> {
    let Some(fee_payer) = &tx_props.public_key else {
        return Ok(());
    };
    let matches = hex::decode(fee_payer).is_ok_and(|bytes| bytes == key.public_key());
    if !matches {
        return Err(SignerError::UnsupportedFeePayer {
            public_key: fee_payer.clone(),
        });
    }
    Ok(())
}

pub(crate) async fn sign_and_broadcast<P: TxPayload>(
    client: &dyn ChainClient,
    key: &dyn SigningKey,
    props: &P,
    tx_props: &TxProps,
) -> Result<TxResponse, SignerError> {
    check_fee_payer(key, tx_props)?;

    let state = client.account_state(key.address()).await?;
    let mut sequence = state.sequence;
    if !state.public_key_revealed {
        info!(address = key.address(), "Revealing public key before first transaction");
        let reveal = RevealPkProps {
            address: key.address().to_string(),
            public_key: hex::encode(key.public_key()),
        };
        broadcast_signed(client, key, &reveal, tx_props, state.account_number, sequence).await?;
        sequence += 1;
    }

    broadcast_signed(client, key, props, tx_props, state.account_number, sequence).await
}

async fn broadcast_signed<P: TxPayload>(
    client: &dyn ChainClient,
    key: &dyn SigningKey,
    props: &P,
    tx_props: &TxProps,
    account_number: u64,
    sequence: u64,
) -> Result<TxResponse, SignerError> {
    let doc = TxBuilder::new(tx_props, account_number, sequence).build(props, &key.public_key())?;
    let signature = key.sign(&doc).await?;
    debug!(tx_type = ?P::TX_TYPE, signer = key.address(), sequence, "Transaction signed");

    let tx = doc.into_tx_raw(signature);
    let response = client.broadcast(&tx).await?.into_result()?;
    info!(tx_type = ?P::TX_TYPE, txhash = %response.txhash, "Transaction accepted");
    Ok(response)
}
