use anyhow::Result;
use secp256k1::{ecdsa::Signature, Message, PublicKey, Secp256k1, SecretKey};

use crate::chain::tx_builder::SignDoc;

/// secp256k1 signer for direct-mode sign docs
/// Produces 64-byte compact signatures over SHA256 of the sign bytes
pub struct TransactionSigner {
    secp: Secp256k1<secp256k1::All>,
}

impl TransactionSigner {
    pub fn new() -> Self {
        Self {
            secp: Secp256k1::new(),
        }
    }

    /// Sign a sign doc with a private key
    pub fn sign_doc(&self, doc: &SignDoc, private_key: &SecretKey) -> Result<Vec<u8>> {
        let hash = doc.sign_hash();
        self.sign_hash(&hash, private_key)
    }

    /// Sign a pre-computed 32-byte digest
    pub fn sign_hash(&self, hash: &[u8; 32], private_key: &SecretKey) -> Result<Vec<u8>> {
        let message = Message::from_digest_slice(hash)?;
        let signature = self.secp.sign_ecdsa(&message, private_key);
        Ok(signature.serialize_compact().to_vec())
    }

    /// Check a compact signature against a sign doc
    pub fn verify_doc(&self, doc: &SignDoc, signature: &[u8], public_key: &PublicKey) -> Result<bool> {
        let hash = doc.sign_hash();
        let message = Message::from_digest_slice(&hash)?;
        let signature = Signature::from_compact(signature)?;
        Ok(self.secp.verify_ecdsa(&message, &signature, public_key).is_ok())
    }
}

impl Default for TransactionSigner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::SoftwareKey;

    const MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    fn doc(chain_id: &str) -> SignDoc {
        SignDoc {
            body_bytes: b"body".to_vec(),
            auth_info_bytes: b"auth".to_vec(),
            chain_id: chain_id.to_string(),
            account_number: 0,
        }
    }

    #[test]
    fn test_doc_signing() {
        let key = SoftwareKey::from_mnemonic(MNEMONIC, "", "namada", 118, Default::default()).unwrap();
        let signer = TransactionSigner::new();
        let private_key = key.private_key().unwrap();

        let signature = signer.sign_doc(&doc("chain-a"), &private_key).unwrap();
        assert_eq!(signature.len(), 64);

        // RFC6979 nonces make signing deterministic
        let again = signer.sign_doc(&doc("chain-a"), &private_key).unwrap();
        assert_eq!(signature, again);

        let public_key = key.public_key().unwrap();
        assert!(signer.verify_doc(&doc("chain-a"), &signature, &public_key).unwrap());
        assert!(!signer.verify_doc(&doc("chain-b"), &signature, &public_key).unwrap());
    }
}
