use anyhow::{anyhow, bail, Result};
use bech32::{self, Hrp};
use bip32::{ChildNumber, XPrv};
use bip39::Mnemonic;
use ripemd::Ripemd160;
use secp256k1::{PublicKey, Secp256k1, SecretKey};
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::chain::tx_builder::SignDoc;
use crate::types::Bip44Path;
use crate::wallet::TransactionSigner;

/// In-memory secp256k1 key with its Cosmos-style bech32 address
/// Private bytes are zeroized on drop
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SoftwareKey {
    #[zeroize(skip)]
    pub address: String,
    #[zeroize(skip)]
    pub path: Bip44Path,

    private_key_bytes: [u8; 32],
    public_key_bytes: [u8; 33],
}

impl std::fmt::Debug for SoftwareKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoftwareKey")
            .field("address", &self.address)
            .field("path", &self.path)
            .field("public_key", &hex::encode(self.public_key_bytes))
            .finish_non_exhaustive()
    }
}

impl SoftwareKey {
    /// Derive `m/44'/coin_type'/account'/change/index` from a BIP39 mnemonic
    pub fn from_mnemonic(
        mnemonic_str: &str,
        passphrase: &str,
        prefix: &str,
        coin_type: u32,
        path: Bip44Path,
    ) -> Result<Self> {
        let mnemonic = Mnemonic::parse(mnemonic_str)?;
        let seed = mnemonic.to_seed(passphrase);

        let mut private_key = derive_private_key_bip32(&seed, coin_type, path)?;
        let key = Self::from_private_key_bytes(&private_key, prefix, path);
        private_key.zeroize();
        key
    }

    /// Import a raw hex-encoded secp256k1 private key
    pub fn from_private_key_hex(private_key_hex: &str, prefix: &str) -> Result<Self> {
        let mut bytes = hex::decode(private_key_hex.trim_start_matches("0x"))?;
        if bytes.len() != 32 {
            let len = bytes.len();
            bytes.zeroize();
            bail!("Invalid private key length: expected 32 bytes, got {}", len);
        }
        let mut private_key = [0u8; 32];
        private_key.copy_from_slice(&bytes);
        bytes.zeroize();

        let key = Self::from_private_key_bytes(&private_key, prefix, Bip44Path::default());
        private_key.zeroize();
        key
    }

    fn from_private_key_bytes(private_key: &[u8; 32], prefix: &str, path: Bip44Path) -> Result<Self> {
        let secp = Secp256k1::new();
        let secret_key = SecretKey::from_slice(private_key)?;
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);
        let public_key_bytes = public_key.serialize();

        let address = bech32_address(prefix, &public_key_bytes)?;

        Ok(Self {
            address,
            path,
            private_key_bytes: *private_key,
            public_key_bytes,
        })
    }

    /// Get the private key as a SecretKey (for signing)
    pub fn private_key(&self) -> Result<SecretKey> {
        SecretKey::from_slice(&self.private_key_bytes)
            .map_err(|e| anyhow!("Invalid private key: {}", e))
    }

    pub fn public_key(&self) -> Result<PublicKey> {
        PublicKey::from_slice(&self.public_key_bytes)
            .map_err(|e| anyhow!("Invalid public key: {}", e))
    }

    /// Compressed public key (33 bytes)
    pub fn public_key_bytes(&self) -> [u8; 33] {
        self.public_key_bytes
    }

    /// Raw 20-byte address (ripemd160 of sha256 of the public key)
    pub fn address_bytes(&self) -> [u8; 20] {
        address_hash(&self.public_key_bytes)
    }

    pub fn sign(&self, doc: &SignDoc) -> Result<Vec<u8>> {
        let private_key = self.private_key()?;
        TransactionSigner::new().sign_doc(doc, &private_key)
    }
}

/// Derive a private key along the BIP44 path for `coin_type`
fn derive_private_key_bip32(seed: &[u8], coin_type: u32, path: Bip44Path) -> Result<[u8; 32]> {
    let xprv = XPrv::new(seed)
        .map_err(|e| anyhow!("Failed to create XPrv from seed: {}", e))?;

    let derived = xprv
        .derive_child(ChildNumber::new(44, true)?)
        .and_then(|k| k.derive_child(ChildNumber::new(coin_type, true)?))
        .and_then(|k| k.derive_child(ChildNumber::new(path.account, true)?))
        .and_then(|k| k.derive_child(ChildNumber::new(path.change, false)?))
        .and_then(|k| k.derive_child(ChildNumber::new(path.index, false)?))
        .map_err(|e| anyhow!("Failed to derive key: {}", e))?;

    Ok(derived.to_bytes())
}

fn address_hash(public_key: &[u8; 33]) -> [u8; 20] {
    let sha = Sha256::digest(public_key);
    Ripemd160::digest(sha).into()
}

/// bech32-encode the address hash of a compressed public key
pub fn bech32_address(prefix: &str, public_key: &[u8; 33]) -> Result<String> {
    let hrp = Hrp::parse(prefix)?;
    let encoded = bech32::encode::<bech32::Bech32>(hrp, &address_hash(public_key))?;
    Ok(encoded)
}
