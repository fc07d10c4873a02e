use serde::{Deserialize, Serialize};
use std::fmt;

/// How the keys behind an account are held
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccountType {
    /// Derived from a BIP39 mnemonic held by the software keystore
    Mnemonic,
    /// Raw secp256k1 private key imported into the software keystore
    PrivateKey,
    /// Shielded spending keys (viewing/spending keys, no transparent signing)
    ShieldedKeys,
    /// Hardware ledger device
    Ledger,
    /// Key managed by an external browser extension
    Extension,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Mnemonic => "mnemonic",
            AccountType::PrivateKey => "private-key",
            AccountType::ShieldedKeys => "shielded-keys",
            AccountType::Ledger => "ledger",
            AccountType::Extension => "extension",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// BIP44 position of a derived key below `m/44'/coin_type'`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bip44Path {
    pub account: u32,
    pub change: u32,
    pub index: u32,
}

/// A wallet-managed key entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub alias: String,
    /// Bech32 address
    pub address: String,
    /// Hex-encoded compressed public key
    pub public_key: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    /// Chain this account is restricted to; `None` means usable on any chain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<String>,
    #[serde(default)]
    pub path: Bip44Path,
}

impl Account {
    /// Whether this account may be offered for `chain_id` (no filter matches everything)
    pub fn matches_chain(&self, chain_id: Option<&str>) -> bool {
        match (chain_id, self.chain_id.as_deref()) {
            (None, _) | (_, None) => true,
            (Some(wanted), Some(own)) => wanted == own,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(chain_id: Option<&str>) -> Account {
        Account {
            id: "1".to_string(),
            alias: "main".to_string(),
            address: "namada1xyz".to_string(),
            public_key: "02ab".to_string(),
            account_type: AccountType::Mnemonic,
            chain_id: chain_id.map(str::to_string),
            path: Bip44Path::default(),
        }
    }

    #[test]
    fn test_chain_filter() {
        let bound = account(Some("anoma-test.fd58c789bc11e6c6392"));
        assert!(bound.matches_chain(None));
        assert!(bound.matches_chain(Some("anoma-test.fd58c789bc11e6c6392")));
        assert!(!bound.matches_chain(Some("anoma-test.008d3ba61b7bb1852c9")));

        let unbound = account(None);
        assert!(unbound.matches_chain(Some("anything")));
    }

    #[test]
    fn test_account_type_serialization() {
        let json = serde_json::to_string(&AccountType::PrivateKey).unwrap();
        assert_eq!(json, "\"private-key\"");
        assert_eq!(AccountType::ShieldedKeys.to_string(), "shielded-keys");

        let json = serde_json::to_value(account(None)).unwrap();
        assert_eq!(json["type"], "mnemonic");
        assert!(json.get("chainId").is_none());
    }
}
