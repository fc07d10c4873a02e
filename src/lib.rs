// Library exports for namada_wallet

pub mod chain;
pub mod config;
pub mod routes;
pub mod signer;
pub mod types;
pub mod wallet;

// Re-export main types for convenience
pub use chain::{Chain, ChainClient, ChainInfo, ChainInfoConfig, HttpChainClient};
pub use config::Config;
pub use signer::{ExtensionSigner, KeystoreSigner, LedgerSigner, Signer, SignerError, SignerSet};
pub use types::{Account, AccountType, TxProps};
pub use wallet::{ExtensionWallet, Keplr, LedgerDevice, OfflineSigner};
