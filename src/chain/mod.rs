pub mod chain_info;
pub mod client;
pub mod proto;
pub mod tx_builder;

pub use chain_info::{Bech32Config, Bip44, Chain, ChainInfo, ChainInfoConfig, Currency, GasPriceStep, Network};
pub use client::{AccountState, ChainClient, ClientConfig, ClientError, HttpChainClient, TxResponse};
pub use proto::TxRaw;
pub use tx_builder::{AuthInfo, DecodeError, Fee, SignDoc, SignerInfo, TxBody, TxBuilder};
