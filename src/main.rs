use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use cosmwasm_std::Uint128;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use namada_wallet::config::{Config, Secrets};
use namada_wallet::routes::Route;
use namada_wallet::signer::Keystore;
use namada_wallet::types::{
    Account, Bip44Path, SubmitBondProps, SubmitVoteProposalProps, TransferProps,
    TxProps, Vote,
};
use namada_wallet::{ChainInfo, HttpChainClient, KeystoreSigner, Signer};

#[derive(Parser)]
#[command(name = "namada-wallet")]
#[command(about = "Wallet core for Namada testnets", version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a default configuration file
    Init {
        /// Output path for config file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the chain descriptor suggested to the extension
    ChainInfo,

    /// List UI route templates
    Routes,

    /// List keystore accounts derived from WALLET_MNEMONIC
    Accounts,

    /// Transfer tokens to another address
    Transfer {
        #[arg(long)]
        target: String,
        #[arg(long)]
        amount: u128,
        #[command(flatten)]
        tx: TxArgs,
    },

    /// Bond tokens to a validator
    Bond {
        #[arg(long)]
        validator: String,
        #[arg(long)]
        amount: u128,
        #[command(flatten)]
        tx: TxArgs,
    },

    /// Vote on a governance proposal
    Vote {
        #[arg(long)]
        proposal_id: u64,
        /// yay, nay or abstain
        #[arg(long)]
        vote: Vote,
        #[command(flatten)]
        tx: TxArgs,
    },
}

#[derive(Args)]
struct TxArgs {
    /// Native token address, also used to pay fees
    #[arg(long)]
    token: String,

    #[arg(long, default_value = "0")]
    fee_amount: u128,

    #[arg(long, default_value = "20000")]
    gas_limit: u64,

    #[arg(long)]
    memo: Option<String>,
}

impl TxArgs {
    fn tx_props(&self, config: &Config) -> TxProps {
        TxProps {
            token: self.token.clone(),
            fee_amount: Uint128::new(self.fee_amount),
            gas_limit: self.gas_limit,
            chain_id: config.chain.id.clone(),
            public_key: None,
            memo: self.memo.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "namada_wallet=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(Config::default_path);

    match cli.command {
        Commands::Init { output } => {
            let output = output.unwrap_or(config_path);
            if output.exists() {
                bail!("{} already exists", output.display());
            }
            Config::default().save(&output)?;
            info!("Configuration file created at: {}", output.display());
        }
        Commands::ChainInfo => {
            let config = Config::load(&config_path)?;
            let chain_info = ChainInfo::from_chain(&config.chain, &config.chain_info);
            println!("{}", serde_json::to_string_pretty(&chain_info)?);
        }
        Commands::Routes => {
            for route in Route::ALL {
                println!("{:<24}{}", route.name(), route.template());
            }
        }
        Commands::Accounts => {
            let config = Config::load(&config_path)?;
            let (signer, _) = keystore_signer(&config)?;
            let accounts = signer.accounts(Some(&config.chain.id)).await?;
            println!("{}", serde_json::to_string_pretty(&accounts.unwrap_or_default())?);
        }
        Commands::Transfer { target, amount, tx } => {
            let config = Config::load(&config_path)?;
            let (signer, account) = keystore_signer(&config)?;
            let props = TransferProps {
                source: account.address.clone(),
                target,
                token: tx.token.clone(),
                amount: Uint128::new(amount),
                native_token: tx.token.clone(),
            };
            signer
                .submit_transfer(&props, &tx.tx_props(&config), account.account_type)
                .await?;
            info!("Transfer of {} submitted from {}", amount, account.address);
        }
        Commands::Bond { validator, amount, tx } => {
            let config = Config::load(&config_path)?;
            let (signer, account) = keystore_signer(&config)?;
            let props = SubmitBondProps {
                source: account.address.clone(),
                validator,
                amount: Uint128::new(amount),
                native_token: tx.token.clone(),
            };
            signer
                .submit_bond(&props, &tx.tx_props(&config), account.account_type)
                .await?;
            info!("Bond of {} submitted from {}", amount, account.address);
        }
        Commands::Vote { proposal_id, vote, tx } => {
            let config = Config::load(&config_path)?;
            let (signer, account) = keystore_signer(&config)?;
            let props = SubmitVoteProposalProps {
                signer: account.address.clone(),
                vote,
                proposal_id,
            };
            signer
                .submit_vote_proposal(&props, &tx.tx_props(&config), account.account_type)
                .await?;
            info!("Vote on proposal {} submitted", proposal_id);
        }
    }

    Ok(())
}

/// Keystore signer holding the account derived from the environment mnemonic
fn keystore_signer(config: &Config) -> Result<(KeystoreSigner, Account)> {
    let secrets = Secrets::from_env()?;
    let mut keystore = Keystore::new(&config.chain_info.bech32_prefix, config.chain_info.coin_type);
    let path = Bip44Path {
        account: config.chain.account_index,
        ..Bip44Path::default()
    };
    let account = keystore
        .add_mnemonic(
            "default",
            &secrets.mnemonic,
            &secrets.passphrase,
            path,
            Some(&config.chain.id),
        )?
        .clone();

    let client = HttpChainClient::new(&config.client)?;
    let signer = KeystoreSigner::new(&config.chain.id, keystore, Arc::new(client));
    Ok((signer, account))
}
