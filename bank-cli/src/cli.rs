use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List all bank accounts of the program.
    List,
    /// Fetch a single bank account.
    Show(ShowArgs),
    /// Create the bank of the connected wallet.
    Create(CreateArgs),
    /// Deposit lamports into a bank.
    Deposit(DepositArgs),
    /// Check that the RPC node is healthy.
    Health,
}

#[derive(Parser, Clone, Debug)]
pub struct GlobalArgs {
    #[arg(long, env = "BANK_RPC_URL", default_value = "http://localhost:8899")]
    pub rpc_url: String,

    #[arg(long, env = "BANK_PROGRAM_ID")]
    pub program_id: Pubkey,

    /// Keypair file of the wallet. Without it no identity is connected.
    #[arg(long, env = "BANK_KEYPAIR")]
    pub keypair: Option<PathBuf>,

    #[arg(long, env = "BANK_COMMITMENT", value_enum, default_value = "confirmed")]
    pub commitment: Commitment,

    #[arg(long, env = "BANK_CONFIRM_TIMEOUT_SECS", default_value = "60")]
    pub confirm_timeout_secs: u64,

    #[arg(long, env = "BANK_MAX_RETRIES", default_value = "3")]
    pub max_retries: u32,

    #[arg(long, env = "BANK_RETRY_DELAY_MS", default_value = "500")]
    pub retry_delay_ms: u64,

    /// Only list accounts carrying the bank discriminator.
    #[arg(long, env = "BANK_FILTER_BY_DISCRIMINATOR")]
    pub filter_by_discriminator: bool,
}

#[derive(Parser, Clone, Debug)]
pub struct ShowArgs {
    #[arg(long)]
    pub bank: Pubkey,
}

#[derive(Parser, Clone, Debug)]
pub struct CreateArgs {
    #[arg(long, default_value = "New Bank")]
    pub name: String,

    /// Run discovery until the new bank is visible, at most this many times.
    #[arg(long, default_value = "5")]
    pub wait_attempts: usize,
}

#[derive(Parser, Clone, Debug)]
pub struct DepositArgs {
    #[arg(long)]
    pub bank: Pubkey,

    #[arg(long, env = "BANK_DEPOSIT_LAMPORTS")]
    pub lamports: Option<u64>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Commitment {
    Processed,
    Confirmed,
    Finalized,
}

impl From<Commitment> for CommitmentConfig {
    fn from(commitment: Commitment) -> Self {
        match commitment {
            Commitment::Processed => CommitmentConfig::processed(),
            Commitment::Confirmed => CommitmentConfig::confirmed(),
            Commitment::Finalized => CommitmentConfig::finalized(),
        }
    }
}
