use std::{fmt::Debug, time::Duration};

use async_trait::async_trait;
use bank_account::BankAccount;
use solana_client::rpc_config::RpcSendTransactionConfig;
use solana_sdk::{
    account::Account, commitment_config::CommitmentConfig, hash::Hash, pubkey::Pubkey,
    signature::Signature, transaction::Transaction, transaction::TransactionError,
};

use crate::{errors::BankClientError, rpc::errors::RpcError};

#[derive(Clone, Debug, Copy)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub retry_delay: Duration,
    /// Upper bound on the total time spent retrying one call.
    pub timeout: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetryConfig {
            max_retries: 3,
            retry_delay: Duration::from_millis(500),
            timeout: Duration::from_secs(15),
        }
    }
}

#[derive(Clone, Debug)]
pub struct RpcConnectionConfig {
    pub url: String,
    pub commitment_config: Option<CommitmentConfig>,
    pub retry_config: RetryConfig,
    /// Interval between signature status polls while confirming.
    pub poll_interval: Duration,
    /// Ask the node to return only accounts starting with the bank
    /// discriminator.
    pub filter_by_discriminator: bool,
}

impl RpcConnectionConfig {
    pub fn new(url: impl ToString) -> Self {
        Self {
            url: url.to_string(),
            commitment_config: None,
            retry_config: RetryConfig::default(),
            poll_interval: Duration::from_millis(500),
            filter_by_discriminator: false,
        }
    }
}

/// Outcome of waiting for a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationStatus {
    Confirmed,
    /// The wait ended before the transaction reached the requested
    /// commitment. It may still land.
    TimedOut,
    Failed(TransactionError),
}

#[async_trait]
pub trait RpcConnection: Send + Sync + Debug + 'static {
    fn new(config: RpcConnectionConfig) -> Self
    where
        Self: Sized;

    fn get_url(&self) -> String;

    async fn health(&self) -> Result<(), RpcError>;

    /// All accounts owned by `program_id`. An empty result is valid.
    async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
    ) -> Result<Vec<(Pubkey, Account)>, RpcError>;

    async fn get_account(&self, address: Pubkey) -> Result<Option<Account>, RpcError>;

    async fn get_latest_blockhash(&self) -> Result<Hash, RpcError>;

    async fn send_transaction(&self, transaction: &Transaction) -> Result<Signature, RpcError> {
        self.send_transaction_with_config(transaction, RpcSendTransactionConfig::default())
            .await
    }

    /// Submits without waiting for the transaction to land.
    async fn send_transaction_with_config(
        &self,
        transaction: &Transaction,
        config: RpcSendTransactionConfig,
    ) -> Result<Signature, RpcError>;

    /// Waits at most `timeout` for `signature` to reach the connection's
    /// commitment. Never cancels the transaction itself.
    async fn confirm_transaction(
        &self,
        signature: Signature,
        timeout: Duration,
    ) -> Result<ConfirmationStatus, RpcError>;

    async fn get_bank_account(
        &self,
        address: Pubkey,
    ) -> Result<Option<BankAccount>, BankClientError> {
        match self.get_account(address).await? {
            Some(account) => Ok(Some(BankAccount::decode(address, &account.data)?)),
            None => Ok(None),
        }
    }
}
