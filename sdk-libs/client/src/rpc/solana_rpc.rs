use std::{
    fmt::{Debug, Formatter},
    time::Duration,
};

use async_trait::async_trait;
use bank_account::discriminators::BANK_ACCOUNT_DISCRIMINATOR;
use solana_account_decoder::UiAccountEncoding;
use solana_client::{
    nonblocking::rpc_client::RpcClient,
    rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig, RpcSendTransactionConfig},
    rpc_filter::{Memcmp, RpcFilterType},
};
use solana_sdk::{
    account::Account, commitment_config::CommitmentConfig, hash::Hash, pubkey::Pubkey,
    signature::Signature, transaction::Transaction,
};
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::rpc::{
    errors::RpcError,
    rpc_connection::{ConfirmationStatus, RetryConfig, RpcConnection, RpcConnectionConfig},
};

pub struct SolanaRpcConnection {
    pub client: RpcClient,
    pub retry_config: RetryConfig,
    poll_interval: Duration,
    filter_by_discriminator: bool,
}

impl Debug for SolanaRpcConnection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SolanaRpcConnection {{ client: {:?} }}",
            self.client.url()
        )
    }
}

impl SolanaRpcConnection {
    /// Retries read-only calls on network errors. Submission never goes
    /// through here.
    async fn retry<F, Fut, T>(&self, operation: F) -> Result<T, RpcError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T, RpcError>>,
    {
        let mut attempts = 0;
        let start_time = Instant::now();
        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_network() => {
                    attempts += 1;
                    if attempts > self.retry_config.max_retries
                        || start_time.elapsed() >= self.retry_config.timeout
                    {
                        return Err(e);
                    }
                    warn!(
                        "Operation failed, retrying in {:?} (attempt {}/{}): {:?}",
                        self.retry_config.retry_delay, attempts, self.retry_config.max_retries, e
                    );
                    sleep(self.retry_config.retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn poll_signature(&self, signature: Signature) -> Result<ConfirmationStatus, RpcError> {
        let commitment = self.client.commitment();
        loop {
            match self.client.get_signature_statuses(&[signature]).await {
                Ok(response) => {
                    if let Some(Some(status)) = response.value.into_iter().next() {
                        if let Some(err) = status.err {
                            return Ok(ConfirmationStatus::Failed(err));
                        }
                        if status.satisfies_commitment(commitment) {
                            return Ok(ConfirmationStatus::Confirmed);
                        }
                        debug!("Transaction {} at slot {}, waiting", signature, status.slot);
                    }
                }
                Err(e) => {
                    let e = RpcError::from(e);
                    if !e.is_network() {
                        return Err(e);
                    }
                    warn!("Signature status poll for {} failed: {}", signature, e);
                }
            }
            sleep(self.poll_interval).await;
        }
    }
}

#[async_trait]
impl RpcConnection for SolanaRpcConnection {
    fn new(config: RpcConnectionConfig) -> Self
    where
        Self: Sized,
    {
        let commitment_config = config
            .commitment_config
            .unwrap_or(CommitmentConfig::confirmed());
        let client = RpcClient::new_with_commitment(config.url, commitment_config);
        Self {
            client,
            retry_config: config.retry_config,
            poll_interval: config.poll_interval,
            filter_by_discriminator: config.filter_by_discriminator,
        }
    }

    fn get_url(&self) -> String {
        self.client.url()
    }

    async fn health(&self) -> Result<(), RpcError> {
        self.retry(|| async { self.client.get_health().await.map_err(RpcError::from) })
            .await
    }

    async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
    ) -> Result<Vec<(Pubkey, Account)>, RpcError> {
        if !self.filter_by_discriminator {
            return self
                .retry(|| async {
                    self.client
                        .get_program_accounts(program_id)
                        .await
                        .map_err(RpcError::from)
                })
                .await;
        }
        self.retry(|| async {
            let config = RpcProgramAccountsConfig {
                filters: Some(vec![RpcFilterType::Memcmp(Memcmp::new_raw_bytes(
                    0,
                    BANK_ACCOUNT_DISCRIMINATOR.to_vec(),
                ))]),
                account_config: RpcAccountInfoConfig {
                    encoding: Some(UiAccountEncoding::Base64),
                    commitment: Some(self.client.commitment()),
                    ..Default::default()
                },
                ..Default::default()
            };
            self.client
                .get_program_accounts_with_config(program_id, config)
                .await
                .map_err(RpcError::from)
        })
        .await
    }

    async fn get_account(&self, address: Pubkey) -> Result<Option<Account>, RpcError> {
        self.retry(|| async {
            self.client
                .get_account_with_commitment(&address, self.client.commitment())
                .await
                .map(|response| response.value)
                .map_err(RpcError::from)
        })
        .await
    }

    async fn get_latest_blockhash(&self) -> Result<Hash, RpcError> {
        self.retry(|| async {
            self.client
                // Confirmed commitments land more reliably than finalized
                // https://www.helius.dev/blog/how-to-deal-with-blockhash-errors-on-solana#how-to-deal-with-blockhash-errors
                .get_latest_blockhash_with_commitment(CommitmentConfig::confirmed())
                .await
                .map(|(hash, _)| hash)
                .map_err(RpcError::from)
        })
        .await
    }

    async fn send_transaction_with_config(
        &self,
        transaction: &Transaction,
        config: RpcSendTransactionConfig,
    ) -> Result<Signature, RpcError> {
        self.client
            .send_transaction_with_config(transaction, config)
            .await
            .map_err(RpcError::from_send_error)
    }

    async fn confirm_transaction(
        &self,
        signature: Signature,
        timeout: Duration,
    ) -> Result<ConfirmationStatus, RpcError> {
        match tokio::time::timeout(timeout, self.poll_signature(signature)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    "Transaction {} not confirmed within {:?}",
                    signature, timeout
                );
                Ok(ConfirmationStatus::TimedOut)
            }
        }
    }
}
