use std::{fmt::Display, sync::Arc, time::Duration};

use bank_account::{
    constants::DEFAULT_DEPOSIT_LAMPORTS, create_bank_instruction, deposit_instruction,
};
use solana_client::rpc_config::RpcSendTransactionConfig;
use solana_sdk::{
    instruction::Instruction, pubkey::Pubkey, signature::Signature, transaction::Transaction,
};
use tracing::{debug, info, warn};

use crate::{
    discovery::{DiscoveryEngine, LocalSnapshot},
    errors::BankClientError,
    rpc::{ConfirmationStatus, RpcConnection, RpcError},
    signer::TransactionSigner,
};

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub program_id: Pubkey,
    /// Hard limit on waiting for confirmation of one transaction.
    pub confirm_timeout: Duration,
    /// Amount used by [`TransactionOrchestrator::deposit_default`].
    pub deposit_lamports: u64,
    /// Submit bank creation without simulation; a failing create then
    /// surfaces during confirmation.
    pub skip_preflight_on_create: bool,
}

impl OrchestratorConfig {
    pub fn new(program_id: Pubkey) -> Self {
        Self {
            program_id,
            confirm_timeout: Duration::from_secs(60),
            deposit_lamports: DEFAULT_DEPOSIT_LAMPORTS,
            skip_preflight_on_create: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationState {
    Building,
    Signing,
    Submitted,
    Confirming,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationKind {
    Create { name: String },
    Deposit { amount: u64 },
}

impl Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationKind::Create { name } => write!(f, "create bank \"{}\"", name),
            OperationKind::Deposit { amount } => write!(f, "deposit {} lamports", amount),
        }
    }
}

/// In-flight write. Lives for one call of the orchestrator.
#[derive(Debug)]
pub struct PendingOperation {
    pub kind: OperationKind,
    pub bank: Pubkey,
    pub signer: Pubkey,
    state: OperationState,
}

impl PendingOperation {
    fn new(kind: OperationKind, bank: Pubkey, signer: Pubkey) -> Self {
        Self {
            kind,
            bank,
            signer,
            state: OperationState::Building,
        }
    }

    fn transition(&mut self, next: OperationState) {
        debug!(
            "{} on {}: {:?} -> {:?}",
            self.kind, self.bank, self.state, next
        );
        self.state = next;
    }
}

#[derive(Debug, Clone)]
pub struct OperationOutcome {
    pub signature: Signature,
    pub bank: Pubkey,
    /// Snapshot of the discovery cycle run after confirmation, `None` if
    /// that refresh failed. The transaction is confirmed either way.
    pub snapshot: Option<Arc<LocalSnapshot>>,
}

pub struct TransactionOrchestrator<R: RpcConnection> {
    rpc: Arc<R>,
    discovery: Arc<DiscoveryEngine<R>>,
    config: OrchestratorConfig,
}

impl<R: RpcConnection> TransactionOrchestrator<R> {
    pub fn new(
        rpc: Arc<R>,
        discovery: Arc<DiscoveryEngine<R>>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            rpc,
            discovery,
            config,
        }
    }

    pub fn discovery(&self) -> &Arc<DiscoveryEngine<R>> {
        &self.discovery
    }

    /// Creates the signer's bank and refreshes the snapshot once the
    /// transaction is confirmed.
    pub async fn create_bank<S>(
        &self,
        signer: &S,
        name: &str,
    ) -> Result<OperationOutcome, BankClientError>
    where
        S: TransactionSigner + ?Sized,
    {
        let user = signer.identity().ok_or(BankClientError::NoIdentity)?;
        let (instruction, bank) = create_bank_instruction(&self.config.program_id, &user, name)?;
        let operation = PendingOperation::new(
            OperationKind::Create {
                name: name.to_string(),
            },
            bank,
            user,
        );
        let send_config = RpcSendTransactionConfig {
            skip_preflight: self.config.skip_preflight_on_create,
            ..Default::default()
        };
        self.execute(operation, signer, instruction, send_config)
            .await
    }

    pub async fn deposit<S>(
        &self,
        signer: &S,
        bank: Pubkey,
        amount: u64,
    ) -> Result<OperationOutcome, BankClientError>
    where
        S: TransactionSigner + ?Sized,
    {
        let user = signer.identity().ok_or(BankClientError::NoIdentity)?;
        let instruction = deposit_instruction(&self.config.program_id, &user, &bank, amount)?;
        let operation = PendingOperation::new(OperationKind::Deposit { amount }, bank, user);
        self.execute(
            operation,
            signer,
            instruction,
            RpcSendTransactionConfig::default(),
        )
        .await
    }

    /// Deposits the configured policy amount.
    pub async fn deposit_default<S>(
        &self,
        signer: &S,
        bank: Pubkey,
    ) -> Result<OperationOutcome, BankClientError>
    where
        S: TransactionSigner + ?Sized,
    {
        self.deposit(signer, bank, self.config.deposit_lamports)
            .await
    }

    async fn execute<S>(
        &self,
        mut operation: PendingOperation,
        signer: &S,
        instruction: Instruction,
        send_config: RpcSendTransactionConfig,
    ) -> Result<OperationOutcome, BankClientError>
    where
        S: TransactionSigner + ?Sized,
    {
        let signature = match self
            .submit_and_confirm(&mut operation, signer, instruction, send_config)
            .await
        {
            Ok(signature) => signature,
            Err(e) => {
                operation.transition(OperationState::Failed);
                warn!("{} failed: {}", operation.kind, e);
                return Err(e);
            }
        };
        operation.transition(OperationState::Succeeded);
        info!("{} confirmed: {}", operation.kind, signature);

        let snapshot = match self.discovery.discover(Some(operation.signer)).await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!(
                    "Refresh after {} failed, snapshot not updated: {}",
                    signature, e
                );
                None
            }
        };

        Ok(OperationOutcome {
            signature,
            bank: operation.bank,
            snapshot,
        })
    }

    async fn submit_and_confirm<S>(
        &self,
        operation: &mut PendingOperation,
        signer: &S,
        instruction: Instruction,
        send_config: RpcSendTransactionConfig,
    ) -> Result<Signature, BankClientError>
    where
        S: TransactionSigner + ?Sized,
    {
        let recent_blockhash = self.rpc.get_latest_blockhash().await?;
        let mut transaction = Transaction::new_with_payer(&[instruction], Some(&operation.signer));
        transaction.message.recent_blockhash = recent_blockhash;

        operation.transition(OperationState::Signing);
        let transaction = signer.sign_transaction(transaction).await?;
        if !transaction.is_signed() {
            return Err(BankClientError::Signer(
                "Signer returned an unsigned transaction".to_string(),
            ));
        }

        let signature = self
            .rpc
            .send_transaction_with_config(&transaction, send_config)
            .await?;
        operation.transition(OperationState::Submitted);

        operation.transition(OperationState::Confirming);
        match self
            .rpc
            .confirm_transaction(signature, self.config.confirm_timeout)
            .await?
        {
            ConfirmationStatus::Confirmed => Ok(signature),
            ConfirmationStatus::TimedOut => Err(BankClientError::TimedOut {
                signature,
                timeout: self.config.confirm_timeout,
            }),
            ConfirmationStatus::Failed(err) => Err(RpcError::Rejected(err.to_string()).into()),
        }
    }
}
