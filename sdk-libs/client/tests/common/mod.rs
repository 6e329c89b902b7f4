#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use bank_account::{constants::BANK_ACCOUNT_SPACE, BankAccount, BankInstruction};
use bank_client::{
    ConfirmationStatus, DiscoveryEngine, OrchestratorConfig, RpcConnection, RpcConnectionConfig,
    RpcError, SignerError, TransactionOrchestrator, TransactionSigner,
};
use solana_client::rpc_config::RpcSendTransactionConfig;
use solana_sdk::{
    account::Account,
    hash::Hash,
    instruction::InstructionError,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    transaction::{Transaction, TransactionError},
};

/// Mirrors `ErrorCode::AccountNotInitialized` of Anchor.
pub const ACCOUNT_NOT_INITIALIZED: u32 = 3012;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmMode {
    /// Executed transactions confirm immediately.
    Immediate,
    /// No transaction ever confirms.
    Never,
}

#[derive(Debug)]
struct Entry {
    address: Pubkey,
    account: Account,
    /// Listings that still do not return this account.
    hidden_listings: usize,
}

#[derive(Debug)]
struct LedgerState {
    accounts: Vec<Entry>,
    statuses: HashMap<Signature, Option<TransactionError>>,
    listing_error: Option<RpcError>,
    submit_error: Option<RpcError>,
    listing_lag: usize,
    listing_delay: Option<Duration>,
    confirm_mode: ConfirmMode,
    duplicate_listing: bool,
}

/// Ledger double that executes bank instructions in memory.
#[derive(Debug)]
pub struct InMemoryLedger {
    program_id: Pubkey,
    state: Mutex<LedgerState>,
    pub list_calls: AtomicUsize,
    pub blockhash_calls: AtomicUsize,
    pub submit_calls: AtomicUsize,
    pub confirm_calls: AtomicUsize,
}

impl InMemoryLedger {
    pub fn with_program(program_id: Pubkey) -> Self {
        Self {
            program_id,
            state: Mutex::new(LedgerState {
                accounts: Vec::new(),
                statuses: HashMap::new(),
                listing_error: None,
                submit_error: None,
                listing_lag: 0,
                listing_delay: None,
                confirm_mode: ConfirmMode::Immediate,
                duplicate_listing: false,
            }),
            list_calls: AtomicUsize::new(0),
            blockhash_calls: AtomicUsize::new(0),
            submit_calls: AtomicUsize::new(0),
            confirm_calls: AtomicUsize::new(0),
        }
    }

    pub fn program_id(&self) -> Pubkey {
        self.program_id
    }

    pub fn network_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
            + self.blockhash_calls.load(Ordering::SeqCst)
            + self.submit_calls.load(Ordering::SeqCst)
            + self.confirm_calls.load(Ordering::SeqCst)
    }

    pub fn insert_bank(&self, bank: &BankAccount) {
        let mut data = bank.encode().unwrap();
        data.resize(BANK_ACCOUNT_SPACE, 0);
        self.insert_raw(bank.address, data);
    }

    pub fn insert_raw(&self, address: Pubkey, data: Vec<u8>) {
        let account = Account {
            lamports: 1_000_000,
            data,
            owner: self.program_id,
            executable: false,
            rent_epoch: 0,
        };
        self.state.lock().unwrap().accounts.push(Entry {
            address,
            account,
            hidden_listings: 0,
        });
    }

    pub fn bank(&self, address: &Pubkey) -> Option<BankAccount> {
        let state = self.state.lock().unwrap();
        state
            .accounts
            .iter()
            .find(|entry| entry.address == *address)
            .map(|entry| BankAccount::decode(entry.address, &entry.account.data).unwrap())
    }

    pub fn fail_listing(&self, error: Option<RpcError>) {
        self.state.lock().unwrap().listing_error = error;
    }

    pub fn fail_submissions(&self, error: Option<RpcError>) {
        self.state.lock().unwrap().submit_error = error;
    }

    /// Accounts created from now on are missing from the next `lag`
    /// listings.
    pub fn set_listing_lag(&self, lag: usize) {
        self.state.lock().unwrap().listing_lag = lag;
    }

    pub fn set_listing_delay(&self, delay: Duration) {
        self.state.lock().unwrap().listing_delay = Some(delay);
    }

    pub fn set_confirm_mode(&self, mode: ConfirmMode) {
        self.state.lock().unwrap().confirm_mode = mode;
    }

    pub fn set_duplicate_listing(&self, duplicate: bool) {
        self.state.lock().unwrap().duplicate_listing = duplicate;
    }

    fn execute(
        &self,
        state: &mut LedgerState,
        transaction: &Transaction,
    ) -> Result<(), TransactionError> {
        transaction.verify()?;
        let keys = &transaction.message.account_keys;
        for (index, compiled) in transaction.message.instructions.iter().enumerate() {
            let index = index as u8;
            if keys[compiled.program_id_index as usize] != self.program_id {
                return Err(TransactionError::InstructionError(
                    index,
                    InstructionError::IncorrectProgramId,
                ));
            }
            let bank = keys[compiled.accounts[0] as usize];
            let user = keys[compiled.accounts[1] as usize];
            let instruction = BankInstruction::unpack(&compiled.data).map_err(|_| {
                TransactionError::InstructionError(index, InstructionError::InvalidInstructionData)
            })?;
            match instruction {
                BankInstruction::Create { name } => {
                    if state.accounts.iter().any(|entry| entry.address == bank) {
                        return Err(TransactionError::InstructionError(
                            index,
                            InstructionError::Custom(0),
                        ));
                    }
                    let account = BankAccount {
                        address: bank,
                        name,
                        owner: user,
                        balance: 0,
                    };
                    let mut data = account.encode().unwrap();
                    data.resize(BANK_ACCOUNT_SPACE, 0);
                    let hidden_listings = state.listing_lag;
                    state.accounts.push(Entry {
                        address: bank,
                        account: Account {
                            lamports: 1_000_000,
                            data,
                            owner: self.program_id,
                            executable: false,
                            rent_epoch: 0,
                        },
                        hidden_listings,
                    });
                }
                BankInstruction::Deposit { amount } => {
                    let entry = state
                        .accounts
                        .iter_mut()
                        .find(|entry| entry.address == bank)
                        .ok_or(TransactionError::InstructionError(
                            index,
                            InstructionError::Custom(ACCOUNT_NOT_INITIALIZED),
                        ))?;
                    let mut account =
                        BankAccount::decode(bank, &entry.account.data).map_err(|_| {
                            TransactionError::InstructionError(
                                index,
                                InstructionError::InvalidAccountData,
                            )
                        })?;
                    account.balance += amount;
                    let mut data = account.encode().unwrap();
                    data.resize(BANK_ACCOUNT_SPACE, 0);
                    entry.account.data = data;
                    entry.account.lamports += amount;
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl RpcConnection for InMemoryLedger {
    fn new(_config: RpcConnectionConfig) -> Self {
        Self::with_program(Pubkey::new_unique())
    }

    fn get_url(&self) -> String {
        "memory://ledger".to_string()
    }

    async fn health(&self) -> Result<(), RpcError> {
        Ok(())
    }

    async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
    ) -> Result<Vec<(Pubkey, Account)>, RpcError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.state.lock().unwrap().listing_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut state = self.state.lock().unwrap();
        if let Some(error) = state.listing_error.clone() {
            return Err(error);
        }
        let mut listing = Vec::new();
        for entry in state.accounts.iter_mut() {
            if entry.account.owner != *program_id {
                continue;
            }
            if entry.hidden_listings > 0 {
                entry.hidden_listings -= 1;
                continue;
            }
            listing.push((entry.address, entry.account.clone()));
        }
        if state.duplicate_listing {
            let copy = listing.clone();
            listing.extend(copy);
        }
        Ok(listing)
    }

    async fn get_account(&self, address: Pubkey) -> Result<Option<Account>, RpcError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .accounts
            .iter()
            .find(|entry| entry.address == address)
            .map(|entry| entry.account.clone()))
    }

    async fn get_latest_blockhash(&self) -> Result<Hash, RpcError> {
        self.blockhash_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Hash::new_unique())
    }

    async fn send_transaction_with_config(
        &self,
        transaction: &Transaction,
        config: RpcSendTransactionConfig,
    ) -> Result<Signature, RpcError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        if let Some(error) = state.submit_error.clone() {
            return Err(error);
        }
        let signature = transaction.signatures[0];
        let result = self.execute(&mut state, transaction);
        match result {
            Err(err) if !config.skip_preflight => Err(RpcError::Rejected(err.to_string())),
            result => {
                state.statuses.insert(signature, result.err());
                Ok(signature)
            }
        }
    }

    async fn confirm_transaction(
        &self,
        signature: Signature,
        timeout: Duration,
    ) -> Result<ConfirmationStatus, RpcError> {
        self.confirm_calls.fetch_add(1, Ordering::SeqCst);
        let (mode, status) = {
            let state = self.state.lock().unwrap();
            (state.confirm_mode, state.statuses.get(&signature).cloned())
        };
        match (mode, status) {
            (ConfirmMode::Immediate, Some(None)) => Ok(ConfirmationStatus::Confirmed),
            (ConfirmMode::Immediate, Some(Some(err))) => Ok(ConfirmationStatus::Failed(err)),
            _ => {
                tokio::time::sleep(timeout).await;
                Ok(ConfirmationStatus::TimedOut)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignerBehavior {
    Approve,
    Reject,
}

/// Wallet double with a real keypair and a scripted user response.
pub struct ScriptedSigner {
    pub keypair: Keypair,
    pub behavior: SignerBehavior,
    pub sign_requests: AtomicUsize,
}

impl ScriptedSigner {
    pub fn approving() -> Self {
        Self::new(SignerBehavior::Approve)
    }

    pub fn rejecting() -> Self {
        Self::new(SignerBehavior::Reject)
    }

    fn new(behavior: SignerBehavior) -> Self {
        Self {
            keypair: Keypair::new(),
            behavior,
            sign_requests: AtomicUsize::new(0),
        }
    }

    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    pub fn identity_pubkey(&self) -> Option<Pubkey> {
        Some(self.keypair.pubkey())
    }
}

#[async_trait]
impl TransactionSigner for ScriptedSigner {
    fn identity(&self) -> Option<Pubkey> {
        Some(self.keypair.pubkey())
    }

    async fn sign_transaction(
        &self,
        mut transaction: Transaction,
    ) -> Result<Transaction, SignerError> {
        self.sign_requests.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            SignerBehavior::Reject => Err(SignerError::UserRejected),
            SignerBehavior::Approve => {
                let recent_blockhash = transaction.message.recent_blockhash;
                let signers: &[&Keypair] = &[&self.keypair];
                transaction
                    .try_sign(signers, recent_blockhash)
                    .map_err(|e| SignerError::Failed(e.to_string()))?;
                Ok(transaction)
            }
        }
    }
}

pub struct TestEnv {
    pub ledger: Arc<InMemoryLedger>,
    pub discovery: Arc<DiscoveryEngine<InMemoryLedger>>,
    pub orchestrator: TransactionOrchestrator<InMemoryLedger>,
}

impl TestEnv {
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    pub fn with_config(configure: impl FnOnce(&mut OrchestratorConfig)) -> Self {
        let program_id = Pubkey::new_unique();
        let ledger = Arc::new(InMemoryLedger::with_program(program_id));
        let discovery = Arc::new(DiscoveryEngine::new(ledger.clone(), program_id));
        let mut config = OrchestratorConfig::new(program_id);
        config.confirm_timeout = Duration::from_millis(200);
        configure(&mut config);
        let orchestrator = TransactionOrchestrator::new(ledger.clone(), discovery.clone(), config);
        Self {
            ledger,
            discovery,
            orchestrator,
        }
    }

    pub fn program_id(&self) -> Pubkey {
        self.ledger.program_id()
    }
}

pub fn sample_bank(name: &str, balance: u64) -> BankAccount {
    BankAccount {
        address: Pubkey::new_unique(),
        name: name.to_string(),
        owner: Pubkey::new_unique(),
        balance,
    }
}
