use std::path::Path;

use async_trait::async_trait;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{read_keypair_file, Keypair, Signer},
    transaction::Transaction,
};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignerError {
    #[error("User rejected the signature request")]
    UserRejected,
    #[error("{0}")]
    Failed(String),
}

/// Wallet capability: the connected identity, if any, and signing.
///
/// `sign_transaction` may wait on a human. A decline is reported as
/// [`SignerError::UserRejected`].
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    fn identity(&self) -> Option<Pubkey>;

    async fn sign_transaction(&self, transaction: Transaction) -> Result<Transaction, SignerError>;
}

pub struct KeypairSigner {
    keypair: Keypair,
}

impl KeypairSigner {
    pub fn new(keypair: Keypair) -> Self {
        Self { keypair }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SignerError> {
        let path = path.as_ref();
        let keypair = read_keypair_file(path).map_err(|e| {
            SignerError::Failed(format!("Failed to read keypair {}: {}", path.display(), e))
        })?;
        Ok(Self::new(keypair))
    }
}

#[async_trait]
impl TransactionSigner for KeypairSigner {
    fn identity(&self) -> Option<Pubkey> {
        Some(self.keypair.pubkey())
    }

    async fn sign_transaction(
        &self,
        mut transaction: Transaction,
    ) -> Result<Transaction, SignerError> {
        let recent_blockhash = transaction.message.recent_blockhash;
        let signers: &[&Keypair] = &[&self.keypair];
        transaction
            .try_sign(signers, recent_blockhash)
            .map_err(|e| SignerError::Failed(e.to_string()))?;
        Ok(transaction)
    }
}

/// No wallet connected.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSigner;

#[async_trait]
impl TransactionSigner for NoSigner {
    fn identity(&self) -> Option<Pubkey> {
        None
    }

    async fn sign_transaction(
        &self,
        _transaction: Transaction,
    ) -> Result<Transaction, SignerError> {
        Err(SignerError::Failed("Wallet not connected".to_string()))
    }
}
