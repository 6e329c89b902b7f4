use std::time::Duration;

use bank_account::{DecodeError, ValidationError};
use solana_sdk::signature::Signature;
use thiserror::Error;

use crate::{rpc::errors::RpcError, signer::SignerError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BankClientError {
    #[error("Wallet not connected")]
    NoIdentity,

    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("User rejected the signature request")]
    UserRejected,

    #[error("Signer error: {0}")]
    Signer(String),

    /// The transaction was submitted but its outcome is unknown.
    #[error("Transaction {signature} not confirmed within {timeout:?}")]
    TimedOut {
        signature: Signature,
        timeout: Duration,
    },
}

impl BankClientError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, BankClientError::Rpc(RpcError::Network(_)))
    }
}

impl From<SignerError> for BankClientError {
    fn from(err: SignerError) -> Self {
        match err {
            SignerError::UserRejected => BankClientError::UserRejected,
            SignerError::Failed(e) => BankClientError::Signer(e),
        }
    }
}
