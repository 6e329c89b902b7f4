//! Client side view of the solanapdas bank program.
//!
//! [`discovery::DiscoveryEngine`] keeps a consistent snapshot of all bank
//! accounts, [`orchestrator::TransactionOrchestrator`] submits create and
//! deposit transactions and refreshes that snapshot once they confirm.

pub mod discovery;
pub mod errors;
pub mod notify;
pub mod orchestrator;
pub mod rpc;
pub mod signer;

pub use bank_account;
pub use discovery::{DiscoveryEngine, LocalSnapshot, SkippedAccount};
pub use errors::BankClientError;
pub use notify::{report_failure, Notifier, Severity, TracingNotifier};
pub use orchestrator::{
    OperationKind, OperationOutcome, OperationState, OrchestratorConfig, PendingOperation,
    TransactionOrchestrator,
};
pub use rpc::{
    ConfirmationStatus, RetryConfig, RpcConnection, RpcConnectionConfig, RpcError,
    SolanaRpcConnection,
};
pub use signer::{KeypairSigner, NoSigner, SignerError, TransactionSigner};
