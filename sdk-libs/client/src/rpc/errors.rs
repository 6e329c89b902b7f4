use solana_client::{
    client_error::{ClientError, ClientErrorKind},
    rpc_request::{RpcError as RpcRequestError, RpcResponseErrorData},
};
use thiserror::Error;

/// Failure of a single ledger RPC call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RpcError {
    /// Transport level failure, the request may not have reached the node.
    #[error("Network error: {0}")]
    Network(String),

    /// The node answered with something the client cannot interpret.
    #[error("Invalid RPC response: {0}")]
    InvalidResponse(String),

    /// The ledger refused the transaction.
    #[error("Transaction rejected: {0}")]
    Rejected(String),
}

impl RpcError {
    pub fn is_network(&self) -> bool {
        matches!(self, RpcError::Network(_))
    }

    /// Classification for transaction submission. A refusal by the ledger
    /// or its preflight simulation is a rejection; an unhealthy node never
    /// looked at the transaction.
    pub fn from_send_error(err: ClientError) -> Self {
        match err.kind() {
            ClientErrorKind::RpcError(RpcRequestError::RpcResponseError {
                data: RpcResponseErrorData::SendTransactionPreflightFailure(_),
                ..
            }) => RpcError::Rejected(err.to_string()),
            _ => RpcError::from(err),
        }
    }
}

impl From<ClientError> for RpcError {
    fn from(err: ClientError) -> Self {
        if let Some(transaction_error) = err.get_transaction_error() {
            return RpcError::Rejected(transaction_error.to_string());
        }
        match err.kind() {
            ClientErrorKind::Io(_)
            | ClientErrorKind::Reqwest(_)
            | ClientErrorKind::RpcError(RpcRequestError::RpcRequestError(_))
            | ClientErrorKind::RpcError(RpcRequestError::RpcResponseError {
                data: RpcResponseErrorData::NodeUnhealthy { .. },
                ..
            }) => {
                RpcError::Network(err.to_string())
            }
            _ => RpcError::InvalidResponse(err.to_string()),
        }
    }
}
