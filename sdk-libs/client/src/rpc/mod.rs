pub mod errors;
pub mod rpc_connection;
pub mod solana_rpc;

pub use errors::RpcError;
pub use rpc_connection::{ConfirmationStatus, RetryConfig, RpcConnection, RpcConnectionConfig};
pub use solana_rpc::SolanaRpcConnection;
