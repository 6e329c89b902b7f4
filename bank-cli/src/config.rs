use std::time::Duration;

use bank_client::{OrchestratorConfig, RetryConfig, RpcConnectionConfig};

use crate::cli::GlobalArgs;

impl GlobalArgs {
    pub fn rpc_connection_config(&self) -> RpcConnectionConfig {
        let retry_delay = Duration::from_millis(self.retry_delay_ms);
        RpcConnectionConfig {
            commitment_config: Some(self.commitment.into()),
            retry_config: RetryConfig {
                max_retries: self.max_retries,
                retry_delay,
                timeout: retry_delay
                    .saturating_mul(self.max_retries.saturating_add(1))
                    .saturating_add(Duration::from_secs(10)),
            },
            filter_by_discriminator: self.filter_by_discriminator,
            ..RpcConnectionConfig::new(&self.rpc_url)
        }
    }

    pub fn orchestrator_config(&self, deposit_lamports: Option<u64>) -> OrchestratorConfig {
        let mut config = OrchestratorConfig::new(self.program_id);
        config.confirm_timeout = Duration::from_secs(self.confirm_timeout_secs);
        if let Some(lamports) = deposit_lamports {
            config.deposit_lamports = lamports;
        }
        config
    }
}
