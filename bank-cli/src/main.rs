use std::sync::Arc;

use bank_cli::{
    cli::{Cli, Commands},
    commands,
    telemetry::setup_telemetry,
};
use bank_client::{
    DiscoveryEngine, KeypairSigner, NoSigner, RpcConnection, SolanaRpcConnection, TracingNotifier,
    TransactionOrchestrator, TransactionSigner,
};
use clap::Parser;
use tracing::debug;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_telemetry();
    let cli = Cli::parse();
    let global = &cli.global;

    let signer: Box<dyn TransactionSigner> = match &global.keypair {
        Some(path) => Box::new(KeypairSigner::from_file(path)?),
        None => Box::new(NoSigner),
    };
    let notifier = TracingNotifier;

    let rpc = Arc::new(SolanaRpcConnection::new(global.rpc_connection_config()));
    debug!("Connected to {}", rpc.get_url());
    let discovery = Arc::new(DiscoveryEngine::new(rpc.clone(), global.program_id));

    match &cli.command {
        Commands::List => commands::list(&discovery, signer.as_ref(), &notifier).await?,
        Commands::Show(args) => commands::show(rpc.as_ref(), args, &notifier).await?,
        Commands::Create(args) => {
            let orchestrator = TransactionOrchestrator::new(
                rpc.clone(),
                discovery.clone(),
                global.orchestrator_config(None),
            );
            commands::create(&orchestrator, signer.as_ref(), args, &notifier).await?
        }
        Commands::Deposit(args) => {
            let orchestrator = TransactionOrchestrator::new(
                rpc.clone(),
                discovery.clone(),
                global.orchestrator_config(args.lamports),
            );
            commands::deposit(&orchestrator, signer.as_ref(), args, &notifier).await?
        }
        Commands::Health => commands::health(rpc.as_ref(), &notifier).await?,
    }
    Ok(())
}
