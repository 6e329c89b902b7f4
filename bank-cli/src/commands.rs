use std::time::Duration;

use bank_account::BankAccount;
use bank_client::{
    report_failure, BankClientError, DiscoveryEngine, LocalSnapshot, Notifier, RpcConnection,
    RpcError, Severity, TransactionOrchestrator, TransactionSigner,
};
use solana_sdk::{native_token::LAMPORTS_PER_SOL, pubkey::Pubkey};

use crate::cli::{CreateArgs, DepositArgs, ShowArgs};

const WAIT_DELAY: Duration = Duration::from_secs(2);

pub async fn list<R: RpcConnection>(
    discovery: &DiscoveryEngine<R>,
    signer: &dyn TransactionSigner,
    notifier: &dyn Notifier,
) -> Result<(), BankClientError> {
    if signer.identity().is_none() {
        notifier.notify(
            Severity::Warning,
            "Wallet not connected",
            "pass --keypair to list banks",
        );
    }
    match discovery.discover(signer.identity()).await {
        Ok(snapshot) => {
            print_snapshot(&snapshot);
            Ok(())
        }
        Err(e) => {
            report_failure(notifier, "Get Banks failed", &e);
            Err(e)
        }
    }
}

pub async fn show<R: RpcConnection>(
    rpc: &R,
    args: &ShowArgs,
    notifier: &dyn Notifier,
) -> Result<(), BankClientError> {
    match rpc.get_bank_account(args.bank).await {
        Ok(Some(bank)) => {
            println!("{}", format_bank(&bank));
            Ok(())
        }
        Ok(None) => {
            notifier.notify(
                Severity::Warning,
                "Bank not found",
                &args.bank.to_string(),
            );
            Ok(())
        }
        Err(e) => {
            report_failure(notifier, "Get Bank failed", &e);
            Err(e)
        }
    }
}

pub async fn create<R: RpcConnection>(
    orchestrator: &TransactionOrchestrator<R>,
    signer: &dyn TransactionSigner,
    args: &CreateArgs,
    notifier: &dyn Notifier,
) -> Result<(), BankClientError> {
    let outcome = match orchestrator.create_bank(signer, &args.name).await {
        Ok(outcome) => outcome,
        Err(e) => {
            report_failure(notifier, "Create Bank failed", &e);
            return Err(e);
        }
    };
    notifier.notify(
        Severity::Success,
        "New Bank created",
        &outcome.signature.to_string(),
    );

    let bank = outcome.bank;
    let visible = |snapshot: &LocalSnapshot| snapshot.get(&bank).is_some();
    let snapshot = match outcome.snapshot {
        Some(snapshot) if visible(snapshot.as_ref()) => Some(snapshot),
        _ => orchestrator
            .discovery()
            .discover_until(signer.identity(), visible, args.wait_attempts, WAIT_DELAY)
            .await
            .unwrap_or_else(|e| {
                report_failure(notifier, "Get Banks failed", &e);
                None
            }),
    };
    match snapshot {
        Some(snapshot) => print_snapshot(&snapshot),
        None => notifier.notify(
            Severity::Warning,
            "New bank not visible yet",
            &bank.to_string(),
        ),
    }
    Ok(())
}

pub async fn deposit<R: RpcConnection>(
    orchestrator: &TransactionOrchestrator<R>,
    signer: &dyn TransactionSigner,
    args: &DepositArgs,
    notifier: &dyn Notifier,
) -> Result<(), BankClientError> {
    match orchestrator.deposit_default(signer, args.bank).await {
        Ok(outcome) => {
            notifier.notify(
                Severity::Success,
                "Deposit created",
                &outcome.signature.to_string(),
            );
            if let Some(snapshot) = outcome.snapshot {
                print_snapshot(&snapshot);
            }
            Ok(())
        }
        Err(e) => {
            report_failure(notifier, "Deposit failed", &e);
            Err(e)
        }
    }
}

pub async fn health<R: RpcConnection>(
    rpc: &R,
    notifier: &dyn Notifier,
) -> Result<(), RpcError> {
    match rpc.health().await {
        Ok(()) => {
            notifier.notify(Severity::Success, "RPC node healthy", &rpc.get_url());
            Ok(())
        }
        Err(e) => {
            notifier.notify(Severity::Error, "RPC node unhealthy", &e.to_string());
            Err(e)
        }
    }
}

fn print_snapshot(snapshot: &LocalSnapshot) {
    if snapshot.is_empty() {
        println!("No banks found");
    }
    for bank in snapshot.accounts.iter() {
        println!("{}", format_bank(bank));
    }
}

pub fn format_bank(bank: &BankAccount) -> String {
    format!(
        "{}  {}  owner {}  balance {} SOL",
        bank.address,
        bank.name,
        short_pubkey(&bank.owner),
        bank.balance as f64 / LAMPORTS_PER_SOL as f64
    )
}

fn short_pubkey(pubkey: &Pubkey) -> String {
    let s = pubkey.to_string();
    format!("{}...{}", &s[..4], &s[s.len() - 4..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bank() {
        let bank = BankAccount {
            address: Pubkey::new_unique(),
            name: "Alpha".to_string(),
            owner: Pubkey::new_unique(),
            balance: 10_000_000,
        };
        let line = format_bank(&bank);
        let owner = bank.owner.to_string();
        assert!(line.contains("Alpha"));
        assert!(line.contains(&format!("{}...{}", &owner[..4], &owner[owner.len() - 4..])));
        assert!(line.ends_with("balance 0.01 SOL"));
    }
}
