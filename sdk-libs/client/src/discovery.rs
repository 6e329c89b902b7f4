use std::{
    collections::HashSet,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, PoisonError, RwLock,
    },
    time::Duration,
};

use bank_account::{BankAccount, DecodeError};
use solana_sdk::{account::Account, pubkey::Pubkey};
use tokio::{sync::Mutex, time::sleep};
use tracing::{debug, info, warn};

use crate::{errors::BankClientError, rpc::RpcConnection};

/// A program account that was listed but could not be decoded as a bank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedAccount {
    pub address: Pubkey,
    pub error: DecodeError,
}

/// Point-in-time view of all bank accounts, produced by one discovery
/// cycle. Never mutated after construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalSnapshot {
    /// Id of the cycle that produced this snapshot, `0` if none ran.
    pub cycle: u64,
    /// Banks in listing order, unique by address.
    pub accounts: Vec<BankAccount>,
    pub skipped: Vec<SkippedAccount>,
}

impl LocalSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn get(&self, address: &Pubkey) -> Option<&BankAccount> {
        self.accounts.iter().find(|bank| bank.address == *address)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&BankAccount> {
        self.accounts.iter().find(|bank| bank.name == name)
    }

    /// Decodes every listed account on its own. A bad entry is recorded in
    /// `skipped` and does not affect its siblings.
    pub fn from_listing(cycle: u64, listing: Vec<(Pubkey, Account)>) -> Self {
        let mut seen = HashSet::with_capacity(listing.len());
        let mut accounts = Vec::with_capacity(listing.len());
        let mut skipped = Vec::new();

        for (address, account) in listing {
            if !seen.insert(address) {
                warn!("Duplicate account {} in program listing, ignored", address);
                continue;
            }
            match BankAccount::decode(address, &account.data) {
                Ok(bank) => accounts.push(bank),
                Err(error) => {
                    warn!("Skipping account {}: {}", address, error);
                    skipped.push(SkippedAccount { address, error });
                }
            }
        }

        Self {
            cycle,
            accounts,
            skipped,
        }
    }
}

#[derive(Debug)]
struct Installed {
    cycle: u64,
    snapshot: Arc<LocalSnapshot>,
}

/// Owns the installed [`LocalSnapshot`] and runs discovery cycles.
///
/// Cycles run one at a time. A caller that had to wait for a running cycle
/// reuses the result of any cycle that started after its own request
/// instead of starting a new one. Snapshots are installed in cycle start
/// order; a result older than the installed one is dropped.
#[derive(Debug)]
pub struct DiscoveryEngine<R: RpcConnection> {
    rpc: Arc<R>,
    program_id: Pubkey,
    cycle_lock: Mutex<()>,
    started_cycles: AtomicU64,
    installed: RwLock<Installed>,
}

impl<R: RpcConnection> DiscoveryEngine<R> {
    pub fn new(rpc: Arc<R>, program_id: Pubkey) -> Self {
        Self {
            rpc,
            program_id,
            cycle_lock: Mutex::new(()),
            started_cycles: AtomicU64::new(0),
            installed: RwLock::new(Installed {
                cycle: 0,
                snapshot: Arc::new(LocalSnapshot::empty()),
            }),
        }
    }

    /// Currently installed snapshot.
    pub fn snapshot(&self) -> Arc<LocalSnapshot> {
        self.installed
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot
            .clone()
    }

    /// Refreshes the snapshot from the ledger.
    ///
    /// Without an identity nothing is fetched and an empty snapshot is
    /// returned; the installed snapshot is left as is. If the listing fails
    /// the installed snapshot is kept and the error is returned.
    pub async fn discover(
        &self,
        identity: Option<Pubkey>,
    ) -> Result<Arc<LocalSnapshot>, BankClientError> {
        if identity.is_none() {
            debug!("No identity connected, skipping discovery");
            return Ok(Arc::new(LocalSnapshot::empty()));
        }

        let requested_after = self.started_cycles.load(Ordering::SeqCst);
        let _guard = self.cycle_lock.lock().await;
        {
            let installed = self.installed.read().unwrap_or_else(PoisonError::into_inner);
            if installed.cycle > requested_after {
                debug!(
                    "Reusing snapshot of cycle {} started after the request",
                    installed.cycle
                );
                return Ok(installed.snapshot.clone());
            }
        }

        let cycle = self.started_cycles.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("Discovery cycle {} started", cycle);
        let listing = self.rpc.get_program_accounts(&self.program_id).await?;
        let snapshot = LocalSnapshot::from_listing(cycle, listing);
        info!(
            "Discovery cycle {}: {} banks, {} skipped",
            cycle,
            snapshot.len(),
            snapshot.skipped.len()
        );
        Ok(self.install(snapshot))
    }

    /// Runs up to `attempts` discovery cycles, `delay` apart, until
    /// `predicate` holds. Returns `None` if it never did.
    ///
    /// Covers the lag between a confirmed transaction and its visibility
    /// on the read path. Only runs when the caller asks for it.
    pub async fn discover_until<F>(
        &self,
        identity: Option<Pubkey>,
        predicate: F,
        attempts: usize,
        delay: Duration,
    ) -> Result<Option<Arc<LocalSnapshot>>, BankClientError>
    where
        F: Fn(&LocalSnapshot) -> bool,
    {
        for attempt in 0..attempts {
            if attempt > 0 {
                sleep(delay).await;
            }
            let snapshot = self.discover(identity).await?;
            if predicate(snapshot.as_ref()) {
                return Ok(Some(snapshot));
            }
            debug!("Discovery attempt {}/{} not satisfied", attempt + 1, attempts);
        }
        Ok(None)
    }

    /// Installs `snapshot` unless a newer cycle already did, returning
    /// whichever snapshot is installed afterwards.
    fn install(&self, snapshot: LocalSnapshot) -> Arc<LocalSnapshot> {
        let mut installed = self
            .installed
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if snapshot.cycle <= installed.cycle {
            warn!(
                "Discarding snapshot of cycle {}, cycle {} is installed",
                snapshot.cycle, installed.cycle
            );
            return installed.snapshot.clone();
        }
        let snapshot = Arc::new(snapshot);
        installed.cycle = snapshot.cycle;
        installed.snapshot = snapshot.clone();
        snapshot
    }
}
