use crate::catalog::{load_catalog, PoolRecord};
use crate::deposits::{fetch_deposits, DepositBook};
use crate::ledger::{Address, Ledger, ReadLimits};
use crate::positions::{classify, PositionReport};
use crate::vault::{fetch_account, fetch_vault_status, AccountStatus, VaultStatus};
use std::sync::Arc;
use std::time::Duration;

/// Current unix time in seconds.
pub fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// One joined read of the pool catalog, a caller's deposits and the
/// membership and vault status shown beside them.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub pools: Vec<PoolRecord>,
    pub book: DepositBook,
    pub account: AccountStatus,
    pub vault: VaultStatus,
    pub fetched_at: i64,
}

impl Snapshot {
    pub fn report(&self, now: i64, decimals: u32) -> PositionReport {
        classify(&self.pools, &self.book, now, decimals)
            .with_status(self.account.clone(), self.vault.clone())
    }
}

/// Reads ledger state for a caller and turns it into position reports.
pub struct Reconciler<L> {
    ledger: Arc<L>,
    limits: ReadLimits,
    decimals: u32,
}

impl<L> Clone for Reconciler<L> {
    fn clone(&self) -> Self {
        Self {
            ledger: Arc::clone(&self.ledger),
            limits: self.limits,
            decimals: self.decimals,
        }
    }
}

impl<L: Ledger> Reconciler<L> {
    pub fn new(ledger: Arc<L>, limits: ReadLimits, decimals: u32) -> Self {
        Self {
            ledger,
            limits,
            decimals,
        }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn limits(&self) -> ReadLimits {
        self.limits
    }

    pub fn read_timeout(&self) -> Duration {
        self.limits.timeout
    }

    pub fn decimals(&self) -> u32 {
        self.decimals
    }

    /// Load the catalog, the caller's deposits and status concurrently.
    pub async fn snapshot(&self, caller: &Address) -> Snapshot {
        let ledger = self.ledger.as_ref();
        let timeout = self.limits.timeout;
        let (pools, book, account, vault) = tokio::join!(
            load_catalog(ledger, self.limits),
            fetch_deposits(ledger, caller, timeout),
            fetch_account(ledger, caller, timeout, self.decimals),
            fetch_vault_status(ledger, timeout, self.decimals),
        );

        Snapshot {
            pools,
            book,
            account,
            vault,
            fetched_at: unix_now(),
        }
    }

    /// Fresh snapshot classified at `now`.
    pub async fn report(&self, caller: &Address, now: i64) -> PositionReport {
        self.snapshot(caller).await.report(now, self.decimals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::positions::PositionCategory;
    use crate::testing::{account, pool, FakeLedger};
    use crate::units::DEFAULT_DECIMALS;
    use serde_json::json;

    fn limits() -> ReadLimits {
        ReadLimits::with_timeout(Duration::from_millis(200))
    }

    #[tokio::test]
    async fn end_to_end_active_and_dropped_pools() {
        let now = 1_700_000_000;
        let caller = account(9);
        let mut p0 = pool(0, true);
        p0.total_deposited = 1000;
        p0.total_withdrawn = 200;
        let ledger = FakeLedger::with_pools(vec![p0, pool(1, false)])
            .with_deposits(
                &caller,
                json!([
                    {"poolId": 0, "amount": "300", "unlockTime": now + 3661},
                    {"poolId": 0, "amount": "0", "unlockTime": now - 10},
                ]),
            )
            .with_member(&caller, true)
            .with_balance(&caller, 42)
            .with_vault(&account(1), 5_000, 300);
        let reconciler = Reconciler::new(Arc::new(ledger), limits(), DEFAULT_DECIMALS);

        let report = reconciler.report(&caller, now).await;

        assert_eq!(report.len(), 1);
        let pos = report.position(0).unwrap();
        assert_eq!(pos.aggregate_amount, 300);
        assert_eq!(pos.category, PositionCategory::ActiveWithPosition);
        assert_eq!(pos.tvl, 800);
        assert_eq!(pos.status.to_string(), "1h 1m 1s");
        assert!(!pos.withdrawable);
        assert!(report.position(1).is_none());

        let status = report.account.as_ref().unwrap();
        assert_eq!(status.member, Some(true));
        assert_eq!(status.balance, Some(42));
        assert_eq!(report.vault.as_ref().unwrap().membership_fee, Some(300));
        assert!(report.can_deposit());
    }

    #[tokio::test]
    async fn snapshot_survives_partial_failures() {
        let caller = account(3);
        let ledger = FakeLedger::with_pools(vec![pool(0, true), pool(1, true), pool(2, true)])
            .failing_pool(1)
            .failing_deposits(&caller);
        let reconciler = Reconciler::new(Arc::new(ledger), limits(), DEFAULT_DECIMALS);

        let snapshot = reconciler.snapshot(&caller).await;

        assert_eq!(snapshot.pools.len(), 3);
        assert_eq!(snapshot.pools[1], PoolRecord::placeholder(1));
        assert!(snapshot.book.is_empty());
        assert_eq!(snapshot.account, AccountStatus::unknown());
        assert_eq!(snapshot.vault, VaultStatus::unknown());

        // placeholder is inactive with no funds, so it drops out
        let report = snapshot.report(0, DEFAULT_DECIMALS);
        assert_eq!(report.active.len(), 2);
        assert!(report.inactive.is_empty());
        assert!(!report.can_deposit());
    }
}
