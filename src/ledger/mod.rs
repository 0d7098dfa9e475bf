//! Read access to the vault ledger.
//!
//! The reconciler only ever talks to a [`Ledger`]; [`HttpLedger`] is the
//! production implementation backed by a JSON read gateway.

mod address;
mod http;
pub mod wire;

pub use address::Address;
pub use http::HttpLedger;

use crate::catalog::PoolRecord;
use crate::error::LedgerError;
use crate::units::Amount;
use std::future::Future;
use std::time::Duration;

/// The ledger reads the reconciler depends on.
pub trait Ledger: Send + Sync {
    /// Total number of pools ever created. Pool ids are `0..count`.
    fn pool_count(&self) -> impl Future<Output = Result<u64, LedgerError>> + Send;

    /// Point read of one pool.
    fn pool(&self, id: u64) -> impl Future<Output = Result<PoolRecord, LedgerError>> + Send;

    /// The ledger's own TVL figure for a pool.
    fn pool_tvl(&self, id: u64) -> impl Future<Output = Result<Amount, LedgerError>> + Send;

    /// The caller's raw deposit list. Left undecoded so that malformed
    /// entries can be skipped individually.
    fn caller_deposits(
        &self,
        caller: &Address,
    ) -> impl Future<Output = Result<serde_json::Value, LedgerError>> + Send;

    /// Whether `account` has joined the club.
    fn is_member(
        &self,
        account: &Address,
    ) -> impl Future<Output = Result<bool, LedgerError>> + Send;

    /// Asset balance held by `account`.
    fn balance_of(
        &self,
        account: &Address,
    ) -> impl Future<Output = Result<Amount, LedgerError>> + Send;

    fn paused(&self) -> impl Future<Output = Result<bool, LedgerError>> + Send;

    fn emergency_unlock(&self) -> impl Future<Output = Result<bool, LedgerError>> + Send;

    fn owner(&self) -> impl Future<Output = Result<Address, LedgerError>> + Send;

    /// Asset balance held by the vault contract itself.
    fn vault_balance(&self) -> impl Future<Output = Result<Amount, LedgerError>> + Send;

    /// Current fee for joining the club.
    fn membership_fee(&self) -> impl Future<Output = Result<Amount, LedgerError>> + Send;
}

/// Bounds applied to a pass over the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadLimits {
    /// Per-read timeout.
    pub timeout: Duration,
    /// Pool ids beyond this are never read, whatever the reported count.
    pub max_pools: u64,
    /// Point reads allowed in flight at once.
    pub concurrency: usize,
}

impl ReadLimits {
    pub const DEFAULT_MAX_POOLS: u64 = 1_000;
    pub const DEFAULT_CONCURRENCY: usize = 16;

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }
}

impl Default for ReadLimits {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_pools: Self::DEFAULT_MAX_POOLS,
            concurrency: Self::DEFAULT_CONCURRENCY,
        }
    }
}

/// Bound a single ledger read by `limit`.
pub async fn read_with_timeout<T, F>(read: F, limit: Duration) -> Result<T, LedgerError>
where
    F: Future<Output = Result<T, LedgerError>>,
{
    tokio::time::timeout(limit, read)
        .await
        .map_err(|_| LedgerError::Timeout(limit))?
}
