//! Joins the pool catalog with the caller's deposits.
//!
//! [`classify`] is a pure function of its inputs: it never fails and never
//! mutates, so callers simply recompute on every tick or ledger change.

use crate::catalog::PoolRecord;
use crate::countdown::UnlockStatus;
use crate::deposits::{DepositBook, DepositRecord};
use crate::ledger::wire;
use crate::units::{display_units, Amount};
use crate::vault::{AccountStatus, VaultStatus};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionCategory {
    ActiveWithPosition,
    ActiveNoPosition,
    InactiveWithPosition,
}

/// One live deposit inside a position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepositEntry {
    pub index: usize,
    #[serde(with = "wire::amount")]
    pub amount: Amount,
    pub amount_display: String,
    pub unlock_timestamp: i64,
    pub status: UnlockStatus,
    pub withdrawable: bool,
}

/// The caller's standing in one pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolPosition {
    pub pool_id: u64,
    pub name: String,
    pub fee_rate: u64,
    pub lock_duration_secs: u64,
    pub lock_days: String,
    pub category: PositionCategory,
    #[serde(with = "wire::amount")]
    pub aggregate_amount: Amount,
    pub aggregate_display: String,
    pub unlock_timestamp: Option<i64>,
    pub status: UnlockStatus,
    pub withdrawable: bool,
    #[serde(with = "wire::amount")]
    pub tvl: Amount,
    pub tvl_display: String,
    pub deposits: Vec<DepositEntry>,
}

/// Active pools plus inactive pools the caller still holds funds in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionReport {
    pub now: i64,
    pub active: Vec<PoolPosition>,
    pub inactive: Vec<PoolPosition>,
    #[serde(with = "wire::amount")]
    pub total_aggregate: Amount,
    pub total_display: String,
    /// Caller membership and balance, when read alongside the positions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<AccountStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vault: Option<VaultStatus>,
}

impl PositionReport {
    pub fn with_status(mut self, account: AccountStatus, vault: VaultStatus) -> Self {
        self.account = Some(account);
        self.vault = Some(vault);
        self
    }

    /// Whether the UI should offer a deposit form. Unknown membership or a
    /// paused vault both count as no.
    pub fn can_deposit(&self) -> bool {
        let member = self.account.as_ref().is_some_and(|a| a.can_deposit);
        let paused = self.vault.as_ref().and_then(|v| v.paused) == Some(true);
        member && !paused
    }

    pub fn len(&self) -> usize {
        self.active.len() + self.inactive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty() && self.inactive.is_empty()
    }

    pub fn position(&self, pool_id: u64) -> Option<&PoolPosition> {
        self.active
            .iter()
            .chain(&self.inactive)
            .find(|p| p.pool_id == pool_id)
    }
}

/// Pick the deposit whose unlock time represents the pool.
///
/// The earliest-unlocking live deposit wins, since that is the first one the
/// caller can withdraw. With no live deposit, the first record for the pool
/// is used so the countdown stays visible.
fn relevant_unlock(book: &DepositBook, pool_id: u64) -> Option<i64> {
    book.records_for(pool_id)
        .filter(|r| r.is_live())
        .map(|r| r.unlock_timestamp)
        .min()
        .or_else(|| book.records_for(pool_id).next().map(|r| r.unlock_timestamp))
}

fn deposit_entry(record: &DepositRecord, now: i64, decimals: u32) -> DepositEntry {
    let status = UnlockStatus::at(record.unlock_timestamp, now);
    DepositEntry {
        index: record.index,
        amount: record.amount,
        amount_display: display_units(record.amount, decimals),
        unlock_timestamp: record.unlock_timestamp,
        status,
        withdrawable: status.is_unlocked() && record.is_live(),
    }
}

fn position(
    pool: &PoolRecord,
    book: &DepositBook,
    category: PositionCategory,
    now: i64,
    decimals: u32,
) -> PoolPosition {
    let aggregate = book.aggregate(pool.id);
    let unlock_timestamp = relevant_unlock(book, pool.id);
    let status = UnlockStatus::for_unlock(unlock_timestamp, now);
    let tvl = pool.current_tvl();

    PoolPosition {
        pool_id: pool.id,
        name: pool.display_name(),
        fee_rate: pool.fee_rate,
        lock_duration_secs: pool.lock_duration_secs,
        lock_days: pool.lock_days(),
        category,
        aggregate_amount: aggregate,
        aggregate_display: display_units(aggregate, decimals),
        unlock_timestamp,
        status,
        withdrawable: status.is_unlocked() && aggregate > 0,
        tvl,
        tvl_display: display_units(tvl, decimals),
        deposits: book
            .records_for(pool.id)
            .filter(|r| r.is_live())
            .map(|r| deposit_entry(r, now, decimals))
            .collect(),
    }
}

/// Classify every pool against the caller's deposits at time `now`.
pub fn classify(
    pools: &[PoolRecord],
    book: &DepositBook,
    now: i64,
    decimals: u32,
) -> PositionReport {
    let mut active = Vec::new();
    let mut inactive = Vec::new();

    for pool in pools {
        let held = book.aggregate(pool.id) > 0;
        match (pool.active, held) {
            (true, true) => active.push(position(
                pool,
                book,
                PositionCategory::ActiveWithPosition,
                now,
                decimals,
            )),
            (true, false) => active.push(position(
                pool,
                book,
                PositionCategory::ActiveNoPosition,
                now,
                decimals,
            )),
            (false, true) => inactive.push(position(
                pool,
                book,
                PositionCategory::InactiveWithPosition,
                now,
                decimals,
            )),
            (false, false) => {}
        }
    }

    let total_aggregate = book.total();
    PositionReport {
        now,
        active,
        inactive,
        total_aggregate,
        total_display: display_units(total_aggregate, decimals),
        account: None,
        vault: None,
    }
}
