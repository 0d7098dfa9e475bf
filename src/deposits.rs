//! Caller deposit records and their per-pool totals.

use crate::ledger::wire::{self, amount_from_value, i64_from_value, u64_from_value};
use crate::ledger::{read_with_timeout, Address, Ledger};
use crate::units::Amount;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

const POOL_ID_KEYS: &[&str] = &["poolId", "pool_id"];
const AMOUNT_KEYS: &[&str] = &["amount"];
const UNLOCK_KEYS: &[&str] = &["unlockTime", "unlockTimestamp", "unlock_timestamp"];

/// One deposit made by the caller. A zero amount means it was withdrawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepositRecord {
    /// Position in the caller's ledger list; the index `Withdraw` expects.
    pub index: usize,
    pub pool_id: u64,
    #[serde(with = "wire::amount")]
    pub amount: Amount,
    pub unlock_timestamp: i64,
}

impl DepositRecord {
    pub fn is_live(&self) -> bool {
        self.amount > 0
    }

    fn parse(index: usize, entry: &Value) -> Option<Self> {
        let field = |keys: &[&str]| keys.iter().find_map(|k| entry.get(*k));

        Some(Self {
            index,
            pool_id: field(POOL_ID_KEYS).and_then(u64_from_value)?,
            amount: field(AMOUNT_KEYS).and_then(amount_from_value)?,
            unlock_timestamp: field(UNLOCK_KEYS).and_then(i64_from_value)?,
        })
    }
}

/// The caller's deposits, with live amounts summed per pool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepositBook {
    totals: BTreeMap<u64, Amount>,
    records: Vec<DepositRecord>,
}

impl DepositBook {
    /// Build from the raw ledger payload. Anything that is not a list gives
    /// an empty book; malformed entries are skipped.
    pub fn from_payload(payload: &Value) -> Self {
        let Some(entries) = payload.as_array() else {
            if !payload.is_null() {
                tracing::warn!("Deposit payload is not a list, ignoring");
            }
            return Self::default();
        };

        let records = entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                let record = DepositRecord::parse(index, entry);
                if record.is_none() {
                    tracing::debug!("Skipping malformed deposit #{index}: {entry}");
                }
                record
            })
            .collect();

        Self::from_records(records)
    }

    pub fn from_records(records: Vec<DepositRecord>) -> Self {
        let mut totals: BTreeMap<u64, Amount> = BTreeMap::new();
        for record in records.iter().filter(|r| r.is_live()) {
            let total = totals.entry(record.pool_id).or_default();
            *total = total.checked_add(record.amount).unwrap_or_else(|| {
                tracing::warn!("Deposit total for pool {} overflowed", record.pool_id);
                Amount::MAX
            });
        }

        Self { totals, records }
    }

    /// The caller's summed live amount in `pool_id`.
    pub fn aggregate(&self, pool_id: u64) -> Amount {
        self.totals.get(&pool_id).copied().unwrap_or(0)
    }

    pub fn totals(&self) -> &BTreeMap<u64, Amount> {
        &self.totals
    }

    pub fn records(&self) -> &[DepositRecord] {
        &self.records
    }

    pub fn records_for(&self, pool_id: u64) -> impl Iterator<Item = &DepositRecord> {
        self.records.iter().filter(move |r| r.pool_id == pool_id)
    }

    pub fn total(&self) -> Amount {
        self.totals
            .values()
            .fold(0, |acc: Amount, v| acc.saturating_add(*v))
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Read and fold the caller's deposits. Any read failure gives an empty book.
pub async fn fetch_deposits<L: Ledger>(
    ledger: &L,
    caller: &Address,
    read_timeout: Duration,
) -> DepositBook {
    match read_with_timeout(ledger.caller_deposits(caller), read_timeout).await {
        Ok(payload) => {
            let book = DepositBook::from_payload(&payload);
            tracing::debug!(
                "Caller {caller}: {} deposits across {} pools",
                book.records().len(),
                book.totals().len()
            );
            book
        }
        Err(e) => {
            tracing::warn!("Failed to read deposits for {caller}: {e}");
            DepositBook::default()
        }
    }
}
