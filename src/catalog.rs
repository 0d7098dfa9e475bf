//! Pool catalog: every pool the vault has ever created.

use crate::ledger::wire::{amount, uint};
use crate::ledger::{read_with_timeout, Ledger, ReadLimits};
use crate::units::Amount;
use futures_util::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};

const SECS_PER_DAY: f64 = 86_400.0;

fn unnamed() -> String {
    "Unnamed".to_string()
}

/// A single investment pool as stored by the vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolRecord {
    #[serde(default, with = "uint")]
    pub id: u64,
    #[serde(default = "unnamed")]
    pub name: String,
    #[serde(default, alias = "duration", with = "uint")]
    pub lock_duration_secs: u64,
    #[serde(default, alias = "fee", with = "uint")]
    pub fee_rate: u64,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub emergency: bool,
    #[serde(default, with = "amount")]
    pub total_deposited: Amount,
    #[serde(default, with = "amount")]
    pub total_withdrawn: Amount,
    #[serde(default, with = "amount")]
    pub total_profit: Amount,
    #[serde(default, with = "amount")]
    pub capital_sent_out: Amount,
}

impl PoolRecord {
    /// Stand-in for a pool whose read failed.
    pub fn placeholder(id: u64) -> Self {
        Self {
            id,
            name: unnamed(),
            lock_duration_secs: 0,
            fee_rate: 0,
            active: false,
            emergency: false,
            total_deposited: 0,
            total_withdrawn: 0,
            total_profit: 0,
            capital_sent_out: 0,
        }
    }

    /// Deposited minus withdrawn, clamped at zero.
    pub fn current_tvl(&self) -> Amount {
        self.total_deposited.saturating_sub(self.total_withdrawn)
    }

    /// Withdrawn exceeds deposited; the ledger data is inconsistent.
    pub fn tvl_is_anomalous(&self) -> bool {
        self.total_withdrawn > self.total_deposited
    }

    pub fn display_name(&self) -> String {
        if self.name.trim().is_empty() {
            format!("Pool {}", self.id)
        } else {
            self.name.clone()
        }
    }

    /// Lock duration in days, e.g. `"30"` or `"0.5"`.
    pub fn lock_days(&self) -> String {
        (self.lock_duration_secs as f64 / SECS_PER_DAY).to_string()
    }
}

/// Load every pool, reading them concurrently.
///
/// The result always has one entry per pool id. A read that fails or exceeds
/// the read timeout is replaced by [`PoolRecord::placeholder`] without
/// affecting the others. If the pool count itself cannot be read, the
/// catalog is empty. A count above `limits.max_pools` is clamped, and at most
/// `limits.concurrency` reads run at once.
pub async fn load_catalog<L: Ledger>(ledger: &L, limits: ReadLimits) -> Vec<PoolRecord> {
    let reported = match read_with_timeout(ledger.pool_count(), limits.timeout).await {
        Ok(count) => count,
        Err(e) => {
            tracing::warn!("Failed to read pool count: {e}");
            return Vec::new();
        }
    };

    let count = if reported > limits.max_pools {
        tracing::warn!(
            "Ledger reports {reported} pools, reading only the first {}",
            limits.max_pools
        );
        limits.max_pools
    } else {
        reported
    };

    let pools: Vec<PoolRecord> = stream::iter(0..count)
        .map(|id| read_pool(ledger, id, limits))
        .buffered(limits.concurrency.max(1))
        .collect()
        .await;
    tracing::debug!("Loaded {} pools", pools.len());
    pools
}

async fn read_pool<L: Ledger>(ledger: &L, id: u64, limits: ReadLimits) -> PoolRecord {
    match read_with_timeout(ledger.pool(id), limits.timeout).await {
        Ok(mut pool) => {
            if pool.id != id {
                tracing::debug!("Pool {id} reported id {}, re-keying", pool.id);
                pool.id = id;
            }
            if pool.tvl_is_anomalous() {
                tracing::warn!(
                    "Pool {id} withdrew more than deposited ({} > {})",
                    pool.total_withdrawn,
                    pool.total_deposited
                );
            }
            pool
        }
        Err(e) => {
            tracing::warn!("Failed to read pool {id}: {e}");
            PoolRecord::placeholder(id)
        }
    }
}
