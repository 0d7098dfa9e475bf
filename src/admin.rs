//! Pool overview for the vault administrator.

use crate::catalog::load_catalog;
use crate::ledger::{read_with_timeout, wire, Ledger, ReadLimits};
use crate::units::{display_units, Amount};
use crate::vault::{fetch_vault_status, VaultStatus};
use futures_util::stream::{self, StreamExt};
use serde::Serialize;

/// Where a pool's TVL figure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TvlSource {
    Ledger,
    Computed,
}

#[derive(Debug, Clone, Serialize)]
pub struct PoolSummary {
    pub id: u64,
    pub name: String,
    pub lock_duration_secs: u64,
    pub lock_days: String,
    pub fee_rate: u64,
    pub active: bool,
    pub emergency: bool,
    #[serde(with = "wire::amount")]
    pub tvl: Amount,
    pub tvl_display: String,
    pub tvl_source: TvlSource,
    pub total_profit_display: String,
    pub capital_sent_out_display: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminOverview {
    pub pools: Vec<PoolSummary>,
    pub active_count: usize,
    #[serde(with = "wire::amount")]
    pub total_tvl: Amount,
    pub total_tvl_display: String,
    pub vault: VaultStatus,
}

/// Load every pool with its TVL, plus the vault's own status.
///
/// The ledger's own TVL read is preferred; when it fails the TVL is computed
/// as deposited minus withdrawn.
pub async fn load_overview<L: Ledger>(
    ledger: &L,
    limits: ReadLimits,
    decimals: u32,
) -> AdminOverview {
    let (pools, vault) = tokio::join!(
        load_catalog(ledger, limits),
        fetch_vault_status(ledger, limits.timeout, decimals),
    );
    let tvls: Vec<_> = stream::iter(&pools)
        .map(|p| read_with_timeout(ledger.pool_tvl(p.id), limits.timeout))
        .buffered(limits.concurrency.max(1))
        .collect()
        .await;

    let summaries: Vec<PoolSummary> = pools
        .iter()
        .zip(tvls)
        .map(|(pool, tvl)| {
            let (tvl, tvl_source) = match tvl {
                Ok(tvl) => (tvl, TvlSource::Ledger),
                Err(e) => {
                    tracing::debug!("TVL read for pool {} failed, computing: {e}", pool.id);
                    (pool.current_tvl(), TvlSource::Computed)
                }
            };

            PoolSummary {
                id: pool.id,
                name: pool.display_name(),
                lock_duration_secs: pool.lock_duration_secs,
                lock_days: pool.lock_days(),
                fee_rate: pool.fee_rate,
                active: pool.active,
                emergency: pool.emergency,
                tvl,
                tvl_display: display_units(tvl, decimals),
                tvl_source,
                total_profit_display: display_units(pool.total_profit, decimals),
                capital_sent_out_display: display_units(pool.capital_sent_out, decimals),
            }
        })
        .collect();

    let total_tvl = summaries
        .iter()
        .fold(0, |acc: Amount, s| acc.saturating_add(s.tvl));

    AdminOverview {
        active_count: summaries.iter().filter(|s| s.active).count(),
        pools: summaries,
        total_tvl,
        total_tvl_display: display_units(total_tvl, decimals),
        vault,
    }
}
