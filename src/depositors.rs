//! Who holds funds in a pool, among a known set of accounts.
//!
//! The ledger has no reverse index from pool to depositors, so this reads
//! each known account's deposit list.

use crate::deposits::DepositBook;
use crate::ledger::{read_with_timeout, wire, Address, Ledger};
use crate::units::{display_units, Amount};
use futures_util::future::join_all;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Depositor {
    pub address: Address,
    #[serde(with = "wire::amount")]
    pub amount: Amount,
    pub amount_display: String,
}

/// Accounts from `accounts` with a live balance in `pool_id`, in input order.
/// Accounts whose read fails are left out.
pub async fn pool_depositors<L: Ledger>(
    ledger: &L,
    pool_id: u64,
    accounts: &[Address],
    read_timeout: Duration,
    decimals: u32,
) -> Vec<Depositor> {
    let reads = accounts.iter().map(|account| async move {
        let result = read_with_timeout(ledger.caller_deposits(account), read_timeout).await;
        (account, result)
    });

    join_all(reads)
        .await
        .into_iter()
        .filter_map(|(account, result)| match result {
            Ok(payload) => {
                let amount = DepositBook::from_payload(&payload).aggregate(pool_id);
                (amount > 0).then(|| Depositor {
                    address: account.clone(),
                    amount,
                    amount_display: display_units(amount, decimals),
                })
            }
            Err(e) => {
                tracing::warn!("Failed to read deposits for {account}: {e}");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{account, FakeLedger};
    use serde_json::json;

    #[tokio::test]
    async fn lists_accounts_with_funds_in_pool() {
        let (a, b, c, d) = (account(1), account(2), account(3), account(4));
        let ledger = FakeLedger::default()
            .with_deposits(
                &a,
                json!([
                    {"poolId": 2, "amount": "1500000000000000000", "unlockTime": 0},
                    {"poolId": 2, "amount": "500000000000000000", "unlockTime": 0},
                ]),
            )
            .with_deposits(&b, json!([{"poolId": 1, "amount": "9", "unlockTime": 0}]))
            .with_deposits(&c, json!([{"poolId": 2, "amount": "0", "unlockTime": 0}]))
            .failing_deposits(&d);
        let e = account(5);

        let listed = pool_depositors(
            &ledger,
            2,
            &[a.clone(), b, c, d, e],
            Duration::from_millis(200),
            18,
        )
        .await;

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].address, a);
        assert_eq!(listed[0].amount, 2_000_000_000_000_000_000);
        assert_eq!(listed[0].amount_display, "2");
    }

    #[tokio::test]
    async fn empty_account_list_gives_nothing() {
        let ledger = FakeLedger::default();
        assert!(pool_depositors(&ledger, 0, &[], Duration::from_millis(50), 18)
            .await
            .is_empty());
    }
}
