//! Membership and vault-level status.
//!
//! Every field is read independently. A failed read leaves that field
//! unknown (`None`, shown as `N/A`) and never affects the others.

use crate::error::LedgerError;
use crate::ledger::{read_with_timeout, wire, Address, Ledger};
use crate::units::{display_units, Amount};
use serde::Serialize;
use std::time::Duration;

/// Shown in place of a value whose read failed.
pub const UNKNOWN: &str = "N/A";

fn display_known(amount: Option<Amount>, decimals: u32) -> String {
    amount.map_or_else(|| UNKNOWN.to_string(), |a| display_units(a, decimals))
}

fn known<T>(what: &str, read: Result<T, LedgerError>) -> Option<T> {
    match read {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Failed to read {what}: {e}");
            None
        }
    }
}

/// The caller's club membership and wallet balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountStatus {
    pub member: Option<bool>,
    #[serde(serialize_with = "wire::opt_amount::serialize")]
    pub balance: Option<Amount>,
    pub balance_display: String,
    /// Deposits are only offered to confirmed members.
    pub can_deposit: bool,
}

impl AccountStatus {
    fn new(member: Option<bool>, balance: Option<Amount>, decimals: u32) -> Self {
        Self {
            member,
            balance,
            balance_display: display_known(balance, decimals),
            can_deposit: member == Some(true),
        }
    }

    pub fn unknown() -> Self {
        Self::new(None, None, 0)
    }
}

impl Default for AccountStatus {
    fn default() -> Self {
        Self::unknown()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VaultStatus {
    pub paused: Option<bool>,
    pub emergency_unlock: Option<bool>,
    pub owner: Option<Address>,
    #[serde(serialize_with = "wire::opt_amount::serialize")]
    pub balance: Option<Amount>,
    pub balance_display: String,
    #[serde(serialize_with = "wire::opt_amount::serialize")]
    pub membership_fee: Option<Amount>,
    pub membership_fee_display: String,
}

impl VaultStatus {
    pub fn unknown() -> Self {
        Self {
            paused: None,
            emergency_unlock: None,
            owner: None,
            balance: None,
            balance_display: UNKNOWN.to_string(),
            membership_fee: None,
            membership_fee_display: UNKNOWN.to_string(),
        }
    }

    /// New members may join only while the vault is known to be unpaused.
    pub fn accepts_members(&self) -> bool {
        self.paused == Some(false)
    }

    pub fn is_owner(&self, account: &Address) -> bool {
        self.owner.as_ref() == Some(account)
    }
}

impl Default for VaultStatus {
    fn default() -> Self {
        Self::unknown()
    }
}

/// Read `caller`'s membership and balance concurrently.
pub async fn fetch_account<L: Ledger>(
    ledger: &L,
    caller: &Address,
    read_timeout: Duration,
    decimals: u32,
) -> AccountStatus {
    let (member, balance) = tokio::join!(
        read_with_timeout(ledger.is_member(caller), read_timeout),
        read_with_timeout(ledger.balance_of(caller), read_timeout),
    );

    AccountStatus::new(
        known("membership", member),
        known("caller balance", balance),
        decimals,
    )
}

/// Read every vault-level status field concurrently.
pub async fn fetch_vault_status<L: Ledger>(
    ledger: &L,
    read_timeout: Duration,
    decimals: u32,
) -> VaultStatus {
    let (paused, emergency_unlock, owner, balance, membership_fee) = tokio::join!(
        read_with_timeout(ledger.paused(), read_timeout),
        read_with_timeout(ledger.emergency_unlock(), read_timeout),
        read_with_timeout(ledger.owner(), read_timeout),
        read_with_timeout(ledger.vault_balance(), read_timeout),
        read_with_timeout(ledger.membership_fee(), read_timeout),
    );

    let balance = known("vault balance", balance);
    let membership_fee = known("membership fee", membership_fee);
    VaultStatus {
        paused: known("paused flag", paused),
        emergency_unlock: known("emergency unlock flag", emergency_unlock),
        owner: known("owner", owner),
        balance,
        balance_display: display_known(balance, decimals),
        membership_fee,
        membership_fee_display: display_known(membership_fee, decimals),
    }
}
