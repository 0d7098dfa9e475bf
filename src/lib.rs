//! Pool position reconciliation for an investment-club vault.
//!
//! Reads the pool catalog and a caller's deposits from the ledger, then
//! classifies every pool into the caller's active and inactive positions
//! with a live unlock countdown. Membership and vault status are read
//! alongside.

pub mod admin;
pub mod catalog;
pub mod config;
pub mod countdown;
pub mod depositors;
pub mod deposits;
pub mod error;
pub mod ledger;
pub mod positions;
pub mod reconciler;
pub mod units;
pub mod vault;
pub mod watcher;

#[cfg(test)]
mod testing;

pub use catalog::PoolRecord;
pub use config::Config;
pub use countdown::UnlockStatus;
pub use deposits::{DepositBook, DepositRecord};
pub use error::AppError;
pub use ledger::{Address, HttpLedger, Ledger, ReadLimits};
pub use positions::{classify, PoolPosition, PositionCategory, PositionReport};
pub use reconciler::{Reconciler, Snapshot};
pub use units::Amount;
pub use vault::{AccountStatus, VaultStatus};
pub use watcher::PositionWatcher;
