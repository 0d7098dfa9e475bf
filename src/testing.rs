//! In-memory ledger shared by unit tests.

use crate::catalog::PoolRecord;
use crate::error::LedgerError;
use crate::ledger::{Address, Ledger};
use crate::units::Amount;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub fn pool(id: u64, active: bool) -> PoolRecord {
    PoolRecord {
        id,
        name: format!("Pool #{id}"),
        lock_duration_secs: 30 * 86_400,
        fee_rate: 5,
        active,
        emergency: false,
        total_deposited: 1_000,
        total_withdrawn: 200,
        total_profit: 0,
        capital_sent_out: 0,
    }
}

pub fn account(n: u8) -> Address {
    format!("0x{:040x}", n).parse().unwrap()
}

fn missing(what: &str) -> LedgerError {
    LedgerError::Decode(format!("{what} unavailable"))
}

#[derive(Default)]
pub struct FakeLedger {
    pools: Vec<PoolRecord>,
    failing_pools: HashSet<u64>,
    hanging_pools: HashSet<u64>,
    count_fails: bool,
    reported_count: Option<u64>,
    pool_delay: Option<Duration>,
    pool_reads: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    tvls: HashMap<u64, Amount>,
    deposits: Mutex<HashMap<Address, Value>>,
    failing_accounts: HashSet<Address>,
    deposit_reads: AtomicUsize,
    members: HashMap<Address, bool>,
    balances: HashMap<Address, Amount>,
    paused: Option<bool>,
    emergency_unlock: Option<bool>,
    owner: Option<Address>,
    vault_balance: Option<Amount>,
    membership_fee: Option<Amount>,
}

impl FakeLedger {
    pub fn with_pools(pools: Vec<PoolRecord>) -> Self {
        Self {
            pools,
            ..Default::default()
        }
    }

    pub fn failing_pool(mut self, id: u64) -> Self {
        self.failing_pools.insert(id);
        self
    }

    pub fn hanging_pool(mut self, id: u64) -> Self {
        self.hanging_pools.insert(id);
        self
    }

    pub fn failing_count(mut self) -> Self {
        self.count_fails = true;
        self
    }

    /// Report `count` pools regardless of how many exist.
    pub fn with_count(mut self, count: u64) -> Self {
        self.reported_count = Some(count);
        self
    }

    /// Every pool read takes `delay`.
    pub fn slow_pools(mut self, delay: Duration) -> Self {
        self.pool_delay = Some(delay);
        self
    }

    pub fn with_tvl(mut self, id: u64, tvl: Amount) -> Self {
        self.tvls.insert(id, tvl);
        self
    }

    pub fn with_deposits(self, caller: &Address, payload: Value) -> Self {
        self.set_deposits(caller, payload);
        self
    }

    pub fn failing_deposits(mut self, caller: &Address) -> Self {
        self.failing_accounts.insert(caller.clone());
        self
    }

    pub fn with_member(mut self, account: &Address, member: bool) -> Self {
        self.members.insert(account.clone(), member);
        self
    }

    pub fn with_balance(mut self, account: &Address, balance: Amount) -> Self {
        self.balances.insert(account.clone(), balance);
        self
    }

    /// An unpaused vault with every status read available.
    pub fn with_vault(mut self, owner: &Address, balance: Amount, membership_fee: Amount) -> Self {
        self.paused = Some(false);
        self.emergency_unlock = Some(false);
        self.owner = Some(owner.clone());
        self.vault_balance = Some(balance);
        self.membership_fee = Some(membership_fee);
        self
    }

    pub fn paused_vault(mut self) -> Self {
        self.paused = Some(true);
        self
    }

    pub fn set_deposits(&self, caller: &Address, payload: Value) {
        self.deposits
            .lock()
            .unwrap()
            .insert(caller.clone(), payload);
    }

    pub fn deposit_reads(&self) -> usize {
        self.deposit_reads.load(Ordering::SeqCst)
    }

    pub fn pool_reads(&self) -> usize {
        self.pool_reads.load(Ordering::SeqCst)
    }

    /// Most pool reads observed in flight at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

impl Ledger for FakeLedger {
    async fn pool_count(&self) -> Result<u64, LedgerError> {
        if self.count_fails {
            return Err(missing("pool count"));
        }
        Ok(self.reported_count.unwrap_or(self.pools.len() as u64))
    }

    async fn pool(&self, id: u64) -> Result<PoolRecord, LedgerError> {
        self.pool_reads.fetch_add(1, Ordering::SeqCst);
        if self.hanging_pools.contains(&id) {
            std::future::pending::<()>().await;
        }

        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);
        if let Some(delay) = self.pool_delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing_pools.contains(&id) {
            return Err(LedgerError::Status {
                status: 500,
                body: "execution reverted".into(),
            });
        }
        self.pools
            .get(id as usize)
            .cloned()
            .ok_or_else(|| LedgerError::Decode(format!("no pool {id}")))
    }

    async fn pool_tvl(&self, id: u64) -> Result<Amount, LedgerError> {
        self.tvls
            .get(&id)
            .copied()
            .ok_or_else(|| LedgerError::Decode(format!("no tvl for {id}")))
    }

    async fn caller_deposits(&self, caller: &Address) -> Result<Value, LedgerError> {
        self.deposit_reads.fetch_add(1, Ordering::SeqCst);
        if self.failing_accounts.contains(caller) {
            return Err(LedgerError::Status {
                status: 502,
                body: "bad gateway".into(),
            });
        }
        let deposits = self.deposits.lock().unwrap();
        Ok(deposits.get(caller).cloned().unwrap_or(Value::Null))
    }

    async fn is_member(&self, account: &Address) -> Result<bool, LedgerError> {
        self.members.get(account).copied().ok_or_else(|| missing("membership"))
    }

    async fn balance_of(&self, account: &Address) -> Result<Amount, LedgerError> {
        self.balances.get(account).copied().ok_or_else(|| missing("balance"))
    }

    async fn paused(&self) -> Result<bool, LedgerError> {
        self.paused.ok_or_else(|| missing("paused"))
    }

    async fn emergency_unlock(&self) -> Result<bool, LedgerError> {
        self.emergency_unlock.ok_or_else(|| missing("emergency unlock"))
    }

    async fn owner(&self) -> Result<Address, LedgerError> {
        self.owner.clone().ok_or_else(|| missing("owner"))
    }

    async fn vault_balance(&self) -> Result<Amount, LedgerError> {
        self.vault_balance.ok_or_else(|| missing("vault balance"))
    }

    async fn membership_fee(&self) -> Result<Amount, LedgerError> {
        self.membership_fee.ok_or_else(|| missing("membership fee"))
    }
}
