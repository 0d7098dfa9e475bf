//! Runtime settings.
//!
//! Read from `~/.pool-positions/config.json` when present, then overridden
//! by `POOL_POSITIONS_*` environment variables.

use crate::error::ConfigError;
use crate::ledger::{Address, HttpLedger, ReadLimits};
use crate::units::DEFAULT_DECIMALS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_GATEWAY_URL: &str = "POOL_POSITIONS_GATEWAY_URL";
pub const ENV_VAULT: &str = "POOL_POSITIONS_VAULT";
pub const ENV_DECIMALS: &str = "POOL_POSITIONS_DECIMALS";
pub const ENV_TIMEOUT_SECS: &str = "POOL_POSITIONS_TIMEOUT_SECS";
pub const ENV_TICK_MS: &str = "POOL_POSITIONS_TICK_MS";
pub const ENV_MAX_POOLS: &str = "POOL_POSITIONS_MAX_POOLS";
pub const ENV_MAX_CONCURRENT_READS: &str = "POOL_POSITIONS_MAX_CONCURRENT_READS";

/// Largest decimal count whose scale fits in an `Amount`.
const MAX_DECIMALS: u32 = 38;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub gateway_url: String,
    pub vault: Option<Address>,
    pub decimals: u32,
    pub read_timeout_secs: u64,
    pub tick_ms: u64,
    /// Upper bound on pool ids read, whatever count the ledger reports.
    pub max_pools: u64,
    pub max_concurrent_reads: usize,
    /// Accounts scanned when listing a pool's depositors.
    pub known_depositors: Vec<Address>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gateway_url: "http://localhost:3000/api".to_string(),
            vault: None,
            decimals: DEFAULT_DECIMALS,
            read_timeout_secs: 10,
            tick_ms: 1_000,
            max_pools: ReadLimits::DEFAULT_MAX_POOLS,
            max_concurrent_reads: ReadLimits::DEFAULT_CONCURRENCY,
            known_depositors: Vec::new(),
        }
    }
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".pool-positions").join("config.json"))
    }

    /// Load the config file (defaults if absent) and apply env overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::default_path() {
            Some(path) => Self::load_from(&path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Apply overrides from `lookup` (the process environment in production).
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_GATEWAY_URL) {
            self.gateway_url = url;
        }
        if let Some(vault) = lookup(ENV_VAULT) {
            self.vault = Some(vault.parse()?);
        }
        if let Some(raw) = lookup(ENV_DECIMALS) {
            self.decimals = parse_number(ENV_DECIMALS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            self.read_timeout_secs = parse_number(ENV_TIMEOUT_SECS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_TICK_MS) {
            self.tick_ms = parse_number(ENV_TICK_MS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_MAX_POOLS) {
            self.max_pools = parse_number(ENV_MAX_POOLS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_MAX_CONCURRENT_READS) {
            self.max_concurrent_reads = parse_number(ENV_MAX_CONCURRENT_READS, &raw)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        url::Url::parse(&self.gateway_url)?;
        if self.decimals > MAX_DECIMALS {
            return Err(invalid("decimals", self.decimals));
        }
        if self.read_timeout_secs == 0 {
            return Err(invalid("read_timeout_secs", 0));
        }
        if self.tick_ms == 0 {
            return Err(invalid("tick_ms", 0));
        }
        if self.max_pools == 0 {
            return Err(invalid("max_pools", 0));
        }
        if self.max_concurrent_reads == 0 {
            return Err(invalid("max_concurrent_reads", 0));
        }
        Ok(())
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn read_limits(&self) -> ReadLimits {
        ReadLimits {
            timeout: self.read_timeout(),
            max_pools: self.max_pools,
            concurrency: self.max_concurrent_reads,
        }
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn vault(&self) -> Result<&Address, ConfigError> {
        self.vault.as_ref().ok_or(ConfigError::Invalid {
            key: "vault",
            value: "<unset>".to_string(),
        })
    }

    /// Build the gateway client described by this config.
    pub fn connect(&self) -> Result<HttpLedger, ConfigError> {
        HttpLedger::new(&self.gateway_url, self.vault()?.clone(), self.read_timeout())
    }
}

fn invalid(key: &'static str, value: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| invalid(key, raw))
}
