use super::wire::{self, amount_from_value, bool_from_value, u64_from_value};
use super::{Address, Ledger};
use crate::catalog::PoolRecord;
use crate::error::{ConfigError, LedgerError};
use crate::units::Amount;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Ledger client for the vault's JSON read gateway.
pub struct HttpLedger {
    base_url: String,
    vault: Address,
    http: Client,
}

impl HttpLedger {
    pub fn new(base_url: &str, vault: Address, timeout: Duration) -> Result<Self, ConfigError> {
        Url::parse(base_url)?;

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            vault,
            http,
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/v1/vaults/{}{}", self.base_url, self.vault, path)
    }

    pub fn vault(&self) -> &Address {
        &self.vault
    }

    async fn get_json(&self, path: &str) -> Result<Value, LedgerError> {
        let url = self.api_url(path);
        tracing::debug!("GET {url}");

        let resp = self.http.get(&url).send().await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(LedgerError::Status {
                status,
                body: body.chars().take(200).collect(),
            });
        }

        Ok(resp.json::<Value>().await?)
    }

    async fn get_flag(&self, path: &str, key: &str) -> Result<bool, LedgerError> {
        let payload = self.get_json(path).await?;
        bool_from_value(wire::scalar(&payload, key))
            .ok_or_else(|| LedgerError::Decode(format!("{key}: {payload}")))
    }

    async fn get_amount(&self, path: &str, key: &str) -> Result<Amount, LedgerError> {
        let payload = self.get_json(path).await?;
        amount_from_value(wire::scalar(&payload, key))
            .ok_or_else(|| LedgerError::Decode(format!("{key}: {payload}")))
    }
}

impl Ledger for HttpLedger {
    async fn pool_count(&self) -> Result<u64, LedgerError> {
        let payload = self.get_json("/pools/count").await?;
        u64_from_value(wire::scalar(&payload, "count"))
            .ok_or_else(|| LedgerError::Decode(format!("pool count: {payload}")))
    }

    async fn pool(&self, id: u64) -> Result<PoolRecord, LedgerError> {
        let payload = self.get_json(&format!("/pools/{id}")).await?;
        decode_pool(id, payload)
    }

    async fn pool_tvl(&self, id: u64) -> Result<Amount, LedgerError> {
        self.get_amount(&format!("/pools/{id}/tvl"), "tvl").await
    }

    async fn caller_deposits(&self, caller: &Address) -> Result<Value, LedgerError> {
        let payload = self
            .get_json(&format!("/accounts/{caller}/deposits"))
            .await?;
        Ok(wire::unwrap_list(payload, "deposits"))
    }

    async fn is_member(&self, account: &Address) -> Result<bool, LedgerError> {
        self.get_flag(&format!("/accounts/{account}/member"), "isMember").await
    }

    async fn balance_of(&self, account: &Address) -> Result<Amount, LedgerError> {
        self.get_amount(&format!("/accounts/{account}/balance"), "balance").await
    }

    async fn paused(&self) -> Result<bool, LedgerError> {
        self.get_flag("/paused", "paused").await
    }

    async fn emergency_unlock(&self) -> Result<bool, LedgerError> {
        self.get_flag("/emergency-unlock", "emergencyUnlock").await
    }

    async fn owner(&self) -> Result<Address, LedgerError> {
        let payload = self.get_json("/owner").await?;
        decode_address(wire::scalar(&payload, "owner"))
    }

    async fn vault_balance(&self) -> Result<Amount, LedgerError> {
        self.get_amount("/balance", "balance").await
    }

    async fn membership_fee(&self) -> Result<Amount, LedgerError> {
        self.get_amount("/membership-fee", "membershipFee").await
    }
}

fn decode_address(value: &Value) -> Result<Address, LedgerError> {
    value
        .as_str()
        .ok_or_else(|| LedgerError::Decode(format!("owner: {value}")))?
        .parse()
        .map_err(|e| LedgerError::Decode(format!("owner: {e}")))
}

/// Decode a pool payload. The id in the path wins over any id in the body.
fn decode_pool(id: u64, payload: Value) -> Result<PoolRecord, LedgerError> {
    let mut pool: PoolRecord = serde_json::from_value(payload)
        .map_err(|e| LedgerError::Decode(format!("pool {id}: {e}")))?;
    pool.id = id;
    Ok(pool)
}
