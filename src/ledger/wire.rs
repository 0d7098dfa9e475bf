//! Lenient decoding of gateway payloads.
//!
//! Integers arrive either as JSON numbers or as decimal strings (amounts in
//! the smallest unit routinely exceed `u64`). Floats and negatives are rejected.

use crate::units::Amount;
use serde_json::Value;

pub fn amount_from_value(value: &Value) -> Option<Amount> {
    match value {
        Value::Number(n) => n.as_u64().map(Amount::from),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn u64_from_value(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn i64_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn bool_from_value(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Read a scalar that may be bare or wrapped as `{"<key>": scalar}`.
pub fn scalar<'a>(payload: &'a Value, key: &str) -> &'a Value {
    payload.get(key).unwrap_or(payload)
}

/// The gateway may return either a list or an object wrapping the list.
pub fn unwrap_list(payload: Value, key: &str) -> Value {
    match payload {
        Value::Object(mut map) => {
            if let Some(list) = map.remove(key).filter(Value::is_array) {
                return list;
            }
            if let Some(list) = map.remove("data").filter(Value::is_array) {
                return list;
            }
            Value::Object(map)
        }
        other => other,
    }
}

/// serde adapter for [`Amount`] fields: lenient on input, string on output.
pub mod amount {
    use super::amount_from_value;
    use crate::units::Amount;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Amount, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        amount_from_value(&value).ok_or_else(|| D::Error::custom(format!("invalid amount: {value}")))
    }

    pub fn serialize<S>(amount: &Amount, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(amount)
    }
}

/// Serializer for amounts that may be unknown: string or `null`.
pub mod opt_amount {
    use crate::units::Amount;
    use serde::Serializer;

    pub fn serialize<S>(amount: &Option<Amount>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match amount {
            Some(amount) => serializer.collect_str(amount),
            None => serializer.serialize_none(),
        }
    }
}

/// serde adapter for `u64` fields that may arrive as strings.
pub mod uint {
    use super::u64_from_value;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        u64_from_value(&value).ok_or_else(|| D::Error::custom(format!("invalid integer: {value}")))
    }

    pub fn serialize<S>(n: &u64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(*n)
    }
}
