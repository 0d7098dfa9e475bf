use serde::Serialize;

/// Failure of a single read against the ledger gateway.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Ledger request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Ledger returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Unexpected ledger payload: {0}")]
    Decode(String),
    #[error("Ledger read timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// Fixed-point conversion failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnitsError {
    #[error("Empty amount")]
    Empty,
    #[error("Invalid amount: {0}")]
    Invalid(String),
    #[error("Too many decimal places (max {0})")]
    TooPrecise(u32),
    #[error("Amount out of range")]
    Overflow,
    #[error("Unsupported decimal count: {0}")]
    Decimals(u32),
    #[error("Enter a valid amount")]
    NotPositive,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("Address must start with 0x: {0}")]
    MissingPrefix(String),
    #[error("Address must be 40 hex characters: {0}")]
    Malformed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid gateway URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
    #[error(transparent)]
    Address(#[from] AddressError),
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Units(#[from] UnitsError),
    #[error(transparent)]
    Address(#[from] AddressError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Internal: {0}")]
    Internal(String),
}

// Reports and admin views carry errors as plain strings
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
