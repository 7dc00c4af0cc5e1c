//! Error types for the price cache.

use chrono::NaiveDate;
use thiserror::Error;

/// Top-level price cache error.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("No price for {symbol} on or before {date}: series starts at {first}")]
    DateOutOfRange {
        symbol: String,
        date: NaiveDate,
        first: NaiveDate,
    },

    #[error("No data available for {0}")]
    NoData(String),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
}

impl CacheError {
    /// Whether this error is a failed lookup against cached data,
    /// as opposed to a failure of an external collaborator.
    pub fn is_lookup(&self) -> bool {
        matches!(
            self,
            CacheError::SymbolNotFound(_) | CacheError::DateOutOfRange { .. } | CacheError::NoData(_)
        )
    }
}

/// Market data provider errors.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Snapshot store errors.
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;
