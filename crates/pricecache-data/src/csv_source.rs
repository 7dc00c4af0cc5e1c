//! CSV price provider.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::ReaderBuilder;
use pricecache_core::error::ProviderError;
use pricecache_core::traits::PriceProvider;
use pricecache_core::types::PriceRecord;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// CSV record format.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(alias = "Date", alias = "date", alias = "timestamp", alias = "Timestamp")]
    date: String,
    #[serde(alias = "Open", alias = "open")]
    open: f64,
    #[serde(alias = "High", alias = "high")]
    high: f64,
    #[serde(alias = "Low", alias = "low")]
    low: f64,
    #[serde(alias = "Close", alias = "close")]
    close: f64,
    #[serde(alias = "Adj Close", alias = "adj_close", alias = "adjclose", default)]
    adj_close: Option<f64>,
    #[serde(alias = "Volume", alias = "volume", default)]
    volume: f64,
}

/// Price provider reading one CSV file per symbol from a directory.
///
/// Looks for `{SYMBOL}.csv`, `{symbol}.csv`, `{SYMBOL}_daily.csv` and
/// `{symbol}_daily.csv`, in that order.
pub struct CsvPriceProvider {
    dir: PathBuf,
}

impl CsvPriceProvider {
    /// Create a new CSV provider over `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, ProviderError> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(ProviderError::Connection(format!(
                "CSV data directory '{}' does not exist",
                dir.display()
            )));
        }
        Ok(Self { dir })
    }

    /// Locate the file holding `symbol`.
    fn find_file(&self, symbol: &str) -> Option<PathBuf> {
        let lower = symbol.to_lowercase();
        [
            format!("{}.csv", symbol),
            format!("{}.csv", lower),
            format!("{}_daily.csv", symbol),
            format!("{}_daily.csv", lower),
        ]
        .into_iter()
        .map(|name| self.dir.join(name))
        .find(|path| path.is_file())
    }

    /// Load all records from a CSV file.
    fn load_from_path(&self, path: &Path) -> Result<Vec<PriceRecord>, ProviderError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        let mut records = Vec::new();

        for result in reader.deserialize() {
            let row: CsvRecord = result.map_err(|e| ProviderError::Parse(e.to_string()))?;

            let date = parse_date(&row.date)?;
            let mut record = PriceRecord::new(date, row.open, row.high, row.low, row.close, row.volume);
            record.adj_close = row.adj_close;
            records.push(record);
        }

        records.sort_by_key(|r| r.date);

        Ok(records)
    }
}

#[async_trait]
impl PriceProvider for CsvPriceProvider {
    async fn fetch_daily(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceRecord>, ProviderError> {
        let path = self
            .find_file(symbol)
            .ok_or_else(|| ProviderError::SymbolNotFound(symbol.to_string()))?;

        debug!(symbol, path = %path.display(), %start, %end, "Reading CSV prices");

        let records = self
            .load_from_path(&path)?
            .into_iter()
            .filter(|r| r.date >= start && r.date <= end)
            .collect();

        Ok(records)
    }

    fn name(&self) -> &str {
        "csv"
    }
}

/// Parse various date formats.
fn parse_date(date_str: &str) -> Result<NaiveDate, ProviderError> {
    let date_str = date_str.trim();

    for format in ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(date_str, format) {
            return Ok(d);
        }
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(date_str, format) {
            return Ok(dt.date());
        }
    }

    // Unix timestamp, milliseconds if > 10 digits
    if let Ok(ts) = date_str.parse::<i64>() {
        let dt = if ts > 10_000_000_000 {
            DateTime::from_timestamp_millis(ts)
        } else {
            DateTime::from_timestamp(ts, 0)
        };
        if let Some(dt) = dt {
            return Ok(dt.date_naive());
        }
    }

    Err(ProviderError::Parse(format!(
        "Could not parse date: {}",
        date_str
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, d).unwrap()
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-01-15").unwrap(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(parse_date("2024-01-15 10:30:00").unwrap(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(parse_date("01/15/2024").unwrap(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(parse_date("1705312800000").unwrap(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()); // Unix ms
        assert_eq!(parse_date("1705312800").unwrap(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()); // Unix sec
        assert!(parse_date("yesterday").is_err());
    }

    #[tokio::test]
    async fn test_fetch_filters_inclusive_range() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("ACME.csv"),
            "Date,Open,High,Low,Close,Adj Close,Volume\n\
             2020-01-06,6.0,7.0,5.0,6.5,6.4,100\n\
             2020-01-02,2.0,3.0,1.0,2.5,2.4,100\n\
             2020-01-03,3.0,4.0,2.0,3.5,3.4,100\n\
             2020-01-07,7.0,8.0,6.0,7.5,7.4,100\n",
        )
        .unwrap();

        let provider = CsvPriceProvider::new(dir.path()).unwrap();
        let records = provider.fetch_daily("ACME", day(3), day(6)).await.unwrap();

        let dates: Vec<NaiveDate> = records.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![day(3), day(6)]);
        assert_eq!(records[0].adj_close, Some(3.4));
    }

    #[tokio::test]
    async fn test_lowercase_daily_file_without_optional_columns() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("acme_daily.csv"),
            "date,open,high,low,close\n2020-01-02,2.0,3.0,1.0,2.5\n",
        )
        .unwrap();

        let provider = CsvPriceProvider::new(dir.path()).unwrap();
        let records = provider.fetch_daily("ACME", day(1), day(31)).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].volume, 0.0);
        assert_eq!(records[0].adj_close, None);
    }

    #[tokio::test]
    async fn test_unknown_symbol() {
        let dir = tempfile::tempdir().unwrap();
        let provider = CsvPriceProvider::new(dir.path()).unwrap();

        let err = provider.fetch_daily("NOPE", day(1), day(31)).await.unwrap_err();
        assert!(matches!(err, ProviderError::SymbolNotFound(s) if s == "NOPE"));
    }

    #[test]
    fn test_missing_directory() {
        assert!(CsvPriceProvider::new("/definitely/not/here").is_err());
    }
}
