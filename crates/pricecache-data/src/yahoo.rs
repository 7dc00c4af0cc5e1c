//! Yahoo Finance price provider.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime};
use pricecache_core::error::ProviderError;
use pricecache_core::traits::PriceProvider;
use pricecache_core::types::PriceRecord;
use time::OffsetDateTime;
use tracing::{debug, warn};
use yahoo_finance_api as yahoo;

/// Daily history from the Yahoo Finance chart API.
pub struct YahooPriceProvider {
    connector: yahoo::YahooConnector,
}

impl YahooPriceProvider {
    /// Create a new Yahoo Finance provider.
    pub fn new() -> Result<Self, ProviderError> {
        let connector = yahoo::YahooConnector::new().map_err(|e| {
            ProviderError::Connection(format!("Failed to initialize Yahoo connector: {}", e))
        })?;
        Ok(Self { connector })
    }

    /// Midnight UTC of `date` as the `time` crate type the connector expects.
    fn to_offset_datetime(date: NaiveDate) -> Result<OffsetDateTime, ProviderError> {
        let ts = date.and_time(NaiveTime::MIN).and_utc().timestamp();
        OffsetDateTime::from_unix_timestamp(ts)
            .map_err(|e| ProviderError::Parse(format!("Invalid date {}: {}", date, e)))
    }

    fn to_record(quote: &yahoo::Quote) -> Option<PriceRecord> {
        let date = DateTime::from_timestamp(quote.timestamp as i64, 0)?.date_naive();
        Some(
            PriceRecord::new(
                date,
                quote.open,
                quote.high,
                quote.low,
                quote.close,
                quote.volume as f64,
            )
            .with_adj_close(quote.adjclose),
        )
    }
}

#[async_trait]
impl PriceProvider for YahooPriceProvider {
    async fn fetch_daily(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceRecord>, ProviderError> {
        debug!(symbol, %start, %end, "Fetching daily history from Yahoo");

        // The chart API treats `period2` as exclusive.
        let exclusive_end = end.succ_opt().unwrap_or(end);
        let start_time = Self::to_offset_datetime(start)?;
        let end_time = Self::to_offset_datetime(exclusive_end)?;

        let response = self
            .connector
            .get_quote_history(symbol, start_time, end_time)
            .await
            .map_err(|e| {
                if matches!(e, yahoo::YahooError::NoQuotes | yahoo::YahooError::NoResult) {
                    ProviderError::SymbolNotFound(symbol.to_string())
                } else {
                    ProviderError::Api(format!("Yahoo history for {}: {}", symbol, e))
                }
            })?;

        let quotes = match response.quotes() {
            Ok(quotes) => quotes,
            Err(yahoo::YahooError::NoQuotes) => {
                warn!(symbol, %start, %end, "No quotes returned for range");
                return Ok(Vec::new());
            }
            Err(e) => return Err(ProviderError::Parse(e.to_string())),
        };

        let mut records: Vec<PriceRecord> = quotes
            .iter()
            .filter_map(Self::to_record)
            .filter(|r| r.date >= start && r.date <= end)
            .collect();
        records.sort_by_key(|r| r.date);

        Ok(records)
    }

    fn name(&self) -> &str {
        "yahoo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_datetime_is_utc_midnight() {
        let date = NaiveDate::from_ymd_opt(2020, 1, 10).unwrap();
        let odt = YahooPriceProvider::to_offset_datetime(date).unwrap();

        assert_eq!(odt.unix_timestamp(), 1_578_614_400);
    }

    #[test]
    fn test_quote_to_record() {
        let quote = yahoo::Quote {
            timestamp: 1_578_666_600, // 2020-01-10 14:30 UTC
            open: 10.0,
            high: 12.0,
            low: 9.5,
            volume: 1_000,
            close: 11.0,
            adjclose: 10.8,
        };

        let record = YahooPriceProvider::to_record(&quote).unwrap();
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2020, 1, 10).unwrap());
        assert_eq!(record.open, 10.0);
        assert_eq!(record.volume, 1_000.0);
        assert_eq!(record.adj_close, Some(10.8));
    }
}
