//! Daily price cache.

use chrono::{Datelike, NaiveDate, Weekday};
use pricecache_core::error::{CacheError, CacheResult};
use pricecache_core::traits::{Clock, PriceProvider, SnapshotStore, SystemClock};
use pricecache_core::types::{PriceRecord, PriceSeries, Snapshot};
use tracing::{debug, info};

/// First day fetched for a symbol with no history.
pub fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// What `refresh_one` did for a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Symbol had no history; the full range was fetched.
    Inserted { records: usize },
    /// Trailing range was fetched and merged; `records` new dates were added.
    Extended { records: usize },
    /// Up to one weekend behind on a Saturday or Sunday; nothing fetched.
    WeekendSkip,
    /// Already holds the reference date; nothing fetched.
    UpToDate,
}

/// Symbol-keyed cache of daily price series, backed by a snapshot store.
///
/// The reference date ("today") is fixed at construction as the day before
/// the clock's date. Every refresh writes the whole mapping back to the
/// store.
pub struct PriceCache<P, S, C = SystemClock> {
    data: Snapshot,
    provider: P,
    store: S,
    clock: C,
    start_date: NaiveDate,
    today: NaiveDate,
}

impl<P, S> PriceCache<P, S, SystemClock>
where
    P: PriceProvider,
    S: SnapshotStore,
{
    /// Create a cache on the system clock and restore it from `store`.
    pub fn new(provider: P, store: S) -> CacheResult<Self> {
        Self::with_clock(provider, store, SystemClock)
    }
}

impl<P, S, C> PriceCache<P, S, C>
where
    P: PriceProvider,
    S: SnapshotStore,
    C: Clock,
{
    /// Create a cache on the given clock and restore it from `store`.
    pub fn with_clock(provider: P, store: S, clock: C) -> CacheResult<Self> {
        let today = clock.today().pred_opt().unwrap_or(NaiveDate::MIN);
        let mut cache = Self {
            data: Snapshot::new(),
            provider,
            store,
            clock,
            start_date: default_start_date(),
            today,
        };
        cache.restore()?;
        Ok(cache)
    }

    /// Set the first day fetched for new symbols.
    pub fn with_start_date(mut self, start_date: NaiveDate) -> Self {
        self.start_date = start_date;
        self
    }

    /// Reload the mapping from the snapshot store.
    ///
    /// Returns `false` and leaves the cache empty when no snapshot exists.
    pub fn restore(&mut self) -> CacheResult<bool> {
        match self.store.restore()? {
            Some(snapshot) => {
                self.data = snapshot;
                info!(symbols = ?self.symbols(), "Restored price cache");
                Ok(true)
            }
            None => {
                info!("No price data was found, starting with an empty cache");
                self.data.clear();
                Ok(false)
            }
        }
    }

    /// Write the whole mapping to the snapshot store.
    pub fn persist(&self) -> CacheResult<()> {
        self.store.persist(&self.data)?;
        debug!(symbols = self.data.len(), "Persisted price cache");
        Ok(())
    }

    /// Refresh every cached symbol, stopping at the first failure.
    pub async fn refresh_all(&mut self) -> CacheResult<Vec<(String, RefreshOutcome)>> {
        let symbols: Vec<String> = self.data.keys().cloned().collect();
        let mut outcomes = Vec::with_capacity(symbols.len());

        for symbol in symbols {
            let outcome = self.refresh_one(&symbol).await?;
            outcomes.push((symbol, outcome));
        }

        Ok(outcomes)
    }

    /// Bring one symbol up to the reference date, adding it if unknown.
    ///
    /// Persists afterwards whether or not anything changed.
    pub async fn refresh_one(&mut self, symbol: &str) -> CacheResult<RefreshOutcome> {
        let last_date = self.data.get(symbol).and_then(PriceSeries::last_date);

        let outcome = match last_date {
            None => {
                let records = self.fetch(symbol, self.start_date, self.today).await?;
                let series = PriceSeries::from(records);
                let count = series.len();
                self.data.insert(symbol.to_string(), series);

                info!(symbol, records = count, "Added symbol to price cache");
                RefreshOutcome::Inserted { records: count }
            }
            Some(cur_date) => {
                let diff = (self.today - cur_date).num_days();

                if diff > 0 && diff < 3 && is_weekend(self.clock.today()) {
                    debug!(symbol, %cur_date, diff, "Market closed for the weekend, skipping");
                    RefreshOutcome::WeekendSkip
                } else if diff > 0 {
                    let records = self.fetch(symbol, cur_date, self.today).await?;
                    let added = self
                        .data
                        .entry(symbol.to_string())
                        .or_default()
                        .merge(records);

                    info!(symbol, from = %cur_date, to = %self.today, added, "Extended price series");
                    RefreshOutcome::Extended { records: added }
                } else {
                    debug!(symbol, %cur_date, "Price series is current");
                    RefreshOutcome::UpToDate
                }
            }
        };

        self.persist()?;
        Ok(outcome)
    }

    async fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> CacheResult<Vec<PriceRecord>> {
        if start > end {
            return Ok(Vec::new());
        }
        debug!(symbol, %start, %end, provider = self.provider.name(), "Fetching prices");
        Ok(self.provider.fetch_daily(symbol, start, end).await?)
    }

    /// Records for `symbol` within `[start_date, end_date]`.
    ///
    /// Bounds default to the cache's start date and reference date.
    pub fn load_company(
        &self,
        symbol: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> CacheResult<&[PriceRecord]> {
        let series = self.get_all(symbol)?;
        let start = start_date.unwrap_or(self.start_date);
        let end = end_date.unwrap_or(self.today);
        Ok(series.range(start, end))
    }

    /// Drop every symbol and persist the empty cache.
    pub fn clear(&mut self) -> CacheResult<()> {
        self.data.clear();
        info!("Cleared price cache");
        self.persist()
    }

    /// Full stored series for `symbol`.
    pub fn get_all(&self, symbol: &str) -> CacheResult<&PriceSeries> {
        self.data
            .get(symbol)
            .ok_or_else(|| CacheError::SymbolNotFound(symbol.to_string()))
    }

    /// Opening price on `date`, padded back to the last trading day.
    ///
    /// With no date, returns the most recent opening price.
    pub fn get_price(&self, symbol: &str, date: Option<NaiveDate>) -> CacheResult<f64> {
        let series = self.get_all(symbol)?;

        let record = match date {
            None => series.last(),
            Some(date) => {
                let record = series.at_or_before(date);
                if record.is_none() {
                    if let Some(first) = series.first_date() {
                        return Err(CacheError::DateOutOfRange {
                            symbol: symbol.to_string(),
                            date,
                            first,
                        });
                    }
                }
                record
            }
        };

        record
            .map(|r| r.open)
            .ok_or_else(|| CacheError::NoData(symbol.to_string()))
    }

    /// Cached symbols in sorted order.
    pub fn symbols(&self) -> Vec<&str> {
        self.data.keys().map(String::as_str).collect()
    }

    /// Whether `symbol` is cached.
    pub fn contains(&self, symbol: &str) -> bool {
        self.data.contains_key(symbol)
    }

    /// Number of cached symbols.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the cache holds no symbols.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Upper bound of "up to date": the day before construction.
    pub fn reference_date(&self) -> NaiveDate {
        self.today
    }

    /// First day fetched for new symbols.
    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// Get the price provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Get the snapshot store.
    pub fn store(&self) -> &S {
        &self.store
    }
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}
