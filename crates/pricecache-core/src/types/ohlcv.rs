//! Daily OHLCV (Open, High, Low, Close, Volume) price types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One trading day of prices for a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    /// Trading day
    pub date: NaiveDate,
    /// Opening price
    pub open: f64,
    /// Highest price
    pub high: f64,
    /// Lowest price
    pub low: f64,
    /// Closing price
    pub close: f64,
    /// Trading volume
    pub volume: f64,
    /// Split/dividend adjusted close (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adj_close: Option<f64>,
}

impl PriceRecord {
    /// Create a new record.
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
            adj_close: None,
        }
    }

    /// Create a new record with an adjusted close.
    pub fn with_adj_close(mut self, adj_close: f64) -> Self {
        self.adj_close = Some(adj_close);
        self
    }
}

/// Date-ordered daily price series for one symbol.
///
/// Dates are unique and strictly increasing. Every constructor and
/// [`PriceSeries::merge`] restores that ordering, so range and pad lookups
/// can binary search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<PriceRecord>", into = "Vec<PriceRecord>")]
pub struct PriceSeries {
    records: Vec<PriceRecord>,
}

/// Whole cache contents: symbol to series.
pub type Snapshot = BTreeMap<String, PriceSeries>;

impl PriceSeries {
    /// Create a new empty series.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of records.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the series is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Get all records as a slice, oldest first.
    pub fn records(&self) -> &[PriceRecord] {
        &self.records
    }

    /// Get the first record.
    pub fn first(&self) -> Option<&PriceRecord> {
        self.records.first()
    }

    /// Get the last record.
    pub fn last(&self) -> Option<&PriceRecord> {
        self.records.last()
    }

    /// Date of the oldest record.
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.first().map(|r| r.date)
    }

    /// Date of the newest record.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.last().map(|r| r.date)
    }

    /// Get the record for an exact date.
    pub fn get(&self, date: NaiveDate) -> Option<&PriceRecord> {
        self.records
            .binary_search_by_key(&date, |r| r.date)
            .ok()
            .map(|i| &self.records[i])
    }

    /// Get the record on `date`, or the closest one before it.
    pub fn at_or_before(&self, date: NaiveDate) -> Option<&PriceRecord> {
        let idx = self.records.partition_point(|r| r.date <= date);
        idx.checked_sub(1).map(|i| &self.records[i])
    }

    /// Records with dates in `[start, end]`, inclusive on both ends.
    pub fn range(&self, start: NaiveDate, end: NaiveDate) -> &[PriceRecord] {
        if start > end {
            return &[];
        }
        let lo = self.records.partition_point(|r| r.date < start);
        let hi = self.records.partition_point(|r| r.date <= end);
        &self.records[lo..hi]
    }

    /// Merge newer records into the series.
    ///
    /// An incoming record replaces a stored record with the same date.
    /// Returns the number of dates that were not present before.
    pub fn merge(&mut self, incoming: impl IntoIterator<Item = PriceRecord>) -> usize {
        let before = self.records.len();
        self.records.extend(incoming);
        self.records = normalize(std::mem::take(&mut self.records));
        self.records.len() - before
    }

    /// Extract open prices as a vector.
    pub fn opens(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.open).collect()
    }

    /// Get an iterator over the records.
    pub fn iter(&self) -> impl Iterator<Item = &PriceRecord> {
        self.records.iter()
    }
}

/// Sort by date and collapse duplicate dates, keeping the later entry.
fn normalize(mut records: Vec<PriceRecord>) -> Vec<PriceRecord> {
    // Stable sort keeps insertion order among equal dates.
    records.sort_by_key(|r| r.date);

    let mut out: Vec<PriceRecord> = Vec::with_capacity(records.len());
    for record in records {
        match out.last_mut() {
            Some(last) if last.date == record.date => *last = record,
            _ => out.push(record),
        }
    }
    out
}

impl From<Vec<PriceRecord>> for PriceSeries {
    fn from(records: Vec<PriceRecord>) -> Self {
        Self {
            records: normalize(records),
        }
    }
}

impl From<PriceSeries> for Vec<PriceRecord> {
    fn from(series: PriceSeries) -> Self {
        series.records
    }
}

impl FromIterator<PriceRecord> for PriceSeries {
    fn from_iter<T: IntoIterator<Item = PriceRecord>>(iter: T) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, d).unwrap()
    }

    fn rec(d: u32, open: f64) -> PriceRecord {
        PriceRecord::new(day(d), open, open + 1.0, open - 1.0, open + 0.5, 1000.0)
    }

    /// Jan 2020 trading days: 2, 3, 6, 7, 8, 9, 10.
    fn sample() -> PriceSeries {
        [2, 3, 6, 7, 8, 9, 10]
            .iter()
            .map(|&d| rec(d, d as f64))
            .collect()
    }

    #[test]
    fn test_from_unsorted_records() {
        let series: PriceSeries = vec![rec(6, 6.0), rec(2, 2.0), rec(3, 3.0)].into();

        assert_eq!(series.len(), 3);
        assert_eq!(series.first_date(), Some(day(2)));
        assert_eq!(series.last_date(), Some(day(6)));
    }

    #[test]
    fn test_duplicate_dates_keep_latest() {
        let series: PriceSeries = vec![rec(2, 2.0), rec(3, 3.0), rec(3, 30.0)].into();

        assert_eq!(series.len(), 2);
        assert_eq!(series.get(day(3)).unwrap().open, 30.0);
    }

    #[test]
    fn test_range_inclusive() {
        let series = sample();

        let slice = series.range(day(3), day(8));
        let dates: Vec<u32> = slice.iter().map(|r| chrono::Datelike::day(&r.date)).collect();
        assert_eq!(dates, vec![3, 6, 7, 8]);

        // Bounds that fall on non-trading days
        let slice = series.range(day(4), day(5));
        assert!(slice.is_empty());

        let slice = series.range(day(1), day(31));
        assert_eq!(slice.len(), series.len());

        assert!(series.range(day(9), day(3)).is_empty());
    }

    #[test]
    fn test_at_or_before_pads_to_prior_date() {
        let series = sample();

        assert_eq!(series.at_or_before(day(6)).unwrap().date, day(6));
        // Weekend resolves to Friday
        assert_eq!(series.at_or_before(day(5)).unwrap().date, day(3));
        assert_eq!(series.at_or_before(day(31)).unwrap().date, day(10));
        assert!(series.at_or_before(day(1)).is_none());
    }

    #[test]
    fn test_merge_replaces_overlapping_day() {
        let mut series: PriceSeries = vec![rec(2, 2.0), rec(3, 3.0)].into();

        let added = series.merge(vec![rec(3, 33.0), rec(6, 6.0), rec(7, 7.0)]);

        assert_eq!(added, 2);
        assert_eq!(series.len(), 4);
        assert_eq!(series.get(day(3)).unwrap().open, 33.0);
        assert_eq!(series.opens(), vec![2.0, 33.0, 6.0, 7.0]);
    }

    #[test]
    fn test_merge_empty_batch() {
        let mut series = sample();
        let before = series.clone();

        assert_eq!(series.merge(Vec::new()), 0);
        assert_eq!(series, before);
    }

    #[test]
    fn test_deserialize_restores_ordering() {
        let json = r#"[
            {"date":"2020-01-03","open":3.0,"high":4.0,"low":2.0,"close":3.5,"volume":10.0},
            {"date":"2020-01-02","open":2.0,"high":3.0,"low":1.0,"close":2.5,"volume":10.0,"adj_close":2.4}
        ]"#;
        let series: PriceSeries = serde_json::from_str(json).unwrap();

        assert_eq!(series.first_date(), Some(day(2)));
        assert_eq!(series.first().unwrap().adj_close, Some(2.4));
        assert_eq!(series.last().unwrap().adj_close, None);
    }
}
