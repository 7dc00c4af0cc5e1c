//! Core data types for the price cache.

mod ohlcv;

pub use ohlcv::{PriceRecord, PriceSeries, Snapshot};
