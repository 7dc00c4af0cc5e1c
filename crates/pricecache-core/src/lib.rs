//! Core types and traits for the price cache.
//!
//! This crate provides the foundational building blocks including:
//! - Daily price types (PriceRecord, PriceSeries)
//! - Error types shared across the workspace
//! - Seams for price providers, snapshot stores and the calendar clock

pub mod types;
pub mod traits;
pub mod error;

pub use error::{CacheError, CacheResult, ProviderError, SnapshotError};
pub use types::*;
pub use traits::*;
