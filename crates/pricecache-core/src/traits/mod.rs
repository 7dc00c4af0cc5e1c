//! Core traits for the price cache.

mod clock;
mod price_provider;
mod snapshot_store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use price_provider::PriceProvider;
pub use snapshot_store::SnapshotStore;
