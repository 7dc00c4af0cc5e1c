//! Price cache, snapshot storage and price providers.

mod cache;
mod csv_source;
mod snapshot;
mod yahoo;

pub use cache::{default_start_date, PriceCache, RefreshOutcome};
pub use csv_source::CsvPriceProvider;
pub use snapshot::{FileSnapshotStore, MemorySnapshotStore};
pub use yahoo::YahooPriceProvider;
