//! Local on-disk cache for daily stock price series.
//!
//! Wires the workspace crates together: configuration picks the price
//! provider and snapshot file, and [`open_cache`] restores a ready
//! [`PriceCache`] from them.

use thiserror::Error;
use tracing::info;

pub use pricecache_config::{
    load_config, AppConfig, CacheSettings, LoggingConfig, ProviderKind, ProviderSettings,
    SettingsError,
};
pub use pricecache_core::{
    CacheError, CacheResult, Clock, FixedClock, PriceProvider, PriceRecord, PriceSeries,
    ProviderError, Snapshot, SnapshotError, SnapshotStore, SystemClock,
};
pub use pricecache_data::{
    default_start_date, CsvPriceProvider, FileSnapshotStore, MemorySnapshotStore, PriceCache,
    RefreshOutcome, YahooPriceProvider,
};
pub use pricecache_monitor::setup_logging;

/// Cache assembled from an [`AppConfig`].
pub type ConfiguredCache<C = SystemClock> = PriceCache<Box<dyn PriceProvider>, FileSnapshotStore, C>;

/// Errors while assembling a cache from configuration.
#[derive(Error, Debug)]
pub enum OpenError {
    #[error(transparent)]
    Config(#[from] SettingsError),

    #[error("Price provider unavailable: {0}")]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Open the configured cache on the system clock.
pub fn open_cache(config: &AppConfig) -> Result<ConfiguredCache, OpenError> {
    open_cache_with_clock(config, SystemClock)
}

/// Open the configured cache on the given clock.
pub fn open_cache_with_clock<C: Clock>(
    config: &AppConfig,
    clock: C,
) -> Result<ConfiguredCache<C>, OpenError> {
    config.validate()?;

    let provider = build_provider(&config.provider)?;
    let store = FileSnapshotStore::new(&config.cache.snapshot_path);

    info!(
        provider = provider.name(),
        snapshot = %config.cache.snapshot_path.display(),
        start_date = %config.cache.start_date,
        "Opening price cache"
    );

    let cache = PriceCache::with_clock(provider, store, clock)?
        .with_start_date(config.cache.start_date);
    Ok(cache)
}

/// Create the price provider named by the settings.
pub fn build_provider(settings: &ProviderSettings) -> Result<Box<dyn PriceProvider>, OpenError> {
    match settings.kind {
        ProviderKind::Yahoo => Ok(Box::new(YahooPriceProvider::new()?)),
        ProviderKind::Csv => {
            let dir = settings.csv_dir.as_ref().ok_or_else(|| {
                SettingsError::Invalid("provider.csv_dir is not set".to_string())
            })?;
            Ok(Box::new(CsvPriceProvider::new(dir)?))
        }
    }
}
