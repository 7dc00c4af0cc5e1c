//! Price provider trait definition.

use crate::error::ProviderError;
use crate::types::PriceRecord;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Trait for historical daily price sources.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Fetch daily records.
    ///
    /// # Arguments
    /// * `symbol` - The symbol to fetch
    /// * `start` - First day of the range (inclusive)
    /// * `end` - Last day of the range (inclusive)
    ///
    /// # Returns
    /// Records ordered from oldest to newest. Empty when the range holds no
    /// trading days.
    async fn fetch_daily(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceRecord>, ProviderError>;

    /// Get the provider name.
    fn name(&self) -> &str;
}

#[async_trait]
impl<P: PriceProvider + ?Sized> PriceProvider for Box<P> {
    async fn fetch_daily(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceRecord>, ProviderError> {
        (**self).fetch_daily(symbol, start, end).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
