//! Market data provider abstraction.
//!
//! [`MarketDataSource`] is the only thing the fetch adapter knows about a
//! provider.  Implementations handle their own wire format and hand back a
//! [`RawTable`]; column naming is left to the validator.

use async_trait::async_trait;

use crate::errors::SourceError;
use crate::types::Interval;

use super::raw_table::RawTable;

#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Fetch roughly `window` worth of `interval` bars for `symbol`.
    async fn get(
        &self,
        symbol: &str,
        window: chrono::Duration,
        interval: Interval,
    ) -> Result<RawTable, SourceError>;
}
