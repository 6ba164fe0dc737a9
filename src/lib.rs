// =============================================================================
// signal-scout — technical indicator screening and recommendation scoring
// =============================================================================
//
// Fetches OHLCV history per ticker, computes indicators, scores the latest
// bar into a recommendation tier, merges optional sentiment into a final
// action, and summarises a batch for a dashboard.
// =============================================================================

pub mod binance;
pub mod errors;
pub mod indicators;
pub mod insights;
pub mod market_data;
pub mod runtime_config;
pub mod screener;
pub mod sentiment;
pub mod signals;
pub mod types;

pub use errors::{DataError, SourceError};
pub use insights::InsightsReport;
pub use runtime_config::RuntimeConfig;
pub use screener::{BatchReport, Screener, SkippedTicker, TickerReport};
pub use types::{Action, Interval, Tier};
