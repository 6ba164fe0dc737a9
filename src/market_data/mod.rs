pub mod fetch_adapter;
pub mod raw_table;
pub mod series;
pub mod source;
pub mod validator;

// Re-export the core data types for convenient access (e.g. `use crate::market_data::Series`).
pub use fetch_adapter::{AnalyzedSeries, RetryingFetchAdapter};
pub use raw_table::{RawColumn, RawTable};
pub use series::{Bar, Series};
pub use source::MarketDataSource;
pub use validator::SeriesValidator;
