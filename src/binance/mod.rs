// =============================================================================
// Binance — public market data over REST
// =============================================================================

pub mod client;

pub use client::BinanceKlineSource;
