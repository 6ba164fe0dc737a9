// =============================================================================
// Runtime Configuration — every tunable of the scoring pipeline in one value
// =============================================================================
//
// Thresholds, indicator windows, retry counts and the watchlist all live here
// and are passed explicitly into each pipeline call; nothing is read from
// global state.
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash.  All fields carry `#[serde(default)]` so that adding new fields
// never breaks loading an older config file.
//
// =============================================================================

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::types::Interval;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_markets() -> BTreeMap<String, Vec<String>> {
    let mut markets = BTreeMap::new();
    markets.insert(
        "crypto".to_string(),
        vec![
            "BTCUSDT".to_string(),
            "ETHUSDT".to_string(),
            "SOLUSDT".to_string(),
        ],
    );
    markets.insert(
        "majors".to_string(),
        vec!["BNBUSDT".to_string(), "XRPUSDT".to_string()],
    );
    markets
}

fn default_lookback_days() -> u32 {
    180
}

fn default_worker_pool_size() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

fn default_rsi_period() -> usize {
    14
}

fn default_sma_short_window() -> usize {
    20
}

fn default_sma_long_window() -> usize {
    50
}

fn default_bb_window() -> usize {
    20
}

fn default_bb_num_std() -> f64 {
    2.0
}

fn default_macd_fast_span() -> usize {
    12
}

fn default_macd_slow_span() -> usize {
    26
}

fn default_macd_signal_span() -> usize {
    9
}

fn default_adx_period() -> usize {
    14
}

fn default_rsi_threshold() -> f64 {
    30.0
}

fn default_price_change_threshold() -> f64 {
    0.01
}

fn default_overbought_rsi() -> f64 {
    70.0
}

fn default_strong_buy_score() -> i32 {
    4
}

fn default_potential_buy_score() -> i32 {
    2
}

fn default_oversold_weight() -> i32 {
    2
}

fn default_unit_weight() -> i32 {
    1
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_ms() -> u64 {
    2_000
}

fn default_top_movers() -> usize {
    5
}

fn default_volume_alert_threshold() -> f64 {
    2.0
}

fn default_volume_window() -> usize {
    20
}

// =============================================================================
// IndicatorParams
// =============================================================================

/// Windows and spans for every indicator column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorParams {
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,

    /// Window of the `sma20` column.
    #[serde(default = "default_sma_short_window")]
    pub sma_short_window: usize,

    /// Window of the `sma50` column.
    #[serde(default = "default_sma_long_window")]
    pub sma_long_window: usize,

    #[serde(default = "default_bb_window")]
    pub bb_window: usize,

    /// Band half-width in sample standard deviations.
    #[serde(default = "default_bb_num_std")]
    pub bb_num_std: f64,

    #[serde(default = "default_macd_fast_span")]
    pub macd_fast_span: usize,

    #[serde(default = "default_macd_slow_span")]
    pub macd_slow_span: usize,

    #[serde(default = "default_macd_signal_span")]
    pub macd_signal_span: usize,

    #[serde(default = "default_adx_period")]
    pub adx_period: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            rsi_period: default_rsi_period(),
            sma_short_window: default_sma_short_window(),
            sma_long_window: default_sma_long_window(),
            bb_window: default_bb_window(),
            bb_num_std: default_bb_num_std(),
            macd_fast_span: default_macd_fast_span(),
            macd_slow_span: default_macd_slow_span(),
            macd_signal_span: default_macd_signal_span(),
            adx_period: default_adx_period(),
        }
    }
}

// =============================================================================
// ScoringConfig
// =============================================================================

/// Points awarded by each scoring condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    /// RSI below `rsi_threshold`.
    #[serde(default = "default_oversold_weight")]
    pub oversold_rsi: i32,

    /// Last-bar price change above `price_change_threshold`.
    #[serde(default = "default_unit_weight")]
    pub price_momentum: i32,

    /// MACD above its signal line.
    #[serde(default = "default_unit_weight")]
    pub macd_crossover: i32,

    /// Close below the lower Bollinger band.
    #[serde(default = "default_unit_weight")]
    pub below_lower_band: i32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            oversold_rsi: default_oversold_weight(),
            price_momentum: default_unit_weight(),
            macd_crossover: default_unit_weight(),
            below_lower_band: default_unit_weight(),
        }
    }
}

/// Thresholds that turn indicator values into a score and a tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_rsi_threshold")]
    pub rsi_threshold: f64,

    /// Fractional last-bar change (0.01 = 1 %).
    #[serde(default = "default_price_change_threshold")]
    pub price_change_threshold: f64,

    /// RSI above which an otherwise unremarkable ticker is Overbought.
    #[serde(default = "default_overbought_rsi")]
    pub overbought_rsi: f64,

    #[serde(default = "default_strong_buy_score")]
    pub strong_buy_score: i32,

    #[serde(default = "default_potential_buy_score")]
    pub potential_buy_score: i32,

    #[serde(default)]
    pub weights: ScoringWeights,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            rsi_threshold: default_rsi_threshold(),
            price_change_threshold: default_price_change_threshold(),
            overbought_rsi: default_overbought_rsi(),
            strong_buy_score: default_strong_buy_score(),
            potential_buy_score: default_potential_buy_score(),
            weights: ScoringWeights::default(),
        }
    }
}

// =============================================================================
// RetryPolicy
// =============================================================================

/// Bounded retry with a fixed pause between attempts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

impl RetryPolicy {
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

// =============================================================================
// InsightsConfig
// =============================================================================

/// Knobs for the dashboard-style summaries built from a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightsConfig {
    /// How many tickers to list as top movers.
    #[serde(default = "default_top_movers")]
    pub top_movers: usize,

    #[serde(default = "default_rsi_threshold")]
    pub oversold_rsi: f64,

    #[serde(default = "default_overbought_rsi")]
    pub overbought_rsi: f64,

    /// Latest volume must exceed this multiple of the trailing mean.
    #[serde(default = "default_volume_alert_threshold")]
    pub volume_alert_threshold: f64,

    /// Number of bars in the trailing volume mean.
    #[serde(default = "default_volume_window")]
    pub volume_window: usize,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            top_movers: default_top_movers(),
            oversold_rsi: default_rsi_threshold(),
            overbought_rsi: default_overbought_rsi(),
            volume_alert_threshold: default_volume_alert_threshold(),
            volume_window: default_volume_window(),
        }
    }
}

// =============================================================================
// RuntimeConfig
// =============================================================================

/// Top-level configuration for a screening run.
///
/// Every field has a serde default so that older JSON files missing new fields
/// will still deserialise correctly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    // --- Watchlist ----------------------------------------------------------

    /// Market type (e.g. "stocks", "crypto") => symbols screened for it.
    #[serde(default = "default_markets")]
    pub markets: BTreeMap<String, Vec<String>>,

    // --- Fetch window -------------------------------------------------------

    /// How far back to request bars.
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,

    #[serde(default)]
    pub interval: Interval,

    // --- Concurrency --------------------------------------------------------

    /// Maximum tickers processed at once.  Defaults to available parallelism.
    #[serde(default = "default_worker_pool_size")]
    pub worker_pool_size: usize,

    // --- Pipeline stages ----------------------------------------------------

    #[serde(default)]
    pub indicators: IndicatorParams,

    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default)]
    pub retry: RetryPolicy,

    #[serde(default)]
    pub insights: InsightsConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            markets: default_markets(),
            lookback_days: default_lookback_days(),
            interval: Interval::default(),
            worker_pool_size: default_worker_pool_size(),
            indicators: IndicatorParams::default(),
            scoring: ScoringConfig::default(),
            retry: RetryPolicy::default(),
            insights: InsightsConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runtime config from {}", path.display()))?;

        info!(
            path = %path.display(),
            symbols = config.symbols().len(),
            interval = %config.interval,
            "runtime config loaded"
        );

        Ok(config)
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise runtime config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "runtime config saved (atomic)");
        Ok(())
    }

    /// Every watched symbol, de-duplicated, in market order.
    pub fn symbols(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for symbol in self.markets.values().flatten() {
            if !out.contains(symbol) {
                out.push(symbol.clone());
            }
        }
        out
    }

    /// The fetch window as a duration.
    pub fn lookback(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.lookback_days))
    }
}
