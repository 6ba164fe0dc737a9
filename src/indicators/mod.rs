// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the technical indicators used by
// the scoring engine.  Every column is aligned 1:1 with its input and uses
// `Option<f64>` so that insufficient history and degenerate denominators are
// explicit instead of leaking NaN into later comparisons.
//
// Columns are computed independently: a degenerate position in one column
// never affects another.

pub mod adx;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;

use serde::Serialize;

use crate::market_data::Series;
use crate::runtime_config::IndicatorParams;

/// Names of the columns in an [`IndicatorSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Indicator {
    Rsi,
    Sma20,
    Sma50,
    BbUpper,
    BbLower,
    Macd,
    Signal,
    Adx,
}

impl Indicator {
    pub const ALL: [Indicator; 8] = [
        Self::Rsi,
        Self::Sma20,
        Self::Sma50,
        Self::BbUpper,
        Self::BbLower,
        Self::Macd,
        Self::Signal,
        Self::Adx,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rsi => "rsi",
            Self::Sma20 => "sma20",
            Self::Sma50 => "sma50",
            Self::BbUpper => "bb_upper",
            Self::BbLower => "bb_lower",
            Self::Macd => "macd",
            Self::Signal => "signal",
            Self::Adx => "adx",
        }
    }
}

impl std::fmt::Display for Indicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-bar indicator values aligned with the series they were derived from.
///
/// `None` marks an undefined value.  It is never a stand-in for zero.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct IndicatorSet {
    pub rsi: Vec<Option<f64>>,
    pub sma20: Vec<Option<f64>>,
    pub sma50: Vec<Option<f64>>,
    pub bb_upper: Vec<Option<f64>>,
    pub bb_lower: Vec<Option<f64>>,
    pub macd: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
    pub adx: Vec<Option<f64>>,
}

impl IndicatorSet {
    /// Compute every column over `series` in one pass.
    pub fn compute(series: &Series, params: &IndicatorParams) -> Self {
        let closes = series.closes();
        let highs = series.highs();
        let lows = series.lows();

        let bands = bollinger::calculate_bollinger(&closes, params.bb_window, params.bb_num_std);
        let macd = macd::calculate_macd(
            &closes,
            params.macd_fast_span,
            params.macd_slow_span,
            params.macd_signal_span,
        );

        Self {
            rsi: rsi::calculate_rsi(&closes, params.rsi_period),
            sma20: sma::calculate_sma(&closes, params.sma_short_window),
            sma50: sma::calculate_sma(&closes, params.sma_long_window),
            bb_upper: bands.iter().map(|b| b.map(|b| b.upper)).collect(),
            bb_lower: bands.iter().map(|b| b.map(|b| b.lower)).collect(),
            macd: macd.macd,
            signal: macd.signal,
            adx: adx::calculate_adx(&highs, &lows, params.adx_period),
        }
    }

    /// Number of positions (equal to the source series length).
    pub fn len(&self) -> usize {
        self.rsi.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rsi.is_empty()
    }

    pub fn column(&self, indicator: Indicator) -> &[Option<f64>] {
        match indicator {
            Indicator::Rsi => &self.rsi,
            Indicator::Sma20 => &self.sma20,
            Indicator::Sma50 => &self.sma50,
            Indicator::BbUpper => &self.bb_upper,
            Indicator::BbLower => &self.bb_lower,
            Indicator::Macd => &self.macd,
            Indicator::Signal => &self.signal,
            Indicator::Adx => &self.adx,
        }
    }

    /// Value of `indicator` at `position`, `None` if undefined or out of range.
    pub fn value(&self, indicator: Indicator, position: usize) -> Option<f64> {
        self.column(indicator).get(position).copied().flatten()
    }

    /// Keep only `positions` in every column (mirrors [`Series::select`]).
    pub fn select(&self, positions: &[usize]) -> Self {
        let pick = |col: &[Option<f64>]| -> Vec<Option<f64>> {
            positions
                .iter()
                .filter_map(|&i| col.get(i).copied())
                .collect()
        };
        Self {
            rsi: pick(&self.rsi),
            sma20: pick(&self.sma20),
            sma50: pick(&self.sma50),
            bb_upper: pick(&self.bb_upper),
            bb_lower: pick(&self.bb_lower),
            macd: pick(&self.macd),
            signal: pick(&self.signal),
            adx: pick(&self.adx),
        }
    }
}
