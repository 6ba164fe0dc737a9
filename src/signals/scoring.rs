// =============================================================================
// Scoring Engine — additive integer score + tier resolution
// =============================================================================
//
// Conditions (independent, additive; an undefined input contributes nothing
// and never appears in the rationale):
//
//   1. RSI < rsi_threshold                       +oversold_rsi      (2)
//   2. (close - prev) / prev > change_threshold  +price_momentum    (1)
//   3. MACD > Signal                             +macd_crossover    (1)
//   4. close < lower Bollinger band              +below_lower_band  (1)
//
// Tier (first match wins):
//   score >= strong_buy_score     => StrongBuy
//   score >= potential_buy_score  => PotentialBuy
//   RSI defined and > overbought  => Overbought
//   otherwise                     => Hold
// =============================================================================

use serde::Serialize;
use tracing::debug;

use crate::indicators::{Indicator, IndicatorSet};
use crate::market_data::Series;
use crate::runtime_config::ScoringConfig;
use crate::types::Tier;

/// Everything the scorer reads at one bar.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct IndicatorSnapshot {
    pub close: f64,
    pub prev_close: Option<f64>,
    pub rsi: Option<f64>,
    pub sma20: Option<f64>,
    pub sma50: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_lower: Option<f64>,
    pub macd: Option<f64>,
    pub signal: Option<f64>,
    pub adx: Option<f64>,
}

impl IndicatorSnapshot {
    /// Snapshot of `series`/`indicators` at `position`.
    ///
    /// `prev_close` is the neighbouring bar in `series`; for a warm-up-trimmed
    /// series use `AnalyzedSeries::snapshot` instead.
    pub fn at(series: &Series, indicators: &IndicatorSet, position: usize) -> Option<Self> {
        let bar = series.bars().get(position)?;
        let prev_close = position
            .checked_sub(1)
            .and_then(|p| series.bars().get(p))
            .map(|b| b.close);

        Some(Self {
            close: bar.close,
            prev_close,
            rsi: indicators.value(Indicator::Rsi, position),
            sma20: indicators.value(Indicator::Sma20, position),
            sma50: indicators.value(Indicator::Sma50, position),
            bb_upper: indicators.value(Indicator::BbUpper, position),
            bb_lower: indicators.value(Indicator::BbLower, position),
            macd: indicators.value(Indicator::Macd, position),
            signal: indicators.value(Indicator::Signal, position),
            adx: indicators.value(Indicator::Adx, position),
        })
    }

    /// Fractional change from the previous close; 0 when it is missing or zero.
    pub fn price_change(&self) -> f64 {
        match self.prev_close {
            Some(prev) if prev != 0.0 => (self.close - prev) / prev,
            _ => 0.0,
        }
    }
}

/// Outcome of one scoring pass.  Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    ticker: String,
    score: i32,
    tier: Tier,
    rationale: Vec<String>,
}

impl Recommendation {
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// Human-readable evidence, in evaluation order.
    pub fn rationale(&self) -> &[String] {
        &self.rationale
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score one snapshot.
    pub fn score(&self, ticker: &str, snap: &IndicatorSnapshot) -> Recommendation {
        let cfg = &self.config;
        let weights = &cfg.weights;
        let mut score = 0;
        let mut rationale = Vec::new();

        if let Some(rsi) = snap.rsi.filter(|&r| r < cfg.rsi_threshold) {
            score += weights.oversold_rsi;
            rationale.push(format!("RSI {rsi:.1} below threshold {}", cfg.rsi_threshold));
        }

        let change = snap.price_change();
        if change > cfg.price_change_threshold {
            score += weights.price_momentum;
            rationale.push(format!(
                "Price change {:.2}% above threshold {:.2}%",
                change * 100.0,
                cfg.price_change_threshold * 100.0
            ));
        }

        if let (Some(macd), Some(signal)) = (snap.macd, snap.signal) {
            if macd > signal {
                score += weights.macd_crossover;
                rationale.push(format!("MACD {macd:.3} above signal {signal:.3}"));
            }
        }

        if let Some(lower) = snap.bb_lower.filter(|&l| snap.close < l) {
            score += weights.below_lower_band;
            rationale.push(format!(
                "Close {:.2} below lower Bollinger band {lower:.2}",
                snap.close
            ));
        }

        let tier = self.resolve_tier(score, snap.rsi);
        debug!(ticker, score, tier = %tier, "ticker scored");

        Recommendation {
            ticker: ticker.to_string(),
            score,
            tier,
            rationale,
        }
    }

    /// Tier as a pure function of score and raw RSI.
    pub fn resolve_tier(&self, score: i32, rsi: Option<f64>) -> Tier {
        if score >= self.config.strong_buy_score {
            Tier::StrongBuy
        } else if score >= self.config.potential_buy_score {
            Tier::PotentialBuy
        } else if rsi.is_some_and(|r| r > self.config.overbought_rsi) {
            Tier::Overbought
        } else {
            Tier::Hold
        }
    }
}
