// =============================================================================
// Insights — batch-level summaries for the dashboard
// =============================================================================
//
// Pure functions over the TickerReports of one batch:
//   - top movers by last-bar change, per market type
//   - mean last-bar change per market type
//   - per-ticker alerts (RSI extremes, SMA20/50 cross, volume spike)
//   - BUY symbols grouped by market type
//
// Nothing here fetches or scores; it only reads what the screener produced.
// =============================================================================

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::runtime_config::InsightsConfig;
use crate::screener::{BatchReport, TickerReport};
use crate::types::Action;

// =============================================================================
// Movers & performance
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mover {
    pub symbol: String,
    /// Fractional change of the last bar against the one before it.
    pub change: f64,
}

/// Per market type, its tickers ranked by last-bar change, largest first,
/// at most `n` each.
pub fn top_movers(
    reports: &[TickerReport],
    markets: &BTreeMap<String, Vec<String>>,
    n: usize,
) -> BTreeMap<String, Vec<Mover>> {
    markets
        .iter()
        .map(|(market, symbols)| {
            let mut movers: Vec<Mover> = reports
                .iter()
                .filter(|r| symbols.contains(&r.symbol))
                .filter_map(|r| {
                    Some(Mover {
                        symbol: r.symbol.clone(),
                        change: r.analysis.last_change()?,
                    })
                })
                .collect();
            movers.sort_by(|a, b| b.change.total_cmp(&a.change));
            movers.truncate(n);
            (market.clone(), movers)
        })
        .collect()
}

/// Mean last-bar change per market type.  Markets with no scored ticker are
/// left out.
pub fn market_performance(
    reports: &[TickerReport],
    markets: &BTreeMap<String, Vec<String>>,
) -> BTreeMap<String, f64> {
    let mut out = BTreeMap::new();
    for (market, symbols) in markets {
        let changes: Vec<f64> = reports
            .iter()
            .filter(|r| symbols.contains(&r.symbol))
            .filter_map(|r| r.analysis.last_change())
            .collect();
        if !changes.is_empty() {
            out.insert(market.clone(), changes.iter().sum::<f64>() / changes.len() as f64);
        }
    }
    out
}

/// Symbols whose final action is BUY, grouped by market type.
pub fn recommended_by_market(
    reports: &[TickerReport],
    markets: &BTreeMap<String, Vec<String>>,
) -> BTreeMap<String, Vec<String>> {
    markets
        .iter()
        .map(|(market, symbols)| {
            let buys = reports
                .iter()
                .filter(|r| r.action == Action::Buy && symbols.contains(&r.symbol))
                .map(|r| r.symbol.clone())
                .collect();
            (market.clone(), buys)
        })
        .collect()
}

// =============================================================================
// Alerts
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReversalDirection {
    Bullish,
    Bearish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AlertKind {
    Overbought,
    Oversold,
    TrendReversal(ReversalDirection),
    VolumeSpike,
}

impl AlertKind {
    /// Heading the alert is listed under.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Overbought | Self::Oversold => "Overbought/Oversold",
            Self::TrendReversal(_) => "Trend Reversal",
            Self::VolumeSpike => "Volume Spike",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub symbol: String,
    pub kind: AlertKind,
    pub detail: String,
}

impl std::fmt::Display for Alert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.symbol, self.detail)
    }
}

/// Alerts raised by the latest bars of one ticker.
///
/// The SMA cross and volume checks only compare bars that were consecutive
/// in the fetched series.
pub fn advanced_alerts(report: &TickerReport, cfg: &InsightsConfig) -> Vec<Alert> {
    let analysis = &report.analysis;
    let series = &analysis.series;
    let ind = &analysis.indicators;
    let mut alerts = Vec::new();
    let alert = |kind, detail: String| Alert {
        symbol: report.symbol.clone(),
        kind,
        detail,
    };

    let Some(last) = series.len().checked_sub(1) else {
        return alerts;
    };

    // ── RSI extremes ────────────────────────────────────────────────────
    if let Some(rsi) = ind.rsi.get(last).copied().flatten() {
        if rsi > cfg.overbought_rsi {
            alerts.push(alert(AlertKind::Overbought, format!("Overbought (RSI {rsi:.1})")));
        } else if rsi < cfg.oversold_rsi {
            alerts.push(alert(AlertKind::Oversold, format!("Oversold (RSI {rsi:.1})")));
        }
    }

    // ── SMA20 / SMA50 cross ─────────────────────────────────────────────
    if let Some(prev) = last.checked_sub(1).filter(|&p| analysis.is_contiguous(p..last + 1)) {
        let pair = |pos: usize| Some((ind.sma20.get(pos).copied()??, ind.sma50.get(pos).copied()??));
        if let (Some((s_prev, l_prev)), Some((s_now, l_now))) = (pair(prev), pair(last)) {
            if s_prev <= l_prev && s_now > l_now {
                alerts.push(alert(
                    AlertKind::TrendReversal(ReversalDirection::Bullish),
                    "Bullish Reversal".to_string(),
                ));
            } else if s_prev >= l_prev && s_now < l_now {
                alerts.push(alert(
                    AlertKind::TrendReversal(ReversalDirection::Bearish),
                    "Bearish Reversal".to_string(),
                ));
            }
        }
    }

    // ── Volume spike ────────────────────────────────────────────────────
    if cfg.volume_window > 0
        && last >= cfg.volume_window
        && analysis.is_contiguous(last - cfg.volume_window..last + 1)
    {
        let bars = series.bars();
        let window: Option<Vec<f64>> = bars[last - cfg.volume_window..last]
            .iter()
            .map(|b| b.volume)
            .collect();
        if let (Some(window), Some(latest)) = (window, bars[last].volume) {
            let mean = window.iter().sum::<f64>() / window.len() as f64;
            if mean > 0.0 && latest > cfg.volume_alert_threshold * mean {
                alerts.push(alert(
                    AlertKind::VolumeSpike,
                    format!("Volume Spike ({:.1}x average)", latest / mean),
                ));
            }
        }
    }

    alerts
}

// =============================================================================
// Report
// =============================================================================

/// Everything the dashboard shows for one batch.
#[derive(Debug, Clone, Serialize)]
pub struct InsightsReport {
    pub batch_id: Uuid,
    pub generated_at: DateTime<Utc>,
    /// Market type => its top movers.
    pub top_movers: BTreeMap<String, Vec<Mover>>,
    pub market_performance: BTreeMap<String, f64>,
    /// Alert category => alerts, in batch order.
    pub alerts: BTreeMap<String, Vec<Alert>>,
    pub recommended: BTreeMap<String, Vec<String>>,
}

impl InsightsReport {
    pub fn build(
        batch: &BatchReport,
        markets: &BTreeMap<String, Vec<String>>,
        cfg: &InsightsConfig,
    ) -> Self {
        let mut alerts: BTreeMap<String, Vec<Alert>> = BTreeMap::new();
        for alert in batch.reports.iter().flat_map(|r| advanced_alerts(r, cfg)) {
            alerts
                .entry(alert.kind.category().to_string())
                .or_default()
                .push(alert);
        }

        Self {
            batch_id: batch.id,
            generated_at: Utc::now(),
            top_movers: top_movers(&batch.reports, markets, cfg.top_movers),
            market_performance: market_performance(&batch.reports, markets),
            alerts,
            recommended: recommended_by_market(&batch.reports, markets),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::IndicatorSet;
    use crate::market_data::{AnalyzedSeries, Bar, Series};
    use crate::signals::ScoringEngine;
    use chrono::TimeZone;

    fn bars(closes: &[f64], volumes: &[f64]) -> Vec<Bar> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        closes
            .iter()
            .zip(volumes)
            .enumerate()
            .map(|(i, (&c, &v))| Bar {
                volume: Some(v),
                ..Bar::flat(start + chrono::Duration::days(i as i64), c)
            })
            .collect()
    }

    fn report_with(symbol: &str, series: Series, indicators: IndicatorSet, action: Action) -> TickerReport {
        let prev_closes = std::iter::once(None)
            .chain(series.bars().iter().map(|b| Some(b.close)))
            .take(series.len())
            .collect();
        let analysis = AnalyzedSeries {
            positions: (0..series.len()).collect(),
            series,
            indicators,
            prev_closes,
        };
        let snap = analysis.latest_snapshot().unwrap_or_default();
        TickerReport {
            symbol: symbol.into(),
            recommendation: ScoringEngine::default().score(symbol, &snap),
            action,
            sentiment: None,
            analysis,
        }
    }

    fn closes_report(symbol: &str, closes: &[f64], action: Action) -> TickerReport {
        let series = Series::from_closes(symbol, closes);
        let n = series.len();
        let indicators = IndicatorSet {
            rsi: vec![Some(50.0); n],
            sma20: vec![None; n],
            sma50: vec![None; n],
            bb_upper: vec![None; n],
            bb_lower: vec![None; n],
            macd: vec![None; n],
            signal: vec![None; n],
            adx: vec![None; n],
        };
        report_with(symbol, series, indicators, action)
    }

    fn markets() -> BTreeMap<String, Vec<String>> {
        BTreeMap::from([
            ("crypto".to_string(), vec!["BTC".to_string(), "ETH".to_string()]),
            ("stocks".to_string(), vec!["AAPL".to_string()]),
            ("commodities".to_string(), vec!["GOLD".to_string()]),
        ])
    }

    #[test]
    fn movers_are_ranked_and_capped_per_market() {
        let mut markets = markets();
        markets.insert("crypto".into(), vec!["BTC".into(), "ETH".into(), "SOL".into()]);
        let reports = vec![
            closes_report("BTC", &[100.0, 108.0], Action::Buy),
            closes_report("ETH", &[100.0, 95.0], Action::Hold),
            closes_report("SOL", &[100.0, 112.0], Action::Buy),
            closes_report("AAPL", &[100.0, 105.0], Action::Buy),
        ];
        let movers = top_movers(&reports, &markets, 2);

        let crypto: Vec<&str> = movers["crypto"].iter().map(|m| m.symbol.as_str()).collect();
        assert_eq!(crypto, vec!["SOL", "BTC"]);
        assert!((movers["crypto"][1].change - 0.08).abs() < 1e-12);

        assert_eq!(movers["stocks"].len(), 1);
        assert_eq!(movers["stocks"][0].symbol, "AAPL");
        assert!(movers["commodities"].is_empty());
    }

    #[test]
    fn performance_averages_per_market() {
        let reports = vec![
            closes_report("BTC", &[100.0, 110.0], Action::Buy),
            closes_report("ETH", &[100.0, 90.0], Action::Hold),
            closes_report("AAPL", &[100.0, 103.0], Action::Hold),
        ];
        let perf = market_performance(&reports, &markets());
        assert!(perf["crypto"].abs() < 1e-12);
        assert!((perf["stocks"] - 0.03).abs() < 1e-12);
        assert!(!perf.contains_key("commodities"));

        let recommended = recommended_by_market(&reports, &markets());
        assert_eq!(recommended["crypto"], vec!["BTC".to_string()]);
        assert!(recommended["stocks"].is_empty());
    }

    #[test]
    fn rsi_extremes_raise_alerts() {
        let mut report = closes_report("BTC", &[100.0, 101.0], Action::Hold);
        report.analysis.indicators.rsi = vec![Some(50.0), Some(78.0)];
        let alerts = advanced_alerts(&report, &InsightsConfig::default());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::Overbought);
        assert_eq!(alerts[0].to_string(), "BTC - Overbought (RSI 78.0)");

        report.analysis.indicators.rsi = vec![Some(50.0), Some(22.0)];
        let alerts = advanced_alerts(&report, &InsightsConfig::default());
        assert_eq!(alerts[0].kind, AlertKind::Oversold);
        assert_eq!(alerts[0].kind.category(), "Overbought/Oversold");
    }

    #[test]
    fn sma_cross_is_a_trend_reversal() {
        let mut report = closes_report("AAPL", &[100.0, 101.0], Action::Hold);
        report.analysis.indicators.sma20 = vec![Some(99.0), Some(101.0)];
        report.analysis.indicators.sma50 = vec![Some(100.0), Some(100.0)];
        let alerts = advanced_alerts(&report, &InsightsConfig::default());
        assert_eq!(
            alerts,
            vec![Alert {
                symbol: "AAPL".into(),
                kind: AlertKind::TrendReversal(ReversalDirection::Bullish),
                detail: "Bullish Reversal".into(),
            }]
        );

        report.analysis.indicators.sma20 = vec![Some(101.0), Some(99.0)];
        let alerts = advanced_alerts(&report, &InsightsConfig::default());
        assert_eq!(alerts[0].kind, AlertKind::TrendReversal(ReversalDirection::Bearish));

        // Bars that were not neighbours before trimming never form a cross.
        report.analysis.positions = vec![10, 14];
        assert!(advanced_alerts(&report, &InsightsConfig::default()).is_empty());
        report.analysis.positions = vec![13, 14];

        // Undefined SMA50 never alerts.
        report.analysis.indicators.sma50 = vec![None, Some(100.0)];
        assert!(advanced_alerts(&report, &InsightsConfig::default()).is_empty());
    }

    #[test]
    fn volume_spike_against_trailing_mean() {
        let closes = vec![100.0; 6];
        let mut volumes = vec![1000.0; 5];
        volumes.push(2500.0);
        let series = Series::new("BTC", bars(&closes, &volumes));
        let indicators = IndicatorSet {
            rsi: vec![Some(50.0); 6],
            ..IndicatorSet::default()
        };
        let report = report_with("BTC", series, indicators, Action::Hold);
        let cfg = InsightsConfig {
            volume_window: 5,
            ..InsightsConfig::default()
        };

        let alerts = advanced_alerts(&report, &cfg);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::VolumeSpike);
        assert_eq!(alerts[0].detail, "Volume Spike (2.5x average)");

        let mut gapped = report.clone();
        gapped.analysis.positions = vec![0, 1, 2, 3, 9, 10];
        assert!(advanced_alerts(&gapped, &cfg).is_empty());

        let strict = InsightsConfig {
            volume_alert_threshold: 3.0,
            ..cfg
        };
        assert!(advanced_alerts(&report, &strict).is_empty());
    }

    #[test]
    fn report_groups_alerts_by_category() {
        let mut hot = closes_report("BTC", &[100.0, 110.0], Action::Buy);
        hot.analysis.indicators.rsi = vec![Some(60.0), Some(80.0)];
        let batch = BatchReport {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            reports: vec![hot, closes_report("AAPL", &[100.0, 99.0], Action::Hold)],
            skipped: Vec::new(),
            not_started: Vec::new(),
        };

        let insights = InsightsReport::build(&batch, &markets(), &InsightsConfig::default());
        assert_eq!(insights.batch_id, batch.id);
        assert_eq!(insights.top_movers["crypto"][0].symbol, "BTC");
        assert_eq!(insights.top_movers["stocks"][0].symbol, "AAPL");
        assert_eq!(insights.alerts["Overbought/Oversold"].len(), 1);
        assert!(!insights.alerts.contains_key("Trend Reversal"));
        assert_eq!(insights.recommended["crypto"], vec!["BTC".to_string()]);
    }
}
