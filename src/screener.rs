// =============================================================================
// Screener — per-ticker pipeline and bounded batch runner
// =============================================================================
//
// Evaluates each symbol independently and produces a TickerReport or a skip
// reason.
//
// Pipeline (per ticker):
//   1. Fetch with retry/backoff, validate, compute indicators, trim warm-up
//   2. Confirm the tail is scoreable (close, RSI, lower band)
//   3. Score the latest bar into a Recommendation
//   4. Pull sentiment (if a source is configured)
//   5. Merge tier + sentiment into the final Action
//
// Batch: one task per ticker, at most `worker_pool_size` in flight (semaphore).
// Outcomes land in a single mutex-guarded Vec.  Every error stays local to
// its ticker; the batch can be abandoned between tickers via the abort flag.
// =============================================================================

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::DataError;
use crate::indicators::Indicator;
use crate::market_data::{AnalyzedSeries, MarketDataSource, RetryingFetchAdapter, SeriesValidator};
use crate::runtime_config::RuntimeConfig;
use crate::sentiment::{SentimentReading, SentimentSource};
use crate::signals::{Recommendation, ScoringEngine, SignalAggregator};
use crate::types::{Action, Interval};

/// Columns whose last two values must be defined before scoring.
const REQUIRED_INDICATORS: [Indicator; 2] = [Indicator::Rsi, Indicator::BbLower];

// =============================================================================
// Reports
// =============================================================================

/// Everything the presentation layer receives for one scored ticker.
#[derive(Debug, Clone, Serialize)]
pub struct TickerReport {
    pub symbol: String,
    pub recommendation: Recommendation,
    pub action: Action,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<SentimentReading>,
    /// Series + indicators, for optional charting.
    pub analysis: AnalyzedSeries,
}

/// A ticker that produced no recommendation, and why.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedTicker {
    pub symbol: String,
    pub reason: DataError,
}

/// Result of one batch run, in input symbol order.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub reports: Vec<TickerReport>,
    pub skipped: Vec<SkippedTicker>,
    /// Requested symbols never started because the batch was aborted.
    pub not_started: Vec<String>,
}

/// How one requested symbol ended up.
enum Outcome {
    Scored(TickerReport),
    Skipped(SkippedTicker),
    NotStarted(String),
}

// =============================================================================
// Screener
// =============================================================================

pub struct Screener {
    fetcher: RetryingFetchAdapter,
    sentiment: Option<Arc<dyn SentimentSource>>,
    scoring: ScoringEngine,
    window: chrono::Duration,
    interval: Interval,
    pool_size: usize,
    abort: Arc<AtomicBool>,
}

impl Screener {
    pub fn new(source: Arc<dyn MarketDataSource>, config: &RuntimeConfig) -> Self {
        Self {
            fetcher: RetryingFetchAdapter::new(
                source,
                config.retry.clone(),
                config.indicators.clone(),
            ),
            sentiment: None,
            scoring: ScoringEngine::new(config.scoring.clone()),
            window: config.lookback(),
            interval: config.interval,
            pool_size: config.worker_pool_size.max(1),
            abort: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Attach a sentiment provider consulted after technical scoring.
    pub fn with_sentiment(mut self, source: Arc<dyn SentimentSource>) -> Self {
        self.sentiment = Some(source);
        self
    }

    /// Flag that, once set, stops the batch from starting further tickers.
    pub fn abort_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.abort)
    }

    /// Run the full pipeline for one symbol.
    pub async fn evaluate_symbol(&self, symbol: &str) -> Result<TickerReport, DataError> {
        // ── 1. Fetch, validate, compute, trim ──────────────────────────────
        let analysis = self.fetcher.fetch(symbol, self.window, self.interval).await?;

        // ── 2. Sufficiency ──────────────────────────────────────────────────
        SeriesValidator::check_sufficiency(
            &analysis.series,
            &analysis.indicators,
            &REQUIRED_INDICATORS,
        )?;
        let snapshot = analysis
            .latest_snapshot()
            .ok_or_else(|| DataError::insufficient(analysis.series.len(), Indicator::Rsi))?;

        // ── 3. Score ────────────────────────────────────────────────────────
        let recommendation = self.scoring.score(symbol, &snapshot);

        // ── 4. Sentiment ────────────────────────────────────────────────────
        let sentiment = match &self.sentiment {
            Some(source) => Some(
                source
                    .get(symbol)
                    .await
                    .map_err(|e| DataError::ExternalService(e.to_string()))?,
            ),
            None => None,
        };

        // ── 5. Merge ────────────────────────────────────────────────────────
        let action = SignalAggregator::merge(&recommendation, sentiment.as_ref());

        info!(
            symbol,
            score = recommendation.score(),
            tier = %recommendation.tier(),
            action = %action,
            sentiment = ?sentiment.as_ref().map(|s| s.label),
            "ticker evaluated"
        );

        Ok(TickerReport {
            symbol: symbol.to_string(),
            recommendation,
            action,
            sentiment,
            analysis,
        })
    }

    /// Evaluate `symbols` concurrently on a bounded pool.
    pub async fn run_batch(self: &Arc<Self>, symbols: &[String]) -> BatchReport {
        let id = Uuid::new_v4();
        let started_at = Utc::now();
        let total = symbols.len();
        info!(%id, total, pool_size = self.pool_size, "batch started");

        let semaphore = Arc::new(Semaphore::new(self.pool_size));
        let outcomes: Arc<Mutex<Vec<(usize, Outcome)>>> =
            Arc::new(Mutex::new(Vec::with_capacity(total)));

        let mut handles = Vec::with_capacity(total);
        for (idx, symbol) in symbols.iter().cloned().enumerate() {
            if self.abort.load(Ordering::SeqCst) {
                info!(remaining = total - idx, "abort requested, remaining tickers not started");
                outcomes.lock().extend(
                    symbols[idx..]
                        .iter()
                        .enumerate()
                        .map(|(offset, s)| (idx + offset, Outcome::NotStarted(s.clone()))),
                );
                break;
            }

            let screener = Arc::clone(self);
            let semaphore = Arc::clone(&semaphore);
            let outcomes = Arc::clone(&outcomes);

            handles.push(tokio::spawn(async move {
                let Ok(_permit) = semaphore.acquire().await else {
                    return;
                };
                if screener.abort.load(Ordering::SeqCst) {
                    debug!(symbol = %symbol, "abort requested, ticker not started");
                    outcomes.lock().push((idx, Outcome::NotStarted(symbol)));
                    return;
                }

                let outcome = match screener.evaluate_symbol(&symbol).await {
                    Ok(report) => Outcome::Scored(report),
                    Err(reason) => {
                        warn!(symbol = %symbol, reason = %reason, "ticker skipped");
                        Outcome::Skipped(SkippedTicker { symbol, reason })
                    }
                };
                outcomes.lock().push((idx, outcome));
            }));
        }

        for joined in futures_util::future::join_all(handles).await {
            if let Err(e) = joined {
                warn!(error = %e, "ticker task panicked or was cancelled");
            }
        }

        let mut collected = std::mem::take(&mut *outcomes.lock());
        collected.sort_by_key(|(idx, _)| *idx);

        let mut reports = Vec::new();
        let mut skipped = Vec::new();
        let mut not_started = Vec::new();
        for (_, outcome) in collected {
            match outcome {
                Outcome::Scored(report) => reports.push(report),
                Outcome::Skipped(skip) => skipped.push(skip),
                Outcome::NotStarted(symbol) => not_started.push(symbol),
            }
        }

        info!(
            %id,
            scored = reports.len(),
            skipped = skipped.len(),
            not_started = not_started.len(),
            "batch finished"
        );

        BatchReport {
            id,
            started_at,
            reports,
            skipped,
            not_started,
        }
    }
}
