// =============================================================================
// Retrying Fetch Adapter
// =============================================================================
//
// Wraps a `MarketDataSource` with a bounded retry loop and warm-up trimming.
//
// State machine:
//
//   Fetching ──ok──▶ Validating ──ok──▶ Success
//      │                 │
//      └──err──┐   retryable err
//              ▼         ▼
//             Retrying ──(attempt < max, sleep backoff)──▶ Fetching
//                 │
//                 └──(attempt == max)──▶ ExhaustedFailure
//
// The backoff sleep is the only suspension point in a ticker pass and parks
// only the task that owns this ticker.
// =============================================================================

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::errors::DataError;
use crate::indicators::IndicatorSet;
use crate::runtime_config::{IndicatorParams, RetryPolicy};
use crate::signals::IndicatorSnapshot;
use crate::types::Interval;

use super::raw_table::RawTable;
use super::series::Series;
use super::source::MarketDataSource;
use super::validator::SeriesValidator;

/// A trimmed series together with its aligned indicator columns.
///
/// Every bar has defined RSI and Bollinger values.  Trimming can remove bars
/// from the middle of the series, so each kept bar also carries the close of
/// the bar that preceded it before trimming.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzedSeries {
    pub series: Series,
    pub indicators: IndicatorSet,
    /// Index of each kept bar in the fetched series.
    pub positions: Vec<usize>,
    /// Close of the bar immediately before each kept bar in the fetched
    /// series; `None` for the very first fetched bar.
    pub prev_closes: Vec<Option<f64>>,
}

impl AnalyzedSeries {
    /// Compute indicators over `series`, then drop the warm-up span.
    ///
    /// The leading `max(rsi_period, bb_window)` bars are removed, and any
    /// later bar whose RSI or Bollinger value is still undefined is dropped.
    pub fn from_series(series: Series, params: &IndicatorParams) -> Self {
        let indicators = IndicatorSet::compute(&series, params);
        let warmup = params.rsi_period.max(params.bb_window);

        let keep: Vec<usize> = (warmup..series.len())
            .filter(|&i| {
                indicators.rsi[i].is_some()
                    && indicators.bb_upper[i].is_some()
                    && indicators.bb_lower[i].is_some()
            })
            .collect();

        let prev_closes = keep
            .iter()
            .map(|&i| i.checked_sub(1).map(|p| series.bars()[p].close))
            .collect();

        Self {
            series: series.select(&keep),
            indicators: indicators.select(&keep),
            positions: keep,
            prev_closes,
        }
    }

    /// Whether the kept bars in `range` were also consecutive before trimming.
    pub fn is_contiguous(&self, range: std::ops::Range<usize>) -> bool {
        self.positions
            .get(range)
            .is_some_and(|p| p.windows(2).all(|w| w[1] == w[0] + 1))
    }

    /// Scoring inputs at `position`, with the untrimmed previous close.
    pub fn snapshot(&self, position: usize) -> Option<IndicatorSnapshot> {
        let mut snap = IndicatorSnapshot::at(&self.series, &self.indicators, position)?;
        snap.prev_close = self.prev_closes.get(position).copied().flatten();
        Some(snap)
    }

    /// Scoring inputs at the most recent bar.
    pub fn latest_snapshot(&self) -> Option<IndicatorSnapshot> {
        self.snapshot(self.series.len().checked_sub(1)?)
    }

    /// Fractional change of the last bar against the bar fetched right
    /// before it.
    pub fn last_change(&self) -> Option<f64> {
        let snap = self.latest_snapshot()?;
        let prev = snap.prev_close.filter(|&p| p != 0.0)?;
        Some((snap.close - prev) / prev)
    }
}

/// Where a fetch currently stands.
#[derive(Debug)]
enum FetchState {
    Fetching { attempt: u32 },
    Validating { attempt: u32, raw: RawTable },
    Retrying { attempt: u32, reason: String },
    Success(Series),
    ExhaustedFailure { attempts: u32 },
}

pub struct RetryingFetchAdapter {
    source: Arc<dyn MarketDataSource>,
    policy: RetryPolicy,
    params: IndicatorParams,
}

impl RetryingFetchAdapter {
    pub fn new(
        source: Arc<dyn MarketDataSource>,
        policy: RetryPolicy,
        params: IndicatorParams,
    ) -> Self {
        Self {
            source,
            policy,
            params,
        }
    }

    /// Fetch, validate and warm-up-trim the series for `symbol`.
    ///
    /// Returns [`DataError::ExhaustedRetries`] once `max_attempts`
    /// consecutive attempts have failed retryably.
    #[instrument(skip(self), name = "fetch_adapter::fetch")]
    pub async fn fetch(
        &self,
        symbol: &str,
        window: chrono::Duration,
        interval: Interval,
    ) -> Result<AnalyzedSeries, DataError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut state = FetchState::Fetching { attempt: 1 };

        loop {
            state = match state {
                FetchState::Fetching { attempt } => {
                    match self.source.get(symbol, window, interval).await {
                        Ok(raw) => FetchState::Validating { attempt, raw },
                        Err(e) => FetchState::Retrying {
                            attempt,
                            reason: e.to_string(),
                        },
                    }
                }

                FetchState::Validating { attempt, raw } => {
                    match SeriesValidator::normalize(symbol, &raw) {
                        Ok(series) => FetchState::Success(series),
                        Err(e) if e.is_retryable() => FetchState::Retrying {
                            attempt,
                            reason: e.to_string(),
                        },
                        Err(e) => return Err(e),
                    }
                }

                FetchState::Retrying { attempt, reason } => {
                    if attempt >= max_attempts {
                        FetchState::ExhaustedFailure { attempts: attempt }
                    } else {
                        warn!(
                            symbol,
                            attempt,
                            max_attempts,
                            reason = %reason,
                            backoff_ms = self.policy.backoff_ms,
                            "fetch attempt failed, retrying"
                        );
                        tokio::time::sleep(self.policy.backoff()).await;
                        FetchState::Fetching {
                            attempt: attempt + 1,
                        }
                    }
                }

                FetchState::Success(series) => {
                    let fetched = series.len();
                    let analyzed = AnalyzedSeries::from_series(series, &self.params);
                    debug!(
                        symbol,
                        fetched,
                        kept = analyzed.series.len(),
                        "series fetched and warm-up trimmed"
                    );
                    return Ok(analyzed);
                }

                FetchState::ExhaustedFailure { attempts } => {
                    info!(symbol, attempts, "giving up on symbol");
                    return Err(DataError::ExhaustedRetries(symbol.to_string()));
                }
            };
        }
    }
}
