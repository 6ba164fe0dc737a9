// =============================================================================
// Series Validator — schema normalization and sufficiency checks
// =============================================================================
//
// `normalize` is the single boundary where loosely-named provider columns are
// mapped onto the canonical `Bar` fields.  Nothing downstream ever searches for
// "a column containing close" again.
//
// Row policy:
//   - rows with an undefined close are dropped;
//   - undefined open/high/low fall back to that row's close;
//   - volume stays optional.
// =============================================================================

use tracing::debug;

use crate::errors::DataError;
use crate::indicators::{Indicator, IndicatorSet};

use super::raw_table::{RawColumn, RawTable};
use super::series::{Bar, Series};

/// Minimum number of trailing bars that must be fully defined to score.
const SCORING_TAIL: usize = 2;

pub struct SeriesValidator;

impl SeriesValidator {
    /// Map a raw provider table onto a strongly-typed [`Series`].
    ///
    /// Never mutates `raw`.  Normalizing the raw form of an already
    /// normalized series yields the same series.
    pub fn normalize(symbol: &str, raw: &RawTable) -> Result<Series, DataError> {
        if raw.is_empty() {
            return Err(DataError::AllValuesMissing);
        }

        let close = raw.find_column("close").ok_or(DataError::NoCloseColumn)?;
        let open = raw.find_column("open");
        let high = raw.find_column("high");
        let low = raw.find_column("low");
        let volume = raw.find_column("volume");

        let mut bars = Vec::with_capacity(raw.len());
        for (row, &timestamp) in raw.index().iter().enumerate() {
            let Some(c) = cell(Some(close), row) else {
                continue;
            };
            bars.push(Bar {
                timestamp,
                open: cell(open, row).unwrap_or(c),
                high: cell(high, row).unwrap_or(c),
                low: cell(low, row).unwrap_or(c),
                close: c,
                volume: cell(volume, row),
            });
        }

        if bars.is_empty() {
            return Err(DataError::AllValuesMissing);
        }

        let dropped = raw.len() - bars.len();
        if dropped > 0 {
            debug!(symbol, dropped, "dropped rows with undefined close");
        }

        Ok(Series::new(symbol, bars))
    }

    /// Confirm the tail of `series` can be scored on.
    ///
    /// Requires at least two bars, and the last two values of every
    /// `required` indicator column to be defined.  A failure here means the
    /// ticker should be skipped, not that the batch should stop.
    pub fn check_sufficiency(
        series: &Series,
        indicators: &IndicatorSet,
        required: &[Indicator],
    ) -> Result<(), DataError> {
        let bars = series.len();
        if bars < SCORING_TAIL || indicators.len() != bars {
            return Err(DataError::InsufficientHistory {
                bars,
                column: "close".to_string(),
            });
        }

        for &indicator in required {
            let tail = &indicators.column(indicator)[bars - SCORING_TAIL..];
            if tail.iter().any(Option::is_none) {
                return Err(DataError::insufficient(bars, indicator));
            }
        }

        Ok(())
    }
}

/// A finite value from `column` at `row`, or `None`.
fn cell(column: Option<&RawColumn>, row: usize) -> Option<f64> {
    column?
        .values
        .get(row)
        .copied()
        .flatten()
        .filter(|v| v.is_finite())
}
