// =============================================================================
// Bar / Series — strongly-typed price history for one symbol
// =============================================================================
//
// A `Series` is the only shape the indicator and scoring layers ever see.
// Construction sorts bars by timestamp and collapses duplicate timestamps
// (last write wins), so every `Series` is strictly increasing in time.
// =============================================================================

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::raw_table::RawTable;

/// One OHLCV sample.  Volume is optional; some sources omit it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<f64>,
}

impl Bar {
    /// A bar whose open/high/low all equal `close`.
    pub fn flat(timestamp: DateTime<Utc>, close: f64) -> Self {
        Self {
            timestamp,
            open: close,
            high: close,
            low: close,
            close,
            volume: None,
        }
    }
}

/// Ordered bars for a single symbol, strictly increasing in timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    symbol: String,
    bars: Vec<Bar>,
}

impl Series {
    /// Build a series from bars in any order.
    ///
    /// Bars are sorted by timestamp; when two bars share a timestamp the one
    /// appearing later in `bars` wins.
    pub fn new(symbol: impl Into<String>, mut bars: Vec<Bar>) -> Self {
        // Stable sort keeps input order among equal timestamps, so the last
        // duplicate is the one we keep below.
        bars.sort_by_key(|b| b.timestamp);

        let mut deduped: Vec<Bar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(last) if last.timestamp == bar.timestamp => *last = bar,
                _ => deduped.push(bar),
            }
        }

        Self {
            symbol: symbol.into(),
            bars: deduped,
        }
    }

    /// Convenience constructor: one flat daily bar per close, starting at
    /// 2024-01-01 UTC.
    pub fn from_closes(symbol: impl Into<String>, closes: &[f64]) -> Self {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap_or_default();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar::flat(start + Duration::days(i as i64), c))
            .collect();
        Self::new(symbol, bars)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    /// Keep only the bars at `positions` (ascending indices into this series).
    pub fn select(&self, positions: &[usize]) -> Self {
        Self {
            symbol: self.symbol.clone(),
            bars: positions
                .iter()
                .filter_map(|&i| self.bars.get(i).cloned())
                .collect(),
        }
    }

    /// Render back into the column-oriented shape a data source produces,
    /// using canonical lower-case field names.
    pub fn to_raw_table(&self) -> RawTable {
        let index = self.bars.iter().map(|b| b.timestamp).collect();
        let mut table = RawTable::new(index);
        let columns: [(&str, fn(&Bar) -> Option<f64>); 5] = [
            ("open", |b| Some(b.open)),
            ("high", |b| Some(b.high)),
            ("low", |b| Some(b.low)),
            ("close", |b| Some(b.close)),
            ("volume", |b| b.volume),
        ];
        for (name, field) in columns {
            table.push_column_unchecked(name, self.bars.iter().map(field).collect());
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 0, 0, 0).unwrap()
    }

    #[test]
    fn new_sorts_and_dedups_last_wins() {
        let bars = vec![
            Bar::flat(ts(3), 30.0),
            Bar::flat(ts(1), 10.0),
            Bar::flat(ts(2), 20.0),
            Bar::flat(ts(2), 21.0),
        ];
        let series = Series::new("AAPL", bars);
        assert_eq!(series.closes(), vec![10.0, 21.0, 30.0]);
        assert!(series
            .bars()
            .windows(2)
            .all(|w| w[0].timestamp < w[1].timestamp));
    }

    #[test]
    fn select_keeps_requested_positions() {
        let series = Series::from_closes("X", &[1.0, 2.0, 3.0, 4.0]);
        let picked = series.select(&[1, 3, 9]);
        assert_eq!(picked.closes(), vec![2.0, 4.0]);
        assert_eq!(picked.symbol(), "X");
    }

    #[test]
    fn raw_table_uses_canonical_columns() {
        let series = Series::from_closes("X", &[1.0, 2.0]);
        let table = series.to_raw_table();
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.column_names(),
            vec!["open", "high", "low", "close", "volume"]
        );
    }
}
