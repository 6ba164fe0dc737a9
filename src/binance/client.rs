// =============================================================================
// Binance Kline Source — public REST market data
// =============================================================================
//
// Serves historical bars from GET /api/v3/klines.  No API key is needed: the
// endpoint is public, so nothing here signs requests or handles secrets.
//
// The response is an array of arrays; each entry becomes one row of a
// RawTable with Open/High/Low/Close/Volume columns indexed by open time.
// Cells that fail to parse become missing values and are left for the
// validator to drop.
// =============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, instrument, warn};

use crate::errors::SourceError;
use crate::market_data::{MarketDataSource, RawTable};
use crate::types::Interval;

const DEFAULT_BASE_URL: &str = "https://api.binance.com";

/// Largest `limit` the klines endpoint accepts.
pub const MAX_KLINES: usize = 1000;

/// Kline column names, in Binance array order starting at index 1.
const COLUMNS: [&str; 5] = ["Open", "High", "Low", "Close", "Volume"];

#[derive(Debug, Clone)]
pub struct BinanceKlineSource {
    base_url: String,
    client: reqwest::Client,
}

impl BinanceKlineSource {
    pub fn new() -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()?;

        debug!(base_url = DEFAULT_BASE_URL, "BinanceKlineSource initialised");

        Ok(Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            client,
        })
    }

    /// Point the source at a different host (testnet, proxy, mock server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// GET /api/v3/klines.
    ///
    /// Array indices:
    ///   [0] openTime, [1] open, [2] high, [3] low, [4] close, [5] volume,
    ///   [6] closeTime, ...
    #[instrument(skip(self), name = "binance::get_klines")]
    pub async fn get_klines(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<RawTable, SourceError> {
        let url = format!(
            "{}/api/v3/klines?symbol={}&interval={}&limit={}",
            self.base_url,
            symbol,
            interval.as_str(),
            limit
        );

        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        let body: serde_json::Value = resp.json().await?;

        if !status.is_success() {
            return Err(SourceError::Api(format!(
                "GET /api/v3/klines returned {status}: {body}"
            )));
        }

        let table = klines_to_table(&body)?;
        debug!(symbol, interval = %interval, rows = table.len(), "klines fetched");
        Ok(table)
    }
}

#[async_trait]
impl MarketDataSource for BinanceKlineSource {
    async fn get(
        &self,
        symbol: &str,
        window: chrono::Duration,
        interval: Interval,
    ) -> Result<RawTable, SourceError> {
        let limit = interval.bars_in(window).min(MAX_KLINES);
        self.get_klines(symbol, interval, limit).await
    }
}

/// Convert a klines payload into a RawTable.
///
/// Entries that are not arrays, are too short, or carry no valid open time
/// are skipped with a warning.  A payload that is not an array at all is
/// `Malformed`.
pub fn klines_to_table(body: &serde_json::Value) -> Result<RawTable, SourceError> {
    let rows = body
        .as_array()
        .ok_or_else(|| SourceError::Malformed("klines response is not an array".into()))?;

    let mut index: Vec<DateTime<Utc>> = Vec::with_capacity(rows.len());
    let mut columns: Vec<Vec<Option<f64>>> = vec![Vec::with_capacity(rows.len()); COLUMNS.len()];

    for entry in rows {
        let Some(arr) = entry.as_array() else {
            warn!("skipping kline entry that is not an array");
            continue;
        };
        if arr.len() <= COLUMNS.len() {
            warn!("skipping malformed kline entry with {} elements", arr.len());
            continue;
        }
        let Some(open_time) = arr[0].as_i64().and_then(DateTime::from_timestamp_millis) else {
            warn!(value = %arr[0], "skipping kline entry with invalid open time");
            continue;
        };

        index.push(open_time);
        for (col, cell) in columns.iter_mut().zip(&arr[1..=COLUMNS.len()]) {
            col.push(parse_str_f64(cell));
        }
    }

    let mut table = RawTable::new(index);
    for (name, values) in COLUMNS.iter().zip(columns) {
        table.push_column_unchecked(name, values);
    }
    Ok(table)
}

/// Parse a JSON value that may be either a string or a number.
fn parse_str_f64(val: &serde_json::Value) -> Option<f64> {
    match val {
        serde_json::Value::String(s) => s.parse::<f64>().ok(),
        other => other.as_f64(),
    }
}
