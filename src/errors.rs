// =============================================================================
// Error taxonomy
// =============================================================================
//
// Every error in this module is local to one ticker.  The screener turns it
// into a skip reason and carries on with the rest of the batch; nothing here
// is fatal to the process.
//
// "Indicator undefined" is deliberately *not* a variant: an undefined
// indicator value is the `None` marker inside an `IndicatorSet` column.
// =============================================================================

use thiserror::Error;

use crate::indicators::Indicator;

/// Data-quality and pipeline failures for a single ticker.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    /// No column whose name contains "close" was found in the raw table.
    #[error("no close-price column in raw table")]
    NoCloseColumn,

    /// The raw table is empty or its close column holds no defined value.
    #[error("close column is empty or entirely missing")]
    AllValuesMissing,

    /// Not enough defined history to score on.
    #[error("insufficient history: {bars} bar(s), {column} not defined on the last 2 bars")]
    InsufficientHistory { bars: usize, column: String },

    /// Every fetch attempt ended in a retryable failure.
    #[error("retries exhausted fetching {0}")]
    ExhaustedRetries(String),

    /// A non-success response from an external service (e.g. sentiment).
    #[error("external service error: {0}")]
    ExternalService(String),
}

impl DataError {
    /// Whether a fetch that failed with this error may be attempted again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NoCloseColumn | Self::AllValuesMissing)
    }

    pub(crate) fn insufficient(bars: usize, indicator: Indicator) -> Self {
        Self::InsufficientHistory {
            bars,
            column: indicator.to_string(),
        }
    }
}

/// Failures reported by an external collaborator (market data or sentiment).
#[derive(Debug, Error)]
pub enum SourceError {
    /// Transport-level failure (network, timeout, TLS).
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("API error: {0}")]
    Api(String),

    /// The payload could not be interpreted.
    #[error("malformed response: {0}")]
    Malformed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(DataError::NoCloseColumn.is_retryable());
        assert!(DataError::AllValuesMissing.is_retryable());
        assert!(!DataError::ExhaustedRetries("AAPL".into()).is_retryable());
        assert!(!DataError::insufficient(3, Indicator::Rsi).is_retryable());
    }

    #[test]
    fn insufficient_history_message_names_column() {
        let err = DataError::insufficient(3, Indicator::Rsi);
        assert_eq!(
            err.to_string(),
            "insufficient history: 3 bar(s), rsi not defined on the last 2 bars"
        );
    }
}
