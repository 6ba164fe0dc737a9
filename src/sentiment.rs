// =============================================================================
// Sentiment — external news/sentiment readings merged into the final action
// =============================================================================
//
// The core only needs a label and an optional score per ticker.  Providers
// that classify individual headlines can fold their labels into one reading
// with `SentimentReading::from_labels`.
// =============================================================================

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::SourceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
    /// The provider had nothing to say.  Treated exactly like no reading.
    Unavailable,
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Positive => write!(f, "Positive"),
            Self::Negative => write!(f, "Negative"),
            Self::Neutral => write!(f, "Neutral"),
            Self::Unavailable => write!(f, "Unavailable"),
        }
    }
}

/// One sentiment verdict for a ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentReading {
    pub ticker: String,
    pub label: SentimentLabel,
    /// Net tone in [-1, 1] when the provider computes one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl SentimentReading {
    pub fn new(ticker: impl Into<String>, label: SentimentLabel, score: Option<f64>) -> Self {
        Self {
            ticker: ticker.into(),
            label,
            score,
        }
    }

    pub fn unavailable(ticker: impl Into<String>) -> Self {
        Self::new(ticker, SentimentLabel::Unavailable, None)
    }

    /// Fold per-item labels (e.g. one per headline) into a single reading.
    ///
    /// The label is the strict majority among Positive/Negative/Neutral;
    /// any tie for first place is Neutral.  The score is
    /// `(positives - negatives) / classified`.  `Unavailable` items are
    /// ignored, and a ticker with no classified items is Unavailable.
    pub fn from_labels(ticker: impl Into<String>, labels: &[SentimentLabel]) -> Self {
        let count = |wanted: SentimentLabel| labels.iter().filter(|&&l| l == wanted).count();
        let pos = count(SentimentLabel::Positive);
        let neg = count(SentimentLabel::Negative);
        let neu = count(SentimentLabel::Neutral);

        let classified = pos + neg + neu;
        if classified == 0 {
            return Self::unavailable(ticker);
        }

        let label = if pos > neg && pos > neu {
            SentimentLabel::Positive
        } else if neg > pos && neg > neu {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        };
        let score = (pos as f64 - neg as f64) / classified as f64;

        Self::new(ticker, label, Some(score))
    }

    /// Whether this reading carries any signal at all.
    pub fn is_available(&self) -> bool {
        self.label != SentimentLabel::Unavailable
    }
}

/// A provider of per-ticker sentiment.
#[async_trait]
pub trait SentimentSource: Send + Sync {
    async fn get(&self, symbol: &str) -> Result<SentimentReading, SourceError>;
}
