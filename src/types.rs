// =============================================================================
// Shared types used across the signal-scout engine
// =============================================================================

use serde::{Deserialize, Serialize};

/// Discrete recommendation bucket derived from a technical score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    StrongBuy,
    PotentialBuy,
    Overbought,
    Hold,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StrongBuy => write!(f, "Strong Buy"),
            Self::PotentialBuy => write!(f, "Potential Buy"),
            Self::Overbought => write!(f, "Overbought"),
            Self::Hold => write!(f, "Hold"),
        }
    }
}

/// Final actionable verdict after merging the technical tier with sentiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Buy,
    SellOrShort,
    Hold,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::SellOrShort => write!(f, "SELL/SHORT"),
            Self::Hold => write!(f, "HOLD"),
        }
    }
}

/// Bar spacing requested from a market data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1m")]
    Minute1,
    #[serde(rename = "5m")]
    Minute5,
    #[serde(rename = "15m")]
    Minute15,
    #[serde(rename = "1h")]
    Hour1,
    #[serde(rename = "4h")]
    Hour4,
    #[serde(rename = "1d")]
    Day1,
    #[serde(rename = "1w")]
    Week1,
}

impl Interval {
    /// Exchange-style shorthand ("1m", "1h", "1d", ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minute1 => "1m",
            Self::Minute5 => "5m",
            Self::Minute15 => "15m",
            Self::Hour1 => "1h",
            Self::Hour4 => "4h",
            Self::Day1 => "1d",
            Self::Week1 => "1w",
        }
    }

    /// Wall-clock span of one bar.
    pub fn duration(&self) -> chrono::Duration {
        match self {
            Self::Minute1 => chrono::Duration::minutes(1),
            Self::Minute5 => chrono::Duration::minutes(5),
            Self::Minute15 => chrono::Duration::minutes(15),
            Self::Hour1 => chrono::Duration::hours(1),
            Self::Hour4 => chrono::Duration::hours(4),
            Self::Day1 => chrono::Duration::days(1),
            Self::Week1 => chrono::Duration::weeks(1),
        }
    }

    /// Number of bars of this interval that fit in `window` (at least 1).
    pub fn bars_in(&self, window: chrono::Duration) -> usize {
        let step = self.duration().num_seconds().max(1);
        let count = window.num_seconds() / step;
        count.max(1) as usize
    }
}

impl Default for Interval {
    fn default() -> Self {
        Self::Day1
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_bar_count() {
        assert_eq!(Interval::Day1.bars_in(chrono::Duration::days(180)), 180);
        assert_eq!(Interval::Hour4.bars_in(chrono::Duration::days(1)), 6);
        assert_eq!(Interval::Week1.bars_in(chrono::Duration::days(2)), 1);
    }

    #[test]
    fn interval_serde_uses_shorthand() {
        let json = serde_json::to_string(&Interval::Minute15).unwrap();
        assert_eq!(json, "\"15m\"");
        let back: Interval = serde_json::from_str("\"1d\"").unwrap();
        assert_eq!(back, Interval::Day1);
    }

    #[test]
    fn tier_display() {
        assert_eq!(Tier::StrongBuy.to_string(), "Strong Buy");
        assert_eq!(Action::SellOrShort.to_string(), "SELL/SHORT");
    }
}
