// =============================================================================
// Signal Aggregator — technical tier + optional sentiment => Action
// =============================================================================
//
// The technical tier always wins when it has an opinion.  Sentiment only
// breaks a Hold:
//
//   tier            | Positive | Negative    | Neutral / Unavailable / none
//   ----------------+----------+-------------+-----------------------------
//   StrongBuy       | Buy      | Buy         | Buy
//   PotentialBuy    | Buy      | Buy         | Buy
//   Overbought      | Sell     | Sell        | Sell
//   Hold            | Buy      | Sell        | Hold
// =============================================================================

use crate::sentiment::{SentimentLabel, SentimentReading};
use crate::types::{Action, Tier};

use super::scoring::Recommendation;

pub struct SignalAggregator;

impl SignalAggregator {
    pub fn merge(recommendation: &Recommendation, sentiment: Option<&SentimentReading>) -> Action {
        match recommendation.tier() {
            Tier::StrongBuy | Tier::PotentialBuy => Action::Buy,
            Tier::Overbought => Action::SellOrShort,
            Tier::Hold => match sentiment.map(|s| s.label) {
                Some(SentimentLabel::Positive) => Action::Buy,
                Some(SentimentLabel::Negative) => Action::SellOrShort,
                Some(SentimentLabel::Neutral | SentimentLabel::Unavailable) | None => Action::Hold,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::scoring::{IndicatorSnapshot, ScoringEngine};

    fn recommendation(tier: Tier) -> Recommendation {
        let snap = match tier {
            Tier::StrongBuy => IndicatorSnapshot {
                close: 98.0,
                prev_close: Some(100.0),
                rsi: Some(24.0),
                macd: Some(1.2),
                signal: Some(0.8),
                bb_lower: Some(99.0),
                ..Default::default()
            },
            Tier::PotentialBuy => IndicatorSnapshot {
                close: 100.0,
                rsi: Some(20.0),
                ..Default::default()
            },
            Tier::Overbought => IndicatorSnapshot {
                close: 100.0,
                rsi: Some(80.0),
                ..Default::default()
            },
            Tier::Hold => IndicatorSnapshot {
                close: 100.0,
                rsi: Some(50.0),
                ..Default::default()
            },
        };
        let rec = ScoringEngine::default().score("AAPL", &snap);
        assert_eq!(rec.tier(), tier);
        rec
    }

    fn reading(label: SentimentLabel) -> SentimentReading {
        SentimentReading::new("AAPL", label, None)
    }

    #[test]
    fn hold_with_positive_sentiment_buys() {
        let action = SignalAggregator::merge(
            &recommendation(Tier::Hold),
            Some(&reading(SentimentLabel::Positive)),
        );
        assert_eq!(action, Action::Buy);
    }

    #[test]
    fn hold_with_negative_sentiment_sells() {
        let action = SignalAggregator::merge(
            &recommendation(Tier::Hold),
            Some(&reading(SentimentLabel::Negative)),
        );
        assert_eq!(action, Action::SellOrShort);
    }

    #[test]
    fn technical_tier_wins_disagreement() {
        let strong = recommendation(Tier::StrongBuy);
        assert_eq!(
            SignalAggregator::merge(&strong, Some(&reading(SentimentLabel::Negative))),
            Action::Buy
        );
        let overbought = recommendation(Tier::Overbought);
        assert_eq!(
            SignalAggregator::merge(&overbought, Some(&reading(SentimentLabel::Positive))),
            Action::SellOrShort
        );
    }

    #[test]
    fn unavailable_matches_missing_sentiment() {
        for tier in [Tier::StrongBuy, Tier::PotentialBuy, Tier::Overbought, Tier::Hold] {
            let rec = recommendation(tier);
            assert_eq!(
                SignalAggregator::merge(&rec, Some(&reading(SentimentLabel::Unavailable))),
                SignalAggregator::merge(&rec, None),
            );
        }
    }

    #[test]
    fn neutral_hold_stays_hold() {
        assert_eq!(
            SignalAggregator::merge(
                &recommendation(Tier::Hold),
                Some(&reading(SentimentLabel::Neutral))
            ),
            Action::Hold
        );
        assert_eq!(
            SignalAggregator::merge(&recommendation(Tier::PotentialBuy), None),
            Action::Buy
        );
    }
}
