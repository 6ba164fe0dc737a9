// =============================================================================
// Signals Module
// =============================================================================
//
// Turns indicator values into decisions:
// - Additive integer scoring with tier resolution
// - Merging the technical tier with external sentiment

pub mod aggregator;
pub mod scoring;

pub use aggregator::SignalAggregator;
pub use scoring::{IndicatorSnapshot, Recommendation, ScoringEngine};
