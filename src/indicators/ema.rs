// =============================================================================
// Exponentially Weighted Moving Average (EWMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula (span-based, recursive):
//   alpha  = 2 / (span + 1)
//   EMA_0  = x_0
//   EMA_t  = alpha * x_t + (1 - alpha) * EMA_{t-1}
//
// The first value seeds the average, so the series is defined from the very
// first bar.  Early values are dominated by that seed; callers that need a
// settled average must mask the leading span themselves.
// =============================================================================

/// Compute the EWMA of `values` for the given `span`, aligned with the input.
///
/// Returns an empty `Vec` when `span == 0`.
pub fn calculate_ewma(values: &[f64], span: usize) -> Vec<f64> {
    if span == 0 {
        return Vec::new();
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let mut result = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;

    for &x in values {
        let ema = match prev {
            None => x,
            Some(p) => alpha * x + (1.0 - alpha) * p,
        };
        result.push(ema);
        prev = Some(ema);
    }

    result
}
