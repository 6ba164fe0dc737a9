// =============================================================================
// Relative Strength Index (RSI) — trailing simple averages
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an asset is overbought or oversold.
//
// Step 1 — Per-bar close difference (the first bar has no predecessor and
//          contributes a zero difference).
// Step 2 — gains  = positive differences, other positions zeroed
//          losses = negated negative differences, other positions zeroed
// Step 3 — avg_gain / avg_loss = trailing mean over `period` bars
// Step 4 — RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// When avg_loss is exactly zero RS is unbounded; that position is reported as
// undefined rather than as a 100.0 produced from a division by zero.
// =============================================================================

/// Compute the RSI column for `closes`, aligned 1:1 with the input.
///
/// # Edge cases
/// - `period == 0` or `closes.len() < period` => every value `None`
/// - positions `0..period-1` => `None` (warm-up)
/// - average loss of exactly zero => `None` at that position
pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let n = closes.len();
    let mut out = vec![None; n];
    if period == 0 || n < period {
        return out;
    }

    let mut gains = vec![0.0_f64; n];
    let mut losses = vec![0.0_f64; n];
    for i in 1..n {
        let delta = closes[i] - closes[i - 1];
        if delta > 0.0 {
            gains[i] = delta;
        } else if delta < 0.0 {
            losses[i] = -delta;
        }
    }

    let period_f = period as f64;
    for i in (period - 1)..n {
        let start = i + 1 - period;
        // Sum each window from scratch: a running sum can drift off an exact
        // zero and turn "no losses" into a huge finite RS.
        let avg_gain = gains[start..=i].iter().sum::<f64>() / period_f;
        let avg_loss = losses[start..=i].iter().sum::<f64>() / period_f;
        out[i] = rsi_from_averages(avg_gain, avg_loss);
    }

    out
}

/// Convert average gain / average loss into an RSI value in [0, 100].
///
/// Returns `None` when `avg_loss` is zero or the result is non-finite.
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_loss == 0.0 {
        return None;
    }
    let rs = avg_gain / avg_loss;
    let rsi = 100.0 - 100.0 / (1.0 + rs);
    rsi.is_finite().then_some(rsi)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsi_empty_input() {
        assert!(calculate_rsi(&[], 14).is_empty());
    }

    #[test]
    fn rsi_period_zero() {
        assert_eq!(calculate_rsi(&[1.0, 2.0, 3.0], 0), vec![None; 3]);
    }

    #[test]
    fn rsi_shorter_than_period_is_all_undefined() {
        let rsi = calculate_rsi(&[150.0, 152.0, 154.0], 14);
        assert_eq!(rsi, vec![None, None, None]);
    }

    #[test]
    fn rsi_monotonic_increase_is_explicitly_undefined() {
        // No losses at all: avg_loss is exactly zero everywhere.
        let closes: Vec<f64> = (1..=40).map(|x| x as f64).collect();
        let rsi = calculate_rsi(&closes, 14);
        assert_eq!(rsi.len(), closes.len());
        assert!(rsi.iter().all(Option::is_none));
    }

    #[test]
    fn rsi_nearly_monotonic_approaches_100() {
        // One tiny dip among strong gains pushes RSI close to 100.
        let mut closes: Vec<f64> = (1..=20).map(|x| x as f64 * 10.0).collect();
        closes[10] = closes[9] - 0.01;
        closes[11] = closes[9] + 20.0;
        let rsi = calculate_rsi(&closes, 14);
        let last = rsi.last().copied().flatten().unwrap();
        assert!(last > 99.0 && last < 100.0, "got {last}");
    }

    #[test]
    fn rsi_all_losses_is_zero() {
        let closes: Vec<f64> = (1..=30).rev().map(|x| x as f64).collect();
        let rsi = calculate_rsi(&closes, 14);
        for v in rsi.iter().skip(13) {
            assert!(v.unwrap().abs() < 1e-10);
        }
    }

    #[test]
    fn rsi_warm_up_positions_undefined() {
        let closes = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08,
            45.89, 46.03, 44.18, 44.22, 44.57, 43.42, 42.66, 43.13,
        ];
        let rsi = calculate_rsi(&closes, 14);
        assert!(rsi[..13].iter().all(Option::is_none));
        assert!(rsi[13..].iter().all(Option::is_some));
    }

    #[test]
    fn rsi_range_check() {
        let closes: Vec<f64> = (0..100)
            .map(|i| 50.0 + (i as f64 * 0.3).sin() * 10.0)
            .collect();
        for v in calculate_rsi(&closes, 14).into_iter().flatten() {
            assert!((0.0..=100.0).contains(&v), "RSI {v} out of range");
        }
    }
}
