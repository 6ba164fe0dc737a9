// =============================================================================
// Average Directional Index (ADX) — range-normalised approximation
// =============================================================================
//
// ADX quantifies trend **strength** regardless of direction.
//
// Calculation pipeline:
//   1. +DM = max(high_t - high_{t-1}, 0)
//      -DM = max(low_{t-1} - low_t, 0)      (the first bar contributes 0)
//   2. Range proxy for true range: high_t - low_t
//   3. Trailing `period` means of +DM, -DM and the range ("ATR")
//   4. +DI = mean(+DM) / ATR * 100
//      -DI = mean(-DM) / ATR * 100
//   5. DX  = |+DI - -DI| / (+DI + -DI) * 100
//   6. ADX = trailing `period` mean of DX
//
// This is not Wilder's smoothing and the range proxy ignores gaps against the
// previous close.  It is kept as-is so scores stay comparable with the
// heuristics they were tuned against.
//
// Interpretation:
//   ADX > 25  => trending market
//   ADX < 20  => ranging / choppy market
// =============================================================================

use super::sma::{calculate_sma, rolling_mean_defined};

/// Compute the ADX column from aligned `highs` and `lows`.
///
/// Positions are `None` when:
/// - `period` is zero or the input is shorter than `period`;
/// - the ATR proxy is zero (no range at all);
/// - `+DI + -DI` is zero (no directional movement);
/// - any DX in the trailing window is undefined.
pub fn calculate_adx(highs: &[f64], lows: &[f64], period: usize) -> Vec<Option<f64>> {
    let n = highs.len().min(lows.len());
    if period == 0 || n < period {
        return vec![None; n];
    }

    let mut plus_dm = vec![0.0_f64; n];
    let mut minus_dm = vec![0.0_f64; n];
    for i in 1..n {
        plus_dm[i] = (highs[i] - highs[i - 1]).max(0.0);
        minus_dm[i] = (lows[i - 1] - lows[i]).max(0.0);
    }
    let ranges: Vec<f64> = highs[..n].iter().zip(&lows[..n]).map(|(h, l)| h - l).collect();

    let avg_plus = calculate_sma(&plus_dm, period);
    let avg_minus = calculate_sma(&minus_dm, period);
    let atr = calculate_sma(&ranges, period);

    let dx: Vec<Option<f64>> = (0..n)
        .map(|i| compute_dx(avg_plus[i]?, avg_minus[i]?, atr[i]?))
        .collect();

    rolling_mean_defined(&dx, period)
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Compute DX from averaged +DM, -DM and the ATR proxy.
///
/// Returns `None` if either divisor is zero or the result is non-finite.
fn compute_dx(avg_plus_dm: f64, avg_minus_dm: f64, atr: f64) -> Option<f64> {
    if atr == 0.0 {
        return None;
    }

    let plus_di = avg_plus_dm / atr * 100.0;
    let minus_di = avg_minus_dm / atr * 100.0;

    let di_sum = plus_di + minus_di;
    if di_sum == 0.0 {
        return None;
    }

    let dx = (plus_di - minus_di).abs() / di_sum * 100.0;
    dx.is_finite().then_some(dx)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn uptrend(n: usize) -> (Vec<f64>, Vec<f64>) {
        let highs = (0..n).map(|i| 101.5 + i as f64 * 2.0).collect();
        let lows = (0..n).map(|i| 99.5 + i as f64 * 2.0).collect();
        (highs, lows)
    }

    #[test]
    fn adx_period_zero() {
        let (h, l) = uptrend(50);
        assert!(calculate_adx(&h, &l, 0).iter().all(Option::is_none));
    }

    #[test]
    fn adx_insufficient_data() {
        let (h, l) = uptrend(10);
        let adx = calculate_adx(&h, &l, 14);
        assert_eq!(adx.len(), 10);
        assert!(adx.iter().all(Option::is_none));
    }

    #[test]
    fn adx_strong_uptrend() {
        // Higher highs and higher lows only: -DM is always zero => DX = 100.
        let (h, l) = uptrend(60);
        let adx = calculate_adx(&h, &l, 14);
        let value = adx.last().copied().flatten().unwrap();
        assert!(value > 25.0, "expected ADX > 25 for strong trend, got {value}");
        assert!((value - 100.0).abs() < 1e-9);
    }

    #[test]
    fn adx_first_defined_position() {
        let (h, l) = uptrend(40);
        let adx = calculate_adx(&h, &l, 14);
        // DX is defined from index 13, ADX needs 14 DX values => index 26.
        assert!(adx[..26].iter().all(Option::is_none));
        assert!(adx[26].is_some());
    }

    #[test]
    fn adx_flat_market_is_undefined() {
        // Identical bars: no directional movement => +DI + -DI == 0.
        let highs = vec![101.0; 60];
        let lows = vec![99.0; 60];
        assert!(calculate_adx(&highs, &lows, 14).iter().all(Option::is_none));
    }

    #[test]
    fn adx_zero_range_is_undefined() {
        // high == low everywhere: ATR proxy is zero.
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        assert!(calculate_adx(&closes, &closes, 14).iter().all(Option::is_none));
    }

    #[test]
    fn adx_result_range() {
        let base: Vec<f64> = (0..100).map(|i| 50.0 + (i as f64 * 0.3).sin() * 10.0).collect();
        let highs: Vec<f64> = base.iter().map(|b| b + 1.0).collect();
        let lows: Vec<f64> = base.iter().map(|b| b - 1.0).collect();
        for value in calculate_adx(&highs, &lows, 14).into_iter().flatten() {
            assert!((0.0..=100.0).contains(&value), "ADX {value} out of [0,100] range");
        }
    }
}
