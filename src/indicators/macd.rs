// =============================================================================
// MACD / Signal line
// =============================================================================
//
//   MACD   = EWMA(close, fast) - EWMA(close, slow)
//   Signal = EWMA(MACD, signal)
//
// Both EWMAs are seeded with the first close, so the raw lines exist from bar
// zero.  Until `slow - 1` bars have elapsed the slow average is still mostly
// seed, so those positions are reported as undefined.
// =============================================================================

use super::ema::calculate_ewma;

/// Aligned MACD and Signal columns.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub macd: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
}

/// Compute MACD and its signal line over `closes`.
///
/// Every position is undefined when any span is zero or `fast >= slow`.
pub fn calculate_macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> MacdSeries {
    let n = closes.len();
    let undefined = MacdSeries {
        macd: vec![None; n],
        signal: vec![None; n],
    };
    if fast == 0 || slow == 0 || signal == 0 || fast >= slow {
        return undefined;
    }

    let ema_fast = calculate_ewma(closes, fast);
    let ema_slow = calculate_ewma(closes, slow);
    let line: Vec<f64> = ema_fast.iter().zip(&ema_slow).map(|(f, s)| f - s).collect();
    let signal_line = calculate_ewma(&line, signal);

    let settled = slow - 1;
    let mask = |values: &[f64]| -> Vec<Option<f64>> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| (i >= settled && v.is_finite()).then_some(v))
            .collect()
    };

    MacdSeries {
        macd: mask(&line),
        signal: mask(&signal_line),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macd_masks_seed_dominated_positions() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let out = calculate_macd(&closes, 12, 26, 9);
        assert_eq!(out.macd.len(), 40);
        assert!(out.macd[..25].iter().all(Option::is_none));
        assert!(out.macd[25..].iter().all(Option::is_some));
        assert!(out.signal[..25].iter().all(Option::is_none));
    }

    #[test]
    fn macd_positive_in_uptrend() {
        let closes: Vec<f64> = (0..80).map(|i| 100.0 + i as f64 * 0.5).collect();
        let out = calculate_macd(&closes, 12, 26, 9);
        let macd = out.macd.last().copied().flatten().unwrap();
        let signal = out.signal.last().copied().flatten().unwrap();
        assert!(macd > 0.0);
        // Signal lags a rising MACD.
        assert!(macd > signal);
    }

    #[test]
    fn macd_flat_series_is_zero() {
        let out = calculate_macd(&[50.0; 40], 12, 26, 9);
        for v in out.macd.into_iter().flatten() {
            assert!(v.abs() < 1e-12);
        }
    }

    #[test]
    fn macd_invalid_spans_are_undefined() {
        let closes = vec![1.0; 30];
        assert!(calculate_macd(&closes, 26, 12, 9).macd.iter().all(Option::is_none));
        assert!(calculate_macd(&closes, 12, 26, 0).signal.iter().all(Option::is_none));
    }
}
