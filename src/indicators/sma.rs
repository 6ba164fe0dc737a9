// =============================================================================
// Simple Moving Average (SMA) and trailing-window helpers
// =============================================================================

/// Trailing arithmetic mean over `window` values, aligned with the input.
///
/// Undefined for the first `window - 1` positions; all undefined when
/// `window == 0`.
pub fn calculate_sma(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if window == 0 || values.len() < window {
        return out;
    }

    let window_f = window as f64;
    for (i, slot) in out.iter_mut().enumerate().skip(window - 1) {
        let sum: f64 = values[i + 1 - window..=i].iter().sum();
        *slot = Some(sum / window_f);
    }
    out
}

/// Trailing mean over a column that may itself contain undefined values.
///
/// A position is defined only when every value in its window is defined.
pub fn rolling_mean_defined(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if window == 0 || values.len() < window {
        return out;
    }

    let window_f = window as f64;
    for (i, slot) in out.iter_mut().enumerate().skip(window - 1) {
        let sum: Option<f64> = values[i + 1 - window..=i].iter().copied().sum();
        *slot = sum.map(|s| s / window_f);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sma_known_values() {
        let sma = calculate_sma(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
        assert_eq!(sma, vec![None, None, Some(2.0), Some(3.0), Some(4.0)]);
    }

    #[test]
    fn sma_window_longer_than_input() {
        assert_eq!(calculate_sma(&[1.0, 2.0], 20), vec![None, None]);
    }

    #[test]
    fn sma_window_zero() {
        assert_eq!(calculate_sma(&[1.0, 2.0], 0), vec![None, None]);
    }

    #[test]
    fn rolling_mean_requires_full_window() {
        let values = [Some(1.0), None, Some(3.0), Some(5.0), Some(7.0)];
        let out = rolling_mean_defined(&values, 2);
        assert_eq!(out, vec![None, None, None, Some(4.0), Some(6.0)]);
    }
}
