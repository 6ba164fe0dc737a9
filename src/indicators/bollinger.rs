// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Bollinger Bands consist of a middle band (SMA), an upper band (SMA + k*σ),
// and a lower band (SMA - k*σ), where σ is the trailing *sample* standard
// deviation over the same window.
//
// Trading below the lower band is read as a stretched, potentially oversold
// price.
// =============================================================================

use serde::Serialize;

/// Band values at a single position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BollingerBand {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// Calculate Bollinger Bands for every position of `closes`.
///
/// Each element is:
/// - `upper`  = SMA + `num_std` * σ
/// - `middle` = SMA
/// - `lower`  = SMA - `num_std` * σ
///
/// Positions are `None` during the warm-up (`period - 1` bars) and whenever
/// σ cannot be formed (`period < 2`) or is non-finite.
pub fn calculate_bollinger(closes: &[f64], period: usize, num_std: f64) -> Vec<Option<BollingerBand>> {
    let mut out = vec![None; closes.len()];
    if period < 2 || closes.len() < period {
        return out;
    }

    let period_f = period as f64;
    for (i, slot) in out.iter_mut().enumerate().skip(period - 1) {
        let window = &closes[i + 1 - period..=i];
        let middle = window.iter().sum::<f64>() / period_f;
        let variance =
            window.iter().map(|x| (x - middle).powi(2)).sum::<f64>() / (period_f - 1.0);
        let std_dev = variance.sqrt();

        if !std_dev.is_finite() || !middle.is_finite() {
            continue;
        }

        *slot = Some(BollingerBand {
            upper: middle + num_std * std_dev,
            middle,
            lower: middle - num_std * std_dev,
        });
    }

    out
}
