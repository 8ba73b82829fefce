//! Indicator series over close prices, oldest first.
//!
//! Windowed indicators return one value per complete window, so the last
//! element always lines up with the last input. Exponentially weighted series
//! return one value per input.

/// Simple Moving Average
pub fn sma(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period {
        return vec![];
    }

    data.windows(period)
        .map(|w| w.iter().sum::<f64>() / period as f64)
        .collect()
}

/// Rolling sample standard deviation (n - 1 denominator).
pub fn rolling_std(data: &[f64], period: usize) -> Vec<f64> {
    if period < 2 || data.len() < period {
        return vec![];
    }

    data.windows(period)
        .map(|w| {
            let mean = w.iter().sum::<f64>() / period as f64;
            let variance = w.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (period - 1) as f64;
            variance.sqrt()
        })
        .collect()
}

/// Exponentially weighted mean with adjusted weights.
///
/// Each output is `Σ (1-α)^i · x[t-i] / Σ (1-α)^i` over all inputs so far,
/// with `α = 2 / (span + 1)`. Early values are therefore not biased towards
/// the first observation the way a seeded recursive EMA is.
pub fn ewm_mean(data: &[f64], span: usize) -> Vec<f64> {
    if span == 0 {
        return vec![];
    }

    let decay = 1.0 - 2.0 / (span as f64 + 1.0);
    let mut numerator = 0.0;
    let mut denominator = 0.0;

    data.iter()
        .map(|&x| {
            numerator = x + decay * numerator;
            denominator = 1.0 + decay * denominator;
            numerator / denominator
        })
        .collect()
}

/// Relative Strength Index from rolling means of gains and losses.
///
/// The first value covers the first `period` price changes. A window with
/// losses but no gains reads 0, gains but no losses reads 100 and a flat
/// window reads 50.
pub fn rolling_rsi(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period + 1 {
        return vec![];
    }

    let deltas: Vec<f64> = data.windows(2).map(|w| w[1] - w[0]).collect();

    deltas
        .windows(period)
        .map(|w| {
            let avg_gain = w.iter().filter(|d| **d > 0.0).sum::<f64>() / period as f64;
            let avg_loss = -w.iter().filter(|d| **d < 0.0).sum::<f64>() / period as f64;

            if avg_loss == 0.0 {
                if avg_gain == 0.0 { 50.0 } else { 100.0 }
            } else {
                let rs = avg_gain / avg_loss;
                100.0 - (100.0 / (1.0 + rs))
            }
        })
        .collect()
}

/// MACD (Moving Average Convergence Divergence)
#[derive(Debug, Clone, Default)]
pub struct MacdResult {
    pub macd_line: Vec<f64>,
    pub signal_line: Vec<f64>,
    pub histogram: Vec<f64>,
}

pub fn macd(data: &[f64], fast_period: usize, slow_period: usize, signal_period: usize) -> MacdResult {
    if fast_period == 0 || slow_period == 0 || signal_period == 0 || slow_period < fast_period {
        return MacdResult::default();
    }

    let ema_fast = ewm_mean(data, fast_period);
    let ema_slow = ewm_mean(data, slow_period);
    let macd_line: Vec<f64> = ema_fast.iter().zip(&ema_slow).map(|(f, s)| f - s).collect();
    let signal_line = ewm_mean(&macd_line, signal_period);
    let histogram = macd_line.iter().zip(&signal_line).map(|(m, s)| m - s).collect();

    MacdResult {
        macd_line,
        signal_line,
        histogram,
    }
}

/// Bollinger Bands
#[derive(Debug, Clone, Default)]
pub struct BollingerBands {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

pub fn bollinger_bands(data: &[f64], period: usize, std_dev: f64) -> BollingerBands {
    let middle = sma(data, period);
    let deviations = rolling_std(data, period);
    if middle.is_empty() || deviations.len() != middle.len() {
        return BollingerBands::default();
    }

    let upper = middle.iter().zip(&deviations).map(|(m, s)| m + std_dev * s).collect();
    let lower = middle.iter().zip(&deviations).map(|(m, s)| m - std_dev * s).collect();

    BollingerBands {
        upper,
        middle,
        lower,
    }
}
