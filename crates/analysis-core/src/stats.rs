//! Aggregates over daily sentiment series and option volatilities.

/// Arithmetic average; an empty series averages to 0.
pub fn mean(values: &[f64]) -> f64 {
    match values.len() {
        0 => 0.0,
        n => values.iter().sum::<f64>() / n as f64,
    }
}

/// Sample standard deviation (n - 1 denominator); 0 below two values.
pub fn std_dev(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let avg = mean(values);
    let squared: f64 = values.iter().map(|v| (v - avg) * (v - avg)).sum();
    (squared / (n - 1) as f64).sqrt()
}

/// Least-squares slope of `values` against their position, per step.
pub fn linear_slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let mid = (n - 1) as f64 / 2.0;
    let avg = mean(values);
    let mut covariance = 0.0;
    let mut spread = 0.0;
    for (day, value) in values.iter().enumerate() {
        let offset = day as f64 - mid;
        covariance += offset * (value - avg);
        spread += offset * offset;
    }
    if spread == 0.0 {
        0.0
    } else {
        covariance / spread
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_of_daily_scores() {
        assert_eq!(mean(&[]), 0.0);
        assert!((mean(&[0.2, -0.1, 0.5]) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_std_dev_uses_sample_denominator() {
        let scores = [0.1, 0.3, 0.3, 0.3, 0.4, 0.4, 0.6, 0.8];
        // squared deviations sum to 0.32 over 7 degrees of freedom
        assert!((std_dev(&scores) - (0.32_f64 / 7.0).sqrt()).abs() < 1e-9);
        assert_eq!(std_dev(&[0.5]), 0.0);
    }

    #[test]
    fn test_slope_of_improving_sentiment() {
        let improving: Vec<f64> = (0..30).map(|day| -0.3 + 0.02 * day as f64).collect();
        assert!((linear_slope(&improving) - 0.02).abs() < 1e-9);

        assert!(linear_slope(&[0.25; 30]).abs() < 1e-12);
        assert_eq!(linear_slope(&[0.4]), 0.0);
    }
}
