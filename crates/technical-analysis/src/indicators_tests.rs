#[cfg(test)]
mod tests {
    use super::super::indicators::*;
    use super::super::snapshot::*;
    use analysis_core::Bar;
    use chrono::Utc;

    // Helper function to create sample price data
    fn sample_prices() -> Vec<f64> {
        vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08,
            45.89, 46.03, 45.61, 46.28, 46.28, 46.00, 46.03, 46.41, 46.22, 45.64,
        ]
    }

    // Helper function to create sample bars
    fn sample_bars(count: usize) -> Vec<Bar> {
        (0..count)
            .map(|i| {
                let close = 100.0 + i as f64;
                Bar {
                    timestamp: Utc::now() - chrono::Duration::days((count - i) as i64),
                    open: close - 1.0,
                    high: close + 1.0,
                    low: close - 2.0,
                    close,
                    volume: 1000000.0,
                    vwap: None,
                }
            })
            .collect()
    }

    #[test]
    fn test_sma_basic() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let result = sma(&data, 3);

        assert_eq!(result.len(), 3);
        assert!((result[0] - 2.0).abs() < 0.001); // (1+2+3)/3 = 2
        assert!((result[1] - 3.0).abs() < 0.001); // (2+3+4)/3 = 3
        assert!((result[2] - 4.0).abs() < 0.001); // (3+4+5)/3 = 4
    }

    #[test]
    fn test_sma_insufficient_data() {
        let data = vec![1.0, 2.0];
        assert!(sma(&data, 5).is_empty());
        assert!(sma(&data, 0).is_empty());
    }

    #[test]
    fn test_sma_real_prices() {
        let prices = sample_prices();
        let result = sma(&prices, 5);

        assert_eq!(result.len(), prices.len() - 4);
        let expected_first = (44.34 + 44.09 + 44.15 + 43.61 + 44.33) / 5.0;
        assert!((result[0] - expected_first).abs() < 0.01);
    }

    #[test]
    fn test_rolling_std_is_sample_std() {
        let data = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let result = rolling_std(&data, 8);

        assert_eq!(result.len(), 1);
        // population std is 2.0; sample std is sqrt(32/7)
        assert!((result[0] - (32.0f64 / 7.0).sqrt()).abs() < 1e-9);
        assert!(rolling_std(&data, 1).is_empty());
    }

    #[test]
    fn test_ewm_mean_adjusted_weights() {
        let data = vec![1.0, 2.0, 3.0];
        let result = ewm_mean(&data, 3); // alpha 0.5

        assert_eq!(result.len(), 3);
        assert!((result[0] - 1.0).abs() < 1e-12);
        // (2 + 0.5*1) / 1.5
        assert!((result[1] - 5.0 / 3.0).abs() < 1e-12);
        // (3 + 0.5*2 + 0.25*1) / 1.75
        assert!((result[2] - 4.25 / 1.75).abs() < 1e-12);
    }

    #[test]
    fn test_ewm_mean_empty_data() {
        assert!(ewm_mean(&[], 5).is_empty());
        assert!(ewm_mean(&[1.0, 2.0], 0).is_empty());
    }

    #[test]
    fn test_ewm_increases_with_uptrend() {
        let data: Vec<f64> = (1..=10).map(|x| x as f64).collect();
        let result = ewm_mean(&data, 3);

        for i in 1..result.len() {
            assert!(result[i] > result[i - 1]);
        }
    }

    #[test]
    fn test_rsi_range_and_length() {
        let prices = sample_prices();
        let result = rolling_rsi(&prices, 14);

        assert_eq!(result.len(), prices.len() - 14);
        for &value in &result {
            assert!((0.0..=100.0).contains(&value));
        }
    }

    #[test]
    fn test_rsi_known_window() {
        // gains: 1, 1, 0 ; losses: 0, 0, 1 over 3 changes
        let data = vec![10.0, 11.0, 12.0, 11.0];
        let result = rolling_rsi(&data, 3);

        assert_eq!(result.len(), 1);
        // rs = (2/3) / (1/3) = 2 -> 100 - 100/3
        assert!((result[0] - (100.0 - 100.0 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn test_rsi_edge_windows() {
        let rising: Vec<f64> = (0..20).map(|x| x as f64).collect();
        assert_eq!(*rolling_rsi(&rising, 14).last().unwrap(), 100.0);

        let falling: Vec<f64> = (0..20).map(|x| 100.0 - x as f64).collect();
        assert_eq!(*rolling_rsi(&falling, 14).last().unwrap(), 0.0);

        let flat = vec![5.0; 20];
        assert_eq!(*rolling_rsi(&flat, 14).last().unwrap(), 50.0);
    }

    #[test]
    fn test_rsi_insufficient_data() {
        assert!(rolling_rsi(&[1.0, 2.0, 3.0], 14).is_empty());
    }

    #[test]
    fn test_macd_lengths_and_histogram() {
        let prices = sample_prices();
        let result = macd(&prices, 12, 26, 9);

        assert_eq!(result.macd_line.len(), prices.len());
        assert_eq!(result.signal_line.len(), prices.len());
        for i in 0..prices.len() {
            let expected = result.macd_line[i] - result.signal_line[i];
            assert!((result.histogram[i] - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_macd_invalid_periods() {
        let prices = sample_prices();
        assert!(macd(&prices, 26, 12, 9).macd_line.is_empty());
        assert!(macd(&prices, 0, 26, 9).macd_line.is_empty());
    }

    #[test]
    fn test_bollinger_bands_basic() {
        let prices = sample_prices();
        let bb = bollinger_bands(&prices, 20, 2.0);

        assert_eq!(bb.upper.len(), 1);
        assert_eq!(bb.middle.len(), 1);
        assert!(bb.upper[0] > bb.middle[0]);
        assert!(bb.lower[0] < bb.middle[0]);
        assert!(((bb.upper[0] - bb.middle[0]) - (bb.middle[0] - bb.lower[0])).abs() < 1e-9);
    }

    #[test]
    fn test_bollinger_bands_insufficient_data() {
        let bb = bollinger_bands(&[1.0, 2.0], 20, 2.0);
        assert!(bb.upper.is_empty());
    }

    #[test]
    fn test_snapshot_empty_history() {
        assert!(TechnicalSnapshot::from_closes(&[], &IndicatorSettings::default()).is_none());
    }

    #[test]
    fn test_snapshot_short_history_uses_neutral_defaults() {
        let snapshot = TechnicalSnapshot::from_closes(&[10.0, 11.0, 12.0], &IndicatorSettings::default()).unwrap();

        assert_eq!(snapshot.moving_averages.sma_20, 0.0);
        assert_eq!(snapshot.moving_averages.price_vs_sma_20, PriceVsAverage::Below);
        assert_eq!(snapshot.rsi.value, 50.0);
        assert_eq!(snapshot.rsi.interpretation, RsiZone::Neutral);
        assert_eq!(snapshot.bollinger_bands.upper, 0.0);
        assert_eq!(snapshot.bollinger_bands.position, BandPosition::Middle);
        // MACD is defined from the first bar onwards
        assert_eq!(snapshot.macd.interpretation, MacdBias::Bullish);
    }

    #[test]
    fn test_snapshot_uptrend() {
        let bars = sample_bars(250);
        let snapshot = TechnicalSnapshot::from_bars(&bars, &IndicatorSettings::default()).unwrap();

        let ma = &snapshot.moving_averages;
        assert!(ma.sma_20 > ma.sma_50 && ma.sma_50 > ma.sma_200);
        assert_eq!(ma.price_vs_sma_200, PriceVsAverage::Above);
        assert_eq!(snapshot.rsi.interpretation, RsiZone::Overbought);
        assert_eq!(snapshot.macd.interpretation, MacdBias::Bullish);
        assert_eq!(snapshot.trend(), "Uptrend");
    }

    #[test]
    fn test_snapshot_price_below_lower_band() {
        let mut closes = vec![100.0, 101.0, 99.0, 100.0, 102.0];
        closes = closes.iter().cycle().take(40).copied().collect();
        closes.push(80.0);
        let snapshot = TechnicalSnapshot::from_closes(&closes, &IndicatorSettings::default()).unwrap();

        assert_eq!(snapshot.bollinger_bands.position, BandPosition::Lower);
        assert_eq!(snapshot.macd.interpretation, MacdBias::Bearish);
    }

    #[test]
    fn test_snapshot_serializes_labels() {
        let snapshot = TechnicalSnapshot::from_bars(&sample_bars(60), &IndicatorSettings::default()).unwrap();
        let value = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(value["moving_averages"]["price_vs_sma_20"], "Above");
        assert!(value["rsi"]["value"].is_number());
        assert_eq!(value["macd"]["interpretation"], "Bullish");
    }
}
