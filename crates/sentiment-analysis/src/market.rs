//! Positioning signals: options flow, technical trend and ownership.

use analysis_core::{InstitutionalHolder, OptionsChain, TickerInfo};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use technical_analysis::TechnicalSnapshot;

/// Aggregates over the nearest-expiration option chain.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptionsSummary {
    pub put_call_ratio: f64,
    pub total_call_volume: f64,
    pub total_put_volume: f64,
    pub nearest_expiration: Option<NaiveDate>,
    pub implied_volatility: Option<f64>,
}

impl OptionsSummary {
    /// `None` for an empty chain.
    pub fn from_chain(chain: &OptionsChain) -> Option<Self> {
        if chain.is_empty() {
            return None;
        }

        let call_volume: f64 = chain.calls.iter().filter_map(|c| c.volume).sum();
        let put_volume: f64 = chain.puts.iter().filter_map(|c| c.volume).sum();
        let ivs: Vec<f64> = chain
            .calls
            .iter()
            .chain(&chain.puts)
            .filter_map(|c| c.implied_volatility)
            .filter(|iv| iv.is_finite())
            .collect();

        Some(Self {
            put_call_ratio: if call_volume > 0.0 { put_volume / call_volume } else { 0.0 },
            total_call_volume: call_volume,
            total_put_volume: put_volume,
            nearest_expiration: chain.expiration,
            implied_volatility: (!ivs.is_empty()).then(|| analysis_core::stats::mean(&ivs)),
        })
    }
}

/// Net direction of the latest institutional filings.
pub fn institutional_activity(holders: &[InstitutionalHolder]) -> Option<&'static str> {
    let changes: Vec<f64> = holders.iter().filter_map(|h| h.pct_change).collect();
    if changes.is_empty() {
        return None;
    }
    Some(if changes.iter().sum::<f64>() >= 0.0 { "Buying" } else { "Selling" })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsSentiment {
    pub put_call_ratio: Option<f64>,
    pub implied_volatility: Option<f64>,
    pub sentiment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicalSentiment {
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub moving_averages: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingCounts {
    pub buy: u32,
    pub hold: u32,
    pub sell: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstitutionalSentiment {
    pub institutional_ownership: Option<f64>,
    pub insider_ownership: Option<f64>,
    pub institutional_activity: Option<String>,
    pub analyst_ratings: Option<RatingCounts>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSentiment {
    pub options_sentiment: OptionsSentiment,
    pub technical_indicators: TechnicalSentiment,
    pub institutional_sentiment: InstitutionalSentiment,
}

impl MarketSentiment {
    pub fn from_signals(
        options: Option<&OptionsSummary>,
        technicals: Option<&TechnicalSnapshot>,
        info: &TickerInfo,
    ) -> Self {
        // a chain with no call volume says nothing about positioning
        let put_call_ratio = options
            .filter(|o| o.total_call_volume > 0.0)
            .map(|o| o.put_call_ratio);
        let options_label = match put_call_ratio {
            Some(r) if r < 1.0 => "Bullish",
            Some(_) => "Bearish",
            None => "Neutral",
        };

        let analyst_ratings = info.analyst_ratings.filter(|r| r.total() > 0).map(|r| RatingCounts {
            buy: r.strong_buy + r.buy,
            hold: r.hold,
            sell: r.sell + r.strong_sell,
        });

        Self {
            options_sentiment: OptionsSentiment {
                put_call_ratio,
                implied_volatility: options.and_then(|o| o.implied_volatility),
                sentiment: options_label.to_string(),
            },
            technical_indicators: TechnicalSentiment {
                rsi: technicals.map(|t| t.rsi.value),
                macd: technicals.map(|t| t.macd.value),
                moving_averages: technicals.map_or("Sideways", |t| t.trend()).to_string(),
            },
            institutional_sentiment: InstitutionalSentiment {
                institutional_ownership: info.institutional_ownership,
                insider_ownership: info.insider_ownership,
                institutional_activity: institutional_activity(&info.top_holders).map(str::to_string),
                analyst_ratings,
            },
        }
    }

    /// Contribution of positioning to the overall score: put/call below 0.8
    /// reads bullish, above 1.2 bearish. Unknown ratios count as 1.0.
    pub fn score(&self) -> f64 {
        let ratio = self.options_sentiment.put_call_ratio.unwrap_or(1.0);
        if ratio < 0.8 {
            0.3
        } else if ratio > 1.2 {
            -0.3
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::{AnalystRatings, OptionContract};
    use technical_analysis::IndicatorSettings;

    fn contract(volume: Option<f64>, iv: Option<f64>) -> OptionContract {
        OptionContract {
            strike: 100.0,
            volume,
            implied_volatility: iv,
        }
    }

    #[test]
    fn test_options_summary() {
        let chain = OptionsChain {
            expiration: NaiveDate::from_ymd_opt(2024, 6, 21),
            calls: vec![contract(Some(300.0), Some(0.2)), contract(Some(100.0), None)],
            puts: vec![contract(Some(200.0), Some(0.4))],
        };
        let summary = OptionsSummary::from_chain(&chain).unwrap();

        assert_eq!(summary.put_call_ratio, 0.5);
        assert_eq!(summary.total_call_volume, 400.0);
        assert!((summary.implied_volatility.unwrap() - 0.3).abs() < 1e-12);
        assert!(OptionsSummary::from_chain(&OptionsChain::default()).is_none());
    }

    #[test]
    fn test_options_summary_without_call_volume() {
        let chain = OptionsChain {
            expiration: None,
            calls: vec![contract(None, None)],
            puts: vec![contract(Some(50.0), None)],
        };
        let summary = OptionsSummary::from_chain(&chain).unwrap();
        assert_eq!(summary.put_call_ratio, 0.0);

        let sentiment = MarketSentiment::from_signals(Some(&summary), None, &TickerInfo::new("X"));
        assert!(sentiment.options_sentiment.put_call_ratio.is_none());
        assert_eq!(sentiment.options_sentiment.sentiment, "Neutral");
        assert_eq!(sentiment.score(), 0.0);
    }

    #[test]
    fn test_market_score_bands() {
        let summary = |ratio: f64| OptionsSummary {
            put_call_ratio: ratio,
            total_call_volume: 100.0,
            ..Default::default()
        };
        let info = TickerInfo::new("X");

        let bullish = MarketSentiment::from_signals(Some(&summary(0.6)), None, &info);
        assert_eq!(bullish.score(), 0.3);
        assert_eq!(bullish.options_sentiment.sentiment, "Bullish");

        let bearish = MarketSentiment::from_signals(Some(&summary(1.5)), None, &info);
        assert_eq!(bearish.score(), -0.3);
        assert_eq!(bearish.options_sentiment.sentiment, "Bearish");

        let mild = MarketSentiment::from_signals(Some(&summary(0.9)), None, &info);
        assert_eq!(mild.score(), 0.0);
        assert_eq!(mild.options_sentiment.sentiment, "Bullish");
    }

    #[test]
    fn test_technicals_and_ownership() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let snapshot = TechnicalSnapshot::from_closes(&closes, &IndicatorSettings::default()).unwrap();

        let mut info = TickerInfo::new("X");
        info.institutional_ownership = Some(0.61);
        info.analyst_ratings = Some(AnalystRatings {
            strong_buy: 5,
            buy: 10,
            hold: 8,
            sell: 1,
            strong_sell: 1,
        });
        info.top_holders = vec![
            InstitutionalHolder {
                name: "Vanguard".to_string(),
                shares: Some(1e9),
                pct_change: Some(0.02),
            },
            InstitutionalHolder {
                name: "BlackRock".to_string(),
                shares: Some(8e8),
                pct_change: Some(-0.01),
            },
        ];

        let sentiment = MarketSentiment::from_signals(None, Some(&snapshot), &info);
        assert_eq!(sentiment.technical_indicators.moving_averages, "Uptrend");
        assert!(sentiment.technical_indicators.rsi.is_some());

        let inst = &sentiment.institutional_sentiment;
        assert_eq!(inst.institutional_ownership, Some(0.61));
        assert_eq!(inst.institutional_activity.as_deref(), Some("Buying"));
        let ratings = inst.analyst_ratings.as_ref().unwrap();
        assert_eq!((ratings.buy, ratings.hold, ratings.sell), (15, 8, 2));
    }

    #[test]
    fn test_institutional_activity_without_changes() {
        assert_eq!(institutional_activity(&[]), None);
        let holder = InstitutionalHolder {
            name: "Fund".to_string(),
            shares: None,
            pct_change: Some(-0.05),
        };
        assert_eq!(institutional_activity(&[holder]), Some("Selling"));
    }
}
