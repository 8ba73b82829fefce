use crate::trends::{SentimentTrends, TREND_WINDOW_DAYS};
use serde::{Deserialize, Serialize};

/// Largest move the projection may make over the horizon.
const MAX_PROJECTED_CHANGE: f64 = 0.1;
/// Article count at which confidence stops growing.
const FULL_COVERAGE_ARTICLES: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForecastDirection {
    Improving,
    Declining,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentForecast {
    pub current_sentiment: f64,
    pub forecasted_sentiment: f64,
    pub trend_direction: ForecastDirection,
    pub confidence_level: f64,
    pub forecast_period: String,
    pub key_factors: Vec<String>,
}

/// Extrapolate the daily trend across one more window, capped at +/-0.1.
pub fn forecast(
    current: f64,
    trends: &SentimentTrends,
    drivers: &[String],
    article_count: usize,
) -> SentimentForecast {
    let delta = (trends.slope() * TREND_WINDOW_DAYS as f64).clamp(-MAX_PROJECTED_CHANGE, MAX_PROJECTED_CHANGE);
    let coverage = (article_count as f64 / FULL_COVERAGE_ARTICLES).min(1.0);

    SentimentForecast {
        current_sentiment: current,
        forecasted_sentiment: (current + delta).clamp(-1.0, 1.0),
        trend_direction: if delta > 0.0 {
            ForecastDirection::Improving
        } else {
            ForecastDirection::Declining
        },
        confidence_level: 0.6 + 0.3 * coverage,
        forecast_period: trends.period.clone(),
        key_factors: drivers.to_vec(),
    }
}
