//! Sentiment Trend Module
//!
//! Buckets news polarity into daily points over a trailing window and fits a
//! least-squares line through the daily scores to read the direction of
//! travel.

use crate::lexicon::Lexicon;
use analysis_core::{stats, NewsArticle};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Days covered by a trend series.
pub const TREND_WINDOW_DAYS: i64 = 30;

/// One day of aggregated news sentiment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendPoint {
    /// Calendar day (UTC), serialized as `%Y-%m-%d`
    pub date: NaiveDate,
    /// Mean polarity of that day's articles, 0 on quiet days
    pub sentiment_score: f64,
    /// Number of articles published that day
    pub volume: usize,
}

/// Direction of the fitted daily-score line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendDirection {
    Increasing,
    Decreasing,
}

/// Sentiment history over the trailing window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentTrends {
    /// Oldest day first
    pub trend_data: Vec<TrendPoint>,
    pub trend_direction: TrendDirection,
    /// Sample standard deviation of the daily scores
    pub volatility: f64,
    pub period: String,
}

impl SentimentTrends {
    /// Score change per day of the fitted line.
    pub fn slope(&self) -> f64 {
        stats::linear_slope(&self.daily_scores())
    }

    /// Articles counted across the whole window.
    pub fn total_volume(&self) -> usize {
        self.trend_data.iter().map(|p| p.volume).sum()
    }

    fn daily_scores(&self) -> Vec<f64> {
        self.trend_data.iter().map(|p| p.sentiment_score).collect()
    }
}

/// Build the daily series ending at `today`. Articles outside the window are
/// ignored.
pub fn sentiment_trends(lexicon: &Lexicon, articles: &[NewsArticle], today: NaiveDate) -> SentimentTrends {
    let start = today - Duration::days(TREND_WINDOW_DAYS - 1);

    let trend_data: Vec<TrendPoint> = (0..TREND_WINDOW_DAYS)
        .map(|offset| {
            let date = start + Duration::days(offset);
            let scores: Vec<f64> = articles
                .iter()
                .filter(|a| a.published_utc.date_naive() == date)
                .map(|a| lexicon.polarity(&a.scoring_text()))
                .collect();

            TrendPoint {
                date,
                sentiment_score: stats::mean(&scores),
                volume: scores.len(),
            }
        })
        .collect();

    let scores: Vec<f64> = trend_data.iter().map(|p| p.sentiment_score).collect();
    let trend_direction = if stats::linear_slope(&scores) > 0.0 {
        TrendDirection::Increasing
    } else {
        TrendDirection::Decreasing
    };

    SentimentTrends {
        volatility: stats::std_dev(&scores),
        trend_data,
        trend_direction,
        period: format!("{} days", TREND_WINDOW_DAYS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 30).unwrap()
    }

    fn create_test_data(days: &[(i64, &str)]) -> Vec<NewsArticle> {
        days.iter()
            .enumerate()
            .map(|(i, (days_ago, title))| NewsArticle {
                id: i.to_string(),
                title: title.to_string(),
                author: None,
                source: None,
                published_utc: Utc.with_ymd_and_hms(2024, 5, 30, 15, 0, 0).unwrap() - Duration::days(*days_ago),
                article_url: String::new(),
                description: None,
                keywords: vec![],
                tickers: vec![],
            })
            .collect()
    }

    #[test]
    fn test_window_shape() {
        let trends = sentiment_trends(&Lexicon::new(), &[], today());

        assert_eq!(trends.trend_data.len(), 30);
        assert_eq!(trends.trend_data[0].date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(trends.trend_data[29].date, today());
        assert_eq!(trends.period, "30 days");
        assert_eq!(trends.volatility, 0.0);
        // a flat series has no positive slope
        assert_eq!(trends.trend_direction, TrendDirection::Decreasing);
    }

    #[test]
    fn test_improving_news_flow() {
        let data = create_test_data(&[
            (25, "Shares plunge on weak guidance"),
            (20, "Analysts fear further losses"),
            (3, "Stock rallies on strong demand"),
            (1, "Record quarter, earnings beat"),
            (1, "Company schedules investor day"),
        ]);
        let trends = sentiment_trends(&Lexicon::new(), &data, today());

        assert_eq!(trends.trend_direction, TrendDirection::Increasing);
        assert!(trends.slope() > 0.0);
        assert!(trends.volatility > 0.0);
        assert_eq!(trends.total_volume(), 5);

        let yesterday = &trends.trend_data[28];
        assert_eq!(yesterday.volume, 2);
        // mean of the scored headline and the neutral one
        assert!(yesterday.sentiment_score > 0.0);
    }

    #[test]
    fn test_deteriorating_news_flow() {
        let data = create_test_data(&[
            (28, "Excellent results, shares soar"),
            (2, "Company hit with lawsuit"),
            (0, "Bankruptcy fears mount"),
        ]);
        let trends = sentiment_trends(&Lexicon::new(), &data, today());
        assert_eq!(trends.trend_direction, TrendDirection::Decreasing);
        assert!(trends.slope() < 0.0);
    }

    #[test]
    fn test_articles_outside_window_ignored() {
        let data = create_test_data(&[(45, "Great news"), (-1, "Great news")]);
        let trends = sentiment_trends(&Lexicon::new(), &data, today());
        assert_eq!(trends.total_volume(), 0);
    }

    #[test]
    fn test_serialized_date_format() {
        let trends = sentiment_trends(&Lexicon::new(), &[], today());
        let json = serde_json::to_value(&trends).unwrap();
        assert_eq!(json["trend_data"][29]["date"], "2024-05-30");
        assert_eq!(json["trend_direction"], "Decreasing");
    }
}
