//! Lexicon-driven sentiment over news, social posts and market positioning.
//!
//! [`SentimentAnalyzer`] is synchronous: callers fetch articles, posts,
//! options and price history first and hand them over as [`SentimentInputs`].

use analysis_core::{NewsArticle, SocialPost, TickerInfo};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use technical_analysis::TechnicalSnapshot;

pub mod competitors;
pub mod drivers;
pub mod forecast;
pub mod lexicon;
pub mod market;
pub mod news;
pub mod social;
pub mod trends;

pub use competitors::{compare_with_competitors, CompetitorSentiment};
pub use drivers::{classify_event, identify_drivers, NewsEventType};
pub use forecast::{forecast, ForecastDirection, SentimentForecast};
pub use lexicon::{Lexicon, SentimentLabel};
pub use market::{institutional_activity, MarketSentiment, OptionsSummary};
pub use news::{analyze_news, NewsSentiment};
pub use social::{analyze_social, SocialSentiment};
pub use trends::{sentiment_trends, SentimentTrends, TrendDirection, TrendPoint};

const NEWS_WEIGHT: f64 = 0.4;
const SOCIAL_WEIGHT: f64 = 0.3;
const MARKET_WEIGHT: f64 = 0.3;

/// Weighted blend of the three channels.
pub fn overall_sentiment(news: &NewsSentiment, social: &SocialSentiment, market: &MarketSentiment) -> f64 {
    NEWS_WEIGHT * news.sentiment_score + SOCIAL_WEIGHT * social.sentiment_score + MARKET_WEIGHT * market.score()
}

/// Everything the full report is computed from.
pub struct SentimentInputs<'a> {
    pub company: &'a str,
    pub articles: &'a [NewsArticle],
    /// `None` when no social source is configured
    pub posts: Option<&'a [SocialPost]>,
    pub options: Option<&'a OptionsSummary>,
    pub technicals: Option<&'a TechnicalSnapshot>,
    pub info: &'a TickerInfo,
    pub today: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentReport {
    pub overall_sentiment: f64,
    pub news_sentiment: NewsSentiment,
    pub social_sentiment: SocialSentiment,
    pub market_sentiment: MarketSentiment,
    pub sentiment_trends: SentimentTrends,
    pub key_sentiment_drivers: Vec<String>,
}

pub struct SentimentAnalyzer {
    lexicon: Lexicon,
}

impl SentimentAnalyzer {
    pub fn new() -> Self {
        Self { lexicon: Lexicon::new() }
    }

    pub fn with_lexicon(lexicon: Lexicon) -> Self {
        Self { lexicon }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn analyze(&self, inputs: &SentimentInputs<'_>) -> SentimentReport {
        let news_sentiment = analyze_news(&self.lexicon, inputs.company, inputs.articles);
        let social_sentiment = analyze_social(&self.lexicon, inputs.company, inputs.posts);
        let market_sentiment = MarketSentiment::from_signals(inputs.options, inputs.technicals, inputs.info);
        let overall = overall_sentiment(&news_sentiment, &social_sentiment, &market_sentiment);

        tracing::debug!(
            company = inputs.company,
            articles = inputs.articles.len(),
            news = news_sentiment.sentiment_score,
            social = social_sentiment.sentiment_score,
            market = market_sentiment.score(),
            overall,
            "Sentiment computed"
        );

        SentimentReport {
            overall_sentiment: overall,
            news_sentiment,
            social_sentiment,
            market_sentiment,
            sentiment_trends: self.trends(inputs.articles, inputs.today),
            key_sentiment_drivers: identify_drivers(inputs.articles),
        }
    }

    pub fn news(&self, company: &str, articles: &[NewsArticle]) -> NewsSentiment {
        analyze_news(&self.lexicon, company, articles)
    }

    pub fn trends(&self, articles: &[NewsArticle], today: NaiveDate) -> SentimentTrends {
        sentiment_trends(&self.lexicon, articles, today)
    }

    /// Compare a company's overall sentiment against each competitor's.
    pub fn competitors(
        &self,
        company: &SentimentReport,
        competitors: &[(String, SentimentReport)],
    ) -> CompetitorSentiment {
        let scores: BTreeMap<String, f64> = competitors
            .iter()
            .map(|(name, report)| (name.clone(), report.overall_sentiment))
            .collect();
        compare_with_competitors(company.overall_sentiment, &scores)
    }
}

impl SentimentReport {
    /// Project the blended score forward along the news trend.
    pub fn forecast(&self) -> SentimentForecast {
        forecast(
            self.overall_sentiment,
            &self.sentiment_trends,
            &self.key_sentiment_drivers,
            self.news_sentiment.article_count,
        )
    }
}

impl Default for SentimentAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
