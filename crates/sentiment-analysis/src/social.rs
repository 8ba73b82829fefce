use crate::lexicon::{Lexicon, SentimentLabel};
use analysis_core::SocialPost;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialSentiment {
    pub sentiment_score: f64,
    pub sentiment_label: SentimentLabel,
    pub total_posts: usize,
    pub positive_posts: usize,
    pub negative_posts: usize,
    pub neutral_posts: usize,
    pub average_engagement: f64,
    pub trending_topics: Vec<String>,
    /// False when no social source is configured.
    pub available: bool,
}

/// `posts` is `None` when the social integration is disabled.
pub fn analyze_social(lexicon: &Lexicon, company: &str, posts: Option<&[SocialPost]>) -> SocialSentiment {
    let trending_topics = ["earnings", "stock", "news"]
        .iter()
        .map(|topic| format!("{} {}", company, topic))
        .collect();

    let Some(posts) = posts else {
        return SocialSentiment {
            sentiment_score: 0.0,
            sentiment_label: SentimentLabel::Neutral,
            total_posts: 0,
            positive_posts: 0,
            negative_posts: 0,
            neutral_posts: 0,
            average_engagement: 0.0,
            trending_topics,
            available: false,
        };
    };

    let labels: Vec<SentimentLabel> = posts
        .iter()
        .map(|p| SentimentLabel::from_score(lexicon.polarity(&p.text)))
        .collect();
    let count = |label: SentimentLabel| labels.iter().filter(|l| **l == label).count();

    let (sentiment_score, average_engagement) = if posts.is_empty() {
        (0.0, 0.0)
    } else {
        let n = posts.len() as f64;
        let total: f64 = posts.iter().map(|p| lexicon.polarity(&p.text)).sum();
        let engagement: f64 = posts.iter().map(|p| p.engagement).sum();
        (total / n, engagement / n)
    };

    SocialSentiment {
        sentiment_score,
        sentiment_label: SentimentLabel::from_score(sentiment_score),
        total_posts: posts.len(),
        positive_posts: count(SentimentLabel::Positive),
        negative_posts: count(SentimentLabel::Negative),
        neutral_posts: count(SentimentLabel::Neutral),
        average_engagement,
        trending_topics,
        available: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(text: &str, engagement: f64) -> SocialPost {
        SocialPost {
            id: text.len().to_string(),
            text: text.to_string(),
            created_at: None,
            engagement,
        }
    }

    #[test]
    fn test_disabled_integration() {
        let result = analyze_social(&Lexicon::new(), "Tesla", None);
        assert!(!result.available);
        assert_eq!(result.sentiment_label, SentimentLabel::Neutral);
        assert_eq!(result.trending_topics, vec!["Tesla earnings", "Tesla stock", "Tesla news"]);
    }

    #[test]
    fn test_scored_posts() {
        let posts = vec![
            post("$TSLA looking bullish into earnings", 30.0),
            post("great delivery numbers", 10.0),
            post("worried about the recall", 20.0),
        ];
        let result = analyze_social(&Lexicon::new(), "Tesla", Some(posts.as_slice()));

        assert!(result.available);
        assert_eq!(result.total_posts, 3);
        assert_eq!(result.positive_posts, 2);
        assert_eq!(result.negative_posts, 1);
        assert_eq!(result.average_engagement, 20.0);
        // (0.8 + 0.8 - 0.5) / 3
        assert!((result.sentiment_score - 1.1 / 3.0).abs() < 1e-9);
        assert_eq!(result.sentiment_label, SentimentLabel::Positive);
    }

    #[test]
    fn test_enabled_but_empty() {
        let result = analyze_social(&Lexicon::new(), "Tesla", Some(&[][..]));
        assert!(result.available);
        assert_eq!(result.total_posts, 0);
        assert_eq!(result.sentiment_score, 0.0);
    }
}
