use crate::lexicon::{Lexicon, SentimentLabel};
use analysis_core::NewsArticle;
use serde::{Deserialize, Serialize};

/// Articles scored per request.
pub const MAX_SCORED_ARTICLES: usize = 20;
/// Articles returned and summarised.
pub const RECENT_ARTICLES: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsSentiment {
    pub sentiment_score: f64,
    pub sentiment_label: SentimentLabel,
    pub article_count: usize,
    pub positive_articles: usize,
    pub negative_articles: usize,
    pub neutral_articles: usize,
    pub recent_articles: Vec<NewsArticle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub sources: Vec<String>,
}

impl NewsSentiment {
    pub fn empty() -> Self {
        Self {
            sentiment_score: 0.0,
            sentiment_label: SentimentLabel::Neutral,
            article_count: 0,
            positive_articles: 0,
            negative_articles: 0,
            neutral_articles: 0,
            recent_articles: Vec::new(),
            summary: None,
            sources: Vec::new(),
        }
    }
}

/// Score the newest articles on title plus description.
pub fn analyze_news(lexicon: &Lexicon, company: &str, articles: &[NewsArticle]) -> NewsSentiment {
    if articles.is_empty() {
        return NewsSentiment::empty();
    }

    let mut newest: Vec<&NewsArticle> = articles.iter().collect();
    newest.sort_by(|a, b| b.published_utc.cmp(&a.published_utc));

    let scores: Vec<f64> = newest
        .iter()
        .take(MAX_SCORED_ARTICLES)
        .map(|a| lexicon.polarity(&a.scoring_text()))
        .collect();

    let count_label = |label: SentimentLabel| {
        scores
            .iter()
            .filter(|s| SentimentLabel::from_score(**s) == label)
            .count()
    };
    let sentiment_score = scores.iter().sum::<f64>() / scores.len() as f64;
    let sentiment_label = SentimentLabel::from_score(sentiment_score);

    let recent: Vec<&NewsArticle> = newest.iter().take(RECENT_ARTICLES).copied().collect();
    let mut sources: Vec<String> = Vec::new();
    for source in recent.iter().filter_map(|a| a.source.as_ref()) {
        if !sources.contains(source) {
            sources.push(source.clone());
        }
    }

    NewsSentiment {
        sentiment_score,
        sentiment_label,
        article_count: articles.len(),
        positive_articles: count_label(SentimentLabel::Positive),
        negative_articles: count_label(SentimentLabel::Negative),
        neutral_articles: count_label(SentimentLabel::Neutral),
        summary: Some(summary(company, recent.len(), sentiment_label)),
        recent_articles: recent.into_iter().cloned().collect(),
        sources,
    }
}

fn summary(company: &str, article_count: usize, label: SentimentLabel) -> String {
    let tail = match label {
        SentimentLabel::Positive => {
            "Most news coverage is optimistic, highlighting positive developments and outlook."
        }
        SentimentLabel::Negative => {
            "Recent news coverage is largely critical or highlights challenges facing the company."
        }
        SentimentLabel::Neutral => {
            "The news coverage is balanced, with both positive and negative perspectives."
        }
    };
    format!(
        "Based on {} recent articles from credible sources, the overall news sentiment for {} is {}. {}",
        article_count,
        company,
        label.as_str().to_lowercase(),
        tail
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn article(i: i64, title: &str, source: Option<&str>) -> NewsArticle {
        NewsArticle {
            id: format!("a{}", i),
            title: title.to_string(),
            author: None,
            source: source.map(str::to_string),
            published_utc: Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap() - Duration::hours(i),
            article_url: format!("https://news.example.com/{}", i),
            description: None,
            keywords: vec![],
            tickers: vec![],
        }
    }

    #[test]
    fn test_no_articles() {
        let result = analyze_news(&Lexicon::new(), "Apple", &[]);
        assert_eq!(result.article_count, 0);
        assert_eq!(result.sentiment_label, SentimentLabel::Neutral);
        assert!(result.summary.is_none());

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["sentiment_label"], "Neutral");
        assert!(json.get("summary").is_none());
    }

    #[test]
    fn test_counts_and_label() {
        let articles = vec![
            article(0, "Apple stock surges on record iPhone sales", Some("Reuters")),
            article(1, "Analysts upgrade Apple after strong quarter", Some("Bloomberg")),
            article(2, "Apple faces lawsuit over App Store fees", Some("Reuters")),
            article(3, "Apple to hold developer conference in June", None),
        ];
        let result = analyze_news(&Lexicon::new(), "Apple", &articles);

        assert_eq!(result.article_count, 4);
        assert_eq!(result.positive_articles, 2);
        assert_eq!(result.negative_articles, 1);
        assert_eq!(result.neutral_articles, 1);
        assert_eq!(result.sources, vec!["Reuters", "Bloomberg"]);
        assert_eq!(result.recent_articles.len(), 4);
        assert_eq!(result.recent_articles[0].id, "a0");
    }

    #[test]
    fn test_summary_text() {
        let articles: Vec<NewsArticle> = (0..8)
            .map(|i| article(i, "Shares rally as outlook looks great", Some("Wire")))
            .collect();
        let result = analyze_news(&Lexicon::new(), "Apple", &articles);

        assert_eq!(result.recent_articles.len(), 5);
        assert_eq!(
            result.summary.as_deref(),
            Some(
                "Based on 5 recent articles from credible sources, the overall news sentiment for Apple is positive. \
                 Most news coverage is optimistic, highlighting positive developments and outlook."
            )
        );
    }

    #[test]
    fn test_only_first_twenty_scored() {
        let mut articles: Vec<NewsArticle> = (0..20)
            .map(|i| article(i, "Company update", None))
            .collect();
        articles.extend((20..30).map(|i| article(i, "Bankruptcy crash", None)));

        let result = analyze_news(&Lexicon::new(), "Acme", &articles);
        assert_eq!(result.article_count, 30);
        assert_eq!(result.neutral_articles, 20);
        assert_eq!(result.negative_articles, 0);
        assert_eq!(result.sentiment_label, SentimentLabel::Neutral);
    }
}
