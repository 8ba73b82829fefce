use analysis_core::stats;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitorSentiment {
    pub company_sentiment: f64,
    pub competitor_sentiments: BTreeMap<String, f64>,
    pub average_competitor_sentiment: f64,
    pub relative_sentiment: f64,
    /// 1-based rank of the company among all scores, highest first
    pub sentiment_ranking: usize,
}

pub fn compare_with_competitors(
    company_score: f64,
    competitor_scores: &BTreeMap<String, f64>,
) -> CompetitorSentiment {
    let scores: Vec<f64> = competitor_scores.values().copied().collect();
    let average = stats::mean(&scores);
    let ranking = 1 + scores.iter().filter(|s| **s > company_score).count();

    CompetitorSentiment {
        company_sentiment: company_score,
        competitor_sentiments: competitor_scores.clone(),
        average_competitor_sentiment: average,
        relative_sentiment: company_score - average,
        sentiment_ranking: ranking,
    }
}
