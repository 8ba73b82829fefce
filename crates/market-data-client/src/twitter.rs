use crate::transport::{build_http_client, ApiTransport, RateLimiter};
use analysis_core::{AnalysisError, SocialPost, SocialProvider};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.twitter.com";

/// Recent-search client. Only built when a bearer token is configured.
#[derive(Clone)]
pub struct TwitterClient {
    bearer_token: String,
    base_url: String,
    transport: ApiTransport,
}

impl TwitterClient {
    pub fn new(bearer_token: String, base_url: Option<String>, timeout: Duration) -> Self {
        Self {
            bearer_token,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            // app-only recent search allows 450 requests per 15 minutes
            transport: ApiTransport::new(
                "Twitter",
                build_http_client(timeout, None),
                RateLimiter::new(450, Duration::from_secs(15 * 60)),
            ),
        }
    }

    pub async fn recent_search(&self, query: &str, max_results: u32) -> Result<Vec<SocialPost>, AnalysisError> {
        let url = format!("{}/2/tweets/search/recent", self.base_url);
        let search = format!("{} -is:retweet lang:en", query);
        let max_results = max_results.clamp(10, 100).to_string();
        let request = self
            .transport
            .client()
            .get(&url)
            .bearer_auth(&self.bearer_token)
            .query(&[
                ("query", search.as_str()),
                ("max_results", max_results.as_str()),
                ("tweet.fields", "created_at,public_metrics"),
            ]);

        let response = self.transport.send(request).await?;
        if !response.status().is_success() {
            tracing::warn!("Twitter search returned HTTP {} for '{}'", response.status(), query);
            return Ok(Vec::new());
        }

        let data: SearchResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::InvalidData(format!("Twitter response: {}", e)))?;

        Ok(data.data.into_iter().map(Tweet::into_post).collect())
    }
}

#[async_trait]
impl SocialProvider for TwitterClient {
    async fn posts(&self, query: &str, limit: u32) -> Result<Vec<SocialPost>, AnalysisError> {
        self.recent_search(query, limit).await
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<Tweet>,
}

#[derive(Debug, Deserialize)]
struct Tweet {
    id: String,
    text: String,
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    public_metrics: PublicMetrics,
}

#[derive(Debug, Default, Deserialize)]
struct PublicMetrics {
    #[serde(default)]
    retweet_count: u64,
    #[serde(default)]
    reply_count: u64,
    #[serde(default)]
    like_count: u64,
    #[serde(default)]
    quote_count: u64,
}

impl Tweet {
    fn into_post(self) -> SocialPost {
        let m = &self.public_metrics;
        let engagement = (m.retweet_count + m.reply_count + m.like_count + m.quote_count) as f64;
        SocialPost {
            id: self.id,
            text: self.text,
            created_at: self.created_at,
            engagement,
        }
    }
}
