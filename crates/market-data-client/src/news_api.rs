use crate::transport::{build_http_client, ApiTransport, RateLimiter};
use analysis_core::{AnalysisError, NewsArticle, NewsProvider};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://newsapi.org";

#[derive(Clone)]
pub struct NewsApiClient {
    api_key: String,
    base_url: String,
    transport: ApiTransport,
}

impl NewsApiClient {
    pub fn new(api_key: String, base_url: Option<String>, rate_limit: usize, timeout: Duration) -> Self {
        Self {
            api_key,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            transport: ApiTransport::new(
                "NewsAPI",
                build_http_client(timeout, None),
                RateLimiter::per_minute(rate_limit),
            ),
        }
    }

    /// Most recent English articles matching `query`. Upstream errors yield an
    /// empty list so sentiment scoring can still run.
    pub async fn everything(&self, query: &str, page_size: u32) -> Result<Vec<NewsArticle>, AnalysisError> {
        let url = format!("{}/v2/everything", self.base_url);
        let page_size = page_size.clamp(1, 100).to_string();
        let request = self.transport.client().get(&url).query(&[
            ("q", query),
            ("apiKey", self.api_key.as_str()),
            ("language", "en"),
            ("sortBy", "publishedAt"),
            ("pageSize", page_size.as_str()),
        ]);

        let response = self.transport.send(request).await?;
        if !response.status().is_success() {
            tracing::warn!("NewsAPI returned HTTP {} for '{}'", response.status(), query);
            return Ok(Vec::new());
        }

        let data: EverythingResponse = match response.json().await {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!("NewsAPI response for '{}' could not be parsed: {}", query, e);
                return Ok(Vec::new());
            }
        };

        Ok(data
            .articles
            .into_iter()
            .filter_map(|a| a.into_article(query))
            .collect())
    }
}

#[async_trait]
impl NewsProvider for NewsApiClient {
    async fn articles(&self, query: &str, limit: u32) -> Result<Vec<NewsArticle>, AnalysisError> {
        self.everything(query, limit).await
    }
}

#[derive(Debug, Deserialize)]
struct EverythingResponse {
    #[serde(default)]
    articles: Vec<ApiArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiArticle {
    source: Option<ApiSource>,
    author: Option<String>,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct ApiSource {
    name: Option<String>,
}

impl ApiArticle {
    fn into_article(self, query: &str) -> Option<NewsArticle> {
        let title = self.title.filter(|t| !t.trim().is_empty() && t != "[Removed]")?;
        let url = self.url.unwrap_or_default();
        Some(NewsArticle {
            id: if url.is_empty() { title.clone() } else { url.clone() },
            title,
            author: self.author,
            source: self.source.and_then(|s| s.name),
            published_utc: self.published_at.unwrap_or_else(Utc::now),
            article_url: url,
            description: self.description,
            keywords: Vec::new(),
            tickers: vec![query.to_string()],
        })
    }
}
