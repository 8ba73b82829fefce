use async_trait::async_trait;
use crate::{
    AnalysisError, Bar, FinancialStatements, HistoryRange, NewsArticle, OptionsChain, SearchHit,
    SocialPost, TickerInfo,
};

/// Source of quotes, company profiles, statements and price history.
///
/// Implementations return `AnalysisError::NotFound` when the symbol is unknown
/// to the provider and `AnalysisError::ApiError` for transport or quota
/// failures, so callers can decide whether to fall through to the next one.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn ticker_info(&self, symbol: &str) -> Result<TickerInfo, AnalysisError>;

    async fn statements(&self, symbol: &str) -> Result<FinancialStatements, AnalysisError>;

    async fn price_history(&self, symbol: &str, range: HistoryRange) -> Result<Vec<Bar>, AnalysisError>;

    async fn options_chain(&self, symbol: &str) -> Result<OptionsChain, AnalysisError>;

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, AnalysisError>;
}

/// Trait for news search backends
#[async_trait]
pub trait NewsProvider: Send + Sync {
    async fn articles(&self, query: &str, limit: u32) -> Result<Vec<NewsArticle>, AnalysisError>;
}

/// Trait for social media search backends
#[async_trait]
pub trait SocialProvider: Send + Sync {
    async fn posts(&self, query: &str, limit: u32) -> Result<Vec<SocialPost>, AnalysisError>;
}
