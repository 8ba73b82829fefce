//! Research pipeline: cached data access across a chain of market-data
//! providers, concurrent fan-out and assembly of the research payload.

use analysis_core::{
    sectors, AnalysisError, Bar, FinancialStatements, HistoryRange, MarketDataProvider, NewsArticle,
    NewsProvider, OptionsChain, SearchHit, SocialPost, SocialProvider, TickerInfo,
};
use chrono::Utc;
use fundamental_analysis::{
    generate_recommendation, CompanyInfo, CompanySummary, CompetitiveAnalysis, FinancialData,
    IndustryAnalysis, InvestmentRecommendation, RecommendationInputs,
};
use futures_util::future::join_all;
use market_data_client::DemoProvider;
use sentiment_analysis::{
    CompetitorSentiment, OptionsSummary, SentimentAnalyzer, SentimentForecast, SentimentInputs,
    SentimentReport, SentimentTrends,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use technical_analysis::{IndicatorSettings, TechnicalSnapshot};
use valuation_engine::{
    calculate_dcf, calculate_valuations, compare_with_peers, fair_value_range, sensitivity_analysis,
    DcfAssumptions, DcfInputs, DcfValuation, FairValueRange, PeerComparison, SensitivityAnalysis,
    Valuations,
};

pub mod cache;
pub mod market_data;
pub mod overview;

pub use cache::TtlCache;
pub use market_data::{InstitutionalData, MarketData, PricePoint};
pub use overview::{MarketOverview, SectorAnalysis};

/// Articles fetched per sentiment query.
const NEWS_LIMIT: u32 = 20;
/// Posts fetched per social query.
const SOCIAL_LIMIT: u32 = 50;
/// Search hits probed when resolving a company name.
const RESOLVE_CANDIDATES: usize = 5;
/// Rows returned by company search.
const SEARCH_LIMIT: usize = 10;

#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub cache_ttl: Duration,
    pub assumptions: DcfAssumptions,
    pub indicators: IndicatorSettings,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(300),
            assumptions: DcfAssumptions::default(),
            indicators: IndicatorSettings::default(),
        }
    }
}

/// The full research payload returned by `/api/analyze`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComprehensiveAnalysis {
    pub company_info: CompanyInfo,
    pub financial_data: FinancialData,
    pub market_data: MarketData,
    pub sentiment_data: SentimentReport,
    pub valuations: Valuations,
    pub competitive_analysis: CompetitiveAnalysis,
    pub industry_analysis: IndustryAnalysis,
    pub investment_recommendation: InvestmentRecommendation,
}

pub struct ResearchOrchestrator {
    /// Tried in order; the first usable answer wins.
    providers: Vec<Arc<dyn MarketDataProvider>>,
    news_providers: Vec<Arc<dyn NewsProvider>>,
    social: Option<Arc<dyn SocialProvider>>,
    analyzer: SentimentAnalyzer,
    settings: OrchestratorSettings,
    info_cache: TtlCache<TickerInfo>,
    statements_cache: TtlCache<FinancialStatements>,
    history_cache: TtlCache<Vec<Bar>>,
    options_cache: TtlCache<OptionsChain>,
    news_cache: TtlCache<Vec<NewsArticle>>,
}

impl ResearchOrchestrator {
    pub fn new(
        providers: Vec<Arc<dyn MarketDataProvider>>,
        news_providers: Vec<Arc<dyn NewsProvider>>,
        social: Option<Arc<dyn SocialProvider>>,
        settings: OrchestratorSettings,
    ) -> Self {
        let ttl = settings.cache_ttl;
        Self {
            providers,
            news_providers,
            social,
            analyzer: SentimentAnalyzer::new(),
            settings,
            info_cache: TtlCache::new(ttl),
            statements_cache: TtlCache::new(ttl),
            history_cache: TtlCache::new(ttl),
            options_cache: TtlCache::new(ttl),
            news_cache: TtlCache::new(ttl),
        }
    }

    /// Offline orchestrator over the built-in dataset.
    pub fn demo(settings: OrchestratorSettings) -> Self {
        let demo = Arc::new(DemoProvider);
        Self::new(
            vec![demo.clone() as Arc<dyn MarketDataProvider>],
            vec![demo as Arc<dyn NewsProvider>],
            None,
            settings,
        )
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub fn has_social(&self) -> bool {
        self.social.is_some()
    }

    /// Drop expired entries from every cache; returns how many remain.
    pub fn purge_expired_caches(&self) -> usize {
        self.info_cache.purge_expired();
        self.statements_cache.purge_expired();
        self.history_cache.purge_expired();
        self.options_cache.purge_expired();
        self.news_cache.purge_expired();
        self.info_cache.len()
            + self.statements_cache.len()
            + self.history_cache.len()
            + self.options_cache.len()
            + self.news_cache.len()
    }

    // ---- cached data access ----

    pub async fn ticker_info(&self, symbol: &str) -> Result<TickerInfo, AnalysisError> {
        let key = normalize_symbol(symbol);
        if let Some(info) = self.info_cache.get(&key) {
            return Ok(info);
        }

        let mut last_error = AnalysisError::NotFound(format!("No quote for {}", key));
        for provider in &self.providers {
            match provider.ticker_info(&key).await {
                Ok(info) => {
                    tracing::debug!("{}: ticker info from {}", key, provider.name());
                    self.info_cache.insert(key, info.clone());
                    return Ok(info);
                }
                Err(e) if e.is_recoverable() => {
                    tracing::warn!("{} ticker info for {} failed: {}", provider.name(), key, e);
                    last_error = e;
                }
                // an unknown symbol is unknown everywhere; spare the quota of the fallbacks
                Err(e) => {
                    tracing::debug!("{} has no ticker info for {}: {}", provider.name(), key, e);
                    return Err(e);
                }
            }
        }
        Err(last_error)
    }

    pub async fn statements(&self, symbol: &str) -> Result<FinancialStatements, AnalysisError> {
        let key = normalize_symbol(symbol);
        if let Some(statements) = self.statements_cache.get(&key) {
            return Ok(statements);
        }

        let mut last_error = AnalysisError::InsufficientData(format!("No statements for {}", key));
        for provider in &self.providers {
            match provider.statements(&key).await {
                Ok(statements) if !statements.is_empty() => {
                    self.statements_cache.insert(key, statements.clone());
                    return Ok(statements);
                }
                Ok(_) => tracing::debug!("{} returned empty statements for {}", provider.name(), key),
                Err(e) => {
                    tracing::warn!("{} statements for {} failed: {}", provider.name(), key, e);
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }

    /// Statements, or an empty set when no provider has them.
    async fn statements_or_empty(&self, symbol: &str) -> FinancialStatements {
        self.statements(symbol).await.unwrap_or_default()
    }

    pub async fn price_history(&self, symbol: &str, range: HistoryRange) -> Result<Vec<Bar>, AnalysisError> {
        let key = normalize_symbol(symbol);
        let cache_key = format!("{}:{}", key, range.as_range_param());
        if let Some(bars) = self.history_cache.get(&cache_key) {
            return Ok(bars);
        }

        let mut last_error = AnalysisError::InsufficientData(format!("No price history for {}", key));
        for provider in &self.providers {
            match provider.price_history(&key, range).await {
                Ok(bars) if !bars.is_empty() => {
                    self.history_cache.insert(cache_key, bars.clone());
                    return Ok(bars);
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!("{} price history for {} failed: {}", provider.name(), key, e);
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }

    pub async fn options_chain(&self, symbol: &str) -> OptionsChain {
        let key = normalize_symbol(symbol);
        if let Some(chain) = self.options_cache.get(&key) {
            return chain;
        }

        for provider in &self.providers {
            match provider.options_chain(&key).await {
                Ok(chain) if !chain.is_empty() => {
                    self.options_cache.insert(key, chain.clone());
                    return chain;
                }
                Ok(_) => {}
                Err(e) => tracing::debug!("{} options for {} failed: {}", provider.name(), key, e),
            }
        }
        OptionsChain::default()
    }

    pub async fn search(&self, query: &str) -> Vec<SearchHit> {
        for provider in &self.providers {
            match provider.search(query).await {
                Ok(hits) if !hits.is_empty() => return hits,
                Ok(_) => {}
                Err(e) => tracing::warn!("{} search for '{}' failed: {}", provider.name(), query, e),
            }
        }
        Vec::new()
    }

    /// Articles about `query`, newest first; empty when every source fails.
    pub async fn news(&self, query: &str) -> Vec<NewsArticle> {
        let cache_key = query.trim().to_lowercase();
        if let Some(articles) = self.news_cache.get(&cache_key) {
            return articles;
        }

        for provider in &self.news_providers {
            match provider.articles(query, NEWS_LIMIT).await {
                Ok(articles) if !articles.is_empty() => {
                    self.news_cache.insert(cache_key, articles.clone());
                    return articles;
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("News lookup for '{}' failed: {}", query, e),
            }
        }
        Vec::new()
    }

    /// `None` when no social source is configured.
    async fn social_posts(&self, query: &str) -> Option<Vec<SocialPost>> {
        let social = self.social.as_ref()?;
        match social.posts(query, SOCIAL_LIMIT).await {
            Ok(posts) => Some(posts),
            Err(e) => {
                tracing::warn!("Social lookup for '{}' failed: {}", query, e);
                Some(Vec::new())
            }
        }
    }

    // ---- research operations ----

    /// Resolve free text to a priced instrument: the input as a ticker
    /// first, then the equity search hits.
    pub async fn resolve_company(&self, input: &str) -> Option<TickerInfo> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        if !input.contains(char::is_whitespace) {
            if let Ok(info) = self.ticker_info(input).await {
                if info.has_price() {
                    return Some(info);
                }
            }
        }

        let hits = self.search(input).await;
        for hit in hits.iter().filter(|h| h.is_equity()).take(RESOLVE_CANDIDATES) {
            if let Ok(info) = self.ticker_info(&hit.symbol).await {
                if info.has_price() {
                    return Some(info);
                }
            }
        }
        None
    }

    pub async fn financial_data(&self, symbol: &str) -> Result<FinancialData, AnalysisError> {
        let (info, statements) = tokio::join!(self.ticker_info(symbol), self.statements_or_empty(symbol));
        Ok(FinancialData::derive(&info?, &statements))
    }

    pub async fn market_data(&self, symbol: &str) -> Result<MarketData, AnalysisError> {
        let info = self.ticker_info(symbol).await?;
        Ok(self.market_data_for(&info).await)
    }

    async fn market_data_for(&self, info: &TickerInfo) -> MarketData {
        let (chain, bars) = tokio::join!(
            self.options_chain(&info.symbol),
            self.price_history(&info.symbol, HistoryRange::Year1),
        );
        let bars = bars.unwrap_or_else(|e| {
            tracing::warn!("No price history for {}: {}", info.symbol, e);
            Vec::new()
        });
        MarketData::assemble(info, &chain, &bars, &self.settings.indicators)
    }

    pub async fn sentiment(&self, company: &str, symbol: &str) -> Result<SentimentReport, AnalysisError> {
        let info = self.ticker_info(symbol).await?;
        Ok(self.sentiment_for(company, &info).await)
    }

    async fn sentiment_for(&self, company: &str, info: &TickerInfo) -> SentimentReport {
        let (articles, posts, chain, bars) = tokio::join!(
            self.news(company),
            self.social_posts(company),
            self.options_chain(&info.symbol),
            self.price_history(&info.symbol, HistoryRange::Year1),
        );
        let options = OptionsSummary::from_chain(&chain);
        let technicals = bars
            .ok()
            .and_then(|bars| TechnicalSnapshot::from_bars(&bars, &self.settings.indicators));

        self.analyzer.analyze(&SentimentInputs {
            company,
            articles: &articles,
            posts: posts.as_deref(),
            options: options.as_ref(),
            technicals: technicals.as_ref(),
            info,
            today: Utc::now().date_naive(),
        })
    }

    pub async fn valuations(&self, symbol: &str) -> Result<Valuations, AnalysisError> {
        let (info, statements) = tokio::join!(self.ticker_info(symbol), self.statements_or_empty(symbol));
        let info = info?;
        let financial = FinancialData::derive(&info, &statements);
        Ok(self.valuations_for(&info, &financial, &statements).await)
    }

    async fn valuations_for(
        &self,
        info: &TickerInfo,
        financial: &FinancialData,
        statements: &FinancialStatements,
    ) -> Valuations {
        let assumptions = &self.settings.assumptions;
        let mut valuations = calculate_valuations(financial, info, statements, assumptions);
        valuations.dcf_detailed = Some(detailed_dcf(info, statements, assumptions).into());
        valuations.peer_comparison = Some(self.peer_comparison_for(info).await);
        valuations
    }

    pub async fn competitive_analysis(&self, symbol: &str) -> Result<CompetitiveAnalysis, AnalysisError> {
        let info = self.ticker_info(symbol).await?;
        Ok(CompetitiveAnalysis::assess(&info))
    }

    pub fn industry_analysis(&self, sector: &str) -> IndustryAnalysis {
        IndustryAnalysis::for_sector(sector)
    }

    /// Resolve `input` and build the complete research payload.
    pub async fn analyze(&self, input: &str) -> Result<ComprehensiveAnalysis, AnalysisError> {
        let info = self
            .resolve_company(input)
            .await
            .ok_or_else(|| AnalysisError::NotFound("Company not found".to_string()))?;
        let company_info = CompanyInfo::from_ticker(&info);
        tracing::info!("Starting comprehensive analysis for {} ({})", company_info.name, info.symbol);

        let (statements, market_data, sentiment_data) = tokio::join!(
            self.statements_or_empty(&info.symbol),
            self.market_data_for(&info),
            self.sentiment_for(&company_info.name, &info),
        );
        let financial_data = FinancialData::derive(&info, &statements);
        let valuations = self.valuations_for(&info, &financial_data, &statements).await;

        let investment_recommendation = generate_recommendation(&RecommendationInputs {
            financial: &financial_data,
            market_cap: info.market_cap,
            overall_sentiment: sentiment_data.overall_sentiment,
            pe_ratio: Some(valuations.pe_ratio),
        });
        tracing::info!(
            "Analysis complete for {}: {:?} (score {})",
            info.symbol,
            investment_recommendation.recommendation,
            investment_recommendation.score
        );

        Ok(ComprehensiveAnalysis {
            competitive_analysis: CompetitiveAnalysis::assess(&info),
            industry_analysis: IndustryAnalysis::for_sector(&company_info.sector),
            company_info,
            financial_data,
            market_data,
            sentiment_data,
            valuations,
            investment_recommendation,
        })
    }

    /// Direct ticker match first, then equity search hits, without duplicates.
    pub async fn search_companies(&self, query: &str) -> Vec<CompanySummary> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        let direct = async {
            if query.contains(char::is_whitespace) {
                return None;
            }
            self.ticker_info(query).await.ok().filter(TickerInfo::has_price)
        };
        let (direct, hits) = tokio::join!(direct, self.search(query));

        let mut results: Vec<CompanySummary> = direct.iter().map(CompanySummary::from_ticker).collect();
        for hit in hits.iter().filter(|h| h.is_equity()) {
            if !results.iter().any(|r| r.symbol.eq_ignore_ascii_case(&hit.symbol)) {
                results.push(CompanySummary::from_hit(hit));
            }
        }
        results.truncate(SEARCH_LIMIT);
        results
    }

    /// Detailed DCF, optionally with caller-supplied rates.
    pub async fn dcf(
        &self,
        symbol: &str,
        growth_rate: Option<f64>,
        discount_rate: Option<f64>,
    ) -> Result<DcfValuation, AnalysisError> {
        let (info, statements) = tokio::join!(self.ticker_info(symbol), self.statements_or_empty(symbol));
        let base = &self.settings.assumptions;
        let assumptions = base.with_rates(
            growth_rate.unwrap_or(base.growth_rate),
            discount_rate.unwrap_or(base.discount_rate),
        );
        detailed_dcf(&info?, &statements, &assumptions)
    }

    pub async fn peer_comparison(&self, symbol: &str) -> Result<PeerComparison, AnalysisError> {
        let info = self.ticker_info(symbol).await?;
        Ok(self.peer_comparison_for(&info).await)
    }

    async fn peer_comparison_for(&self, info: &TickerInfo) -> PeerComparison {
        let sector = info.sector.as_deref().unwrap_or_default();
        let symbols = sectors::peers_excluding(sector, &info.symbol);
        let results = join_all(symbols.iter().map(|s| self.ticker_info(s))).await;

        let peers: Vec<TickerInfo> = symbols
            .iter()
            .zip(results)
            .filter_map(|(symbol, result)| match result {
                Ok(peer) => Some(peer),
                Err(e) => {
                    tracing::warn!("Skipping peer {}: {}", symbol, e);
                    None
                }
            })
            .collect();
        compare_with_peers(info, &peers)
    }

    pub async fn sensitivity(&self, symbol: &str) -> Result<SensitivityAnalysis, AnalysisError> {
        let (info, statements) = tokio::join!(self.ticker_info(symbol), self.statements_or_empty(symbol));
        let inputs = DcfInputs::from_sources(&info?, &statements)?;
        Ok(sensitivity_analysis(&inputs, &self.settings.assumptions))
    }

    pub async fn fair_value_range(&self, symbol: &str) -> Result<FairValueRange, AnalysisError> {
        let (info, statements) = tokio::join!(self.ticker_info(symbol), self.statements_or_empty(symbol));
        let info = info?;
        let dcf = detailed_dcf(&info, &statements, &self.settings.assumptions).ok();
        let peers = self.peer_comparison_for(&info).await;
        fair_value_range(dcf.as_ref(), Some(&peers), info.trailing_eps)
    }

    /// Daily news sentiment for the last 30 days. The company name is used
    /// as the news query when the symbol resolves.
    pub async fn sentiment_trends(&self, symbol: &str) -> SentimentTrends {
        let query = match self.ticker_info(symbol).await {
            Ok(info) if info.long_name.is_some() || info.short_name.is_some() => info.display_name(),
            _ => normalize_symbol(symbol),
        };
        let articles = self.news(&query).await;
        self.analyzer.trends(&articles, Utc::now().date_naive())
    }

    /// Full sentiment report for free-text company input. The market channel
    /// is only filled when the input resolves to a quoted ticker.
    pub async fn company_sentiment(&self, company: &str) -> SentimentReport {
        if let Some(info) = self.resolve_company(company).await {
            return self.sentiment_for(company, &info).await;
        }

        tracing::debug!("'{}' did not resolve to a ticker; news and social only", company);
        let (articles, posts) = tokio::join!(self.news(company), self.social_posts(company));
        self.analyzer.analyze(&SentimentInputs {
            company,
            articles: &articles,
            posts: posts.as_deref(),
            options: None,
            technicals: None,
            info: &TickerInfo::new(company),
            today: Utc::now().date_naive(),
        })
    }

    pub async fn sentiment_forecast(&self, company: &str) -> SentimentForecast {
        self.company_sentiment(company).await.forecast()
    }

    pub async fn competitor_sentiment(&self, company: &str, competitors: &[String]) -> CompetitorSentiment {
        let (report, rival_reports) = tokio::join!(
            self.company_sentiment(company),
            join_all(competitors.iter().map(|c| self.company_sentiment(c))),
        );
        let rivals: Vec<(String, SentimentReport)> = competitors.iter().cloned().zip(rival_reports).collect();
        self.analyzer.competitors(&report, &rivals)
    }
}

fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

fn detailed_dcf(
    info: &TickerInfo,
    statements: &FinancialStatements,
    assumptions: &DcfAssumptions,
) -> Result<DcfValuation, AnalysisError> {
    let inputs = DcfInputs::from_sources(info, statements)?;
    calculate_dcf(&inputs, assumptions)
}
