use crate::fields::{self, METADATA_KEYS};
use crate::transport::{build_http_client, ApiTransport, RateLimiter};
use analysis_core::{
    AnalysisError, AnalystRatings, Bar, FinancialStatements, HistoryRange, InstitutionalHolder,
    MarketDataProvider, OptionContract, OptionsChain, SearchHit, Statement, StatementPeriod,
    TickerInfo,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

pub const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com";
const DEFAULT_COOKIE_URL: &str = "https://fc.yahoo.com";
const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

const INFO_MODULES: &str = "price,summaryProfile,assetProfile,summaryDetail,defaultKeyStatistics,\
financialData,majorHoldersBreakdown,institutionOwnership,recommendationTrend";
const STATEMENT_MODULES: &str = "incomeStatementHistory,balanceSheetHistory,cashflowStatementHistory";

#[derive(Debug, Clone)]
pub struct YahooConfig {
    pub base_url: String,
    pub search_url: String,
    /// Page visited once to obtain session cookies before asking for a crumb.
    /// `None` skips the cookie step.
    pub cookie_url: Option<String>,
    pub rate_limit: usize,
    pub timeout: Duration,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            search_url: DEFAULT_BASE_URL.to_string(),
            cookie_url: Some(DEFAULT_COOKIE_URL.to_string()),
            rate_limit: 120,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Yahoo Finance client: quoteSummary, chart, options and search endpoints.
#[derive(Clone)]
pub struct YahooClient {
    transport: ApiTransport,
    base_url: String,
    search_url: String,
    cookie_url: Option<String>,
    crumb: Arc<Mutex<Option<String>>>,
}

impl YahooClient {
    pub fn new(config: YahooConfig) -> Self {
        let client = build_http_client(config.timeout, Some(USER_AGENT));
        Self {
            transport: ApiTransport::new("Yahoo Finance", client, RateLimiter::per_minute(config.rate_limit)),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            search_url: config.search_url.trim_end_matches('/').to_string(),
            cookie_url: config.cookie_url,
            crumb: Arc::new(Mutex::new(None)),
        }
    }

    /// Session crumb for quoteSummary calls. Failure is not fatal: many
    /// deployments still answer without one.
    async fn crumb(&self) -> Option<String> {
        let mut cached = self.crumb.lock().await;
        if cached.is_some() {
            return cached.clone();
        }

        let client = self.transport.client();
        if let Some(cookie_url) = &self.cookie_url {
            if let Err(e) = client.get(cookie_url).send().await {
                tracing::debug!("Yahoo cookie request failed: {}", e);
            }
        }

        let url = format!("{}/v1/test/getcrumb", self.base_url);
        let response = match client.get(&url).send().await {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                tracing::debug!("Yahoo crumb unavailable: HTTP {}", r.status());
                return None;
            }
            Err(e) => {
                tracing::debug!("Yahoo crumb request failed: {}", e);
                return None;
            }
        };

        let body = response.text().await.ok()?;
        let body = body.trim();
        if body.is_empty() || body.len() > 64 || body.contains('<') {
            return None;
        }
        *cached = Some(body.to_string());
        cached.clone()
    }

    async fn quote_summary(&self, symbol: &str, modules: &str) -> Result<Value, AnalysisError> {
        let url = format!("{}/v10/finance/quoteSummary/{}", self.base_url, symbol);
        let mut request = self.transport.client().get(&url).query(&[("modules", modules)]);
        if let Some(crumb) = self.crumb().await {
            request = request.query(&[("crumb", crumb)]);
        }

        let json = match self.transport.get_json(request).await {
            Ok(json) => json,
            Err(e) => {
                if matches!(e, AnalysisError::ApiError(_)) {
                    // stale crumbs surface as 401s; fetch a fresh one next time
                    *self.crumb.lock().await = None;
                }
                return Err(e);
            }
        };

        json.pointer("/quoteSummary/result/0")
            .cloned()
            .ok_or_else(|| AnalysisError::NotFound(format!("No quote summary for {}", symbol)))
    }

    /// Quote, profile and key statistics.
    pub async fn get_ticker_info(&self, symbol: &str) -> Result<TickerInfo, AnalysisError> {
        let summary = self.quote_summary(symbol, INFO_MODULES).await?;
        let info = parse_ticker_info(symbol, &summary);
        if !info.has_price() {
            return Err(AnalysisError::NotFound(format!("{} has no regular market price", symbol)));
        }
        Ok(info)
    }

    /// Annual income statement, balance sheet and cash flow history.
    pub async fn get_statements(&self, symbol: &str) -> Result<FinancialStatements, AnalysisError> {
        let summary = self.quote_summary(symbol, STATEMENT_MODULES).await?;
        Ok(FinancialStatements {
            income: parse_statement(summary.get("incomeStatementHistory"), "incomeStatementHistory"),
            balance_sheet: parse_statement(summary.get("balanceSheetHistory"), "balanceSheetStatements"),
            cash_flow: parse_statement(summary.get("cashflowStatementHistory"), "cashflowStatements"),
        })
    }

    /// Daily bars over `range`, oldest first.
    pub async fn get_price_history(&self, symbol: &str, range: HistoryRange) -> Result<Vec<Bar>, AnalysisError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        let request = self
            .transport
            .client()
            .get(&url)
            .query(&[("range", range.as_range_param()), ("interval", "1d")]);
        let json = self.transport.get_json(request).await?;

        let result = json
            .pointer("/chart/result/0")
            .ok_or_else(|| AnalysisError::NotFound(format!("No chart data for {}", symbol)))?;
        Ok(parse_chart(result))
    }

    /// Option chain for the nearest expiration.
    pub async fn get_options_chain(&self, symbol: &str) -> Result<OptionsChain, AnalysisError> {
        let url = format!("{}/v7/finance/options/{}", self.base_url, symbol);
        let mut request = self.transport.client().get(&url);
        if let Some(crumb) = self.crumb().await {
            request = request.query(&[("crumb", crumb)]);
        }
        let json = self.transport.get_json(request).await?;

        Ok(json
            .pointer("/optionChain/result/0/options/0")
            .map(parse_options)
            .unwrap_or_default())
    }

    pub async fn search_symbols(&self, query: &str) -> Result<Vec<SearchHit>, AnalysisError> {
        let url = format!("{}/v1/finance/search", self.search_url);
        let request = self
            .transport
            .client()
            .get(&url)
            .query(&[("q", query), ("quotesCount", "10"), ("newsCount", "0")]);
        let json = self.transport.get_json(request).await?;

        let hits = json
            .get("quotes")
            .and_then(Value::as_array)
            .map(|quotes| quotes.iter().filter_map(parse_search_hit).collect())
            .unwrap_or_default();
        Ok(hits)
    }
}

#[async_trait]
impl MarketDataProvider for YahooClient {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    async fn ticker_info(&self, symbol: &str) -> Result<TickerInfo, AnalysisError> {
        self.get_ticker_info(symbol).await
    }

    async fn statements(&self, symbol: &str) -> Result<FinancialStatements, AnalysisError> {
        self.get_statements(symbol).await
    }

    async fn price_history(&self, symbol: &str, range: HistoryRange) -> Result<Vec<Bar>, AnalysisError> {
        self.get_price_history(symbol, range).await
    }

    async fn options_chain(&self, symbol: &str) -> Result<OptionsChain, AnalysisError> {
        self.get_options_chain(symbol).await
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, AnalysisError> {
        self.search_symbols(query).await
    }
}

/// Numeric field that may be a bare number or a `{raw, fmt}` object.
fn raw(node: Option<&Value>, key: &str) -> Option<f64> {
    let value = node?.get(key)?;
    let n = match value {
        Value::Object(_) => value.get("raw")?.as_f64(),
        other => other.as_f64(),
    }?;
    n.is_finite().then_some(n)
}

fn text(node: Option<&Value>, key: &str) -> Option<String> {
    node?
        .get(key)?
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn parse_ticker_info(symbol: &str, summary: &Value) -> TickerInfo {
    let price = summary.get("price");
    let profile = summary.get("summaryProfile").or_else(|| summary.get("assetProfile"));
    let asset_profile = summary.get("assetProfile");
    let detail = summary.get("summaryDetail");
    let stats = summary.get("defaultKeyStatistics");
    let financial = summary.get("financialData");
    let holders = summary.get("majorHoldersBreakdown");

    let mut info = TickerInfo::new(symbol);
    info.long_name = text(price, "longName");
    info.short_name = text(price, "shortName");
    info.quote_type = text(price, "quoteType");

    info.sector = text(profile, "sector").or_else(|| text(asset_profile, "sector"));
    info.industry = text(profile, "industry").or_else(|| text(asset_profile, "industry"));
    info.description = text(profile, "longBusinessSummary").or_else(|| text(asset_profile, "longBusinessSummary"));
    info.website = text(profile, "website");
    info.country = text(profile, "country");
    info.employees = raw(profile, "fullTimeEmployees").map(|n| n as i64);
    info.ceo = asset_profile
        .and_then(|p| p.get("companyOfficers"))
        .and_then(Value::as_array)
        .and_then(|officers| {
            officers
                .iter()
                .find(|o| {
                    o.get("title")
                        .and_then(Value::as_str)
                        .map_or(false, |t| t.contains("CEO") || t.contains("Chief Executive"))
                })
                .or_else(|| officers.first())
        })
        .and_then(|o| text(Some(o), "name"));

    info.price = raw(price, "regularMarketPrice").or_else(|| raw(financial, "currentPrice"));
    info.change = raw(price, "regularMarketChange");
    info.change_percent = raw(price, "regularMarketChangePercent").map(|p| p * 100.0);
    info.volume = raw(price, "regularMarketVolume");
    info.average_volume = raw(detail, "averageVolume");
    info.day_high = raw(price, "regularMarketDayHigh").or_else(|| raw(detail, "dayHigh"));
    info.day_low = raw(price, "regularMarketDayLow").or_else(|| raw(detail, "dayLow"));
    info.year_high = raw(detail, "fiftyTwoWeekHigh");
    info.year_low = raw(detail, "fiftyTwoWeekLow");

    info.market_cap = raw(price, "marketCap").or_else(|| raw(detail, "marketCap"));
    info.enterprise_value = raw(stats, "enterpriseValue");
    info.beta = raw(detail, "beta").or_else(|| raw(stats, "beta"));
    info.trailing_pe = raw(detail, "trailingPE");
    info.trailing_eps = raw(stats, "trailingEps");
    info.price_to_book = raw(stats, "priceToBook");
    info.price_to_sales = raw(detail, "priceToSalesTrailing12Months");
    info.enterprise_to_ebitda = raw(stats, "enterpriseToEbitda");
    info.shares_outstanding = raw(stats, "sharesOutstanding");
    info.float_shares = raw(stats, "floatShares");
    info.short_ratio = raw(stats, "shortRatio");
    info.dividend_yield = raw(detail, "dividendYield");

    info.gross_margins = raw(financial, "grossMargins");
    info.operating_margins = raw(financial, "operatingMargins");
    info.profit_margins = raw(financial, "profitMargins");
    info.return_on_assets = raw(financial, "returnOnAssets");
    info.return_on_equity = raw(financial, "returnOnEquity");
    info.current_ratio = raw(financial, "currentRatio");
    info.quick_ratio = raw(financial, "quickRatio");
    // Yahoo reports debt/equity as a percentage
    info.debt_to_equity = raw(financial, "debtToEquity").map(|d| d / 100.0);

    info.institutional_ownership =
        raw(holders, "institutionsPercentHeld").or_else(|| raw(stats, "heldPercentInstitutions"));
    info.insider_ownership = raw(holders, "insidersPercentHeld").or_else(|| raw(stats, "heldPercentInsiders"));
    info.analyst_ratings = summary.get("recommendationTrend").and_then(parse_ratings);
    info.top_holders = summary
        .pointer("/institutionOwnership/ownershipList")
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .take(10)
                .filter_map(|h| {
                    Some(InstitutionalHolder {
                        name: text(Some(h), "organization")?,
                        shares: raw(Some(h), "position"),
                        pct_change: raw(Some(h), "pctChange"),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    info
}

fn parse_ratings(trend: &Value) -> Option<AnalystRatings> {
    let periods = trend.get("trend")?.as_array()?;
    let current = periods
        .iter()
        .find(|p| p.get("period").and_then(Value::as_str) == Some("0m"))
        .or_else(|| periods.first())?;
    let count = |key: &str| raw(Some(current), key).map_or(0, |n| n.max(0.0) as u32);

    Some(AnalystRatings {
        strong_buy: count("strongBuy"),
        buy: count("buy"),
        hold: count("hold"),
        sell: count("sell"),
        strong_sell: count("strongSell"),
    })
}

fn parse_statement(module: Option<&Value>, list_key: &str) -> Statement {
    let mut periods: Vec<StatementPeriod> = module
        .and_then(|m| m.get(list_key))
        .and_then(Value::as_array)
        .map(|rows| rows.iter().map(parse_period).collect())
        .unwrap_or_default();
    // newest first; undated periods sink to the end
    periods.sort_by(|a, b| b.end_date.cmp(&a.end_date));
    Statement { periods }
}

fn parse_period(row: &Value) -> StatementPeriod {
    let end_date = row.get("endDate").and_then(|d| {
        d.get("fmt")
            .and_then(Value::as_str)
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
            .or_else(|| {
                d.get("raw")
                    .and_then(Value::as_i64)
                    .and_then(|ts| DateTime::from_timestamp(ts, 0))
                    .map(|dt| dt.date_naive())
            })
    });

    let mut items = BTreeMap::new();
    if let Some(fields) = row.as_object() {
        for key in fields.keys() {
            if METADATA_KEYS.contains(&key.as_str()) {
                continue;
            }
            if let Some(value) = raw(Some(row), key) {
                items.entry(fields::label_for(key)).or_insert(value);
            }
        }
    }
    fields::fill_total_debt(&mut items);

    StatementPeriod { end_date, items }
}

fn parse_chart(result: &Value) -> Vec<Bar> {
    let timestamps = match result.get("timestamp").and_then(Value::as_array) {
        Some(ts) => ts,
        None => return Vec::new(),
    };
    let quote = result.pointer("/indicators/quote/0");
    let column = |name: &str| -> Vec<Option<f64>> {
        quote
            .and_then(|q| q.get(name))
            .and_then(Value::as_array)
            .map(|values| values.iter().map(Value::as_f64).collect())
            .unwrap_or_default()
    };
    let (open, high, low, close, volume) =
        (column("open"), column("high"), column("low"), column("close"), column("volume"));
    let at = |col: &[Option<f64>], i: usize| col.get(i).copied().flatten();

    timestamps
        .iter()
        .enumerate()
        .filter_map(|(i, ts)| {
            let timestamp = DateTime::from_timestamp(ts.as_i64()?, 0)?;
            // halted or partial sessions come back with null closes
            let close = at(&close, i)?;
            Some(Bar {
                timestamp,
                open: at(&open, i).unwrap_or(close),
                high: at(&high, i).unwrap_or(close),
                low: at(&low, i).unwrap_or(close),
                close,
                volume: at(&volume, i).unwrap_or(0.0),
                vwap: None,
            })
        })
        .collect()
}

fn parse_options(node: &Value) -> OptionsChain {
    let contracts = |side: &str| -> Vec<OptionContract> {
        node.get(side)
            .and_then(Value::as_array)
            .map(|list| {
                list.iter()
                    .filter_map(|c| {
                        Some(OptionContract {
                            strike: raw(Some(c), "strike")?,
                            volume: raw(Some(c), "volume"),
                            implied_volatility: raw(Some(c), "impliedVolatility"),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default()
    };

    OptionsChain {
        expiration: node
            .get("expirationDate")
            .and_then(Value::as_i64)
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .map(|dt| dt.date_naive()),
        calls: contracts("calls"),
        puts: contracts("puts"),
    }
}

fn parse_search_hit(quote: &Value) -> Option<SearchHit> {
    let q = Some(quote);
    Some(SearchHit {
        symbol: text(q, "symbol")?,
        name: text(q, "longname").or_else(|| text(q, "shortname")),
        quote_type: text(q, "quoteType"),
        exchange: text(q, "exchDisp").or_else(|| text(q, "exchange")),
    })
}

#[cfg(test)]
#[path = "yahoo_tests.rs"]
mod yahoo_tests;
