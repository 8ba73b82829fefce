use crate::fields::{self, METADATA_KEYS};
use crate::transport::{build_http_client, ApiTransport, RateLimiter};
use analysis_core::{
    AnalysisError, AnalystRatings, Bar, FinancialStatements, HistoryRange, MarketDataProvider,
    OptionsChain, SearchHit, Statement, StatementPeriod, TickerInfo,
};
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co";

/// Alpha Vantage sector names are upper-case and partly differ from Yahoo's.
const SECTOR_NAMES: &[(&str, &str)] = &[
    ("TECHNOLOGY", "Technology"),
    ("FINANCE", "Financial Services"),
    ("FINANCIAL SERVICES", "Financial Services"),
    ("LIFE SCIENCES", "Healthcare"),
    ("HEALTHCARE", "Healthcare"),
    ("TRADE & SERVICES", "Consumer Cyclical"),
    ("MANUFACTURING", "Industrials"),
    ("ENERGY & TRANSPORTATION", "Energy"),
    ("REAL ESTATE & CONSTRUCTION", "Real Estate"),
];

/// Fallback fundamentals source. The free tier allows five calls a minute.
#[derive(Clone)]
pub struct AlphaVantageClient {
    api_key: String,
    base_url: String,
    transport: ApiTransport,
}

impl AlphaVantageClient {
    pub fn new(api_key: String, base_url: Option<String>, rate_limit: usize, timeout: Duration) -> Self {
        Self {
            api_key,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            transport: ApiTransport::new(
                "Alpha Vantage",
                build_http_client(timeout, None),
                RateLimiter::per_minute(rate_limit),
            ),
        }
    }

    async fn query(&self, function: &str, params: &[(&str, &str)]) -> Result<Value, AnalysisError> {
        let url = format!("{}/query", self.base_url);
        let request = self
            .transport
            .client()
            .get(&url)
            .query(&[("function", function), ("apikey", self.api_key.as_str())])
            .query(params);
        let json = self.transport.get_json(request).await?;

        if let Some(message) = json.get("Error Message").and_then(Value::as_str) {
            return Err(AnalysisError::NotFound(message.to_string()));
        }
        // quota and premium-endpoint notices arrive as 200s
        if let Some(message) = json
            .get("Note")
            .or_else(|| json.get("Information"))
            .and_then(Value::as_str)
        {
            tracing::warn!("Alpha Vantage {} refused: {}", function, message);
            return Err(AnalysisError::ApiError(message.to_string()));
        }
        Ok(json)
    }

    pub async fn get_ticker_info(&self, symbol: &str) -> Result<TickerInfo, AnalysisError> {
        let params = [("symbol", symbol)];
        let (overview, quote) = tokio::join!(
            self.query("OVERVIEW", &params),
            self.query("GLOBAL_QUOTE", &params),
        );
        let overview = overview?;
        if overview.as_object().map_or(true, |o| o.is_empty()) {
            return Err(AnalysisError::NotFound(format!("No overview for {}", symbol)));
        }

        let mut info = parse_overview(symbol, &overview);
        if let Some(global) = quote?.get("Global Quote") {
            apply_quote(&mut info, global);
        }
        if !info.has_price() {
            return Err(AnalysisError::NotFound(format!("{} has no quote", symbol)));
        }
        Ok(info)
    }

    pub async fn get_statements(&self, symbol: &str) -> Result<FinancialStatements, AnalysisError> {
        let params = [("symbol", symbol)];
        let (income, balance, cash_flow) = tokio::join!(
            self.query("INCOME_STATEMENT", &params),
            self.query("BALANCE_SHEET", &params),
            self.query("CASH_FLOW", &params),
        );
        Ok(FinancialStatements {
            income: parse_reports(&income?),
            balance_sheet: parse_reports(&balance?),
            cash_flow: parse_reports(&cash_flow?),
        })
    }

    pub async fn get_daily_bars(&self, symbol: &str, range: HistoryRange) -> Result<Vec<Bar>, AnalysisError> {
        // compact returns the latest 100 sessions
        let output_size = if range.to_days() <= 140 { "compact" } else { "full" };
        let json = self
            .query("TIME_SERIES_DAILY", &[("symbol", symbol), ("outputsize", output_size)])
            .await?;

        let cutoff = Utc::now().date_naive() - ChronoDuration::days(range.to_days());
        let series = json
            .get("Time Series (Daily)")
            .and_then(Value::as_object)
            .ok_or_else(|| AnalysisError::NotFound(format!("No daily series for {}", symbol)))?;

        let mut bars: Vec<Bar> = series
            .iter()
            .filter_map(|(day, v)| {
                let date = NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()?;
                if date < cutoff {
                    return None;
                }
                let close = num(v, "4. close")?;
                Some(Bar {
                    timestamp: date.and_hms_opt(0, 0, 0)?.and_utc(),
                    open: num(v, "1. open").unwrap_or(close),
                    high: num(v, "2. high").unwrap_or(close),
                    low: num(v, "3. low").unwrap_or(close),
                    close,
                    volume: num(v, "5. volume").unwrap_or(0.0),
                    vwap: None,
                })
            })
            .collect();
        bars.sort_by_key(|b| b.timestamp);
        Ok(bars)
    }

    pub async fn symbol_search(&self, keywords: &str) -> Result<Vec<SearchHit>, AnalysisError> {
        let json = self.query("SYMBOL_SEARCH", &[("keywords", keywords)]).await?;
        Ok(json
            .get("bestMatches")
            .and_then(Value::as_array)
            .map(|matches| {
                matches
                    .iter()
                    .filter_map(|m| {
                        Some(SearchHit {
                            symbol: text(m, "1. symbol")?,
                            name: text(m, "2. name"),
                            quote_type: text(m, "3. type").map(|t| {
                                if t == "Equity" { "EQUITY".to_string() } else { t.to_uppercase() }
                            }),
                            exchange: text(m, "4. region"),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[async_trait]
impl MarketDataProvider for AlphaVantageClient {
    fn name(&self) -> &'static str {
        "alpha_vantage"
    }

    async fn ticker_info(&self, symbol: &str) -> Result<TickerInfo, AnalysisError> {
        self.get_ticker_info(symbol).await
    }

    async fn statements(&self, symbol: &str) -> Result<FinancialStatements, AnalysisError> {
        self.get_statements(symbol).await
    }

    async fn price_history(&self, symbol: &str, range: HistoryRange) -> Result<Vec<Bar>, AnalysisError> {
        self.get_daily_bars(symbol, range).await
    }

    async fn options_chain(&self, _symbol: &str) -> Result<OptionsChain, AnalysisError> {
        Ok(OptionsChain::default())
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, AnalysisError> {
        self.symbol_search(query).await
    }
}

/// Alpha Vantage encodes every number as a string and uses "None" for gaps.
fn num(node: &Value, key: &str) -> Option<f64> {
    let n = match node.get(key)? {
        Value::String(s) => {
            let s = s.trim().trim_end_matches('%');
            if s.is_empty() || s == "None" || s == "-" {
                return None;
            }
            s.parse::<f64>().ok()?
        }
        Value::Number(n) => n.as_f64()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn text(node: &Value, key: &str) -> Option<String> {
    node.get(key)?
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "None")
        .map(String::from)
}

pub(crate) fn normalize_sector(raw: &str) -> String {
    let upper = raw.trim().to_uppercase();
    if let Some((_, name)) = SECTOR_NAMES.iter().find(|(k, _)| *k == upper) {
        return name.to_string();
    }
    upper
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn parse_overview(symbol: &str, o: &Value) -> TickerInfo {
    let mut info = TickerInfo::new(symbol);
    info.long_name = text(o, "Name");
    info.quote_type = text(o, "AssetType").map(|t| {
        if t == "Common Stock" { "EQUITY".to_string() } else { t.to_uppercase() }
    });
    info.sector = text(o, "Sector").map(|s| normalize_sector(&s));
    info.industry = text(o, "Industry").map(|s| normalize_sector(&s));
    info.description = text(o, "Description");
    info.website = text(o, "OfficialSite");
    info.country = text(o, "Country");

    info.year_high = num(o, "52WeekHigh");
    info.year_low = num(o, "52WeekLow");
    info.market_cap = num(o, "MarketCapitalization");
    info.beta = num(o, "Beta");
    info.trailing_pe = num(o, "TrailingPE").or_else(|| num(o, "PERatio"));
    info.trailing_eps = num(o, "EPS");
    info.price_to_book = num(o, "PriceToBookRatio");
    info.price_to_sales = num(o, "PriceToSalesRatioTTM");
    info.enterprise_to_ebitda = num(o, "EVToEBITDA");
    info.shares_outstanding = num(o, "SharesOutstanding");
    info.dividend_yield = num(o, "DividendYield");

    info.operating_margins = num(o, "OperatingMarginTTM");
    info.profit_margins = num(o, "ProfitMargin");
    info.gross_margins = match (num(o, "GrossProfitTTM"), num(o, "RevenueTTM")) {
        (Some(gp), Some(rev)) if rev != 0.0 => Some(gp / rev),
        _ => None,
    };
    info.return_on_assets = num(o, "ReturnOnAssetsTTM");
    info.return_on_equity = num(o, "ReturnOnEquityTTM");

    info.institutional_ownership = num(o, "PercentInstitutions").map(|p| p / 100.0);
    info.insider_ownership = num(o, "PercentInsiders").map(|p| p / 100.0);

    let rating = |key: &str| num(o, key).map(|n| n.max(0.0) as u32);
    let counts = [
        rating("AnalystRatingStrongBuy"),
        rating("AnalystRatingBuy"),
        rating("AnalystRatingHold"),
        rating("AnalystRatingSell"),
        rating("AnalystRatingStrongSell"),
    ];
    if counts.iter().any(Option::is_some) {
        let [strong_buy, buy, hold, sell, strong_sell] = counts.map(|c| c.unwrap_or(0));
        info.analyst_ratings = Some(AnalystRatings { strong_buy, buy, hold, sell, strong_sell });
    }
    info
}

fn apply_quote(info: &mut TickerInfo, q: &Value) {
    info.price = num(q, "05. price");
    info.change = num(q, "09. change");
    info.change_percent = num(q, "10. change percent");
    info.volume = num(q, "06. volume");
    info.day_high = num(q, "03. high");
    info.day_low = num(q, "04. low");
}

fn parse_reports(json: &Value) -> Statement {
    let mut periods: Vec<StatementPeriod> = json
        .get("annualReports")
        .and_then(Value::as_array)
        .map(|reports| {
            reports
                .iter()
                .map(|report| {
                    let mut items = BTreeMap::new();
                    if let Some(fields) = report.as_object() {
                        for key in fields.keys() {
                            if METADATA_KEYS.contains(&key.as_str()) {
                                continue;
                            }
                            if let Some(value) = num(report, key) {
                                items.entry(fields::label_for(key)).or_insert(value);
                            }
                        }
                    }
                    fields::fill_total_debt(&mut items);
                    StatementPeriod {
                        end_date: report
                            .get("fiscalDateEnding")
                            .and_then(Value::as_str)
                            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()),
                        items,
                    }
                })
                .collect()
        })
        .unwrap_or_default();
    periods.sort_by(|a, b| b.end_date.cmp(&a.end_date));
    Statement { periods }
}
