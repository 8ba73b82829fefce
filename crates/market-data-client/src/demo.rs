//! Built-in dataset served when upstream APIs are unreachable or `DEMO_MODE`
//! is set. Figures approximate recent fiscal years for a fixed universe of
//! large caps plus the index and sector ETF tickers used by the market
//! overview. Everything is derived deterministically from the table below.

use analysis_core::{
    line_items, AnalysisError, AnalystRatings, Bar, FinancialStatements, HistoryRange,
    InstitutionalHolder, MarketDataProvider, NewsArticle, NewsProvider, OptionContract,
    OptionsChain, SearchHit, Statement, StatementPeriod, TickerInfo,
};
use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate, Utc, Weekday};
use std::collections::BTreeMap;

struct DemoCompany {
    symbol: &'static str,
    name: &'static str,
    sector: &'static str,
    industry: &'static str,
    price: f64,
    market_cap: f64,
    pe: f64,
    pb: f64,
    ps: f64,
    ev_ebitda: f64,
    beta: f64,
    dividend_yield: f64,
    gross_margin: f64,
    operating_margin: f64,
    profit_margin: f64,
    roa: f64,
    roe: f64,
    current_ratio: f64,
    debt_to_equity: f64,
    revenue: f64,
    revenue_growth: f64,
}

/// Zero marks a figure the provider would not report (banks have no gross margin).
#[rustfmt::skip]
const COMPANIES: &[DemoCompany] = &[
    DemoCompany { symbol: "AAPL", name: "Apple Inc.", sector: "Technology", industry: "Consumer Electronics", price: 189.5, market_cap: 2.93e12, pe: 29.4, pb: 47.0, ps: 7.6, ev_ebitda: 22.5, beta: 1.28, dividend_yield: 0.005, gross_margin: 0.46, operating_margin: 0.30, profit_margin: 0.26, roa: 0.22, roe: 1.56, current_ratio: 0.99, debt_to_equity: 1.45, revenue: 3.83e11, revenue_growth: 0.02 },
    DemoCompany { symbol: "MSFT", name: "Microsoft Corporation", sector: "Technology", industry: "Software - Infrastructure", price: 415.0, market_cap: 3.09e12, pe: 36.5, pb: 12.5, ps: 13.6, ev_ebitda: 25.8, beta: 0.90, dividend_yield: 0.007, gross_margin: 0.70, operating_margin: 0.45, profit_margin: 0.36, roa: 0.15, roe: 0.38, current_ratio: 1.27, debt_to_equity: 0.43, revenue: 2.45e11, revenue_growth: 0.15 },
    DemoCompany { symbol: "GOOGL", name: "Alphabet Inc.", sector: "Technology", industry: "Internet Content & Information", price: 172.0, market_cap: 2.12e12, pe: 26.0, pb: 6.9, ps: 6.6, ev_ebitda: 18.0, beta: 1.05, dividend_yield: 0.0046, gross_margin: 0.57, operating_margin: 0.32, profit_margin: 0.26, roa: 0.17, roe: 0.29, current_ratio: 2.10, debt_to_equity: 0.10, revenue: 3.07e11, revenue_growth: 0.09 },
    DemoCompany { symbol: "AMZN", name: "Amazon.com, Inc.", sector: "Technology", industry: "Internet Retail", price: 185.0, market_cap: 1.93e12, pe: 50.0, pb: 8.5, ps: 3.2, ev_ebitda: 21.0, beta: 1.15, dividend_yield: 0.0, gross_margin: 0.48, operating_margin: 0.10, profit_margin: 0.07, roa: 0.07, roe: 0.21, current_ratio: 1.05, debt_to_equity: 0.80, revenue: 5.75e11, revenue_growth: 0.12 },
    DemoCompany { symbol: "META", name: "Meta Platforms, Inc.", sector: "Technology", industry: "Internet Content & Information", price: 480.0, market_cap: 1.22e12, pe: 27.0, pb: 8.2, ps: 9.3, ev_ebitda: 16.0, beta: 1.20, dividend_yield: 0.004, gross_margin: 0.81, operating_margin: 0.38, profit_margin: 0.33, roa: 0.21, roe: 0.33, current_ratio: 2.70, debt_to_equity: 0.29, revenue: 1.35e11, revenue_growth: 0.16 },
    DemoCompany { symbol: "JNJ", name: "Johnson & Johnson", sector: "Healthcare", industry: "Drug Manufacturers - General", price: 152.0, market_cap: 3.66e11, pe: 10.5, pb: 5.3, ps: 4.3, ev_ebitda: 12.0, beta: 0.52, dividend_yield: 0.032, gross_margin: 0.69, operating_margin: 0.25, profit_margin: 0.18, roa: 0.09, roe: 0.37, current_ratio: 1.00, debt_to_equity: 0.44, revenue: 8.52e10, revenue_growth: 0.03 },
    DemoCompany { symbol: "PFE", name: "Pfizer Inc.", sector: "Healthcare", industry: "Drug Manufacturers - General", price: 28.5, market_cap: 1.61e11, pe: 75.0, pb: 1.8, ps: 2.9, ev_ebitda: 11.0, beta: 0.62, dividend_yield: 0.059, gross_margin: 0.56, operating_margin: 0.13, profit_margin: 0.04, roa: 0.01, roe: 0.02, current_ratio: 0.91, debt_to_equity: 0.73, revenue: 5.85e10, revenue_growth: -0.41 },
    DemoCompany { symbol: "UNH", name: "UnitedHealth Group Incorporated", sector: "Healthcare", industry: "Healthcare Plans", price: 495.0, market_cap: 4.56e11, pe: 30.0, pb: 4.6, ps: 1.2, ev_ebitda: 14.0, beta: 0.55, dividend_yield: 0.016, gross_margin: 0.24, operating_margin: 0.08, profit_margin: 0.04, roa: 0.07, roe: 0.15, current_ratio: 0.83, debt_to_equity: 0.70, revenue: 3.72e11, revenue_growth: 0.15 },
    DemoCompany { symbol: "ABBV", name: "AbbVie Inc.", sector: "Healthcare", industry: "Drug Manufacturers - General", price: 165.0, market_cap: 2.92e11, pe: 49.0, pb: 27.0, ps: 5.3, ev_ebitda: 13.5, beta: 0.58, dividend_yield: 0.038, gross_margin: 0.62, operating_margin: 0.24, profit_margin: 0.09, roa: 0.07, roe: 0.57, current_ratio: 0.87, debt_to_equity: 5.70, revenue: 5.43e10, revenue_growth: -0.06 },
    DemoCompany { symbol: "TMO", name: "Thermo Fisher Scientific Inc.", sector: "Healthcare", industry: "Diagnostics & Research", price: 575.0, market_cap: 2.19e11, pe: 36.0, pb: 4.5, ps: 5.1, ev_ebitda: 22.0, beta: 0.78, dividend_yield: 0.0027, gross_margin: 0.40, operating_margin: 0.17, profit_margin: 0.14, roa: 0.06, roe: 0.13, current_ratio: 1.75, debt_to_equity: 0.74, revenue: 4.29e10, revenue_growth: -0.05 },
    DemoCompany { symbol: "JPM", name: "JPMorgan Chase & Co.", sector: "Financial Services", industry: "Banks - Diversified", price: 198.0, market_cap: 5.69e11, pe: 11.9, pb: 1.8, ps: 3.7, ev_ebitda: 0.0, beta: 1.10, dividend_yield: 0.023, gross_margin: 0.0, operating_margin: 0.40, profit_margin: 0.33, roa: 0.013, roe: 0.17, current_ratio: 0.0, debt_to_equity: 1.30, revenue: 1.58e11, revenue_growth: 0.23 },
    DemoCompany { symbol: "BAC", name: "Bank of America Corporation", sector: "Financial Services", industry: "Banks - Diversified", price: 37.5, market_cap: 2.93e11, pe: 12.9, pb: 1.1, ps: 3.0, ev_ebitda: 0.0, beta: 1.33, dividend_yield: 0.026, gross_margin: 0.0, operating_margin: 0.31, profit_margin: 0.27, roa: 0.009, roe: 0.09, current_ratio: 0.0, debt_to_equity: 1.10, revenue: 9.90e10, revenue_growth: 0.04 },
    DemoCompany { symbol: "WFC", name: "Wells Fargo & Company", sector: "Financial Services", industry: "Banks - Diversified", price: 58.0, market_cap: 2.05e11, pe: 12.0, pb: 1.2, ps: 2.5, ev_ebitda: 0.0, beta: 1.17, dividend_yield: 0.024, gross_margin: 0.0, operating_margin: 0.30, profit_margin: 0.25, roa: 0.010, roe: 0.11, current_ratio: 0.0, debt_to_equity: 1.10, revenue: 8.30e10, revenue_growth: 0.11 },
    DemoCompany { symbol: "GS", name: "The Goldman Sachs Group, Inc.", sector: "Financial Services", industry: "Capital Markets", price: 455.0, market_cap: 1.47e11, pe: 17.8, pb: 1.3, ps: 3.2, ev_ebitda: 0.0, beta: 1.38, dividend_yield: 0.025, gross_margin: 0.0, operating_margin: 0.24, profit_margin: 0.18, roa: 0.0055, roe: 0.08, current_ratio: 0.0, debt_to_equity: 2.90, revenue: 4.60e10, revenue_growth: -0.02 },
    DemoCompany { symbol: "MS", name: "Morgan Stanley", sector: "Financial Services", industry: "Capital Markets", price: 97.0, market_cap: 1.58e11, pe: 17.0, pb: 1.6, ps: 2.9, ev_ebitda: 0.0, beta: 1.36, dividend_yield: 0.036, gross_margin: 0.0, operating_margin: 0.21, profit_margin: 0.16, roa: 0.008, roe: 0.09, current_ratio: 0.0, debt_to_equity: 3.40, revenue: 5.40e10, revenue_growth: 0.02 },
];

/// Indices and sector ETFs: (symbol, name, quote type, price).
const FUNDS: &[(&str, &str, &str, f64)] = &[
    ("^GSPC", "S&P 500", "INDEX", 5300.0),
    ("^IXIC", "NASDAQ Composite", "INDEX", 16800.0),
    ("^DJI", "Dow Jones Industrial Average", "INDEX", 39000.0),
    ("^VIX", "CBOE Volatility Index", "INDEX", 13.5),
    ("XLK", "Technology Select Sector SPDR Fund", "ETF", 215.0),
    ("XLV", "Health Care Select Sector SPDR Fund", "ETF", 145.0),
    ("XLF", "Financial Select Sector SPDR Fund", "ETF", 41.5),
    ("XLY", "Consumer Discretionary Select Sector SPDR Fund", "ETF", 178.0),
    ("XLP", "Consumer Staples Select Sector SPDR Fund", "ETF", 77.0),
    ("XLI", "Industrial Select Sector SPDR Fund", "ETF", 124.0),
    ("XLE", "Energy Select Sector SPDR Fund", "ETF", 92.0),
    ("XLB", "Materials Select Sector SPDR Fund", "ETF", 89.0),
    ("XLRE", "Real Estate Select Sector SPDR Fund", "ETF", 37.5),
    ("XLU", "Utilities Select Sector SPDR Fund", "ETF", 70.0),
    ("XLC", "Communication Services Select Sector SPDR Fund", "ETF", 82.0),
];

const HEADLINES: &[(&str, &str)] = &[
    ("{} reports strong quarterly earnings, beating analyst expectations", "Revenue growth and record margins lifted profit."),
    ("Analysts upgrade {} on robust demand outlook", "Several brokers raised price targets after positive guidance."),
    ("{} announces new product launch to expand market share", "The company unveiled an innovative lineup."),
    ("{} shares slip amid broader market volatility", "Investors weighed concerns about interest rates and slowing growth."),
    ("Regulators open review of {} business practices", "The probe adds uncertainty but analysts see limited risk."),
    ("{} names new chief financial officer", "The executive appointment follows a planned leadership transition."),
];

fn seed(symbol: &str) -> u64 {
    symbol
        .bytes()
        .fold(1469598103934665603u64, |h, b| (h ^ b as u64).wrapping_mul(1099511628211))
}

fn known(v: f64) -> Option<f64> {
    (v != 0.0).then_some(v)
}

/// Deterministic daily move in percent, between -1.5 and +2.5.
fn daily_change_percent(symbol: &str) -> f64 {
    ((seed(symbol) % 41) as f64 - 15.0) / 10.0
}

fn company(symbol: &str) -> Option<&'static DemoCompany> {
    COMPANIES.iter().find(|c| c.symbol.eq_ignore_ascii_case(symbol))
}

fn fund(symbol: &str) -> Option<&'static (&'static str, &'static str, &'static str, f64)> {
    FUNDS.iter().find(|f| f.0.eq_ignore_ascii_case(symbol))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DemoProvider;

impl DemoProvider {
    pub fn new() -> Self {
        Self
    }

    pub fn symbols() -> impl Iterator<Item = &'static str> {
        COMPANIES.iter().map(|c| c.symbol).chain(FUNDS.iter().map(|f| f.0))
    }

    pub fn knows(symbol: &str) -> bool {
        company(symbol).is_some() || fund(symbol).is_some()
    }

    fn info_for(symbol: &str) -> Option<TickerInfo> {
        let change_pct = daily_change_percent(symbol);

        if let Some(c) = company(symbol) {
            let mut info = TickerInfo::new(c.symbol);
            info.long_name = Some(c.name.to_string());
            info.short_name = Some(c.name.to_string());
            info.quote_type = Some("EQUITY".to_string());
            info.sector = Some(c.sector.to_string());
            info.industry = Some(c.industry.to_string());
            info.description = Some(format!(
                "{} operates in the {} industry within the {} sector.",
                c.name, c.industry, c.sector
            ));
            info.country = Some("United States".to_string());

            let shares = c.market_cap / c.price;
            let volume = shares * 0.008;
            info.price = Some(c.price);
            info.change_percent = Some(change_pct);
            info.change = Some(c.price * change_pct / (100.0 + change_pct));
            info.volume = Some(volume);
            info.average_volume = Some(volume * 1.1);
            info.day_high = Some(c.price * 1.01);
            info.day_low = Some(c.price * 0.99);
            info.year_high = Some(c.price * 1.18);
            info.year_low = Some(c.price * 0.78);

            info.market_cap = Some(c.market_cap);
            info.enterprise_value = Some(c.market_cap * (1.0 + 0.1 * c.debt_to_equity));
            info.beta = Some(c.beta);
            info.trailing_pe = known(c.pe);
            info.trailing_eps = known(c.pe).map(|pe| c.price / pe);
            info.price_to_book = known(c.pb);
            info.price_to_sales = known(c.ps);
            info.enterprise_to_ebitda = known(c.ev_ebitda);
            info.shares_outstanding = Some(shares);
            info.float_shares = Some(shares * 0.99);
            info.short_ratio = Some(1.5 + (seed(symbol) % 20) as f64 / 10.0);
            info.dividend_yield = known(c.dividend_yield);

            info.gross_margins = known(c.gross_margin);
            info.operating_margins = known(c.operating_margin);
            info.profit_margins = known(c.profit_margin);
            info.return_on_assets = known(c.roa);
            info.return_on_equity = known(c.roe);
            info.current_ratio = known(c.current_ratio);
            info.quick_ratio = known(c.current_ratio).map(|r| r * 0.85);
            info.debt_to_equity = known(c.debt_to_equity);
            info.asset_turnover = known(c.roa / c.profit_margin);

            let s = seed(symbol);
            info.institutional_ownership = Some(0.55 + (s % 25) as f64 / 100.0);
            info.insider_ownership = Some(0.001 + (s % 7) as f64 / 1000.0);
            info.analyst_ratings = Some(AnalystRatings {
                strong_buy: 5 + (s % 9) as u32,
                buy: 10 + (s % 13) as u32,
                hold: 4 + (s % 8) as u32,
                sell: (s % 3) as u32,
                strong_sell: (s % 2) as u32,
            });
            info.top_holders = ["Vanguard Group Inc", "BlackRock Inc.", "State Street Corporation"]
                .iter()
                .enumerate()
                .map(|(i, name)| InstitutionalHolder {
                    name: name.to_string(),
                    shares: Some(shares * (0.085 - 0.02 * i as f64)),
                    pct_change: Some(((s >> (i * 3)) % 5) as f64 / 100.0 - 0.02),
                })
                .collect();
            return Some(info);
        }

        let (sym, name, quote_type, price) = *fund(symbol)?;
        let mut info = TickerInfo::new(sym);
        info.long_name = Some(name.to_string());
        info.short_name = Some(name.to_string());
        info.quote_type = Some(quote_type.to_string());
        info.price = Some(price);
        info.change_percent = Some(change_pct);
        info.change = Some(price * change_pct / (100.0 + change_pct));
        if quote_type == "ETF" {
            info.volume = Some(5.0e6 + (seed(sym) % 50) as f64 * 2.0e5);
        }
        Some(info)
    }

    fn statements_for(symbol: &str) -> Option<FinancialStatements> {
        let c = company(symbol)?;
        let year = Utc::now().year() - 1;
        let equity = c.market_cap / c.pb.max(0.1);
        let mut income = Vec::new();
        let mut balance = Vec::new();
        let mut cash_flow = Vec::new();

        for i in 0..4 {
            let end_date = NaiveDate::from_ymd_opt(year - i, 12, 31);
            let revenue = c.revenue / (1.0 + c.revenue_growth).powi(i);
            let net_income = revenue * c.profit_margin;
            let scale = revenue / c.revenue;

            let mut items = BTreeMap::new();
            items.insert(line_items::TOTAL_REVENUE.to_string(), revenue);
            if c.gross_margin > 0.0 {
                items.insert(line_items::COST_OF_REVENUE.to_string(), revenue * (1.0 - c.gross_margin));
                items.insert(line_items::GROSS_PROFIT.to_string(), revenue * c.gross_margin);
            }
            items.insert(line_items::OPERATING_INCOME.to_string(), revenue * c.operating_margin);
            items.insert("Operating Expenses".to_string(), revenue * (c.gross_margin - c.operating_margin).max(0.0));
            items.insert(line_items::NET_INCOME.to_string(), net_income);
            income.push(StatementPeriod { end_date, items });

            let mut items = BTreeMap::new();
            items.insert(line_items::STOCKHOLDERS_EQUITY.to_string(), equity * scale);
            items.insert(line_items::TOTAL_DEBT.to_string(), equity * c.debt_to_equity * scale);
            items.insert(line_items::CASH.to_string(), revenue * 0.1);
            items.insert(line_items::GOODWILL.to_string(), equity * 0.05 * scale);
            items.insert(line_items::INTANGIBLE_ASSETS.to_string(), equity * 0.02 * scale);
            items.insert(line_items::TOTAL_ASSETS.to_string(), net_income / c.roa.max(0.001));
            balance.push(StatementPeriod { end_date, items });

            let mut items = BTreeMap::new();
            items.insert(line_items::OPERATING_CASH_FLOW.to_string(), net_income * 1.2);
            items.insert(line_items::CAPITAL_EXPENDITURE.to_string(), -revenue * 0.05);
            cash_flow.push(StatementPeriod { end_date, items });
        }

        Some(FinancialStatements {
            income: Statement { periods: income },
            balance_sheet: Statement { periods: balance },
            cash_flow: Statement { periods: cash_flow },
        })
    }

    /// Weekday bars ending today whose last close equals the quoted price.
    fn history_for(symbol: &str, range: HistoryRange) -> Option<Vec<Bar>> {
        let price = Self::info_for(symbol)?.price?;
        let count = (range.to_days() * 252 / 365).max(1) as usize;
        let s = seed(symbol);
        let phase = (s % 628) as f64 / 100.0;
        let drift = ((s % 31) as f64 - 10.0) / 100.0;

        let raw: Vec<f64> = (0..count)
            .map(|i| {
                let t = i as f64;
                1.0 + drift * t / count as f64 + 0.05 * (t / 11.0 + phase).sin() + 0.02 * (t / 3.0).cos()
            })
            .collect();
        let last = raw.last().copied().unwrap_or(1.0);

        let mut dates = Vec::with_capacity(count);
        let mut day = Utc::now().date_naive();
        while dates.len() < count {
            if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
                dates.push(day);
            }
            day -= Duration::days(1);
        }
        dates.reverse();

        let base_volume = 2.0e7 + (s % 100) as f64 * 1.0e5;
        Some(
            dates
                .into_iter()
                .zip(raw)
                .enumerate()
                .filter_map(|(i, (date, r))| {
                    let close = price * r / last;
                    Some(Bar {
                        timestamp: date.and_hms_opt(21, 0, 0)?.and_utc(),
                        open: close * 0.998,
                        high: close * 1.01,
                        low: close * 0.99,
                        close,
                        volume: base_volume * (1.0 + 0.3 * (i as f64 / 5.0).sin()),
                        vwap: None,
                    })
                })
                .collect(),
        )
    }

    fn options_for(symbol: &str) -> Option<OptionsChain> {
        let c = company(symbol)?;
        let s = seed(symbol);
        let iv = 0.18 + c.beta * 0.08;
        let strikes: Vec<f64> = (-2..=2).map(|k| (c.price * (1.0 + 0.05 * k as f64)).round()).collect();
        let contract = |strike: f64, volume: f64| OptionContract {
            strike,
            volume: Some(volume.round()),
            implied_volatility: Some(iv),
        };
        let call_base = 1_000.0 + (s % 500) as f64;
        let put_base = 700.0 + (s % 700) as f64;

        Some(OptionsChain {
            expiration: Some(Utc::now().date_naive() + Duration::days(7)),
            calls: strikes.iter().enumerate().map(|(i, k)| contract(*k, call_base / (1.0 + i as f64))).collect(),
            puts: strikes.iter().rev().enumerate().map(|(i, k)| contract(*k, put_base / (1.0 + i as f64))).collect(),
        })
    }

    /// Headlines for a company or a free-text query, newest first.
    pub fn headlines(query: &str, limit: usize) -> Vec<NewsArticle> {
        let name = company(query)
            .map(|c| c.name)
            .or_else(|| {
                COMPANIES
                    .iter()
                    .find(|c| c.name.to_lowercase().contains(&query.to_lowercase()))
                    .map(|c| c.name)
            })
            .unwrap_or(query);
        let now = Utc::now();

        HEADLINES
            .iter()
            .enumerate()
            .take(limit)
            .map(|(i, (title, description))| {
                let title = title.replace("{}", name);
                let url = format!("https://demo.invalid/news/{}/{}", seed(name) % 10_000, i);
                NewsArticle {
                    id: url.clone(),
                    title,
                    author: None,
                    source: Some(["Demo Wire", "Market Desk", "Sample Financial Times"][i % 3].to_string()),
                    published_utc: now - Duration::days(i as i64 * 2),
                    article_url: url,
                    description: Some(description.to_string()),
                    keywords: Vec::new(),
                    tickers: Vec::new(),
                }
            })
            .collect()
    }
}

#[async_trait]
impl MarketDataProvider for DemoProvider {
    fn name(&self) -> &'static str {
        "demo"
    }

    async fn ticker_info(&self, symbol: &str) -> Result<TickerInfo, AnalysisError> {
        Self::info_for(symbol).ok_or_else(|| AnalysisError::NotFound(format!("{} is not in the demo dataset", symbol)))
    }

    async fn statements(&self, symbol: &str) -> Result<FinancialStatements, AnalysisError> {
        Ok(Self::statements_for(symbol).unwrap_or_default())
    }

    async fn price_history(&self, symbol: &str, range: HistoryRange) -> Result<Vec<Bar>, AnalysisError> {
        Self::history_for(symbol, range)
            .ok_or_else(|| AnalysisError::NotFound(format!("{} is not in the demo dataset", symbol)))
    }

    async fn options_chain(&self, symbol: &str) -> Result<OptionsChain, AnalysisError> {
        Ok(Self::options_for(symbol).unwrap_or_default())
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, AnalysisError> {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return Ok(Vec::new());
        }
        Ok(COMPANIES
            .iter()
            .filter(|c| c.symbol.to_lowercase().starts_with(&q) || c.name.to_lowercase().contains(&q))
            .map(|c| SearchHit {
                symbol: c.symbol.to_string(),
                name: Some(c.name.to_string()),
                quote_type: Some("EQUITY".to_string()),
                exchange: Some("NMS".to_string()),
            })
            .collect())
    }
}

#[async_trait]
impl NewsProvider for DemoProvider {
    async fn articles(&self, query: &str, limit: u32) -> Result<Vec<NewsArticle>, AnalysisError> {
        Ok(Self::headlines(query, limit as usize))
    }
}
