use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// OHLCV bar data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    #[serde(default)]
    pub vwap: Option<f64>,
}

/// Lookback window for price history requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HistoryRange {
    Month1,
    Month6,
    Year1,
    Year2,
    Year5,
}

impl HistoryRange {
    pub fn to_days(&self) -> i64 {
        match self {
            HistoryRange::Month1 => 30,
            HistoryRange::Month6 => 182,
            HistoryRange::Year1 => 365,
            HistoryRange::Year2 => 730,
            HistoryRange::Year5 => 1826,
        }
    }

    /// Range token understood by the Yahoo chart endpoint.
    pub fn as_range_param(&self) -> &'static str {
        match self {
            HistoryRange::Month1 => "1mo",
            HistoryRange::Month6 => "6mo",
            HistoryRange::Year1 => "1y",
            HistoryRange::Year2 => "2y",
            HistoryRange::Year5 => "5y",
        }
    }
}

/// Analyst recommendation counts for the current month
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalystRatings {
    pub strong_buy: u32,
    pub buy: u32,
    pub hold: u32,
    pub sell: u32,
    pub strong_sell: u32,
}

impl AnalystRatings {
    pub fn total(&self) -> u32 {
        self.strong_buy + self.buy + self.hold + self.sell + self.strong_sell
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstitutionalHolder {
    pub name: String,
    pub shares: Option<f64>,
    /// Fractional change in position since the previous filing
    pub pct_change: Option<f64>,
}

/// Quote, profile and key statistics for one symbol.
///
/// Ratios are plain fractions (`0.25` = 25%), including `debt_to_equity`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickerInfo {
    pub symbol: String,
    pub long_name: Option<String>,
    pub short_name: Option<String>,
    pub quote_type: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub country: Option<String>,
    pub employees: Option<i64>,
    pub ceo: Option<String>,

    pub price: Option<f64>,
    pub change: Option<f64>,
    pub change_percent: Option<f64>,
    pub volume: Option<f64>,
    pub average_volume: Option<f64>,
    pub day_high: Option<f64>,
    pub day_low: Option<f64>,
    pub year_high: Option<f64>,
    pub year_low: Option<f64>,

    pub market_cap: Option<f64>,
    pub enterprise_value: Option<f64>,
    pub beta: Option<f64>,
    pub trailing_pe: Option<f64>,
    pub trailing_eps: Option<f64>,
    pub price_to_book: Option<f64>,
    pub price_to_sales: Option<f64>,
    pub enterprise_to_ebitda: Option<f64>,
    pub shares_outstanding: Option<f64>,
    pub float_shares: Option<f64>,
    pub short_ratio: Option<f64>,
    pub dividend_yield: Option<f64>,

    pub gross_margins: Option<f64>,
    pub operating_margins: Option<f64>,
    pub profit_margins: Option<f64>,
    pub return_on_assets: Option<f64>,
    pub return_on_equity: Option<f64>,
    pub return_on_capital: Option<f64>,
    pub current_ratio: Option<f64>,
    pub quick_ratio: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub interest_coverage: Option<f64>,
    pub asset_turnover: Option<f64>,
    pub inventory_turnover: Option<f64>,
    pub receivables_turnover: Option<f64>,

    pub institutional_ownership: Option<f64>,
    pub insider_ownership: Option<f64>,
    pub analyst_ratings: Option<AnalystRatings>,
    #[serde(default)]
    pub top_holders: Vec<InstitutionalHolder>,
}

impl TickerInfo {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Default::default()
        }
    }

    pub fn display_name(&self) -> String {
        self.long_name
            .clone()
            .or_else(|| self.short_name.clone())
            .unwrap_or_else(|| "Unknown".to_string())
    }

    /// A symbol is considered tradable once a regular market price is known.
    pub fn has_price(&self) -> bool {
        self.price.map_or(false, |p| p.is_finite())
    }

    /// Fill empty fields from a secondary source, keeping what is already set.
    pub fn merge_missing(&mut self, other: &TickerInfo) {
        macro_rules! fill {
            ($($field:ident),* $(,)?) => {
                $(if self.$field.is_none() { self.$field = other.$field.clone(); })*
            };
        }
        fill!(
            long_name, short_name, quote_type, sector, industry, description, website, country,
            employees, ceo, price, change, change_percent, volume, average_volume, day_high,
            day_low, year_high, year_low, market_cap, enterprise_value, beta, trailing_pe,
            trailing_eps, price_to_book, price_to_sales, enterprise_to_ebitda, shares_outstanding,
            float_shares, short_ratio, dividend_yield, gross_margins, operating_margins,
            profit_margins, return_on_assets, return_on_equity, return_on_capital, current_ratio,
            quick_ratio, debt_to_equity, interest_coverage, asset_turnover, inventory_turnover,
            receivables_turnover, institutional_ownership, insider_ownership, analyst_ratings,
        );
        if self.top_holders.is_empty() {
            self.top_holders = other.top_holders.clone();
        }
    }
}

/// Canonical statement line-item labels shared by every provider.
pub mod line_items {
    pub const TOTAL_REVENUE: &str = "Total Revenue";
    pub const COST_OF_REVENUE: &str = "Cost Of Revenue";
    pub const GROSS_PROFIT: &str = "Gross Profit";
    pub const OPERATING_INCOME: &str = "Operating Income";
    pub const NET_INCOME: &str = "Net Income";
    pub const OPERATING_CASH_FLOW: &str = "Operating Cash Flow";
    pub const CAPITAL_EXPENDITURE: &str = "Capital Expenditure";
    pub const TOTAL_DEBT: &str = "Total Debt";
    pub const CASH: &str = "Cash";
    pub const STOCKHOLDERS_EQUITY: &str = "Stockholders Equity";
    pub const GOODWILL: &str = "Goodwill";
    pub const INTANGIBLE_ASSETS: &str = "Intangible Assets";
    pub const TOTAL_ASSETS: &str = "Total Assets";
}

/// One reporting period of a financial statement
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatementPeriod {
    pub end_date: Option<NaiveDate>,
    pub items: BTreeMap<String, f64>,
}

/// Annual statement history, newest period first
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Statement {
    pub periods: Vec<StatementPeriod>,
}

impl Statement {
    pub fn is_empty(&self) -> bool {
        self.periods.iter().all(|p| p.items.is_empty())
    }

    pub fn contains(&self, item: &str) -> bool {
        self.periods.iter().any(|p| p.items.contains_key(item))
    }

    /// Most recent reported value of a line item.
    pub fn latest(&self, item: &str) -> Option<f64> {
        self.periods.first().and_then(|p| p.items.get(item).copied())
    }

    /// Up to `n` newest values; periods missing the item report 0.
    pub fn series(&self, item: &str, n: usize) -> Vec<f64> {
        if !self.contains(item) {
            return Vec::new();
        }
        self.periods
            .iter()
            .take(n)
            .map(|p| p.items.get(item).copied().unwrap_or(0.0))
            .collect()
    }

    /// Line items of the most recent period, in label order.
    pub fn line_items(&self) -> impl Iterator<Item = (&String, &f64)> {
        self.periods.iter().take(1).flat_map(|p| p.items.iter())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinancialStatements {
    pub income: Statement,
    pub balance_sheet: Statement,
    pub cash_flow: Statement,
}

impl FinancialStatements {
    pub fn is_empty(&self) -> bool {
        self.income.is_empty() && self.balance_sheet.is_empty() && self.cash_flow.is_empty()
    }
}

/// News article
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsArticle {
    pub id: String,
    pub title: String,
    pub author: Option<String>,
    pub source: Option<String>,
    pub published_utc: DateTime<Utc>,
    pub article_url: String,
    pub description: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub tickers: Vec<String>,
}

impl NewsArticle {
    /// Title and description joined for scoring.
    pub fn scoring_text(&self) -> String {
        format!("{} {}", self.title, self.description.as_deref().unwrap_or(""))
    }
}

/// Social media post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialPost {
    pub id: String,
    pub text: String,
    pub created_at: Option<DateTime<Utc>>,
    /// Likes + reposts + replies + quotes
    pub engagement: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionContract {
    pub strike: f64,
    pub volume: Option<f64>,
    pub implied_volatility: Option<f64>,
}

/// Option chain for the nearest expiration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptionsChain {
    pub expiration: Option<NaiveDate>,
    pub calls: Vec<OptionContract>,
    pub puts: Vec<OptionContract>,
}

impl OptionsChain {
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty() && self.puts.is_empty()
    }
}

/// Symbol search hit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub symbol: String,
    pub name: Option<String>,
    pub quote_type: Option<String>,
    pub exchange: Option<String>,
}

impl SearchHit {
    pub fn is_equity(&self) -> bool {
        self.quote_type
            .as_deref()
            .map_or(false, |t| t.eq_ignore_ascii_case("EQUITY"))
    }
}
