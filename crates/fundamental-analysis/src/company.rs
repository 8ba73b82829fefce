use analysis_core::{SearchHit, TickerInfo};
use serde::{Deserialize, Serialize};

/// Profile block at the top of the research payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyInfo {
    pub symbol: String,
    pub name: String,
    pub sector: String,
    pub industry: String,
    pub market_cap: Option<f64>,
    pub enterprise_value: Option<f64>,
    pub description: String,
    pub website: String,
    pub country: String,
    pub employees: Option<i64>,
    pub ceo: String,
}

impl CompanyInfo {
    pub fn from_ticker(info: &TickerInfo) -> Self {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        Self {
            symbol: info.symbol.clone(),
            name: info.display_name(),
            sector: info.sector.clone().unwrap_or_else(|| "Unknown".to_string()),
            industry: info.industry.clone().unwrap_or_else(|| "Unknown".to_string()),
            market_cap: info.market_cap,
            enterprise_value: info.enterprise_value,
            description: text(&info.description),
            website: text(&info.website),
            country: text(&info.country),
            employees: info.employees,
            ceo: info.ceo.clone().unwrap_or_else(|| "Unknown".to_string()),
        }
    }
}

/// One row of the company search dropdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanySummary {
    pub symbol: String,
    pub name: String,
    pub sector: String,
}

impl CompanySummary {
    pub fn from_ticker(info: &TickerInfo) -> Self {
        Self {
            symbol: info.symbol.clone(),
            name: info.display_name(),
            sector: info.sector.clone().unwrap_or_else(|| "Unknown".to_string()),
        }
    }

    /// Search hits carry no sector.
    pub fn from_hit(hit: &SearchHit) -> Self {
        Self {
            symbol: hit.symbol.clone(),
            name: hit.name.clone().unwrap_or_else(|| hit.symbol.clone()),
            sector: "Unknown".to_string(),
        }
    }
}
