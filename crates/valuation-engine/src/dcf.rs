use analysis_core::{line_items, AnalysisError, FinancialStatements, TickerInfo};
use serde::{Deserialize, Serialize};

const PROJECTION_YEARS: i32 = 5;

/// Rates used by the cash-flow models.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DcfAssumptions {
    pub growth_rate: f64,
    pub discount_rate: f64,
    pub risk_free_rate: f64,
    pub market_risk_premium: f64,
}

impl Default for DcfAssumptions {
    fn default() -> Self {
        Self {
            growth_rate: 0.05,
            discount_rate: 0.10,
            risk_free_rate: 0.04,
            market_risk_premium: 0.06,
        }
    }
}

impl DcfAssumptions {
    pub fn with_rates(&self, growth_rate: f64, discount_rate: f64) -> Self {
        Self {
            growth_rate,
            discount_rate,
            ..*self
        }
    }
}

/// Latest-period figures the DCF needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DcfInputs {
    pub operating_cash_flow: f64,
    pub capital_expenditure: f64,
    pub total_debt: f64,
    pub cash: f64,
    pub shares_outstanding: f64,
    pub current_price: f64,
}

impl DcfInputs {
    /// Missing line items count as 0 and missing share count as 1.
    pub fn from_sources(info: &TickerInfo, statements: &FinancialStatements) -> Result<Self, AnalysisError> {
        if statements.cash_flow.is_empty() {
            return Err(AnalysisError::InsufficientData("No cash flow data available".to_string()));
        }

        let cash_flow = &statements.cash_flow;
        let balance = &statements.balance_sheet;
        Ok(Self {
            operating_cash_flow: cash_flow.latest(line_items::OPERATING_CASH_FLOW).unwrap_or(0.0),
            capital_expenditure: cash_flow.latest(line_items::CAPITAL_EXPENDITURE).unwrap_or(0.0),
            total_debt: balance.latest(line_items::TOTAL_DEBT).unwrap_or(0.0),
            cash: balance.latest(line_items::CASH).unwrap_or(0.0),
            shares_outstanding: info.shares_outstanding.unwrap_or(1.0),
            current_price: info.price.unwrap_or(0.0),
        })
    }

    pub fn free_cash_flow(&self) -> f64 {
        self.operating_cash_flow - self.capital_expenditure.abs()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DcfValuation {
    pub dcf_value_per_share: f64,
    pub current_price: f64,
    pub upside_potential: f64,
    pub enterprise_value: f64,
    pub equity_value: f64,
    pub free_cash_flow: f64,
    pub terminal_value: f64,
    pub assumptions: DcfAssumptions,
}

/// Five-year projection of the latest free cash flow plus a Gordon-growth
/// terminal value.
pub fn calculate_dcf(inputs: &DcfInputs, assumptions: &DcfAssumptions) -> Result<DcfValuation, AnalysisError> {
    let g = assumptions.growth_rate;
    let r = assumptions.discount_rate;
    if r <= g {
        return Err(AnalysisError::CalculationError(format!(
            "DCF calculation failed: discount rate {} must exceed growth rate {}",
            r, g
        )));
    }

    let fcf = inputs.free_cash_flow();
    let terminal_value = fcf * (1.0 + g) / (r - g);
    let projected_pv: f64 = (1_i32..=PROJECTION_YEARS)
        .map(|year| fcf * (1.0_f64 + g).powi(year) / (1.0_f64 + r).powi(year))
        .sum();
    let enterprise_value = projected_pv + terminal_value / (1.0_f64 + r).powi(PROJECTION_YEARS);
    let equity_value = enterprise_value - inputs.total_debt + inputs.cash;

    let per_share = if inputs.shares_outstanding > 0.0 {
        equity_value / inputs.shares_outstanding
    } else {
        0.0
    };
    let price = inputs.current_price;
    let upside_potential = if price > 0.0 { (per_share - price) / price } else { 0.0 };

    Ok(DcfValuation {
        dcf_value_per_share: per_share,
        current_price: price,
        upside_potential,
        enterprise_value,
        equity_value,
        free_cash_flow: fcf,
        terminal_value,
        assumptions: *assumptions,
    })
}
