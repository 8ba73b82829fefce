use crate::dcf::{DcfAssumptions, DcfValuation};
use crate::peers::PeerComparison;
use crate::Outcome;
use analysis_core::{line_items, FinancialStatements, TickerInfo};
use fundamental_analysis::FinancialData;
use serde::{Deserialize, Serialize};

// Market-wide multiples used when the quote feed has no figure.
const FALLBACK_PE: f64 = 15.0;
const FALLBACK_PB: f64 = 2.0;
const FALLBACK_PS: f64 = 3.0;
const FALLBACK_PCF: f64 = 10.0;
const FALLBACK_EV_EBITDA: f64 = 12.0;
const FALLBACK_DIVIDEND_YIELD: f64 = 0.02;
const DIVIDEND_GROWTH_RATE: f64 = 0.03;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicDcf {
    pub dcf_value: f64,
    pub free_cash_flow: f64,
    pub terminal_value: f64,
    pub growth_rate: f64,
    pub discount_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelativeValuations {
    pub pe_ratio: f64,
    pub pb_ratio: f64,
    pub ev_ebitda: f64,
    pub peg_ratio: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetBasedValuation {
    pub book_value: f64,
    pub tangible_book_value: f64,
    pub liquidation_value: f64,
    pub replacement_cost: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DividendDiscountModel {
    pub dividend_yield: f64,
    pub dividend_growth_rate: f64,
    pub ddm_value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationRatios {
    pub price_to_earnings: f64,
    pub price_to_book: f64,
    pub price_to_sales: f64,
    pub price_to_cash_flow: f64,
    pub enterprise_value_to_ebitda: f64,
    pub return_on_invested_capital: f64,
    pub economic_value_added: f64,
}

/// The `valuations` block of the research payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Valuations {
    pub dcf_valuation: Outcome<BasicDcf>,
    pub relative_valuations: RelativeValuations,
    pub asset_based_valuation: AssetBasedValuation,
    pub dividend_discount_model: DividendDiscountModel,
    pub valuation_ratios: ValuationRatios,
    /// P/E the recommendation is scored on.
    pub pe_ratio: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dcf_detailed: Option<Outcome<DcfValuation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer_comparison: Option<PeerComparison>,
}

pub fn calculate_valuations(
    financial: &FinancialData,
    info: &TickerInfo,
    statements: &FinancialStatements,
    assumptions: &DcfAssumptions,
) -> Valuations {
    let relative_valuations = relative_valuations(financial, info);
    let pe_ratio = relative_valuations.pe_ratio;

    Valuations {
        dcf_valuation: basic_dcf(financial, assumptions),
        relative_valuations,
        asset_based_valuation: asset_based(statements),
        dividend_discount_model: dividend_discount(info, assumptions),
        valuation_ratios: valuation_ratios(financial, info),
        pe_ratio,
        dcf_detailed: None,
        peer_comparison: None,
    }
}

/// Operating cash flow capitalised without discounting the projection years.
pub fn basic_dcf(financial: &FinancialData, assumptions: &DcfAssumptions) -> Outcome<BasicDcf> {
    let Some(fcf) = financial.latest_operating_cash_flow() else {
        return Outcome::error("Insufficient cash flow data");
    };
    let g = assumptions.growth_rate;
    let r = assumptions.discount_rate;
    if r <= g {
        return Outcome::error("Basic DCF calculation failed");
    }

    let terminal_value = fcf * (1.0 + g) / (r - g);
    let projected = fcf * 5.0;
    Outcome::Value(BasicDcf {
        dcf_value: projected + terminal_value / (1.0_f64 + r).powi(5),
        free_cash_flow: fcf,
        terminal_value,
        growth_rate: g,
        discount_rate: r,
    })
}

pub fn relative_valuations(financial: &FinancialData, info: &TickerInfo) -> RelativeValuations {
    let pe_ratio = info.trailing_pe.unwrap_or(FALLBACK_PE);
    let peg_ratio = financial
        .growth_metrics
        .revenue_growth_1y
        .filter(|g| *g != 0.0)
        .map(|g| pe_ratio / (g * 100.0));

    RelativeValuations {
        pe_ratio,
        pb_ratio: info.price_to_book.unwrap_or(FALLBACK_PB),
        ev_ebitda: info.enterprise_to_ebitda.unwrap_or(FALLBACK_EV_EBITDA),
        peg_ratio,
    }
}

pub fn asset_based(statements: &FinancialStatements) -> AssetBasedValuation {
    let balance = &statements.balance_sheet;
    let book_value = balance.latest(line_items::STOCKHOLDERS_EQUITY).unwrap_or(0.0);
    let goodwill = balance.latest(line_items::GOODWILL).unwrap_or(0.0);
    let intangibles = balance.latest(line_items::INTANGIBLE_ASSETS).unwrap_or(0.0);

    AssetBasedValuation {
        book_value,
        tangible_book_value: book_value - goodwill - intangibles,
        liquidation_value: 0.0,
        replacement_cost: 0.0,
    }
}

/// Gordon growth on the current dividend; 0 without a price or a reported
/// yield.
pub fn dividend_discount(info: &TickerInfo, assumptions: &DcfAssumptions) -> DividendDiscountModel {
    let r = assumptions.discount_rate;
    let g = DIVIDEND_GROWTH_RATE;
    let ddm_value = match (info.price, info.dividend_yield) {
        (Some(price), Some(yield_)) if price > 0.0 && r > g => price * yield_ * (1.0 + g) / (r - g),
        _ => 0.0,
    };

    DividendDiscountModel {
        dividend_yield: info.dividend_yield.unwrap_or(FALLBACK_DIVIDEND_YIELD),
        dividend_growth_rate: g,
        ddm_value,
    }
}

pub fn valuation_ratios(financial: &FinancialData, info: &TickerInfo) -> ValuationRatios {
    let price_to_cash_flow = match (info.market_cap, financial.latest_operating_cash_flow()) {
        (Some(cap), Some(ocf)) if ocf > 0.0 => cap / ocf,
        _ => FALLBACK_PCF,
    };

    ValuationRatios {
        price_to_earnings: info.trailing_pe.unwrap_or(FALLBACK_PE),
        price_to_book: info.price_to_book.unwrap_or(FALLBACK_PB),
        price_to_sales: info.price_to_sales.unwrap_or(FALLBACK_PS),
        price_to_cash_flow,
        enterprise_value_to_ebitda: info.enterprise_to_ebitda.unwrap_or(FALLBACK_EV_EBITDA),
        return_on_invested_capital: financial.profitability_metrics.roic.unwrap_or(0.0),
        economic_value_added: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::{Statement, StatementPeriod};

    fn financial_with_cash_flow(values: &[f64]) -> FinancialData {
        let mut data = FinancialData::default();
        data.historical_data.cash_flow_5y = values.to_vec();
        data
    }

    #[test]
    fn test_basic_dcf() {
        let result = basic_dcf(&financial_with_cash_flow(&[100.0, 90.0]), &DcfAssumptions::default());
        let dcf = result.value().unwrap();

        assert_eq!(dcf.free_cash_flow, 100.0);
        assert!((dcf.terminal_value - 2100.0).abs() < 1e-9);
        assert!((dcf.dcf_value - (500.0 + 2100.0 / 1.1f64.powi(5))).abs() < 1e-6);
    }

    #[test]
    fn test_basic_dcf_without_cash_flow() {
        let result = basic_dcf(&FinancialData::default(), &DcfAssumptions::default());
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["error"], "Insufficient cash flow data");
    }

    #[test]
    fn test_relative_valuations_placeholders_and_peg() {
        let mut financial = FinancialData::default();
        let info = TickerInfo::new("X");

        let rel = relative_valuations(&financial, &info);
        assert_eq!((rel.pe_ratio, rel.pb_ratio, rel.ev_ebitda), (15.0, 2.0, 12.0));
        assert!(rel.peg_ratio.is_none());

        financial.growth_metrics.revenue_growth_1y = Some(0.10);
        let rel = relative_valuations(&financial, &info);
        assert!((rel.peg_ratio.unwrap() - 1.5).abs() < 1e-12);

        financial.growth_metrics.revenue_growth_1y = Some(0.0);
        assert!(relative_valuations(&financial, &info).peg_ratio.is_none());
    }

    #[test]
    fn test_asset_based_tangible_book() {
        let statements = FinancialStatements {
            balance_sheet: Statement {
                periods: vec![StatementPeriod {
                    end_date: None,
                    items: [
                        ("Stockholders Equity".to_string(), 500.0),
                        ("Goodwill".to_string(), 80.0),
                        ("Intangible Assets".to_string(), 20.0),
                    ]
                    .into_iter()
                    .collect(),
                }],
            },
            ..Default::default()
        };
        let assets = asset_based(&statements);
        assert_eq!(assets.book_value, 500.0);
        assert_eq!(assets.tangible_book_value, 400.0);
        assert_eq!(assets.liquidation_value, 0.0);
    }

    #[test]
    fn test_dividend_discount() {
        let mut info = TickerInfo::new("X");
        let ddm = dividend_discount(&info, &DcfAssumptions::default());
        assert_eq!(ddm.dividend_yield, 0.02);
        assert_eq!(ddm.ddm_value, 0.0);

        info.price = Some(100.0);
        info.dividend_yield = Some(0.035);
        let ddm = dividend_discount(&info, &DcfAssumptions::default());
        // 100 * 0.035 * 1.03 / 0.07
        assert!((ddm.ddm_value - 51.5).abs() < 1e-9);
    }

    #[test]
    fn test_valuations_block() {
        let mut info = TickerInfo::new("X");
        info.trailing_pe = Some(22.0);
        info.market_cap = Some(1000.0);
        let financial = financial_with_cash_flow(&[50.0]);

        let v = calculate_valuations(&financial, &info, &FinancialStatements::default(), &DcfAssumptions::default());
        assert_eq!(v.pe_ratio, 22.0);
        assert_eq!(v.valuation_ratios.price_to_cash_flow, 20.0);
        assert_eq!(v.valuation_ratios.price_to_sales, 3.0);

        let json = serde_json::to_value(&v).unwrap();
        assert!(json.get("dcf_detailed").is_none());
        assert!(json["dcf_valuation"]["dcf_value"].is_number());
    }
}
