use analysis_core::{line_items, FinancialStatements, Statement, TickerInfo};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const HISTORY_YEARS: usize = 5;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RevenueSources {
    pub primary_sources: BTreeMap<String, f64>,
    pub geographic_breakdown: BTreeMap<String, f64>,
    pub segment_breakdown: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CostStructure {
    pub fixed_costs: BTreeMap<String, f64>,
    pub variable_costs: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CostDrivers {
    pub primary_costs: BTreeMap<String, f64>,
    pub cost_structure: CostStructure,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfitabilityMetrics {
    pub gross_margin: Option<f64>,
    pub operating_margin: Option<f64>,
    pub net_margin: Option<f64>,
    pub roa: Option<f64>,
    pub roe: Option<f64>,
    pub roic: Option<f64>,
}

/// Year-over-year growth; a field is omitted when fewer than two annual
/// periods were reported.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GrowthMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue_growth_1y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub earnings_growth_1y: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LiquidityMetrics {
    pub current_ratio: Option<f64>,
    pub quick_ratio: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub interest_coverage: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EfficiencyMetrics {
    pub asset_turnover: Option<f64>,
    pub inventory_turnover: Option<f64>,
    pub receivables_turnover: Option<f64>,
}

/// Up to five newest annual values, newest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoricalData {
    pub revenue_5y: Vec<f64>,
    pub earnings_5y: Vec<f64>,
    pub cash_flow_5y: Vec<f64>,
}

/// Statement-derived view of a company's financial health.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinancialData {
    pub revenue_sources: RevenueSources,
    pub cost_drivers: CostDrivers,
    pub profitability_metrics: ProfitabilityMetrics,
    pub growth_metrics: GrowthMetrics,
    pub liquidity_metrics: LiquidityMetrics,
    pub efficiency_metrics: EfficiencyMetrics,
    pub historical_data: HistoricalData,
}

impl FinancialData {
    pub fn derive(info: &TickerInfo, statements: &FinancialStatements) -> Self {
        let income = &statements.income;

        let revenue_sources = RevenueSources {
            primary_sources: latest_matching(income, &["revenue", "sales"]),
            ..Default::default()
        };
        let cost_drivers = CostDrivers {
            primary_costs: latest_matching(income, &["cost", "expense", "operating"]),
            cost_structure: CostStructure::default(),
        };

        let revenue_history = income.series(line_items::TOTAL_REVENUE, HISTORY_YEARS);
        let earnings_history = income.series(line_items::NET_INCOME, HISTORY_YEARS);

        // Ratios the quote feed left out are rebuilt from the statements.
        let asset_turnover = info.asset_turnover.or_else(|| {
            let revenue = income.latest(line_items::TOTAL_REVENUE)?;
            let assets = statements.balance_sheet.latest(line_items::TOTAL_ASSETS)?;
            (assets > 0.0).then(|| revenue / assets)
        });
        let interest_coverage = info.interest_coverage.or_else(|| {
            let operating_income = income.latest(line_items::OPERATING_INCOME)?;
            let interest = income.latest("Interest Expense")?.abs();
            (interest > 0.0).then(|| operating_income / interest)
        });

        Self {
            revenue_sources,
            cost_drivers,
            profitability_metrics: ProfitabilityMetrics {
                gross_margin: info.gross_margins,
                operating_margin: info.operating_margins,
                net_margin: info.profit_margins,
                roa: info.return_on_assets,
                roe: info.return_on_equity,
                roic: info.return_on_capital,
            },
            growth_metrics: GrowthMetrics {
                revenue_growth_1y: year_over_year(&revenue_history),
                earnings_growth_1y: year_over_year(&earnings_history),
            },
            liquidity_metrics: LiquidityMetrics {
                current_ratio: info.current_ratio,
                quick_ratio: info.quick_ratio,
                debt_to_equity: info.debt_to_equity,
                interest_coverage,
            },
            efficiency_metrics: EfficiencyMetrics {
                asset_turnover,
                inventory_turnover: info.inventory_turnover,
                receivables_turnover: info.receivables_turnover,
            },
            historical_data: HistoricalData {
                revenue_5y: revenue_history,
                earnings_5y: earnings_history,
                cash_flow_5y: statements
                    .cash_flow
                    .series(line_items::OPERATING_CASH_FLOW, HISTORY_YEARS),
            },
        }
    }

    /// True when neither statements nor quote ratios contributed anything.
    pub fn is_empty(&self) -> bool {
        let p = &self.profitability_metrics;
        self.historical_data.revenue_5y.is_empty()
            && self.historical_data.cash_flow_5y.is_empty()
            && self.revenue_sources.primary_sources.is_empty()
            && [p.gross_margin, p.operating_margin, p.net_margin, p.roa, p.roe, p.roic]
                .iter()
                .all(Option::is_none)
    }

    pub fn latest_operating_cash_flow(&self) -> Option<f64> {
        self.historical_data.cash_flow_5y.first().copied()
    }
}

fn latest_matching(statement: &Statement, needles: &[&str]) -> BTreeMap<String, f64> {
    statement
        .line_items()
        .filter(|(name, _)| {
            let lower = name.to_lowercase();
            needles.iter().any(|n| lower.contains(n))
        })
        .map(|(name, value)| (name.clone(), *value))
        .collect()
}

fn year_over_year(series: &[f64]) -> Option<f64> {
    match series {
        [current, previous, ..] => Some(if *previous == 0.0 {
            0.0
        } else {
            (current - previous) / previous
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::StatementPeriod;

    fn period(items: &[(&str, f64)]) -> StatementPeriod {
        StatementPeriod {
            end_date: None,
            items: items.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        }
    }

    fn sample_statements() -> FinancialStatements {
        FinancialStatements {
            income: Statement {
                periods: vec![
                    period(&[
                        ("Total Revenue", 120.0),
                        ("Cost Of Revenue", 70.0),
                        ("Selling General Administrative", 10.0),
                        ("Operating Income", 30.0),
                        ("Interest Expense", -5.0),
                        ("Net Income", 22.0),
                    ]),
                    period(&[("Total Revenue", 100.0), ("Net Income", 20.0)]),
                    period(&[("Total Revenue", 90.0), ("Net Income", 0.0)]),
                ],
            },
            balance_sheet: Statement {
                periods: vec![period(&[("Total Assets", 240.0)])],
            },
            cash_flow: Statement {
                periods: vec![period(&[("Operating Cash Flow", 35.0)])],
            },
        }
    }

    #[test]
    fn test_revenue_and_cost_items_by_keyword() {
        let data = FinancialData::derive(&TickerInfo::new("TEST"), &sample_statements());

        let revenue: Vec<&str> = data.revenue_sources.primary_sources.keys().map(String::as_str).collect();
        assert_eq!(revenue, vec!["Cost Of Revenue", "Total Revenue"]);

        let costs = &data.cost_drivers.primary_costs;
        assert!(costs.contains_key("Cost Of Revenue"));
        assert!(costs.contains_key("Operating Income"));
        assert!(costs.contains_key("Interest Expense"));
        assert!(!costs.contains_key("Net Income"));
        assert!(data.cost_drivers.cost_structure.fixed_costs.is_empty());
    }

    #[test]
    fn test_growth_from_two_newest_periods() {
        let data = FinancialData::derive(&TickerInfo::new("TEST"), &sample_statements());

        assert!((data.growth_metrics.revenue_growth_1y.unwrap() - 0.2).abs() < 1e-12);
        assert!((data.growth_metrics.earnings_growth_1y.unwrap() - 0.1).abs() < 1e-12);
        assert_eq!(data.historical_data.revenue_5y, vec![120.0, 100.0, 90.0]);
        assert_eq!(data.historical_data.cash_flow_5y, vec![35.0]);
    }

    #[test]
    fn test_growth_zero_previous_and_single_period() {
        assert_eq!(year_over_year(&[5.0, 0.0]), Some(0.0));
        assert_eq!(year_over_year(&[5.0]), None);

        let single = FinancialStatements {
            income: Statement {
                periods: vec![period(&[("Total Revenue", 10.0)])],
            },
            ..Default::default()
        };
        let data = FinancialData::derive(&TickerInfo::new("TEST"), &single);
        let json = serde_json::to_value(&data.growth_metrics).unwrap();
        assert!(json.as_object().unwrap().is_empty());
    }

    #[test]
    fn test_ratios_come_from_info_with_statement_fallback() {
        let mut info = TickerInfo::new("TEST");
        info.gross_margins = Some(0.42);
        info.return_on_assets = Some(0.08);
        info.current_ratio = Some(1.8);

        let data = FinancialData::derive(&info, &sample_statements());
        assert_eq!(data.profitability_metrics.gross_margin, Some(0.42));
        assert_eq!(data.profitability_metrics.roa, Some(0.08));
        assert_eq!(data.liquidity_metrics.current_ratio, Some(1.8));
        assert_eq!(data.efficiency_metrics.asset_turnover, Some(0.5));
        assert_eq!(data.liquidity_metrics.interest_coverage, Some(6.0));

        info.asset_turnover = Some(0.9);
        let data = FinancialData::derive(&info, &sample_statements());
        assert_eq!(data.efficiency_metrics.asset_turnover, Some(0.9));
    }

    #[test]
    fn test_empty_inputs() {
        let data = FinancialData::derive(&TickerInfo::new("TEST"), &FinancialStatements::default());
        assert!(data.is_empty());
        assert!(data.historical_data.earnings_5y.is_empty());
        assert!(data.latest_operating_cash_flow().is_none());
    }
}
