//! Statement field naming shared by the Yahoo and Alpha Vantage clients.
//!
//! Upstream statement payloads use camelCase keys. Analysis code reads the
//! canonical labels in [`analysis_core::line_items`], everything else is
//! humanised (`costOfRevenue` -> `Cost Of Revenue`).

use analysis_core::line_items;
use std::collections::BTreeMap;

const ALIASES: &[(&str, &str)] = &[
    ("totalRevenue", line_items::TOTAL_REVENUE),
    ("costOfRevenue", line_items::COST_OF_REVENUE),
    ("grossProfit", line_items::GROSS_PROFIT),
    ("operatingIncome", line_items::OPERATING_INCOME),
    ("netIncome", line_items::NET_INCOME),
    ("totalCashFromOperatingActivities", line_items::OPERATING_CASH_FLOW),
    ("operatingCashflow", line_items::OPERATING_CASH_FLOW),
    ("capitalExpenditures", line_items::CAPITAL_EXPENDITURE),
    ("cash", line_items::CASH),
    ("cashAndCashEquivalentsAtCarryingValue", line_items::CASH),
    ("shortLongTermDebtTotal", line_items::TOTAL_DEBT),
    ("totalDebt", line_items::TOTAL_DEBT),
    ("totalStockholderEquity", line_items::STOCKHOLDERS_EQUITY),
    ("totalShareholderEquity", line_items::STOCKHOLDERS_EQUITY),
    ("goodWill", line_items::GOODWILL),
    ("goodwill", line_items::GOODWILL),
    ("intangibleAssets", line_items::INTANGIBLE_ASSETS),
    ("totalAssets", line_items::TOTAL_ASSETS),
];

/// Keys that describe the period rather than carry a value.
pub(crate) const METADATA_KEYS: &[&str] = &["maxAge", "endDate", "fiscalDateEnding", "reportedCurrency"];

/// Map an upstream key onto the label used in `StatementPeriod::items`.
pub fn label_for(key: &str) -> String {
    ALIASES
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, label)| label.to_string())
        .unwrap_or_else(|| humanize(key))
}

/// `costOfRevenue` -> `Cost Of Revenue`, `ebit` -> `Ebit`.
pub fn humanize(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 8);
    let mut prev: Option<char> = None;

    for c in key.chars() {
        match prev {
            None => out.extend(c.to_uppercase()),
            Some(p) => {
                let boundary = (c.is_uppercase() && p.is_lowercase())
                    || (c.is_ascii_digit() && !p.is_ascii_digit());
                if boundary {
                    out.push(' ');
                }
                out.push(c);
            }
        }
        prev = Some(c);
    }
    out
}

/// Providers that only report debt components get a derived `Total Debt`.
pub fn fill_total_debt(items: &mut BTreeMap<String, f64>) {
    if items.contains_key(line_items::TOTAL_DEBT) {
        return;
    }
    let parts: Vec<f64> = ["Long Term Debt", "Short Long Term Debt", "Short Term Debt"]
        .iter()
        .filter_map(|k| items.get(*k).copied())
        .collect();
    if !parts.is_empty() {
        items.insert(line_items::TOTAL_DEBT.to_string(), parts.iter().sum());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("costOfRevenue"), "Cost Of Revenue");
        assert_eq!(humanize("ebit"), "Ebit");
        assert_eq!(humanize("researchDevelopment"), "Research Development");
    }

    #[test]
    fn test_aliases_win_over_humanize() {
        assert_eq!(label_for("totalCashFromOperatingActivities"), "Operating Cash Flow");
        assert_eq!(label_for("capitalExpenditures"), "Capital Expenditure");
        assert_eq!(label_for("totalStockholderEquity"), "Stockholders Equity");
        assert_eq!(label_for("sellingGeneralAdministrative"), "Selling General Administrative");
    }

    #[test]
    fn test_fill_total_debt_from_components() {
        let mut items = BTreeMap::new();
        items.insert("Long Term Debt".to_string(), 90.0);
        items.insert("Short Long Term Debt".to_string(), 10.0);
        fill_total_debt(&mut items);
        assert_eq!(items.get(line_items::TOTAL_DEBT), Some(&100.0));

        let mut reported = BTreeMap::new();
        reported.insert(line_items::TOTAL_DEBT.to_string(), 5.0);
        reported.insert("Long Term Debt".to_string(), 90.0);
        fill_total_debt(&mut reported);
        assert_eq!(reported.get(line_items::TOTAL_DEBT), Some(&5.0));
    }
}
