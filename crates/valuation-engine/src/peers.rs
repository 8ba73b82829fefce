use analysis_core::TickerInfo;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Multiples compared across the peer group. Unknown values stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValuationMetrics {
    pub pe_ratio: Option<f64>,
    pub pb_ratio: Option<f64>,
    pub ps_ratio: Option<f64>,
    pub ev_ebitda: Option<f64>,
    pub roe: Option<f64>,
    pub roa: Option<f64>,
}

impl ValuationMetrics {
    pub fn from_info(info: &TickerInfo) -> Self {
        Self {
            pe_ratio: info.trailing_pe,
            pb_ratio: info.price_to_book,
            ps_ratio: info.price_to_sales,
            ev_ebitda: info.enterprise_to_ebitda,
            roe: info.return_on_equity,
            roa: info.return_on_assets,
        }
    }

    fn by_name(&self) -> [(&'static str, Option<f64>); 6] {
        [
            ("pe_ratio", self.pe_ratio),
            ("pb_ratio", self.pb_ratio),
            ("ps_ratio", self.ps_ratio),
            ("ev_ebitda", self.ev_ebitda),
            ("roe", self.roe),
            ("roa", self.roa),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerEntry {
    pub symbol: String,
    pub name: String,
    #[serde(flatten)]
    pub metrics: ValuationMetrics,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerComparison {
    pub company_metrics: ValuationMetrics,
    pub peer_comparison: Vec<PeerEntry>,
    /// Percentile (0-100) of the company within the peer values per metric.
    pub valuation_percentile: BTreeMap<String, f64>,
}

impl PeerComparison {
    /// Mean of the positive peer P/E ratios.
    pub fn average_peer_pe(&self) -> Option<f64> {
        let ratios: Vec<f64> = self
            .peer_comparison
            .iter()
            .filter_map(|p| p.metrics.pe_ratio)
            .filter(|pe| *pe > 0.0)
            .collect();
        (!ratios.is_empty()).then(|| ratios.iter().sum::<f64>() / ratios.len() as f64)
    }
}

pub fn compare_with_peers(company: &TickerInfo, peers: &[TickerInfo]) -> PeerComparison {
    let company_metrics = ValuationMetrics::from_info(company);
    let peer_comparison: Vec<PeerEntry> = peers
        .iter()
        .filter(|peer| !peer.symbol.eq_ignore_ascii_case(&company.symbol))
        .map(|peer| PeerEntry {
            symbol: peer.symbol.clone(),
            name: peer.display_name(),
            metrics: ValuationMetrics::from_info(peer),
        })
        .collect();

    tracing::debug!("{}: comparing against {} peers", company.symbol, peer_comparison.len());

    let valuation_percentile = if peer_comparison.is_empty() {
        BTreeMap::new()
    } else {
        percentiles(&company_metrics, &peer_comparison)
    };

    PeerComparison {
        company_metrics,
        peer_comparison,
        valuation_percentile,
    }
}

/// Position of the company value in the sorted list of positive peer values
/// plus itself, as a share of the list length.
fn percentiles(company: &ValuationMetrics, peers: &[PeerEntry]) -> BTreeMap<String, f64> {
    let mut result = BTreeMap::new();

    for (index, (metric, value)) in company.by_name().into_iter().enumerate() {
        let Some(value) = value.filter(|v| v.is_finite()) else {
            continue;
        };
        let mut values: Vec<f64> = peers
            .iter()
            .filter_map(|p| p.metrics.by_name()[index].1)
            .filter(|v| *v > 0.0 && v.is_finite())
            .collect();
        if values.is_empty() {
            continue;
        }

        values.push(value);
        values.sort_by(|a, b| a.total_cmp(b));
        if let Some(position) = values.iter().position(|v| *v == value) {
            result.insert(metric.to_string(), position as f64 / values.len() as f64 * 100.0);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticker(symbol: &str, pe: Option<f64>, roe: Option<f64>) -> TickerInfo {
        let mut info = TickerInfo::new(symbol);
        info.long_name = Some(format!("{} Corp", symbol));
        info.trailing_pe = pe;
        info.return_on_equity = roe;
        info
    }

    #[test]
    fn test_percentile_position() {
        let company = ticker("AAA", Some(20.0), Some(0.2));
        let peers = vec![
            ticker("BBB", Some(10.0), Some(0.1)),
            ticker("CCC", Some(30.0), Some(0.3)),
            ticker("DDD", Some(15.0), None),
        ];
        let comparison = compare_with_peers(&company, &peers);

        // sorted [10, 15, 20, 30] -> index 2 of 4
        assert_eq!(comparison.valuation_percentile["pe_ratio"], 50.0);
        // sorted [0.1, 0.2, 0.3] -> index 1 of 3
        assert!((comparison.valuation_percentile["roe"] - 100.0 / 3.0).abs() < 1e-9);
        assert!(!comparison.valuation_percentile.contains_key("pb_ratio"));
    }

    #[test]
    fn test_non_positive_peer_values_ignored() {
        let company = ticker("AAA", Some(5.0), None);
        let peers = vec![ticker("BBB", Some(-4.0), None), ticker("CCC", Some(0.0), None)];
        let comparison = compare_with_peers(&company, &peers);
        assert!(comparison.valuation_percentile.is_empty());
    }

    #[test]
    fn test_company_excluded_from_its_peers() {
        let company = ticker("AAPL", Some(30.0), None);
        let peers = vec![ticker("AAPL", Some(30.0), None), ticker("MSFT", Some(35.0), None)];
        let comparison = compare_with_peers(&company, &peers);

        assert_eq!(comparison.peer_comparison.len(), 1);
        assert_eq!(comparison.peer_comparison[0].name, "MSFT Corp");
        assert_eq!(comparison.average_peer_pe(), Some(35.0));
    }

    #[test]
    fn test_no_peers() {
        let comparison = compare_with_peers(&ticker("XOM", Some(12.0), None), &[]);
        assert!(comparison.peer_comparison.is_empty());
        assert!(comparison.valuation_percentile.is_empty());
        assert!(comparison.average_peer_pe().is_none());

        let json = serde_json::to_value(&comparison).unwrap();
        assert_eq!(json["company_metrics"]["pe_ratio"], 12.0);
        assert!(json["company_metrics"]["roa"].is_null());
    }

    #[test]
    fn test_peer_entry_flattens_metrics() {
        let comparison = compare_with_peers(&ticker("AAA", None, None), &[ticker("BBB", Some(9.0), None)]);
        let json = serde_json::to_value(&comparison.peer_comparison[0]).unwrap();
        assert_eq!(json["symbol"], "BBB");
        assert_eq!(json["pe_ratio"], 9.0);
    }
}
