use crate::dcf::{calculate_dcf, DcfAssumptions, DcfInputs, DcfValuation};
use crate::peers::PeerComparison;
use analysis_core::AnalysisError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const SENSITIVITY_GROWTH_RATES: [f64; 4] = [0.02, 0.05, 0.08, 0.10];
pub const SENSITIVITY_DISCOUNT_RATES: [f64; 4] = [0.08, 0.10, 0.12, 0.15];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityAnalysis {
    /// growth rate -> discount rate -> per-share value; `None` where the DCF
    /// is undefined.
    pub sensitivity_matrix: BTreeMap<String, BTreeMap<String, Option<f64>>>,
    pub growth_rates: Vec<f64>,
    pub discount_rates: Vec<f64>,
}

pub fn sensitivity_analysis(inputs: &DcfInputs, base: &DcfAssumptions) -> SensitivityAnalysis {
    let sensitivity_matrix = SENSITIVITY_GROWTH_RATES
        .iter()
        .map(|&g| {
            let row = SENSITIVITY_DISCOUNT_RATES
                .iter()
                .map(|&r| {
                    let value = calculate_dcf(inputs, &base.with_rates(g, r))
                        .ok()
                        .map(|dcf| dcf.dcf_value_per_share);
                    (rate_key(r), value)
                })
                .collect();
            (rate_key(g), row)
        })
        .collect();

    SensitivityAnalysis {
        sensitivity_matrix,
        growth_rates: SENSITIVITY_GROWTH_RATES.to_vec(),
        discount_rates: SENSITIVITY_DISCOUNT_RATES.to_vec(),
    }
}

/// `0.1` -> `"0.1"`, `0.05` -> `"0.05"`.
fn rate_key(rate: f64) -> String {
    format!("{}", rate)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueRange {
    pub minimum: f64,
    pub maximum: f64,
    pub average: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FairValueRange {
    pub fair_value_range: ValueRange,
    pub valuation_methods: usize,
    pub confidence_level: String,
}

/// Combine every per-share estimate that could be produced.
pub fn fair_value_range(
    dcf: Option<&DcfValuation>,
    peers: Option<&PeerComparison>,
    eps: Option<f64>,
) -> Result<FairValueRange, AnalysisError> {
    let mut estimates = Vec::new();

    if let Some(dcf) = dcf {
        estimates.push(dcf.dcf_value_per_share);
    }
    if let (Some(avg_pe), Some(eps)) = (peers.and_then(PeerComparison::average_peer_pe), eps) {
        estimates.push(avg_pe * eps);
    }

    let estimates: Vec<f64> = estimates.into_iter().filter(|v| v.is_finite()).collect();
    if estimates.is_empty() {
        return Err(AnalysisError::InsufficientData(
            "Insufficient data for fair value calculation".to_string(),
        ));
    }

    let minimum = estimates.iter().copied().fold(f64::INFINITY, f64::min);
    let maximum = estimates.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let average = estimates.iter().sum::<f64>() / estimates.len() as f64;
    let confidence_level = if estimates.len() >= 3 { "High" } else { "Medium" };

    Ok(FairValueRange {
        fair_value_range: ValueRange {
            minimum,
            maximum,
            average,
        },
        valuation_methods: estimates.len(),
        confidence_level: confidence_level.to_string(),
    })
}
