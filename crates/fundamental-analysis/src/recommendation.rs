use crate::financials::FinancialData;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Recommendation {
    Buy,
    Hold,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentRecommendation {
    pub recommendation: Recommendation,
    pub confidence: Level,
    pub score: f64,
    pub factors: Vec<String>,
    pub risk_level: Level,
}

impl InvestmentRecommendation {
    pub fn insufficient_data() -> Self {
        Self {
            recommendation: Recommendation::Hold,
            confidence: Level::Low,
            score: 0.5,
            factors: vec!["Insufficient data".to_string()],
            risk_level: Level::Medium,
        }
    }
}

/// Everything the scoring rules look at.
#[derive(Debug, Clone, Copy)]
pub struct RecommendationInputs<'a> {
    pub financial: &'a FinancialData,
    pub market_cap: Option<f64>,
    pub overall_sentiment: f64,
    pub pe_ratio: Option<f64>,
}

/// Weighted checklist: financial health 0.4, valuation 0.3, sentiment 0.2,
/// size 0.1.
pub fn generate_recommendation(inputs: &RecommendationInputs<'_>) -> InvestmentRecommendation {
    if inputs.financial.is_empty() && inputs.market_cap.is_none() {
        return InvestmentRecommendation::insufficient_data();
    }

    let mut score = 0.0;
    let mut factors = Vec::new();

    if inputs.financial.profitability_metrics.roa.unwrap_or(0.0) > 0.05 {
        score += 0.4;
        factors.push("Strong return on assets".to_string());
    }
    if inputs.pe_ratio.unwrap_or(0.0) < 20.0 {
        score += 0.3;
        factors.push("Reasonable P/E ratio".to_string());
    }
    if inputs.overall_sentiment > 0.5 {
        score += 0.2;
        factors.push("Positive market sentiment".to_string());
    }
    if inputs.market_cap.unwrap_or(0.0) > 1e10 {
        score += 0.1;
        factors.push("Large market cap".to_string());
    }

    // 0.4 + 0.3 must land on the BUY threshold exactly
    let score = (score * 100.0_f64).round() / 100.0;
    let (recommendation, confidence, risk_level) = if score >= 0.7 {
        (Recommendation::Buy, Level::High, Level::Low)
    } else if score >= 0.5 {
        (Recommendation::Hold, Level::Medium, Level::Medium)
    } else {
        (Recommendation::Sell, Level::Low, Level::High)
    };

    InvestmentRecommendation {
        recommendation,
        confidence,
        score,
        factors,
        risk_level,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn financial_with_roa(roa: f64) -> FinancialData {
        let mut data = FinancialData::default();
        data.profitability_metrics.roa = Some(roa);
        data
    }

    #[test]
    fn test_buy_on_health_and_valuation() {
        let financial = financial_with_roa(0.08);
        let rec = generate_recommendation(&RecommendationInputs {
            financial: &financial,
            market_cap: Some(5e9),
            overall_sentiment: 0.1,
            pe_ratio: Some(18.0),
        });

        assert_eq!(rec.recommendation, Recommendation::Buy);
        assert_eq!(rec.confidence, Level::High);
        assert_eq!(rec.risk_level, Level::Low);
        assert_eq!(rec.score, 0.7);
        assert_eq!(rec.factors, vec!["Strong return on assets", "Reasonable P/E ratio"]);
    }

    #[test]
    fn test_hold_and_sell_bands() {
        let financial = financial_with_roa(0.02);
        let sell = generate_recommendation(&RecommendationInputs {
            financial: &financial,
            market_cap: Some(2e11),
            overall_sentiment: 0.6,
            pe_ratio: Some(35.0),
        });
        assert_eq!(sell.score, 0.3);
        assert_eq!(sell.recommendation, Recommendation::Sell);

        let sell = generate_recommendation(&RecommendationInputs {
            financial: &financial,
            market_cap: Some(2e11),
            overall_sentiment: 0.0,
            pe_ratio: Some(12.0),
        });
        assert_eq!(sell.score, 0.4);
        assert_eq!(sell.risk_level, Level::High);

        let financial = financial_with_roa(0.09);
        let hold = generate_recommendation(&RecommendationInputs {
            financial: &financial,
            market_cap: Some(2e11),
            overall_sentiment: 0.0,
            pe_ratio: Some(40.0),
        });
        assert_eq!(hold.score, 0.5);
        assert_eq!(hold.recommendation, Recommendation::Hold);
        assert_eq!(hold.confidence, Level::Medium);
    }

    #[test]
    fn test_fallback_without_inputs() {
        let financial = FinancialData::default();
        let rec = generate_recommendation(&RecommendationInputs {
            financial: &financial,
            market_cap: None,
            overall_sentiment: 0.0,
            pe_ratio: None,
        });

        assert_eq!(rec.recommendation, Recommendation::Hold);
        assert_eq!(rec.confidence, Level::Low);
        assert_eq!(rec.factors, vec!["Insufficient data"]);
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["recommendation"], "HOLD");
        assert_eq!(json["risk_level"], "Medium");
    }
}
