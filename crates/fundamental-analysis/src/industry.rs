use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorPerformance {
    pub sector_growth_rate: f64,
    pub sector_pe_ratio: f64,
    pub sector_market_cap: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegulatoryEnvironment {
    pub regulatory_risk: String,
    pub compliance_requirements: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthProspects {
    pub projected_growth_rate: f64,
    pub key_drivers: Vec<String>,
    pub risks: Vec<String>,
}

/// Sector-level context. Performance and growth figures are long-run
/// market averages rather than live sector data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndustryAnalysis {
    pub sector_performance: SectorPerformance,
    pub industry_trends: Vec<String>,
    pub regulatory_environment: RegulatoryEnvironment,
    pub growth_prospects: GrowthProspects,
}

impl IndustryAnalysis {
    pub fn for_sector(sector: &str) -> Self {
        let regulatory_risk = match sector {
            "Technology" => "Low",
            "Healthcare" | "Financial Services" => "High",
            _ => "Medium",
        };
        let compliance_requirements = match sector {
            "Healthcare" | "Financial Services" => "High",
            _ => "Standard",
        };

        Self {
            sector_performance: SectorPerformance {
                sector_growth_rate: 0.05,
                sector_pe_ratio: 15.0,
                sector_market_cap: 1e12,
            },
            industry_trends: to_strings(industry_trends(sector)),
            regulatory_environment: RegulatoryEnvironment {
                regulatory_risk: regulatory_risk.to_string(),
                compliance_requirements: compliance_requirements.to_string(),
            },
            growth_prospects: GrowthProspects {
                projected_growth_rate: 0.05,
                key_drivers: to_strings(&["Market expansion", "Technology adoption"]),
                risks: to_strings(&["Economic downturn", "Regulatory changes"]),
            },
        }
    }
}

fn industry_trends(sector: &str) -> &'static [&'static str] {
    match sector {
        "Technology" => &["Digital transformation", "AI/ML adoption", "Cloud computing"],
        "Healthcare" => &["Telemedicine", "Personalized medicine", "Digital health"],
        "Financial Services" => &["Fintech disruption", "Digital banking", "Regulatory changes"],
        "Consumer Discretionary" => &["E-commerce growth", "Sustainability focus", "Digital marketing"],
        _ => &["General market trends"],
    }
}

pub(crate) fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_sector() {
        let analysis = IndustryAnalysis::for_sector("Healthcare");
        assert_eq!(analysis.industry_trends[0], "Telemedicine");
        assert_eq!(analysis.regulatory_environment.regulatory_risk, "High");
        assert_eq!(analysis.regulatory_environment.compliance_requirements, "High");
        assert_eq!(analysis.sector_performance.sector_pe_ratio, 15.0);
    }

    #[test]
    fn test_technology_is_low_risk_standard_compliance() {
        let analysis = IndustryAnalysis::for_sector("Technology");
        assert_eq!(analysis.regulatory_environment.regulatory_risk, "Low");
        assert_eq!(analysis.regulatory_environment.compliance_requirements, "Standard");
    }

    #[test]
    fn test_unknown_sector_defaults() {
        let analysis = IndustryAnalysis::for_sector("Unknown");
        assert_eq!(analysis.industry_trends, vec!["General market trends"]);
        assert_eq!(analysis.regulatory_environment.regulatory_risk, "Medium");
        assert_eq!(analysis.growth_prospects.projected_growth_rate, 0.05);
        assert_eq!(analysis.growth_prospects.risks.len(), 2);
    }
}
