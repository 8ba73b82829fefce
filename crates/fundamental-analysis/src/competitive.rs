use analysis_core::{sectors, TickerInfo};
use serde::{Deserialize, Serialize};

const REGULATED_SECTORS: &[&str] = &["Healthcare", "Financial Services"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoatStrength {
    Strong,
    Moderate,
    Weak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BarrierLevel {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoatAnalysis {
    pub moat_score: u32,
    pub moat_factors: Vec<String>,
    pub moat_strength: MoatStrength,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SwotAnalysis {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub opportunities: Vec<String>,
    pub threats: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketPosition {
    /// Market capitalisation, used as the size proxy for share.
    pub market_share: Option<f64>,
    pub competitive_advantages: Vec<String>,
    pub moat_analysis: MoatAnalysis,
    pub swot_analysis: SwotAnalysis,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarriersToEntry {
    pub capital_requirements: BarrierLevel,
    pub regulatory_barriers: BarrierLevel,
    pub technology_barriers: BarrierLevel,
    pub brand_barriers: BarrierLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortersFiveForces {
    pub threat_of_new_entrants: String,
    pub bargaining_power_of_suppliers: String,
    pub bargaining_power_of_buyers: String,
    pub threat_of_substitutes: String,
    pub rivalry_among_competitors: String,
}

/// Rule-based competitive position of a single company.
///
/// Every rule compares a quote-feed ratio against a fixed threshold; a
/// missing ratio is treated as 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitiveAnalysis {
    pub market_position: MarketPosition,
    pub competitors: Vec<String>,
    pub competitive_threats: Vec<String>,
    pub barriers_to_entry: BarriersToEntry,
    pub porters_five_forces: PortersFiveForces,
}

impl CompetitiveAnalysis {
    pub fn assess(info: &TickerInfo) -> Self {
        let sector = info.sector.as_deref().unwrap_or("Unknown");
        let market_cap = info.market_cap.unwrap_or(0.0);

        Self {
            market_position: MarketPosition {
                market_share: info.market_cap,
                competitive_advantages: competitive_advantages(info),
                moat_analysis: moat_analysis(),
                swot_analysis: swot_analysis(info),
            },
            competitors: sectors::peers_excluding(sector, &info.symbol),
            competitive_threats: competitive_threats(market_cap, sector),
            barriers_to_entry: BarriersToEntry {
                capital_requirements: if market_cap > 1e10 {
                    BarrierLevel::High
                } else {
                    BarrierLevel::Medium
                },
                regulatory_barriers: if REGULATED_SECTORS.contains(&sector) {
                    BarrierLevel::High
                } else {
                    BarrierLevel::Low
                },
                technology_barriers: BarrierLevel::Medium,
                // no brand valuation feed
                brand_barriers: BarrierLevel::Low,
            },
            porters_five_forces: five_forces(market_cap, info.gross_margins.unwrap_or(0.0)),
        }
    }
}

fn competitive_advantages(info: &TickerInfo) -> Vec<String> {
    let mut advantages = Vec::new();
    if info.gross_margins.unwrap_or(0.0) > 0.4 {
        advantages.push("High gross margins indicating pricing power".to_string());
    }
    if info.return_on_equity.unwrap_or(0.0) > 0.15 {
        advantages.push("Strong return on equity".to_string());
    }
    if info.debt_to_equity.unwrap_or(0.0) < 0.5 {
        advantages.push("Low debt levels".to_string());
    }
    advantages
}

// Network effects, switching costs and brand value need data we do not
// fetch, so the score only moves once such a factor is recorded.
fn moat_analysis() -> MoatAnalysis {
    let moat_factors: Vec<String> = Vec::new();
    let moat_score = moat_factors.len() as u32;
    let moat_strength = match moat_score {
        s if s >= 3 => MoatStrength::Strong,
        s if s >= 1 => MoatStrength::Moderate,
        _ => MoatStrength::Weak,
    };
    MoatAnalysis {
        moat_score,
        moat_factors,
        moat_strength,
    }
}

fn swot_analysis(info: &TickerInfo) -> SwotAnalysis {
    let mut swot = SwotAnalysis::default();

    if info.gross_margins.unwrap_or(0.0) > 0.3 {
        swot.strengths.push("Strong profitability".to_string());
    }
    if info.current_ratio.unwrap_or(0.0) > 1.5 {
        swot.strengths.push("Good liquidity position".to_string());
    }
    if info.debt_to_equity.unwrap_or(0.0) > 1.0 {
        swot.weaknesses.push("High debt levels".to_string());
    }
    if info.return_on_equity.unwrap_or(0.0) < 0.1 {
        swot.weaknesses.push("Low return on equity".to_string());
    }
    swot
}

fn competitive_threats(market_cap: f64, sector: &str) -> Vec<String> {
    let mut threats = Vec::new();
    if market_cap > 1e11 {
        threats.push("Large market cap may limit growth potential".to_string());
    }
    if REGULATED_SECTORS.contains(&sector) {
        threats.push("Regulatory risks in sector".to_string());
    }
    threats
}

fn five_forces(market_cap: f64, gross_margin: f64) -> PortersFiveForces {
    let barriers = if market_cap > 1e11 {
        "high"
    } else if market_cap < 1e9 {
        "low"
    } else {
        "moderate"
    };
    let buyer_power = if gross_margin > 0.4 { "low" } else { "moderate" };
    let rivalry = if market_cap > 1e11 { "high" } else { "moderate" };

    PortersFiveForces {
        threat_of_new_entrants: format!(
            "Barriers to entry are {}. Large established players and high capital requirements may deter new entrants.",
            barriers
        ),
        bargaining_power_of_suppliers: "Supplier power is moderate. The company may have multiple suppliers, but unique components or raw materials could increase supplier influence.".to_string(),
        bargaining_power_of_buyers: format!(
            "Buyer power is {}. Strong brand or differentiated products reduce buyer leverage.",
            buyer_power
        ),
        threat_of_substitutes: "Threat of substitutes is moderate. Innovation and changing consumer preferences could introduce alternatives.".to_string(),
        rivalry_among_competitors: format!(
            "Competitive rivalry is {}. The industry has several strong players and competition is intense.",
            rivalry
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mega_cap_tech() -> TickerInfo {
        let mut info = TickerInfo::new("MSFT");
        info.sector = Some("Technology".to_string());
        info.market_cap = Some(3.0e12);
        info.gross_margins = Some(0.70);
        info.return_on_equity = Some(0.38);
        info.debt_to_equity = Some(0.43);
        info.current_ratio = Some(1.27);
        info
    }

    #[test]
    fn test_strong_company_advantages() {
        let analysis = CompetitiveAnalysis::assess(&mega_cap_tech());
        let position = &analysis.market_position;

        assert_eq!(
            position.competitive_advantages,
            vec![
                "High gross margins indicating pricing power",
                "Strong return on equity",
                "Low debt levels"
            ]
        );
        assert_eq!(position.swot_analysis.strengths, vec!["Strong profitability"]);
        assert!(position.swot_analysis.weaknesses.is_empty());
        assert_eq!(position.market_share, Some(3.0e12));
        assert_eq!(position.moat_analysis.moat_score, 0);
        assert_eq!(position.moat_analysis.moat_strength, MoatStrength::Weak);
    }

    #[test]
    fn test_competitors_exclude_company() {
        let analysis = CompetitiveAnalysis::assess(&mega_cap_tech());
        assert_eq!(analysis.competitors, vec!["AAPL", "GOOGL", "AMZN", "META"]);

        let mut other = TickerInfo::new("XOM");
        other.sector = Some("Energy".to_string());
        assert!(CompetitiveAnalysis::assess(&other).competitors.is_empty());
    }

    #[test]
    fn test_regulated_sector_threats_and_barriers() {
        let mut info = TickerInfo::new("JPM");
        info.sector = Some("Financial Services".to_string());
        info.market_cap = Some(5.0e11);
        info.debt_to_equity = Some(1.3);
        info.return_on_equity = Some(0.05);

        let analysis = CompetitiveAnalysis::assess(&info);
        assert_eq!(
            analysis.competitive_threats,
            vec!["Large market cap may limit growth potential", "Regulatory risks in sector"]
        );
        assert_eq!(analysis.barriers_to_entry.regulatory_barriers, BarrierLevel::High);
        assert_eq!(analysis.barriers_to_entry.capital_requirements, BarrierLevel::High);
        assert_eq!(
            analysis.market_position.swot_analysis.weaknesses,
            vec!["High debt levels", "Low return on equity"]
        );
    }

    #[test]
    fn test_missing_inputs_count_as_zero() {
        let analysis = CompetitiveAnalysis::assess(&TickerInfo::new("NEW"));

        assert_eq!(analysis.market_position.competitive_advantages, vec!["Low debt levels"]);
        assert_eq!(analysis.barriers_to_entry.capital_requirements, BarrierLevel::Medium);
        assert_eq!(analysis.barriers_to_entry.brand_barriers, BarrierLevel::Low);
        assert!(analysis
            .porters_five_forces
            .threat_of_new_entrants
            .starts_with("Barriers to entry are low."));
        assert!(analysis
            .porters_five_forces
            .bargaining_power_of_buyers
            .starts_with("Buyer power is moderate."));
    }

    #[test]
    fn test_five_forces_for_mega_cap() {
        let forces = CompetitiveAnalysis::assess(&mega_cap_tech()).porters_five_forces;
        assert!(forces.threat_of_new_entrants.starts_with("Barriers to entry are high."));
        assert!(forces.bargaining_power_of_buyers.starts_with("Buyer power is low."));
        assert!(forces.rivalry_among_competitors.starts_with("Competitive rivalry is high."));

        let json = serde_json::to_value(CompetitiveAnalysis::assess(&mega_cap_tech())).unwrap();
        assert_eq!(json["barriers_to_entry"]["technology_barriers"], "Medium");
    }
}
