use analysis_core::{Bar, OptionsChain, TickerInfo};
use chrono::NaiveDate;
use sentiment_analysis::{institutional_activity, OptionsSummary};
use serde::{Deserialize, Serialize, Serializer};
use technical_analysis::{IndicatorSettings, TechnicalSnapshot};

/// Holders listed in the institutional block.
const TOP_HOLDERS: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HolderSummary {
    pub name: String,
    pub shares: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstitutionalData {
    pub institutional_ownership: Option<f64>,
    pub insider_ownership: Option<f64>,
    pub top_institutional_holders: Vec<HolderSummary>,
    pub recent_institutional_activity: Option<String>,
}

impl InstitutionalData {
    pub fn from_info(info: &TickerInfo) -> Self {
        Self {
            institutional_ownership: info.institutional_ownership,
            insider_ownership: info.insider_ownership,
            top_institutional_holders: info
                .top_holders
                .iter()
                .take(TOP_HOLDERS)
                .map(|h| HolderSummary {
                    name: h.name.clone(),
                    shares: h.shares,
                })
                .collect(),
            recent_institutional_activity: institutional_activity(&info.top_holders).map(str::to_string),
        }
    }
}

/// Daily bar as shown on the price chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl From<&Bar> for PricePoint {
    fn from(bar: &Bar) -> Self {
        Self {
            date: bar.timestamp.date_naive(),
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume.max(0.0).round() as u64,
        }
    }
}

/// The `market_data` block of the research payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketData {
    pub current_price: Option<f64>,
    pub market_cap: Option<f64>,
    pub volume: Option<f64>,
    pub avg_volume: Option<f64>,
    pub price_change: Option<f64>,
    pub price_change_percent: Option<f64>,
    pub day_high: Option<f64>,
    pub day_low: Option<f64>,
    pub year_high: Option<f64>,
    pub year_low: Option<f64>,
    pub beta: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub shares_outstanding: Option<f64>,
    pub float_shares: Option<f64>,
    pub short_ratio: Option<f64>,
    pub options_data: Option<OptionsSummary>,
    pub institutional_data: InstitutionalData,
    pub price_history: Vec<PricePoint>,
    #[serde(serialize_with = "snapshot_or_empty")]
    pub technical_indicators: Option<TechnicalSnapshot>,
}

impl MarketData {
    pub fn assemble(info: &TickerInfo, chain: &OptionsChain, bars: &[Bar], settings: &IndicatorSettings) -> Self {
        Self {
            current_price: info.price,
            market_cap: info.market_cap,
            volume: info.volume,
            avg_volume: info.average_volume,
            price_change: info.change,
            price_change_percent: info.change_percent,
            day_high: info.day_high,
            day_low: info.day_low,
            year_high: info.year_high,
            year_low: info.year_low,
            beta: info.beta,
            pe_ratio: info.trailing_pe,
            shares_outstanding: info.shares_outstanding,
            float_shares: info.float_shares,
            short_ratio: info.short_ratio,
            options_data: OptionsSummary::from_chain(chain),
            institutional_data: InstitutionalData::from_info(info),
            price_history: bars.iter().map(PricePoint::from).collect(),
            technical_indicators: TechnicalSnapshot::from_bars(bars, settings),
        }
    }
}

/// Missing snapshots render as `{}` so the dashboard can probe fields.
pub(crate) fn snapshot_or_empty<S: Serializer>(
    snapshot: &Option<TechnicalSnapshot>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    use serde::ser::SerializeMap;
    match snapshot {
        Some(snapshot) => snapshot.serialize(serializer),
        None => serializer.serialize_map(Some(0))?.end(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::{InstitutionalHolder, OptionContract};
    use chrono::{Duration, TimeZone, Utc};

    fn bars(n: usize) -> Vec<Bar> {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 21, 0, 0).unwrap();
        (0..n)
            .map(|i| Bar {
                timestamp: start + Duration::days(i as i64),
                open: 100.0 + i as f64,
                high: 101.0 + i as f64,
                low: 99.0 + i as f64,
                close: 100.5 + i as f64,
                volume: 1_234_567.4,
                vwap: None,
            })
            .collect()
    }

    #[test]
    fn test_assemble_market_data() {
        let mut info = TickerInfo::new("AAPL");
        info.price = Some(190.0);
        info.trailing_pe = Some(29.5);
        info.top_holders = (0..7)
            .map(|i| InstitutionalHolder {
                name: format!("Fund {}", i),
                shares: Some(1e6),
                pct_change: Some(-0.01),
            })
            .collect();
        let chain = OptionsChain {
            expiration: None,
            calls: vec![OptionContract {
                strike: 190.0,
                volume: Some(100.0),
                implied_volatility: Some(0.25),
            }],
            puts: vec![],
        };

        let data = MarketData::assemble(&info, &chain, &bars(30), &IndicatorSettings::default());

        assert_eq!(data.current_price, Some(190.0));
        assert_eq!(data.pe_ratio, Some(29.5));
        assert_eq!(data.institutional_data.top_institutional_holders.len(), 5);
        assert_eq!(data.institutional_data.recent_institutional_activity.as_deref(), Some("Selling"));
        assert_eq!(data.options_data.as_ref().map(|o| o.total_call_volume), Some(100.0));
        assert_eq!(data.price_history.len(), 30);
        assert_eq!(data.price_history[0].volume, 1_234_567);
        assert!(data.technical_indicators.is_some());

        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["price_history"][0]["date"], "2024-01-02");
    }

    #[test]
    fn test_no_history_serializes_empty_indicators() {
        let data = MarketData::assemble(
            &TickerInfo::new("X"),
            &OptionsChain::default(),
            &[],
            &IndicatorSettings::default(),
        );
        assert!(data.options_data.is_none());

        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["technical_indicators"], serde_json::json!({}));
        assert_eq!(json["price_history"], serde_json::json!([]));
    }
}
