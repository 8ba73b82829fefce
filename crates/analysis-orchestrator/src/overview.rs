//! Market-wide dashboard: benchmark indices, sector ETFs, breadth, volume
//! and volatility, plus the per-sector drill-down.

use crate::market_data::snapshot_or_empty;
use crate::ResearchOrchestrator;
use analysis_core::{sectors, AnalysisError, HistoryRange, TickerInfo};
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use technical_analysis::TechnicalSnapshot;

/// VIX level assumed when the index cannot be fetched.
pub const DEFAULT_VIX: f64 = 20.0;

/// A quote counts toward new highs/lows within this band of the 52-week range.
const NEW_EXTREME_BAND: f64 = 0.02;
/// Volume above this multiple of its average is unusual.
const UNUSUAL_VOLUME_MULTIPLE: f64 = 1.5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexQuote {
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub volume: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorQuote {
    pub price: f64,
    pub change_percent: f64,
    pub volume: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketBreadth {
    pub advancing_stocks: usize,
    pub declining_stocks: usize,
    pub advance_decline_ratio: f64,
    pub new_highs: usize,
    pub new_lows: usize,
    pub high_low_ratio: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingVolume {
    pub total_volume: f64,
    pub average_volume: f64,
    pub volume_trend: String,
    pub unusual_volume: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolatilityIndicators {
    pub vix_level: f64,
    pub volatility_level: String,
    pub fear_greed_index: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketOverview {
    pub indices: BTreeMap<String, IndexQuote>,
    pub sectors: BTreeMap<String, SectorQuote>,
    pub market_breadth: MarketBreadth,
    pub market_sentiment: String,
    pub trading_volume: TradingVolume,
    pub volatility: VolatilityIndicators,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorAnalysis {
    pub sector_name: String,
    pub etf_symbol: String,
    pub current_price: Option<f64>,
    pub change_percent: Option<f64>,
    pub volume: Option<f64>,
    pub market_cap: Option<f64>,
    pub pe_ratio: Option<f64>,
    #[serde(serialize_with = "snapshot_or_empty")]
    pub technical_analysis: Option<TechnicalSnapshot>,
    pub sector_trends: Vec<String>,
    pub key_drivers: Vec<String>,
}

/// Bullish when at least 70% of the quotes are up, Bearish at 30% or less.
pub fn market_sentiment_label(changes: &[f64]) -> &'static str {
    if changes.is_empty() {
        return "Neutral";
    }
    let positive = changes.iter().filter(|c| **c > 0.0).count();
    let ratio = positive as f64 / changes.len() as f64;
    if ratio >= 0.7 {
        "Bullish"
    } else if ratio <= 0.3 {
        "Bearish"
    } else {
        "Neutral"
    }
}

pub fn volatility_level(vix: f64) -> &'static str {
    if vix < 15.0 {
        "Low"
    } else if vix < 25.0 {
        "Normal"
    } else if vix < 35.0 {
        "High"
    } else {
        "Extreme"
    }
}

pub fn fear_greed_index(vix: f64) -> &'static str {
    if vix < 15.0 {
        "Extreme Greed"
    } else if vix < 20.0 {
        "Greed"
    } else if vix < 25.0 {
        "Neutral"
    } else if vix < 30.0 {
        "Fear"
    } else {
        "Extreme Fear"
    }
}

pub fn volatility_indicators(vix: Option<f64>) -> VolatilityIndicators {
    let vix = vix.filter(|v| v.is_finite()).unwrap_or(DEFAULT_VIX);
    VolatilityIndicators {
        vix_level: vix,
        volatility_level: volatility_level(vix).to_string(),
        fear_greed_index: fear_greed_index(vix).to_string(),
    }
}

/// Breadth over the sector ETFs.
pub fn market_breadth(quotes: &[TickerInfo]) -> MarketBreadth {
    let changes: Vec<f64> = quotes.iter().filter_map(|q| q.change_percent).collect();
    let advancing = changes.iter().filter(|c| **c > 0.0).count();
    let declining = changes.iter().filter(|c| **c < 0.0).count();

    let near = |price: Option<f64>, extreme: Option<f64>, high: bool| match (price, extreme) {
        (Some(p), Some(e)) if e > 0.0 => {
            if high {
                p >= e * (1.0 - NEW_EXTREME_BAND)
            } else {
                p <= e * (1.0 + NEW_EXTREME_BAND)
            }
        }
        _ => false,
    };
    let new_highs = quotes.iter().filter(|q| near(q.price, q.year_high, true)).count();
    let new_lows = quotes.iter().filter(|q| near(q.price, q.year_low, false)).count();

    MarketBreadth {
        advancing_stocks: advancing,
        declining_stocks: declining,
        advance_decline_ratio: advancing as f64 / declining.max(1) as f64,
        new_highs,
        new_lows,
        high_low_ratio: new_highs as f64 / new_lows.max(1) as f64,
    }
}

/// Session volume of the sector ETFs against their average volume.
pub fn trading_volume(quotes: &[TickerInfo]) -> TradingVolume {
    let total_volume: f64 = quotes.iter().filter_map(|q| q.volume).sum();
    let average_volume: f64 = quotes.iter().filter_map(|q| q.average_volume).sum();
    let unusual_volume = quotes
        .iter()
        .filter(|q| match (q.volume, q.average_volume) {
            (Some(v), Some(avg)) => avg > 0.0 && v > avg * UNUSUAL_VOLUME_MULTIPLE,
            _ => false,
        })
        .count();

    TradingVolume {
        total_volume,
        average_volume,
        volume_trend: if total_volume > average_volume { "Increasing" } else { "Decreasing" }.to_string(),
        unusual_volume,
    }
}

pub fn sector_trends(sector: &str) -> Vec<String> {
    let trends: &[&str] = match sector {
        "Technology" => &["AI/ML adoption", "Cloud computing growth", "Cybersecurity focus"],
        "Healthcare" => &["Digital health", "Biotech innovation", "Telemedicine expansion"],
        "Financial Services" => &["Fintech disruption", "Digital banking", "Regulatory changes"],
        "Consumer Discretionary" => &["E-commerce growth", "Digital transformation", "Sustainability focus"],
        "Energy" => &["Renewable energy transition", "Oil price volatility", "ESG focus"],
        "Real Estate" => &["Remote work impact", "Urban migration", "Interest rate sensitivity"],
        _ => &["General market trends"],
    };
    trends.iter().map(|t| t.to_string()).collect()
}

pub fn sector_drivers(sector: &str) -> Vec<String> {
    let drivers: &[&str] = match sector {
        "Technology" => &["Innovation", "Digital transformation", "Global competition"],
        "Healthcare" => &["Demographics", "Regulation", "Technology adoption"],
        "Financial Services" => &["Interest rates", "Regulation", "Technology disruption"],
        "Consumer Discretionary" => &["Consumer confidence", "Economic growth", "Technology adoption"],
        "Energy" => &["Oil prices", "Geopolitics", "Climate policy"],
        "Real Estate" => &["Interest rates", "Economic growth", "Demographics"],
        _ => &["Economic conditions", "Market sentiment"],
    };
    drivers.iter().map(|d| d.to_string()).collect()
}

impl ResearchOrchestrator {
    /// Quotes for a fixed list of `(label, symbol)` pairs, fetched concurrently.
    /// Symbols that fail are left out.
    async fn quotes(&self, symbols: &[(&str, &str)]) -> Vec<(String, TickerInfo)> {
        let results = join_all(symbols.iter().map(|(_, symbol)| self.ticker_info(symbol))).await;

        symbols
            .iter()
            .zip(results)
            .filter_map(|((label, symbol), result)| match result {
                Ok(info) => Some((label.to_string(), info)),
                Err(e) => {
                    tracing::warn!("Error getting data for {} ({}): {}", label, symbol, e);
                    None
                }
            })
            .collect()
    }

    pub async fn market_overview(&self) -> Result<MarketOverview, AnalysisError> {
        let (indices, sector_quotes) = tokio::join!(
            self.quotes(sectors::MARKET_INDICES),
            self.quotes(sectors::SECTOR_ETFS),
        );

        if indices.is_empty() && sector_quotes.is_empty() {
            return Err(AnalysisError::ApiError("No market data available".to_string()));
        }

        let vix = indices
            .iter()
            .find(|(label, _)| label == "VIX")
            .and_then(|(_, info)| info.price);
        let index_changes: Vec<f64> = indices.iter().filter_map(|(_, info)| info.change_percent).collect();
        let etf_infos: Vec<TickerInfo> = sector_quotes.iter().map(|(_, info)| info.clone()).collect();

        Ok(MarketOverview {
            market_sentiment: market_sentiment_label(&index_changes).to_string(),
            market_breadth: market_breadth(&etf_infos),
            trading_volume: trading_volume(&etf_infos),
            volatility: volatility_indicators(vix),
            indices: indices
                .into_iter()
                .map(|(label, info)| {
                    let quote = IndexQuote {
                        price: info.price.unwrap_or(0.0),
                        change: info.change.unwrap_or(0.0),
                        change_percent: info.change_percent.unwrap_or(0.0),
                        volume: info.volume.unwrap_or(0.0),
                    };
                    (label, quote)
                })
                .collect(),
            sectors: sector_quotes
                .into_iter()
                .map(|(label, info)| {
                    let quote = SectorQuote {
                        price: info.price.unwrap_or(0.0),
                        change_percent: info.change_percent.unwrap_or(0.0),
                        volume: info.volume.unwrap_or(0.0),
                    };
                    (label, quote)
                })
                .collect(),
            last_updated: Utc::now(),
        })
    }

    pub async fn sector_analysis(&self, sector: &str) -> Result<SectorAnalysis, AnalysisError> {
        let (sector_name, etf) =
            sectors::sector_etf(sector).ok_or_else(|| AnalysisError::NotFound("Sector not found".to_string()))?;

        let (info, bars) = tokio::join!(self.ticker_info(etf), self.price_history(etf, HistoryRange::Year1));
        let info = info?;
        let bars = bars.unwrap_or_default();

        Ok(SectorAnalysis {
            sector_name: sector_name.to_string(),
            etf_symbol: etf.to_string(),
            current_price: info.price,
            change_percent: info.change_percent,
            volume: info.volume,
            market_cap: info.market_cap,
            pe_ratio: info.trailing_pe,
            technical_analysis: TechnicalSnapshot::from_bars(&bars, &self.settings().indicators),
            sector_trends: sector_trends(sector_name),
            key_drivers: sector_drivers(sector_name),
        })
    }
}
