use analysis_core::Bar;
use serde::{Deserialize, Serialize};

use crate::indicators::*;

/// Indicator periods; the defaults are the conventional 14 / 12-26-9 / 20x2.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSettings {
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bollinger_period: usize,
    pub bollinger_std_dev: f64,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bollinger_period: 20,
            bollinger_std_dev: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceVsAverage {
    Above,
    Below,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RsiZone {
    Overbought,
    Oversold,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MacdBias {
    Bullish,
    Bearish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BandPosition {
    Upper,
    Middle,
    Lower,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovingAverages {
    pub sma_20: f64,
    pub sma_50: f64,
    pub sma_200: f64,
    pub price_vs_sma_20: PriceVsAverage,
    pub price_vs_sma_50: PriceVsAverage,
    pub price_vs_sma_200: PriceVsAverage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RsiReading {
    pub value: f64,
    pub interpretation: RsiZone,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacdReading {
    pub value: f64,
    pub signal: f64,
    pub interpretation: MacdBias,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BollingerReading {
    pub upper: f64,
    pub lower: f64,
    pub position: BandPosition,
}

/// Latest reading of every indicator shown on the dashboard.
///
/// Indicators that need more history than is available fall back to neutral
/// values: 0 for averages and bands, 50 for RSI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicalSnapshot {
    pub moving_averages: MovingAverages,
    pub rsi: RsiReading,
    pub macd: MacdReading,
    pub bollinger_bands: BollingerReading,
}

impl TechnicalSnapshot {
    /// `None` for an empty series.
    pub fn from_closes(closes: &[f64], settings: &IndicatorSettings) -> Option<Self> {
        let price = *closes.last()?;

        let last_sma = |period: usize| sma(closes, period).last().copied();
        let vs = |avg: Option<f64>| match avg {
            Some(a) if price > a => PriceVsAverage::Above,
            _ => PriceVsAverage::Below,
        };
        let (sma_20, sma_50, sma_200) = (last_sma(20), last_sma(50), last_sma(200));

        let rsi_value = rolling_rsi(closes, settings.rsi_period).last().copied();
        let interpretation = match rsi_value {
            Some(v) if v > 70.0 => RsiZone::Overbought,
            Some(v) if v < 30.0 => RsiZone::Oversold,
            _ => RsiZone::Neutral,
        };

        let macd_result = macd(closes, settings.macd_fast, settings.macd_slow, settings.macd_signal);
        let macd_value = macd_result.macd_line.last().copied().unwrap_or(0.0);
        let macd_signal = macd_result.signal_line.last().copied().unwrap_or(0.0);

        let bands = bollinger_bands(closes, settings.bollinger_period, settings.bollinger_std_dev);
        let upper = bands.upper.last().copied();
        let lower = bands.lower.last().copied();
        let position = match (upper, lower) {
            (Some(u), _) if price > u => BandPosition::Upper,
            (_, Some(l)) if price < l => BandPosition::Lower,
            _ => BandPosition::Middle,
        };

        Some(Self {
            moving_averages: MovingAverages {
                sma_20: sma_20.unwrap_or(0.0),
                sma_50: sma_50.unwrap_or(0.0),
                sma_200: sma_200.unwrap_or(0.0),
                price_vs_sma_20: vs(sma_20),
                price_vs_sma_50: vs(sma_50),
                price_vs_sma_200: vs(sma_200),
            },
            rsi: RsiReading {
                value: rsi_value.unwrap_or(50.0),
                interpretation,
            },
            macd: MacdReading {
                value: macd_value,
                signal: macd_signal,
                interpretation: if macd_value > macd_signal {
                    MacdBias::Bullish
                } else {
                    MacdBias::Bearish
                },
            },
            bollinger_bands: BollingerReading {
                upper: upper.unwrap_or(0.0),
                lower: lower.unwrap_or(0.0),
                position,
            },
        })
    }

    pub fn from_bars(bars: &[Bar], settings: &IndicatorSettings) -> Option<Self> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        Self::from_closes(&closes, settings)
    }

    /// Short-term trend label used by market sentiment.
    pub fn trend(&self) -> &'static str {
        let ma = &self.moving_averages;
        match (ma.price_vs_sma_20, ma.price_vs_sma_50) {
            (PriceVsAverage::Above, PriceVsAverage::Above) => "Uptrend",
            (PriceVsAverage::Below, PriceVsAverage::Below) => "Downtrend",
            _ => "Sideways",
        }
    }
}
