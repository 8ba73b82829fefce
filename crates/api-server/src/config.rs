use analysis_orchestrator::OrchestratorSettings;
use anyhow::{bail, Result};
use serde::Serialize;
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;
use technical_analysis::IndicatorSettings;
use valuation_engine::DcfAssumptions;

/// Placeholder key shipped in sample `.env` files.
pub const DEMO_KEY: &str = "demo";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AppEnv {
    Development,
    Production,
    Testing,
}

impl AppEnv {
    fn parse(value: Option<String>) -> Self {
        match value.as_deref().map(str::trim).map(str::to_ascii_lowercase).as_deref() {
            Some("production") | Some("prod") => AppEnv::Production,
            Some("testing") | Some("test") => AppEnv::Testing,
            None | Some("") | Some("development") | Some("dev") => AppEnv::Development,
            Some(other) => {
                tracing::warn!("Unknown APP_ENV '{}', using development", other);
                AppEnv::Development
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: AppEnv,
    pub secret_key: Option<String>,

    // Server
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub request_timeout: Duration,
    pub enable_hsts: bool,

    // Upstream credentials
    pub alpha_vantage_api_key: String,
    pub news_api_key: String,
    pub twitter_bearer_token: Option<String>,
    pub openai_api_key: Option<String>,

    // Requests per minute
    pub alpha_vantage_rate_limit: usize,
    pub news_api_rate_limit: usize,
    pub yahoo_rate_limit: usize,

    pub cache_ttl: Duration,
    pub demo_mode: bool,

    // Valuation defaults
    pub default_growth_rate: f64,
    pub default_discount_rate: f64,
    pub risk_free_rate: f64,
    pub market_risk_premium: f64,

    // Indicator periods
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,

    // Upstream overrides
    pub yahoo_base_url: Option<String>,
    pub yahoo_search_url: Option<String>,
    pub alpha_vantage_base_url: Option<String>,
    pub news_api_base_url: Option<String>,
    pub twitter_api_base_url: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self::read(&Vars(lookup));
        if config.env == AppEnv::Production && config.secret_key.is_none() {
            bail!("SECRET_KEY must be set when APP_ENV=production");
        }
        Ok(config)
    }

    /// Offline configuration used by tests and `DEMO_MODE`.
    pub fn demo() -> Self {
        let mut config = Self::read(&Vars(|_: &str| None));
        config.demo_mode = true;
        config
    }

    fn read<F: Fn(&str) -> Option<String>>(vars: &Vars<F>) -> Self {
        Self {
            env: AppEnv::parse(vars.text("APP_ENV")),
            secret_key: vars.text("SECRET_KEY"),

            host: vars.text("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: vars.number("PORT", 5000),
            allowed_origins: vars
                .text("ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            request_timeout: Duration::from_secs(vars.number("REQUEST_TIMEOUT_SECS", 60)),
            enable_hsts: vars.flag("ENABLE_HSTS"),

            alpha_vantage_api_key: vars.text("ALPHA_VANTAGE_API_KEY").unwrap_or_else(|| DEMO_KEY.to_string()),
            news_api_key: vars.text("NEWS_API_KEY").unwrap_or_else(|| DEMO_KEY.to_string()),
            twitter_bearer_token: vars.text("TWITTER_BEARER_TOKEN"),
            openai_api_key: vars.text("OPENAI_API_KEY"),

            alpha_vantage_rate_limit: vars.number("ALPHA_VANTAGE_RATE_LIMIT", 5),
            news_api_rate_limit: vars.number("NEWS_API_RATE_LIMIT", 100),
            yahoo_rate_limit: vars.number("YAHOO_RATE_LIMIT", 120),

            cache_ttl: Duration::from_secs(vars.number("CACHE_TTL_SECS", 300)),
            demo_mode: vars.flag("DEMO_MODE"),

            default_growth_rate: vars.number("DEFAULT_GROWTH_RATE", 0.05),
            default_discount_rate: vars.number("DEFAULT_DISCOUNT_RATE", 0.10),
            risk_free_rate: vars.number("RISK_FREE_RATE", 0.04),
            market_risk_premium: vars.number("MARKET_RISK_PREMIUM", 0.06),

            rsi_period: vars.number("RSI_PERIOD", 14),
            macd_fast: vars.number("MACD_FAST", 12),
            macd_slow: vars.number("MACD_SLOW", 26),
            macd_signal: vars.number("MACD_SIGNAL", 9),

            yahoo_base_url: vars.text("YAHOO_BASE_URL"),
            yahoo_search_url: vars.text("YAHOO_SEARCH_URL"),
            alpha_vantage_base_url: vars.text("ALPHA_VANTAGE_BASE_URL"),
            news_api_base_url: vars.text("NEWS_API_BASE_URL"),
            twitter_api_base_url: vars.text("TWITTER_API_BASE_URL"),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn has_alpha_vantage_key(&self) -> bool {
        self.alpha_vantage_api_key != DEMO_KEY
    }

    pub fn has_news_api_key(&self) -> bool {
        self.news_api_key != DEMO_KEY
    }

    pub fn orchestrator_settings(&self) -> OrchestratorSettings {
        let defaults = IndicatorSettings::default();
        OrchestratorSettings {
            cache_ttl: self.cache_ttl,
            assumptions: DcfAssumptions {
                growth_rate: self.default_growth_rate,
                discount_rate: self.default_discount_rate,
                risk_free_rate: self.risk_free_rate,
                market_risk_premium: self.market_risk_premium,
            },
            indicators: IndicatorSettings {
                rsi_period: self.rsi_period,
                macd_fast: self.macd_fast,
                macd_slow: self.macd_slow,
                macd_signal: self.macd_signal,
                ..defaults
            },
        }
    }

    /// Startup report on which integrations are live.
    pub fn log_startup(&self) {
        tracing::info!("Environment: {:?}", self.env);
        if self.demo_mode {
            tracing::warn!("DEMO_MODE is on: serving the built-in dataset, upstream APIs are not called");
            return;
        }
        if !self.has_alpha_vantage_key() {
            tracing::warn!("Using demo Alpha Vantage API key; fundamentals fallback disabled (https://www.alphavantage.co/)");
        }
        if !self.has_news_api_key() {
            tracing::warn!("Using demo News API key; headlines come from the built-in dataset (https://newsapi.org/)");
        }
        if self.twitter_bearer_token.is_none() {
            tracing::info!("Twitter API not configured (optional)");
        }
        if self.openai_api_key.is_none() {
            tracing::info!("OpenAI API not configured (optional)");
        }
    }
}

struct Vars<F>(F);

impl<F: Fn(&str) -> Option<String>> Vars<F> {
    fn text(&self, key: &str) -> Option<String> {
        (self.0)(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
    }

    /// Parsed value, or the default with a warning when unparsable.
    fn number<T>(&self, key: &str, default: T) -> T
    where
        T: FromStr + Display + Copy,
        T::Err: Display,
    {
        let Some(raw) = self.text(key) else {
            return default;
        };
        match raw.parse::<T>() {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("Invalid {}='{}' ({}), using {}", key, raw, e, default);
                default
            }
        }
    }

    fn flag(&self, key: &str) -> bool {
        self.text(key)
            .map_or(false, |v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.env, AppEnv::Development);
        assert_eq!(config.bind_address(), "0.0.0.0:5000");
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.alpha_vantage_rate_limit, 5);
        assert_eq!(config.news_api_rate_limit, 100);
        assert_eq!(config.yahoo_rate_limit, 120);
        assert!(!config.has_news_api_key());
        assert!(config.allowed_origins.is_empty());
        assert!(!config.demo_mode);
        assert!(!config.enable_hsts);
    }

    #[test]
    fn test_production_requires_secret_key() {
        assert!(config(&[("APP_ENV", "production")]).is_err());

        let config = config(&[("APP_ENV", "production"), ("SECRET_KEY", "s3cret")]).unwrap();
        assert_eq!(config.env, AppEnv::Production);
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = config(&[("PORT", "eighty"), ("CACHE_TTL_SECS", "-5"), ("DEFAULT_GROWTH_RATE", "0.07")]).unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
        assert_eq!(config.default_growth_rate, 0.07);
    }

    #[test]
    fn test_lists_and_flags() {
        let config = config(&[
            ("ALLOWED_ORIGINS", "http://localhost:3000, https://research.example.com,"),
            ("DEMO_MODE", "true"),
            ("ENABLE_HSTS", "1"),
            ("NEWS_API_KEY", "abc123"),
        ])
        .unwrap();
        assert_eq!(config.allowed_origins, vec!["http://localhost:3000", "https://research.example.com"]);
        assert!(config.demo_mode);
        assert!(config.enable_hsts);
        assert!(config.has_news_api_key());
    }

    #[test]
    fn test_orchestrator_settings() {
        let config = config(&[("RSI_PERIOD", "21"), ("DEFAULT_DISCOUNT_RATE", "0.12")]).unwrap();
        let settings = config.orchestrator_settings();
        assert_eq!(settings.indicators.rsi_period, 21);
        assert_eq!(settings.indicators.bollinger_period, 20);
        assert_eq!(settings.assumptions.discount_rate, 0.12);
        assert_eq!(settings.assumptions.growth_rate, 0.05);
    }
}
