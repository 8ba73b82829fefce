//! Upstream market data clients.
//!
//! Yahoo Finance is the primary source of quotes, statements, history and
//! options. Alpha Vantage serves as a fundamentals fallback, NewsAPI and
//! Twitter feed sentiment scoring, and [`DemoProvider`] answers offline.

pub mod alpha_vantage;
pub mod demo;
pub mod fields;
pub mod news_api;
pub mod transport;
pub mod twitter;
pub mod yahoo;

pub use alpha_vantage::AlphaVantageClient;
pub use demo::DemoProvider;
pub use news_api::NewsApiClient;
pub use transport::{ApiTransport, RateLimiter};
pub use twitter::TwitterClient;
pub use yahoo::{YahooClient, YahooConfig};
