//! Sentiment Routes
//!
//! News sentiment trends, the short-term forecast and relative sentiment
//! against a list of competitors.

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use sentiment_analysis::{CompetitorSentiment, SentimentForecast, SentimentTrends};
use serde::Deserialize;

use crate::{require_symbol, require_text, ApiResponse, AppError, AppState};

/// Competitors scored per request; each one costs a full sentiment lookup.
const MAX_COMPETITORS: usize = 10;

#[derive(Deserialize)]
pub struct TrendsQuery {
    #[serde(default)]
    pub symbol: Option<String>,
}

#[derive(Deserialize)]
pub struct ForecastQuery {
    #[serde(default)]
    pub company: Option<String>,
}

#[derive(Deserialize)]
pub struct CompetitorRequest {
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub competitors: Vec<String>,
}

pub fn sentiment_routes() -> Router<AppState> {
    Router::new()
        .route("/api/sentiment/trends", get(get_sentiment_trends))
        .route("/api/sentiment/forecast", get(get_sentiment_forecast))
        .route("/api/sentiment/competitors", post(compare_competitors))
}

async fn get_sentiment_trends(
    State(state): State<AppState>,
    Query(query): Query<TrendsQuery>,
) -> Result<Json<ApiResponse<SentimentTrends>>, AppError> {
    let symbol = require_symbol(query.symbol.as_deref())?;
    let trends = state.orchestrator.sentiment_trends(&symbol).await;
    Ok(Json(ApiResponse::success(trends)))
}

async fn get_sentiment_forecast(
    State(state): State<AppState>,
    Query(query): Query<ForecastQuery>,
) -> Result<Json<ApiResponse<SentimentForecast>>, AppError> {
    let company = require_text(query.company.as_deref(), "Company name is required")?;
    let forecast = state.orchestrator.sentiment_forecast(&company).await;
    Ok(Json(ApiResponse::success(forecast)))
}

async fn compare_competitors(
    State(state): State<AppState>,
    Json(request): Json<CompetitorRequest>,
) -> Result<Json<ApiResponse<CompetitorSentiment>>, AppError> {
    let company = require_text(request.company.as_deref(), "Company name is required")?;

    let mut competitors: Vec<String> = Vec::new();
    for name in request.competitors.iter().map(|c| c.trim()).filter(|c| !c.is_empty()) {
        if !competitors.iter().any(|c| c.eq_ignore_ascii_case(name)) && !name.eq_ignore_ascii_case(&company) {
            competitors.push(name.to_string());
        }
    }
    if competitors.is_empty() {
        return Err(AppError::bad_request("At least one competitor is required"));
    }
    if competitors.len() > MAX_COMPETITORS {
        return Err(AppError::bad_request(format!(
            "At most {} competitors can be compared",
            MAX_COMPETITORS
        )));
    }

    let comparison = state.orchestrator.competitor_sentiment(&company, &competitors).await;
    Ok(Json(ApiResponse::success(comparison)))
}
