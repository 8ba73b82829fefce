//! Valuation endpoints
//!
//! Detailed DCF with optional rate overrides, peer multiples, the
//! growth/discount sensitivity grid and the blended fair-value range.

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use valuation_engine::{DcfValuation, FairValueRange, PeerComparison, SensitivityAnalysis};

use crate::{require_symbol, ApiResponse, AppError, AppState};

/// Rates outside this band are rejected before any upstream call.
const RATE_BOUNDS: (f64, f64) = (-0.5, 1.0);

#[derive(Deserialize)]
pub struct SymbolRequest {
    #[serde(default)]
    pub symbol: Option<String>,
}

#[derive(Deserialize)]
pub struct DcfRequest {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub growth_rate: Option<f64>,
    #[serde(default)]
    pub discount_rate: Option<f64>,
}

pub fn valuation_routes() -> Router<AppState> {
    Router::new()
        .route("/api/valuation/dcf", post(calculate_dcf))
        .route("/api/valuation/comparison", post(compare_valuations))
        .route("/api/valuation/sensitivity", post(sensitivity))
        .route("/api/valuation/fair-value", post(fair_value))
}

fn check_rate(name: &str, rate: Option<f64>) -> Result<(), AppError> {
    match rate {
        Some(r) if !r.is_finite() || r < RATE_BOUNDS.0 || r > RATE_BOUNDS.1 => Err(AppError::bad_request(format!(
            "{} must be between {} and {}",
            name, RATE_BOUNDS.0, RATE_BOUNDS.1
        ))),
        _ => Ok(()),
    }
}

async fn calculate_dcf(
    State(state): State<AppState>,
    Json(request): Json<DcfRequest>,
) -> Result<Json<ApiResponse<DcfValuation>>, AppError> {
    let symbol = require_symbol(request.symbol.as_deref())?;
    check_rate("growth_rate", request.growth_rate)?;
    check_rate("discount_rate", request.discount_rate)?;

    let dcf = state
        .orchestrator
        .dcf(&symbol, request.growth_rate, request.discount_rate)
        .await
        .map_err(|e| AppError::internal("DCF calculation failed", e))?;

    Ok(Json(ApiResponse::success(dcf)))
}

async fn compare_valuations(
    State(state): State<AppState>,
    Json(request): Json<SymbolRequest>,
) -> Result<Json<ApiResponse<PeerComparison>>, AppError> {
    let symbol = require_symbol(request.symbol.as_deref())?;

    let comparison = state
        .orchestrator
        .peer_comparison(&symbol)
        .await
        .map_err(|e| AppError::internal("Peer comparison failed", e))?;

    Ok(Json(ApiResponse::success(comparison)))
}

async fn sensitivity(
    State(state): State<AppState>,
    Json(request): Json<SymbolRequest>,
) -> Result<Json<ApiResponse<SensitivityAnalysis>>, AppError> {
    let symbol = require_symbol(request.symbol.as_deref())?;

    let analysis = state
        .orchestrator
        .sensitivity(&symbol)
        .await
        .map_err(|e| AppError::internal("Sensitivity analysis failed", e))?;

    Ok(Json(ApiResponse::success(analysis)))
}

async fn fair_value(
    State(state): State<AppState>,
    Json(request): Json<SymbolRequest>,
) -> Result<Json<ApiResponse<FairValueRange>>, AppError> {
    let symbol = require_symbol(request.symbol.as_deref())?;

    let range = state
        .orchestrator
        .fair_value_range(&symbol)
        .await
        .map_err(|e| AppError::internal("Fair value calculation failed", e))?;

    Ok(Json(ApiResponse::success(range)))
}
