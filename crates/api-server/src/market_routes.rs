use analysis_core::AnalysisError;
use analysis_orchestrator::{MarketOverview, SectorAnalysis};
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::{ApiResponse, AppError, AppState};

pub fn market_routes() -> Router<AppState> {
    Router::new()
        .route("/api/market/overview", get(get_market_overview))
        .route("/api/market/sectors/:sector", get(get_sector_analysis))
}

async fn get_market_overview(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<MarketOverview>>, AppError> {
    let overview = state
        .orchestrator
        .market_overview()
        .await
        .map_err(|e| AppError::internal("Failed to get market overview", e))?;
    Ok(Json(ApiResponse::success(overview)))
}

/// Accepts `technology`, `Real Estate` or `real-estate`.
async fn get_sector_analysis(
    State(state): State<AppState>,
    Path(sector): Path<String>,
) -> Result<Json<ApiResponse<SectorAnalysis>>, AppError> {
    let sector = sector.replace(['-', '_'], " ");

    match state.orchestrator.sector_analysis(&sector).await {
        Ok(analysis) => Ok(Json(ApiResponse::success(analysis))),
        Err(e @ AnalysisError::NotFound(_)) => Err(AppError::not_found(e.detail())),
        Err(e) => Err(AppError::internal("Failed to get sector analysis", e)),
    }
}
