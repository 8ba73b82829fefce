//! Comprehensive company analysis.

use analysis_core::AnalysisError;
use analysis_orchestrator::ComprehensiveAnalysis;
use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;

use crate::{require_text, ApiResponse, AppError, AppState};

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    /// Company name or ticker symbol.
    #[serde(default)]
    pub company_input: Option<String>,
}

pub fn analysis_routes() -> Router<AppState> {
    Router::new().route("/api/analyze", post(analyze_company))
}

async fn analyze_company(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<ApiResponse<ComprehensiveAnalysis>>, AppError> {
    let input = require_text(request.company_input.as_deref(), "Company name or symbol is required")?;
    tracing::info!("Analyzing company: {}", input);

    match state.orchestrator.analyze(&input).await {
        Ok(analysis) => Ok(Json(ApiResponse::success(analysis))),
        Err(AnalysisError::NotFound(_)) => Err(AppError::not_found("Company not found")),
        Err(e) => Err(AppError::internal("An error occurred during analysis", e)),
    }
}
