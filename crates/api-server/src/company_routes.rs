use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use fundamental_analysis::CompanySummary;
use serde::Deserialize;

use crate::{ApiResponse, AppError, AppState};

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: Option<String>,
}

pub fn company_routes() -> Router<AppState> {
    Router::new().route("/api/companies/search", get(search_companies))
}

async fn search_companies(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<CompanySummary>>>, AppError> {
    let q = query.q.as_deref().unwrap_or_default().trim();
    if q.is_empty() {
        return Ok(Json(ApiResponse::success(Vec::new())));
    }

    let results = state.orchestrator.search_companies(q).await;
    tracing::debug!("Search '{}' matched {} companies", q, results.len());
    Ok(Json(ApiResponse::success(results)))
}
