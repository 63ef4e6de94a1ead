//! Recommendation endpoint

use axum::{extract::State, response::Json, routing::post, Router};
use cardrec_core::Recommendation;
use serde::Deserialize;
use tracing::info;

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    pub category: String,
    /// Falls back to the server default when omitted
    #[serde(default)]
    pub top_n: Option<i64>,
}

/// Recommend cards for a spending category
async fn recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendRequest>,
) -> Result<Json<Recommendation>, ApiError> {
    let top_n = request.top_n.unwrap_or(state.default_top_n);
    info!("Recommendation requested for {} (top_n={})", request.category, top_n);

    let recommendation = state
        .recommendation_service
        .recommend(&request.category, top_n)
        .await?;

    Ok(Json(recommendation))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/recommend", post(recommend))
}
