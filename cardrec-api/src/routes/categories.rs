//! Category listing endpoint

use axum::{extract::State, response::Json, routing::get, Router};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
struct CategoriesResponse {
    available_categories: Vec<String>,
}

/// List categories that can be passed to `/recommend`
async fn list_categories(State(state): State<AppState>) -> Json<CategoriesResponse> {
    Json(CategoriesResponse {
        available_categories: state.recommendation_service.available_categories(),
    })
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/categories", get(list_categories))
}
