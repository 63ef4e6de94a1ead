//! API route definitions

mod categories;
mod health;
mod recommend;

use axum::Router;
use crate::AppState;

/// Create all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(categories::routes())
        .merge(recommend::routes())
        .merge(health::routes())
}
