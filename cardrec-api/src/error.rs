//! HTTP mapping of service errors

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cardrec_core::CardRecError;
use serde::Serialize;
use tracing::error;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_categories: Option<Vec<String>>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            available_categories: None,
        }
    }
}

/// Error returned from API handlers
#[derive(Debug)]
pub struct ApiError(pub CardRecError);

impl From<CardRecError> for ApiError {
    fn from(e: CardRecError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self.0 {
            CardRecError::CategoryNotFound {
                ref category,
                ref available,
            } => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: format!("Category '{}' not found in category embeddings.", category),
                    available_categories: Some(available.clone()),
                },
            ),
            CardRecError::InvalidTopN(_) => {
                (StatusCode::BAD_REQUEST, ErrorResponse::new(self.0.to_string()))
            }
            ref other => {
                // Details stay in the log
                error!("Request failed: {}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("Internal server error"),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
