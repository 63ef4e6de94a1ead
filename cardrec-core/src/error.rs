//! Error types for the recommendation service

use thiserror::Error;

/// Service-wide error type
#[derive(Error, Debug)]
pub enum CardRecError {
    /// Requested category has no vector in the category index
    #[error("Category '{category}' not found in category embeddings.")]
    CategoryNotFound {
        category: String,
        available: Vec<String>,
    },

    #[error("top_n must be at least 1 (got {0})")]
    InvalidTopN(i64),

    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Language model call failed or timed out
    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CardRecError {
    pub fn category_not_found(category: impl Into<String>, available: Vec<String>) -> Self {
        CardRecError::CategoryNotFound {
            category: category.into(),
            available,
        }
    }

    pub fn embedding(msg: impl Into<String>) -> Self {
        CardRecError::Embedding(msg.into())
    }

    pub fn generation(msg: impl Into<String>) -> Self {
        CardRecError::Generation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        CardRecError::Internal(msg.into())
    }

    /// Errors the caller can fix by changing the request
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CardRecError::CategoryNotFound { .. } | CardRecError::InvalidTopN(_)
        )
    }
}

/// Result type alias for recommendation operations
pub type CardRecResult<T> = Result<T, CardRecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_not_found_message_names_category() {
        let err = CardRecError::category_not_found("groceries", vec!["dining".to_string()]);
        assert_eq!(
            err.to_string(),
            "Category 'groceries' not found in category embeddings."
        );
        assert!(err.is_client_error());
    }

    #[test]
    fn test_generation_is_server_error() {
        assert!(!CardRecError::generation("timed out").is_client_error());
    }
}
