//! Error types for embedding operations

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EmbeddingError>;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("OpenAI API error: {0}")]
    OpenAI(#[from] async_openai::error::OpenAIError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("Deserialization error: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("Invalid embedding dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    #[error("Category '{0}' not found in category embeddings.")]
    CategoryNotFound(String),

    #[error("Corpus error: {0}")]
    Corpus(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<rusqlite::Error> for EmbeddingError {
    fn from(e: rusqlite::Error) -> Self {
        EmbeddingError::Database(e.to_string())
    }
}

impl From<csv::Error> for EmbeddingError {
    fn from(e: csv::Error) -> Self {
        EmbeddingError::Corpus(e.to_string())
    }
}
