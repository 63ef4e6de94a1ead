//! Error types for language model calls

use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GenerationError>;

/// Failure of the model call itself
///
/// Output that arrives but cannot be parsed is not an error; it is reported
/// through `ExtractionStatus` instead.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("OpenAI API error: {0}")]
    Api(#[from] async_openai::error::OpenAIError),

    #[error("Generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("No response from model")]
    EmptyResponse,

    #[error("Failed to build request: {0}")]
    Request(String),
}
