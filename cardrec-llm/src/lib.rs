//! Benefit extraction with a language model
//!
//! This crate turns free-text card benefit descriptions into structured,
//! comparable records. All candidate cards for a request are sent to the
//! model in one batch and the JSON answer is validated and aligned back to
//! the cards by position.

pub mod error;
pub mod extractor;
pub mod openai;
pub mod parse;
pub mod prompt;
pub mod types;

pub use error::{GenerationError, Result};
pub use extractor::BenefitExtractor;
pub use openai::{Generator, OpenAIClient, DEFAULT_TIMEOUT};
pub use parse::{parse_batch_response, NO_OBJECTS, PARSE_FAILURE};
pub use prompt::{build_batch_prompt, REFERENCE_SPEND, SYSTEM_PROMPT};
pub use types::BatchExtraction;
