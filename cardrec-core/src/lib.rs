//! Core types for the card recommendation service
//!
//! This crate defines the shared data structures used across the workspace:
//! card records from the corpus, the structured benefit records produced by
//! extraction, and the recommendation payload returned to callers.

pub mod benefit;
pub mod card;
pub mod error;
pub mod recommendation;

pub use benefit::{BenefitAmount, BenefitRecord, ExtractedBenefit, ExtractionStatus, FallbackRecord};
pub use card::CardRecord;
pub use error::{CardRecError, CardRecResult};
pub use recommendation::Recommendation;
