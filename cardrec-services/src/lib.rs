//! Recommendation pipeline for the card recommendation service
//!
//! This crate wires the category index, the similarity ranker and the
//! benefit extractor into the service the HTTP layer calls.

pub mod context;
pub mod recommender;

pub use context::RecommendationContext;
pub use recommender::RecommendationService;
