//! Embeddings and similarity ranking for card recommendation
//!
//! This crate turns the card corpus and category labels into vectors and
//! ranks cards against a category by cosine similarity.
//!
//! ## Features
//! - Generate embeddings with OpenAI's embedding models
//! - Rank the corpus against a query vector with an exact matrix scan
//! - Cache card and category vectors in SQLite across restarts
//! - Resolve category labels to query vectors

pub mod category;
pub mod client;
pub mod corpus;
pub mod error;
pub mod similarity;
pub mod store;
pub mod types;

pub use category::{distinct_categories, CategoryIndex};
pub use client::{Embedder, EmbeddingClient};
pub use corpus::{load_cards_csv, read_cards_csv, CardCorpus, ScoredCard};
pub use error::{EmbeddingError, Result};
pub use similarity::{cosine_similarity, EmbeddingMatrix, SimilarityIndex};
pub use store::{EmbeddingStats, EmbeddingStore};
pub use types::{CardEmbedding, CategoryEmbedding, EmbeddingVector, SimilarityMatch};
