//! Core types for embeddings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Embedding vector (dimension fixed by the embedding model)
pub type EmbeddingVector = Vec<f32>;

/// Stored embedding for one corpus row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardEmbedding {
    /// Position of the card in the corpus
    pub row_index: usize,
    /// Card name, kept to detect a corpus that changed under the store
    pub card_name: String,
    /// The embedding vector
    pub embedding: EmbeddingVector,
    pub dimension: usize,
    /// Model used to produce the vector
    pub model: String,
    pub created_at: DateTime<Utc>,
}

/// Cached embedding for a category label
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryEmbedding {
    pub category: String,
    pub embedding: EmbeddingVector,
    pub dimension: usize,
    pub model: String,
    pub created_at: DateTime<Utc>,
}

/// Similarity of one corpus row to a query vector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityMatch {
    /// Row index in the corpus
    pub index: usize,
    /// Cosine similarity score (-1.0 - 1.0)
    pub score: f64,
}

impl CardEmbedding {
    pub fn new(row_index: usize, card_name: String, model: &str, embedding: EmbeddingVector) -> Self {
        Self {
            row_index,
            card_name,
            dimension: embedding.len(),
            embedding,
            model: model.to_string(),
            created_at: Utc::now(),
        }
    }
}

impl CategoryEmbedding {
    pub fn new(category: String, model: &str, embedding: EmbeddingVector) -> Self {
        Self {
            category,
            dimension: embedding.len(),
            embedding,
            model: model.to_string(),
            created_at: Utc::now(),
        }
    }
}
