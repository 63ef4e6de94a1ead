//! Cosine similarity calculations and corpus ranking

use std::cmp::Ordering;

use ndarray::{Array1, Array2, ArrayView1, Axis, Zip};
use tracing::debug;

use crate::{
    error::{EmbeddingError, Result},
    types::{EmbeddingVector, SimilarityMatch},
};

/// Calculate cosine similarity between two embeddings
///
/// Returns a value between -1.0 (opposite) and 1.0 (identical), or 0.0 when
/// either vector has zero magnitude or the dimensions differ.
///
/// Formula: cos(θ) = (A · B) / (||A|| ||B||)
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }

    let a_view = ArrayView1::from(a);
    let b_view = ArrayView1::from(b);

    let dot_product = a_view.dot(&b_view);
    let norm_a = a_view.dot(&a_view).sqrt();
    let norm_b = b_view.dot(&b_view).sqrt();

    // Avoid division by zero
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot_product / (norm_a * norm_b)) as f64
}

/// Nearest-neighbour search over the corpus embeddings
///
/// Implementations return at most `top_n` matches ordered by descending
/// score, with equal scores kept in corpus order. `top_n` larger than the
/// corpus is clamped.
pub trait SimilarityIndex: Send + Sync {
    fn search(&self, query: &[f32], top_n: usize) -> Result<Vec<SimilarityMatch>>;

    /// Number of indexed rows
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn dimension(&self) -> usize;
}

/// Dense row-per-card embedding matrix with precomputed row norms
///
/// Search is an exact scan: one matrix-vector product per query.
#[derive(Debug, Clone)]
pub struct EmbeddingMatrix {
    rows: Array2<f32>,
    norms: Array1<f32>,
}

impl EmbeddingMatrix {
    /// Build the matrix from rows, all of which must have `dimension` finite values
    pub fn from_rows(rows: Vec<EmbeddingVector>, dimension: usize) -> Result<Self> {
        for (i, row) in rows.iter().enumerate() {
            if row.len() != dimension {
                return Err(EmbeddingError::InvalidDimension {
                    expected: dimension,
                    actual: row.len(),
                });
            }
            if row.iter().any(|v| !v.is_finite()) {
                return Err(EmbeddingError::Corpus(format!(
                    "Non-finite value in embedding row {}",
                    i
                )));
            }
        }

        let count = rows.len();
        let flat: Vec<f32> = rows.into_iter().flatten().collect();
        let rows = Array2::from_shape_vec((count, dimension), flat)
            .map_err(|e| EmbeddingError::Corpus(e.to_string()))?;
        let norms = rows.map_axis(Axis(1), |row| row.dot(&row).sqrt());

        Ok(Self { rows, norms })
    }

    /// Cosine similarity of `query` against every row, in row order
    pub fn scores(&self, query: &[f32]) -> Result<Array1<f64>> {
        if query.len() != self.dimension() {
            return Err(EmbeddingError::InvalidDimension {
                expected: self.dimension(),
                actual: query.len(),
            });
        }

        let query = ArrayView1::from(query);
        let query_norm = query.dot(&query).sqrt();
        let dots = self.rows.dot(&query);

        Ok(Zip::from(&dots)
            .and(&self.norms)
            .map_collect(|&dot, &norm| {
                if query_norm == 0.0 || norm == 0.0 {
                    0.0
                } else {
                    (dot / (query_norm * norm)) as f64
                }
            }))
    }
}

impl SimilarityIndex for EmbeddingMatrix {
    fn search(&self, query: &[f32], top_n: usize) -> Result<Vec<SimilarityMatch>> {
        let top_n = top_n.min(self.len());
        if top_n == 0 {
            return Ok(Vec::new());
        }

        let scores = self.scores(query)?;

        let mut matches: Vec<SimilarityMatch> = scores
            .iter()
            .enumerate()
            .map(|(index, &score)| SimilarityMatch { index, score })
            .collect();

        // Stable sort keeps corpus order among equal scores
        matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        matches.truncate(top_n);

        if let Some(top) = matches.first() {
            debug!(
                "Ranked {} rows, top_n={}, top index={} score={:.3}",
                self.len(),
                top_n,
                top.index,
                top.score
            );
        }

        Ok(matches)
    }

    fn len(&self) -> usize {
        self.rows.nrows()
    }

    fn dimension(&self) -> usize {
        self.rows.ncols()
    }
}
