//! Category index: one embedding per distinct category label

use cardrec_core::CardRecord;
use indexmap::{IndexMap, IndexSet};
use tracing::{info, instrument, warn};

use crate::{
    client::Embedder,
    error::{EmbeddingError, Result},
    store::EmbeddingStore,
    types::{CategoryEmbedding, EmbeddingVector},
};

/// Immutable map from category label to its query vector
///
/// Labels keep their order of first appearance in the corpus and are
/// compared by exact, case-sensitive string equality.
#[derive(Debug, Clone, Default)]
pub struct CategoryIndex {
    vectors: IndexMap<String, EmbeddingVector>,
}

/// Distinct category labels in order of first appearance
pub fn distinct_categories(cards: &[CardRecord]) -> Vec<String> {
    cards
        .iter()
        .map(|card| card.category.as_str())
        .collect::<IndexSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

impl CategoryIndex {
    /// Build from precomputed `(label, vector)` pairs; a repeated label keeps its first vector
    pub fn from_vectors(pairs: impl IntoIterator<Item = (String, EmbeddingVector)>) -> Self {
        let mut vectors = IndexMap::new();
        for (category, vector) in pairs {
            vectors.entry(category).or_insert(vector);
        }
        Self { vectors }
    }

    /// Embed every distinct category in `cards`
    ///
    /// Vectors cached in `store` for the embedder's model are reused; the
    /// rest are embedded in one batch and written back to the store.
    #[instrument(skip_all, fields(model = embedder.model()))]
    pub async fn build(
        cards: &[CardRecord],
        embedder: &dyn Embedder,
        store: Option<&EmbeddingStore>,
    ) -> Result<Self> {
        let categories = distinct_categories(cards);
        let dimension = embedder.dimension();

        let mut cached: IndexMap<String, Option<EmbeddingVector>> = IndexMap::new();
        for category in &categories {
            let hit = match store {
                Some(store) => store
                    .get_category_embedding(category, embedder.model())?
                    .filter(|e| e.dimension == dimension)
                    .map(|e| e.embedding),
                None => None,
            };
            cached.insert(category.clone(), hit);
        }

        let missing: Vec<String> = cached
            .iter()
            .filter(|(_, v)| v.is_none())
            .map(|(k, _)| k.clone())
            .collect();

        info!(
            "Category index: {} categories, {} cached, {} to embed",
            categories.len(),
            categories.len() - missing.len(),
            missing.len()
        );

        if !missing.is_empty() {
            let embeddings = embedder.embed_batch(&missing).await?;
            if embeddings.len() != missing.len() {
                return Err(EmbeddingError::Corpus(format!(
                    "Embedder returned {} vectors for {} categories",
                    embeddings.len(),
                    missing.len()
                )));
            }

            for (category, embedding) in missing.into_iter().zip(embeddings) {
                if let Some(store) = store {
                    let record = CategoryEmbedding::new(category.clone(), embedder.model(), embedding.clone());
                    if let Err(e) = store.save_category_embedding(&record) {
                        warn!("Failed to cache embedding for category {}: {}", category, e);
                    }
                }
                cached.insert(category, Some(embedding));
            }
        }

        let mut vectors = IndexMap::with_capacity(cached.len());
        for (category, vector) in cached {
            let vector = vector.ok_or_else(|| EmbeddingError::CategoryNotFound(category.clone()))?;
            if vector.len() != dimension {
                return Err(EmbeddingError::InvalidDimension {
                    expected: dimension,
                    actual: vector.len(),
                });
            }
            vectors.insert(category, vector);
        }

        Ok(Self { vectors })
    }

    /// Query vector for `category`
    pub fn vector_for(&self, category: &str) -> Result<&[f32]> {
        self.vectors
            .get(category)
            .map(Vec::as_slice)
            .ok_or_else(|| EmbeddingError::CategoryNotFound(category.to_string()))
    }

    /// Known labels in order of first appearance
    pub fn known_categories(&self) -> Vec<String> {
        self.vectors.keys().cloned().collect()
    }

    pub fn contains(&self, category: &str) -> bool {
        self.vectors.contains_key(category)
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    /// Records every batch it is asked to embed
    struct RecordingEmbedder {
        batches: Mutex<Vec<Vec<String>>>,
    }

    impl RecordingEmbedder {
        fn new() -> Self {
            Self {
                batches: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Embedder for RecordingEmbedder {
        fn model(&self) -> &str {
            "recording"
        }

        fn dimension(&self) -> usize {
            3
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>> {
            self.batches.lock().push(texts.to_vec());
            Ok(texts.iter().map(|t| vec![t.len() as f32, 1.0, 0.0]).collect())
        }
    }

    fn cards() -> Vec<CardRecord> {
        vec![
            CardRecord::new("A", "dining", "x"),
            CardRecord::new("B", "transit", "x"),
            CardRecord::new("C", "dining", "x"),
            CardRecord::new("D", "Dining", "x"),
        ]
    }

    #[test]
    fn test_distinct_categories_first_appearance_case_sensitive() {
        assert_eq!(
            distinct_categories(&cards()),
            vec!["dining".to_string(), "transit".to_string(), "Dining".to_string()]
        );
    }

    #[tokio::test]
    async fn test_build_embeds_each_label_once() {
        let embedder = RecordingEmbedder::new();
        let index = CategoryIndex::build(&cards(), &embedder, None).await.unwrap();

        assert_eq!(index.len(), 3);
        assert_eq!(index.known_categories(), vec!["dining", "transit", "Dining"]);
        let batches = embedder.batches.lock();
        assert_eq!(batches.len(), 1, "all labels go in one batch");
        assert_eq!(batches[0].len(), 3);
    }

    #[tokio::test]
    async fn test_build_uses_and_fills_cache() {
        let store = EmbeddingStore::new_in_memory().unwrap();
        store
            .save_category_embedding(&CategoryEmbedding::new(
                "dining".to_string(),
                "recording",
                vec![9.0, 9.0, 9.0],
            ))
            .unwrap();

        let embedder = RecordingEmbedder::new();
        let index = CategoryIndex::build(&cards(), &embedder, Some(&store)).await.unwrap();

        assert_eq!(index.vector_for("dining").unwrap().to_vec(), vec![9.0f32, 9.0, 9.0]);
        assert_eq!(
            embedder.batches.lock()[0],
            vec!["transit".to_string(), "Dining".to_string()]
        );
        assert!(store.get_category_embedding("transit", "recording").unwrap().is_some());

        // Fully cached: no embedding call at all
        let second = RecordingEmbedder::new();
        CategoryIndex::build(&cards(), &second, Some(&store)).await.unwrap();
        assert!(second.batches.lock().is_empty());
    }

    #[test]
    fn test_vector_for_unknown_category() {
        let index = CategoryIndex::from_vectors(vec![("dining".to_string(), vec![1.0, 0.0])]);

        assert!(index.vector_for("dining").is_ok());
        assert!(matches!(
            index.vector_for("groceries"),
            Err(EmbeddingError::CategoryNotFound(c)) if c == "groceries"
        ));
        assert!(index.vector_for("DINING").is_err());
    }
}
