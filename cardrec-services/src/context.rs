//! Process-wide recommendation state
//!
//! The corpus, its embedding matrix and the category index are built once at
//! startup and only read afterwards, so the context is shared behind an
//! `Arc` without any locking.

use std::path::Path;

use cardrec_core::{CardRecError, CardRecResult, CardRecord};
use cardrec_embedding::{
    load_cards_csv, CardCorpus, CategoryIndex, Embedder, EmbeddingError, EmbeddingStore,
    ScoredCard,
};
use tracing::{info, instrument};

/// Map embedding-layer errors onto the service error, keeping unknown
/// categories as a client error
pub(crate) fn map_embedding_error(e: EmbeddingError, categories: &CategoryIndex) -> CardRecError {
    match e {
        EmbeddingError::CategoryNotFound(category) => {
            CardRecError::category_not_found(category, categories.known_categories())
        }
        other => CardRecError::embedding(other.to_string()),
    }
}

/// Immutable lookup state injected into the recommendation service
#[derive(Debug)]
pub struct RecommendationContext {
    corpus: CardCorpus,
    categories: CategoryIndex,
}

impl RecommendationContext {
    /// Assemble a context, checking that category vectors match the corpus dimension
    pub fn new(corpus: CardCorpus, categories: CategoryIndex) -> CardRecResult<Self> {
        for category in categories.known_categories() {
            let vector = categories
                .vector_for(&category)
                .map_err(|e| map_embedding_error(e, &categories))?;
            if vector.len() != corpus.dimension() {
                return Err(CardRecError::embedding(format!(
                    "Category '{}' has dimension {}, corpus has {}",
                    category,
                    vector.len(),
                    corpus.dimension()
                )));
            }
        }

        Ok(Self { corpus, categories })
    }

    /// Build the context from a corpus CSV
    ///
    /// Card vectors come from `store` when they line up with the CSV and are
    /// embedded otherwise; category vectors are cached in the same store.
    #[instrument(skip(store, embedder))]
    pub async fn load(
        corpus_path: &Path,
        store: &EmbeddingStore,
        embedder: &dyn Embedder,
    ) -> CardRecResult<Self> {
        let cards = load_cards_csv(corpus_path).map_err(|e| CardRecError::embedding(e.to_string()))?;
        Self::from_cards(cards, store, embedder).await
    }

    /// Build the context from already loaded cards
    pub async fn from_cards(
        cards: Vec<CardRecord>,
        store: &EmbeddingStore,
        embedder: &dyn Embedder,
    ) -> CardRecResult<Self> {
        let categories = CategoryIndex::build(&cards, embedder, Some(store))
            .await
            .map_err(|e| CardRecError::embedding(e.to_string()))?;
        let corpus = CardCorpus::load(cards, store, embedder)
            .await
            .map_err(|e| CardRecError::embedding(e.to_string()))?;

        info!(
            "Recommendation context ready: {} cards, {} categories, dimension {}",
            corpus.len(),
            categories.len(),
            corpus.dimension()
        );

        Self::new(corpus, categories)
    }

    /// Query vector for `category`
    pub fn vector_for(&self, category: &str) -> CardRecResult<&[f32]> {
        self.categories
            .vector_for(category)
            .map_err(|e| map_embedding_error(e, &self.categories))
    }

    /// Cards most similar to `query`, best first
    pub fn rank(&self, query: &[f32], top_n: usize) -> CardRecResult<Vec<ScoredCard<'_>>> {
        self.corpus
            .rank(query, top_n)
            .map_err(|e| map_embedding_error(e, &self.categories))
    }

    pub fn known_categories(&self) -> Vec<String> {
        self.categories.known_categories()
    }

    pub fn corpus(&self) -> &CardCorpus {
        &self.corpus
    }
}
