//! Card corpus with its positionally aligned embedding matrix

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use cardrec_core::CardRecord;
use tracing::{info, instrument, warn};

use crate::{
    client::Embedder,
    error::{EmbeddingError, Result},
    similarity::{EmbeddingMatrix, SimilarityIndex},
    store::EmbeddingStore,
    types::{CardEmbedding, SimilarityMatch},
};

/// Read card records from CSV
///
/// Expects a header row with `name`, `benefit_category` and
/// `combined_benefits`; `image_url` is optional. Row order is corpus order.
pub fn read_cards_csv<R: Read>(reader: R) -> Result<Vec<CardRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut cards = Vec::new();
    for record in csv_reader.deserialize() {
        let mut card: CardRecord = record?;
        if card.image_url.as_deref().is_some_and(str::is_empty) {
            card.image_url = None;
        }
        cards.push(card);
    }

    let mut seen = HashSet::new();
    for card in &cards {
        if !seen.insert(card.name.as_str()) {
            warn!("Duplicate card name in corpus: {}", card.name);
        }
    }

    Ok(cards)
}

/// Read card records from a CSV file
#[instrument]
pub fn load_cards_csv(path: &Path) -> Result<Vec<CardRecord>> {
    let file = std::fs::File::open(path)
        .map_err(|e| EmbeddingError::Corpus(format!("Failed to open {}: {}", path.display(), e)))?;
    let cards = read_cards_csv(file)?;
    info!("Loaded {} cards from {}", cards.len(), path.display());
    Ok(cards)
}

/// Text embedded for a card when the store has no vector for it
pub fn card_embedding_text(card: &CardRecord) -> String {
    format!("{}\nCategory: {}\n{}", card.name, card.category, card.benefits)
}

/// A scored card borrowed from the corpus
#[derive(Debug, Clone, Copy)]
pub struct ScoredCard<'a> {
    pub card: &'a CardRecord,
    pub score: f64,
}

/// Cards plus one embedding row per card
///
/// Row `i` of the matrix always belongs to card `i`; neither side is
/// reordered after construction.
pub struct CardCorpus {
    cards: Vec<CardRecord>,
    index: Box<dyn SimilarityIndex>,
}

impl std::fmt::Debug for CardCorpus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardCorpus")
            .field("cards", &self.cards.len())
            .field("dimension", &self.index.dimension())
            .finish()
    }
}

impl CardCorpus {
    /// Build a corpus from cards and their aligned embeddings
    pub fn new(
        cards: Vec<CardRecord>,
        embeddings: Vec<Vec<f32>>,
        dimension: usize,
    ) -> Result<Self> {
        let matrix = EmbeddingMatrix::from_rows(embeddings, dimension)?;
        Self::with_index(cards, Box::new(matrix))
    }

    /// Build a corpus over any similarity index with one row per card
    pub fn with_index(cards: Vec<CardRecord>, index: Box<dyn SimilarityIndex>) -> Result<Self> {
        if cards.len() != index.len() {
            return Err(EmbeddingError::Corpus(format!(
                "Corpus has {} cards but {} embedding rows",
                cards.len(),
                index.len()
            )));
        }
        Ok(Self { cards, index })
    }

    /// Load embeddings for `cards` from the store, embedding and persisting
    /// them first when the stored rows do not line up with the corpus
    #[instrument(skip_all, fields(cards = cards.len(), model = embedder.model()))]
    pub async fn load(
        cards: Vec<CardRecord>,
        store: &EmbeddingStore,
        embedder: &dyn Embedder,
    ) -> Result<Self> {
        let dimension = embedder.dimension();
        let stored = store.load_card_embeddings(embedder.model())?;

        let aligned = stored.len() == cards.len()
            && stored.iter().zip(&cards).enumerate().all(|(i, (row, card))| {
                row.row_index == i && row.card_name == card.name && row.dimension == dimension
            });

        let embeddings = if aligned {
            info!("Using {} stored card embeddings", stored.len());
            stored.into_iter().map(|row| row.embedding).collect()
        } else {
            if !stored.is_empty() {
                warn!(
                    "Stored card embeddings ({} rows) do not match corpus ({} cards), rebuilding",
                    stored.len(),
                    cards.len()
                );
            }

            let texts: Vec<String> = cards.iter().map(card_embedding_text).collect();
            let embeddings = embedder.embed_batch(&texts).await?;
            if embeddings.len() != cards.len() {
                return Err(EmbeddingError::Corpus(format!(
                    "Embedder returned {} vectors for {} cards",
                    embeddings.len(),
                    cards.len()
                )));
            }

            let rows: Vec<CardEmbedding> = cards
                .iter()
                .zip(&embeddings)
                .enumerate()
                .map(|(i, (card, embedding))| {
                    CardEmbedding::new(i, card.name.clone(), embedder.model(), embedding.clone())
                })
                .collect();
            store.replace_card_embeddings(&rows)?;

            embeddings
        };

        Self::new(cards, embeddings, dimension)
    }

    /// Rank cards by similarity to `query`, best first
    ///
    /// `top_n` of zero gives an empty selection; values above the corpus
    /// size are clamped.
    pub fn rank(&self, query: &[f32], top_n: usize) -> Result<Vec<ScoredCard<'_>>> {
        let matches = self.index.search(query, top_n)?;
        Ok(matches
            .into_iter()
            .filter_map(|SimilarityMatch { index, score }| {
                self.cards.get(index).map(|card| ScoredCard { card, score })
            })
            .collect())
    }

    pub fn cards(&self) -> &[CardRecord] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.index.dimension()
    }
}
