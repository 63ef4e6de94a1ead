//! Recommendation service
//!
//! Composes category lookup, similarity ranking and batch benefit
//! extraction into the single category -> formatted cards operation.

use std::sync::Arc;

use cardrec_core::{CardRecError, CardRecResult, CardRecord, ExtractionStatus, Recommendation};
use cardrec_llm::BenefitExtractor;
use tracing::{debug, info, instrument, warn};

use crate::context::RecommendationContext;

/// Service for recommending cards by spending category
#[derive(Clone)]
pub struct RecommendationService {
    context: Arc<RecommendationContext>,
    extractor: BenefitExtractor,
}

impl RecommendationService {
    pub fn new(context: Arc<RecommendationContext>, extractor: BenefitExtractor) -> Self {
        Self { context, extractor }
    }

    /// Categories that can be requested, in corpus order
    pub fn available_categories(&self) -> Vec<String> {
        self.context.known_categories()
    }

    /// Recommend up to `top_n` cards for `category`
    ///
    /// The best-ranked card becomes `top_card` and the rest `other_cards`,
    /// in ranking order. Extraction output is split at the same position.
    #[instrument(skip(self))]
    pub async fn recommend(&self, category: &str, top_n: i64) -> CardRecResult<Recommendation> {
        if top_n < 1 {
            return Err(CardRecError::InvalidTopN(top_n));
        }

        let vector = self.context.vector_for(category)?;
        let top_n = usize::try_from(top_n).unwrap_or(usize::MAX);
        let ranked = self.context.rank(vector, top_n)?;

        debug!(
            "Ranked {} cards for {}: {:?}",
            ranked.len(),
            category,
            ranked
                .iter()
                .map(|s| (s.card.name.as_str(), s.score))
                .collect::<Vec<_>>()
        );

        let cards: Vec<&CardRecord> = ranked.iter().map(|s| s.card).collect();
        let extraction = self
            .extractor
            .extract_batch(&cards, category)
            .await
            .map_err(|e| CardRecError::generation(e.to_string()))?;

        let status = extraction.status;
        let mut records = extraction.records;

        // A malformed reply is one record for the whole batch, not card 0
        if !matches!(status, ExtractionStatus::Malformed { .. }) {
            for (record, scored) in records.iter_mut().zip(&ranked) {
                if record.card_name() == Some(scored.card.name.as_str()) {
                    record.set_score(scored.score);
                }
            }
        }

        if !status.is_complete() {
            warn!("Returning degraded recommendation for {}: {:?}", category, status);
        }

        let recommendation = Recommendation::from_ranked(records, status).ok_or_else(|| {
            CardRecError::internal(format!("No cards available for category '{}'", category))
        })?;

        info!(
            "Recommended {} cards for {}",
            1 + recommendation.other_cards.len(),
            category
        );

        Ok(recommendation)
    }
}
