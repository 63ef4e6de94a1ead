//! Batch benefit extraction

use std::sync::Arc;

use cardrec_core::CardRecord;
use tracing::{info, instrument};

use crate::{
    error::Result,
    openai::Generator,
    parse::parse_batch_response,
    prompt::{build_batch_prompt, SYSTEM_PROMPT},
    types::BatchExtraction,
};

/// Extracts the category-relevant benefit of several cards with one model call
#[derive(Clone)]
pub struct BenefitExtractor {
    generator: Arc<dyn Generator>,
}

impl BenefitExtractor {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }

    /// Extract benefits for `cards`, in order
    ///
    /// Backend failures and timeouts are errors. Output that cannot be parsed
    /// is not: it comes back as fallback records with a non-complete status.
    #[instrument(skip(self, cards), fields(cards = cards.len()))]
    pub async fn extract_batch(&self, cards: &[&CardRecord], category: &str) -> Result<BatchExtraction> {
        if cards.is_empty() {
            return Ok(BatchExtraction::default());
        }

        let user_prompt = build_batch_prompt(cards, category);
        let raw = self.generator.generate(SYSTEM_PROMPT, &user_prompt).await?;
        let extraction = parse_batch_response(&raw, cards);

        info!(
            "Extracted {} benefit records for {} cards ({:?})",
            extraction.records.len(),
            cards.len(),
            extraction.status
        );

        Ok(extraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenerationError;
    use async_trait::async_trait;
    use cardrec_core::{BenefitRecord, ExtractionStatus};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Answers every call with a fixed reply and counts calls
    struct ScriptedGenerator {
        reply: std::result::Result<String, Duration>,
        calls: AtomicUsize,
    }

    impl ScriptedGenerator {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                calls: AtomicUsize::new(0),
            })
        }

        fn timing_out() -> Arc<Self> {
            Arc::new(Self {
                reply: Err(Duration::from_secs(1)),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Generator for ScriptedGenerator {
        async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
            assert_eq!(system_prompt, SYSTEM_PROMPT);
            assert!(user_prompt.contains("Card 1:"));
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone().map_err(GenerationError::Timeout)
        }
    }

    fn cards() -> Vec<CardRecord> {
        vec![
            CardRecord::new("Metro", "transit", "10% off subway"),
            CardRecord::new("Taxi Plus", "transit", "5% cashback on taxis"),
        ]
    }

    #[tokio::test]
    async fn test_single_call_for_whole_batch() {
        let generator = ScriptedGenerator::replying(
            r#"[
                {"discount_target": "subway", "discount_type": "10% discount", "remaining_benefit": "1,000 KRW"},
                {"discount_target": "taxi", "discount_type": "5% cashback", "remaining_benefit": "500 KRW"}
            ]"#,
        );
        let extractor = BenefitExtractor::new(generator.clone());
        let cards = cards();
        let refs: Vec<&CardRecord> = cards.iter().collect();

        let result = extractor.extract_batch(&refs, "transit").await.unwrap();

        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
        assert_eq!(result.status, ExtractionStatus::Complete);
        let names: Vec<_> = result.records.iter().map(|r| r.card_name()).collect();
        assert_eq!(names, vec![Some("Metro"), Some("Taxi Plus")]);
    }

    #[tokio::test]
    async fn test_malformed_reply_is_not_an_error() {
        let extractor = BenefitExtractor::new(ScriptedGenerator::replying("not json at all"));
        let cards = cards();
        let refs: Vec<&CardRecord> = cards.iter().collect();

        let result = extractor.extract_batch(&refs, "transit").await.unwrap();

        assert_eq!(result.records.len(), 1);
        assert!(matches!(&result.records[0], BenefitRecord::Fallback(f) if f.raw_response == "not json at all"));
    }

    #[tokio::test]
    async fn test_backend_failure_propagates() {
        let extractor = BenefitExtractor::new(ScriptedGenerator::timing_out());
        let cards = cards();
        let refs: Vec<&CardRecord> = cards.iter().collect();

        let result = extractor.extract_batch(&refs, "transit").await;
        assert!(matches!(result, Err(GenerationError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_empty_batch_skips_model() {
        let generator = ScriptedGenerator::replying("[]");
        let extractor = BenefitExtractor::new(generator.clone());

        let result = extractor.extract_batch(&[], "transit").await.unwrap();

        assert!(result.records.is_empty());
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }
}
