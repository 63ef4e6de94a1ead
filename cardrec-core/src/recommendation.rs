//! Recommendation payload returned to callers

use serde::{Deserialize, Serialize};

use crate::benefit::{BenefitRecord, ExtractionStatus};

/// Best card for a category plus the runners-up, in ranking order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub top_card: BenefitRecord,
    pub other_cards: Vec<BenefitRecord>,

    /// Present only when extraction output was degraded
    #[serde(default, skip_serializing_if = "ExtractionStatus::is_complete")]
    pub extraction: ExtractionStatus,
}

impl Recommendation {
    /// Split formatted records at the ranking boundary: index 0 is the top card
    ///
    /// Returns `None` when there are no records.
    pub fn from_ranked(records: Vec<BenefitRecord>, extraction: ExtractionStatus) -> Option<Self> {
        let mut records = records.into_iter();
        let top_card = records.next()?;
        Some(Self {
            top_card,
            other_cards: records.collect(),
            extraction,
        })
    }

    /// Whether any part of the payload came from fallback handling
    pub fn is_degraded(&self) -> bool {
        !self.extraction.is_complete()
            || self.top_card.is_fallback()
            || self.other_cards.iter().any(BenefitRecord::is_fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_ranked_splits_at_first_record() {
        let records = vec![
            BenefitRecord::fallback("a", "1"),
            BenefitRecord::fallback("b", "2"),
            BenefitRecord::fallback("c", "3"),
        ];
        let rec = Recommendation::from_ranked(records, ExtractionStatus::Complete).unwrap();
        assert_eq!(rec.top_card, BenefitRecord::fallback("a", "1"));
        assert_eq!(rec.other_cards.len(), 2);
        assert_eq!(rec.other_cards[1], BenefitRecord::fallback("c", "3"));
    }

    #[test]
    fn test_from_ranked_empty() {
        assert!(Recommendation::from_ranked(Vec::new(), ExtractionStatus::Complete).is_none());
    }

    #[test]
    fn test_complete_status_not_serialized() {
        let rec = Recommendation::from_ranked(
            vec![BenefitRecord::fallback("a", "1")],
            ExtractionStatus::Complete,
        )
        .unwrap();
        let value = serde_json::to_value(&rec).unwrap();
        assert!(value.get("extraction").is_none());
        assert!(value["other_cards"].as_array().unwrap().is_empty());
        assert!(rec.is_degraded());
    }
}
