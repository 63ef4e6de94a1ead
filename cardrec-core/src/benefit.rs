//! Structured benefit records produced by batch extraction

use serde::{Deserialize, Serialize};
use std::fmt;

/// Benefit value on the reference spend
///
/// Models answer with either a plain number (`1000`) or a formatted string
/// (`"1,000 KRW"`, `"300 points"`), both are kept as given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BenefitAmount {
    Amount(f64),
    Text(String),
}

impl fmt::Display for BenefitAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BenefitAmount::Amount(value) => write!(f, "{}", value),
            BenefitAmount::Text(text) => write!(f, "{}", text),
        }
    }
}

/// A benefit successfully extracted for one card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedBenefit {
    /// Name of the originating card
    pub card_name: String,

    /// Image of the originating card
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Similarity between the card and the requested category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,

    /// What the discount applies to (e.g., "subway", "taxi")
    pub discount_target: String,

    /// Kind of discount (e.g., "10% discount", "5% cashback")
    pub discount_type: String,

    /// Benefit on the reference spend
    #[serde(alias = "benefit_amount")]
    pub remaining_benefit: BenefitAmount,
}

/// Degraded output kept when model output could not be parsed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackRecord {
    /// Set when the failure is tied to a single card's position
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    pub error: String,

    /// Unparsed model output (whole response or the offending element)
    pub raw_response: String,
}

/// Per-card output of the extraction stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BenefitRecord {
    Extracted(ExtractedBenefit),
    Fallback(FallbackRecord),
}

impl BenefitRecord {
    pub fn fallback(error: impl Into<String>, raw_response: impl Into<String>) -> Self {
        BenefitRecord::Fallback(FallbackRecord {
            card_name: None,
            image_url: None,
            error: error.into(),
            raw_response: raw_response.into(),
        })
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, BenefitRecord::Fallback(_))
    }

    pub fn card_name(&self) -> Option<&str> {
        match self {
            BenefitRecord::Extracted(benefit) => Some(&benefit.card_name),
            BenefitRecord::Fallback(fallback) => fallback.card_name.as_deref(),
        }
    }

    /// Attach the similarity score; fallback records carry none
    pub fn set_score(&mut self, score: f64) {
        if let BenefitRecord::Extracted(benefit) = self {
            benefit.score = Some(score);
        }
    }
}

/// Outcome of a batch extraction
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExtractionStatus {
    /// One well-formed object per submitted card
    #[default]
    Complete,
    /// Model returned a different number of objects than cards submitted;
    /// output was truncated to the shorter of the two
    CountMismatch { expected: usize, received: usize },
    /// Model output was not a JSON array
    Malformed { reason: String },
}

impl ExtractionStatus {
    pub fn is_complete(&self) -> bool {
        matches!(self, ExtractionStatus::Complete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_amount_accepts_number_or_string() {
        let number: BenefitAmount = serde_json::from_value(json!(1000)).unwrap();
        assert_eq!(number, BenefitAmount::Amount(1000.0));

        let text: BenefitAmount = serde_json::from_value(json!("1,000 KRW")).unwrap();
        assert_eq!(text, BenefitAmount::Text("1,000 KRW".to_string()));
    }

    #[test]
    fn test_fallback_serializes_error_and_raw_text() {
        let record = BenefitRecord::fallback("Failed to parse JSON response", "not json");
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["error"], "Failed to parse JSON response");
        assert_eq!(value["raw_response"], "not json");
        assert!(value.get("card_name").is_none());
        assert!(record.is_fallback());
    }

    #[test]
    fn test_untagged_record_picks_extracted_variant() {
        let value = json!({
            "card_name": "Metro Card",
            "discount_target": "subway",
            "discount_type": "10% discount",
            "remaining_benefit": "1,000 KRW"
        });
        let record: BenefitRecord = serde_json::from_value(value).unwrap();
        assert!(!record.is_fallback());
        assert_eq!(record.card_name(), Some("Metro Card"));
    }

    #[test]
    fn test_set_score_only_on_extracted() {
        let mut record = BenefitRecord::Extracted(ExtractedBenefit {
            card_name: "Metro Card".to_string(),
            image_url: None,
            score: None,
            discount_target: "subway".to_string(),
            discount_type: "10% discount".to_string(),
            remaining_benefit: BenefitAmount::Amount(1000.0),
        });
        record.set_score(0.91);
        match &record {
            BenefitRecord::Extracted(benefit) => assert_eq!(benefit.score, Some(0.91)),
            BenefitRecord::Fallback(_) => panic!("expected extracted record"),
        }

        let mut fallback = BenefitRecord::fallback("bad", "raw");
        fallback.set_score(0.5);
        assert_eq!(fallback, BenefitRecord::fallback("bad", "raw"));
    }

    #[test]
    fn test_status_tagging() {
        let status = ExtractionStatus::CountMismatch {
            expected: 5,
            received: 3,
        };
        let value = serde_json::to_value(&status).unwrap();
        assert_eq!(value["status"], "count_mismatch");
        assert_eq!(value["expected"], 5);
        assert_eq!(value["received"], 3);
    }
}
