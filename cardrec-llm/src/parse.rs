//! Parsing and validation of batch extraction output

use cardrec_core::{
    BenefitAmount, BenefitRecord, CardRecord, ExtractedBenefit, ExtractionStatus, FallbackRecord,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::types::BatchExtraction;

/// Error text carried by the whole-response fallback record
pub const PARSE_FAILURE: &str = "Failed to parse JSON response";

/// Error text when the model answers with an empty array
pub const NO_OBJECTS: &str = "Model returned no benefit objects";

/// Fields the model must produce for each card
#[derive(Debug, Deserialize)]
struct ModelBenefit {
    discount_target: String,
    discount_type: String,
    #[serde(alias = "benefit_amount")]
    remaining_benefit: BenefitAmount,
}

/// Narrow model output to the JSON it contains
///
/// Handles a ```json fenced block and prose around a bare array.
fn extract_json(content: &str) -> &str {
    // Try to find JSON in code blocks first
    if let Some(start) = content.find("```json") {
        let start = start + 7;
        if let Some(end) = content[start..].find("```") {
            return content[start..start + end].trim();
        }
    }

    let trimmed = content.trim();
    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        return trimmed;
    }

    // Try to find a raw array
    if let (Some(start), Some(end)) = (content.find('['), content.rfind(']')) {
        if start < end {
            return &content[start..=end];
        }
    }

    trimmed
}

/// Turn the parsed payload into one JSON value per card
///
/// A bare array is the expected shape. A single object is one card; an
/// object wrapping an array of objects (`{"cards": [...]}`) is unwrapped.
fn into_items(value: Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        Value::Object(map) => {
            let wrapped = map
                .values()
                .find(|v| matches!(v, Value::Array(items) if items.iter().all(Value::is_object)))
                .cloned();
            match wrapped {
                Some(Value::Array(items)) => Some(items),
                _ => Some(vec![Value::Object(map)]),
            }
        }
        _ => None,
    }
}

fn merge(card: &CardRecord, item: &Value) -> BenefitRecord {
    match serde_json::from_value::<ModelBenefit>(item.clone()) {
        Ok(benefit) => BenefitRecord::Extracted(ExtractedBenefit {
            card_name: card.name.clone(),
            image_url: card.image_url.clone(),
            score: None,
            discount_target: benefit.discount_target,
            discount_type: benefit.discount_type,
            remaining_benefit: benefit.remaining_benefit,
        }),
        Err(e) => {
            warn!("Invalid benefit object for card {}: {}", card.name, e);
            BenefitRecord::Fallback(FallbackRecord {
                card_name: Some(card.name.clone()),
                image_url: card.image_url.clone(),
                error: format!("Invalid benefit object: {}", e),
                raw_response: item.to_string(),
            })
        }
    }
}

/// Parse model output for `cards` into aligned benefit records
///
/// Never fails: unparseable or empty output becomes a single fallback record
/// with the raw text, and a count mismatch truncates to the shorter side and
/// is reported in the status.
pub fn parse_batch_response(raw: &str, cards: &[&CardRecord]) -> BatchExtraction {
    let items = serde_json::from_str::<Value>(extract_json(raw))
        .map_err(|e| e.to_string())
        .and_then(|value| into_items(value).ok_or_else(|| "expected a JSON array".to_string()));

    let items = match items {
        Ok(items) => items,
        Err(reason) => {
            warn!("Malformed extraction output: {}", reason);
            return BatchExtraction {
                records: vec![BenefitRecord::fallback(PARSE_FAILURE, raw)],
                status: ExtractionStatus::Malformed { reason },
            };
        }
    };

    if items.is_empty() && !cards.is_empty() {
        warn!("Model returned no benefit objects for {} cards", cards.len());
        return BatchExtraction {
            records: vec![BenefitRecord::fallback(NO_OBJECTS, raw)],
            status: ExtractionStatus::CountMismatch {
                expected: cards.len(),
                received: 0,
            },
        };
    }

    let status = if items.len() == cards.len() {
        ExtractionStatus::Complete
    } else {
        warn!(
            "Extraction count mismatch: {} cards submitted, {} objects returned",
            cards.len(),
            items.len()
        );
        ExtractionStatus::CountMismatch {
            expected: cards.len(),
            received: items.len(),
        }
    };

    let records = cards
        .iter()
        .zip(items.iter())
        .map(|(card, item)| merge(card, item))
        .collect();

    BatchExtraction { records, status }
}
