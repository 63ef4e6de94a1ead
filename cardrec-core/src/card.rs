//! Card records from the corpus

use serde::{Deserialize, Serialize};

/// A card from the corpus
///
/// Field names follow the corpus CSV columns so rows deserialize directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardRecord {
    /// Card name, unique within the corpus
    pub name: String,

    /// Spending category label (e.g., "dining", "transit")
    #[serde(rename = "benefit_category")]
    pub category: String,

    /// Free-text description of every benefit the card carries
    #[serde(rename = "combined_benefits")]
    pub benefits: String,

    /// URL to the card image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl CardRecord {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        benefits: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            benefits: benefits.into(),
            image_url: None,
        }
    }

    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_corpus_row() {
        let json = r#"{
            "name": "Everyday Dining",
            "benefit_category": "dining",
            "combined_benefits": "10% off at restaurants"
        }"#;

        let card: CardRecord = serde_json::from_str(json).unwrap();
        assert_eq!(card.name, "Everyday Dining");
        assert_eq!(card.category, "dining");
        assert_eq!(card.benefits, "10% off at restaurants");
        assert!(card.image_url.is_none());
    }
}
