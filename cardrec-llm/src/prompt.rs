//! Batch prompt construction for benefit extraction

use cardrec_core::CardRecord;

/// Spend used to turn percentage benefits into an amount
pub const REFERENCE_SPEND: &str = "10,000 KRW";

/// Fixed instruction message: output schema and extraction rules
pub const SYSTEM_PROMPT: &str = r#"You are an expert at writing card benefit information in strict JSON.
Every response must follow the given JSON structure exactly. Do not add any other text or formatting.

For each card you receive, produce one object with this structure:
{
  "card_name": "string",
  "discount_target": "string",
  "discount_type": "string",
  "remaining_benefit": "string"
}

Rules:
1. `discount_target`: only what the discount applies to within the input category (e.g. "subway", "taxi").
2. `discount_type`: the discount that applies to `discount_target` (e.g. "10% discount", "5% cashback").
3. `remaining_benefit`: the benefit on a spend of 10,000 KRW (e.g. 10% discount -> "1,000 KRW", 5% cashback -> "500 KRW"). Use points if the card earns points.
4. Ignore benefits for other categories and extract only the benefit most relevant to the input category.

Return a single JSON array containing one object per card, in the same order as the cards were given."#;

/// Content message listing every card in the batch
///
/// Cards are numbered from 1 in the order given; the model is asked to
/// answer in that order.
pub fn build_batch_prompt(cards: &[&CardRecord], category: &str) -> String {
    let mut prompt = format!(
        "Convert each of the following {} card(s) into the JSON structure.\n\
         Input Category: {}\n",
        cards.len(),
        category
    );

    for (i, card) in cards.iter().enumerate() {
        prompt.push_str(&format!(
            "\nCard {}:\n- Card Name: {}\n- Benefit Description: {}\n- Input Category: {}\n- Assume a spending amount of {} for calculating remaining benefit.\n",
            i + 1,
            card.name,
            card.benefits.trim(),
            category,
            REFERENCE_SPEND
        ));
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_prompt_lists_cards_in_order() {
        let first = CardRecord::new("Metro", "transit", "10% off subway");
        let second = CardRecord::new("Taxi Plus", "transit", "5% cashback on taxis");

        let prompt = build_batch_prompt(&[&first, &second], "transit");

        let metro = prompt.find("Card 1:\n- Card Name: Metro").expect("first card");
        let taxi = prompt.find("Card 2:\n- Card Name: Taxi Plus").expect("second card");
        assert!(metro < taxi);
        assert!(prompt.contains("Benefit Description: 5% cashback on taxis"));
        assert_eq!(prompt.matches("Input Category: transit").count(), 3);
        assert!(prompt.starts_with("Convert each of the following 2 card(s)"));
    }

    #[test]
    fn test_batch_prompt_is_pure() {
        let card = CardRecord::new("Metro", "transit", "10% off subway");
        assert_eq!(
            build_batch_prompt(&[&card], "transit"),
            build_batch_prompt(&[&card], "transit")
        );
    }

    #[test]
    fn test_system_prompt_is_request_independent() {
        assert!(SYSTEM_PROMPT.contains("10,000 KRW"));
        assert!(SYSTEM_PROMPT.contains("discount_target"));
        assert!(!SYSTEM_PROMPT.contains("Card 1"));
    }
}
