use serde::{Deserialize, Serialize};

use super::card::HeldCard;
use super::period::Period;

pub const NO_APPLICABLE_CARD: &str = "No cards found with reward details for this category";

/// Which card should I use here?
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionRequest {
    #[serde(default)]
    pub held_cards: Vec<HeldCard>,
    #[serde(default, alias = "store")]
    pub merchant: Option<String>,
    /// Resolved from the merchant directory when absent
    #[serde(default)]
    pub category: Option<String>,
    /// "Q1".."Q4"; defaults to the current quarter
    #[serde(default, alias = "currentQuarter")]
    pub period: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionResponse {
    pub merchant: Option<String>,
    pub category: Option<String>,
    pub period: Period,
    pub suggestions: Vec<SuggestionEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SuggestionEntry {
    Card(CardSuggestion),
    /// Stands in for an empty ranking so the response shape never changes
    NoApplicableCard { error: String },
}

impl SuggestionEntry {
    pub fn no_applicable_card() -> Self {
        SuggestionEntry::NoApplicableCard {
            error: NO_APPLICABLE_CARD.to_string(),
        }
    }

    pub fn as_card(&self) -> Option<&CardSuggestion> {
        match self {
            SuggestionEntry::Card(card) => Some(card),
            SuggestionEntry::NoApplicableCard { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardSuggestion {
    pub issuer: String,
    pub product: String,
    /// One decimal place, e.g. "5.0%"
    pub reward_rate: String,
    pub reasoning: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_accepts_legacy_field_names() {
        let req: SuggestionRequest = serde_json::from_str(
            r#"{"heldCards":[{"issuer":"Chase","product":"Sapphire"}],"store":"Costco","currentQuarter":"Q2"}"#,
        )
        .unwrap();

        assert_eq!(req.held_cards.len(), 1);
        assert_eq!(req.merchant.as_deref(), Some("Costco"));
        assert_eq!(req.period.as_deref(), Some("Q2"));
        assert!(req.category.is_none());
    }

    #[test]
    fn test_entry_serialization() {
        let card = SuggestionEntry::Card(CardSuggestion {
            issuer: "Chase".into(),
            product: "Freedom Flex".into(),
            reward_rate: "5.0%".into(),
            reasoning: "Best reward rate (5.0%) for gas category".into(),
        });
        let value = serde_json::to_value(&card).unwrap();
        assert_eq!(value["rewardRate"], "5.0%");
        assert!(value.get("score").is_none());

        let none = serde_json::to_value(SuggestionEntry::no_applicable_card()).unwrap();
        assert_eq!(none, serde_json::json!({ "error": NO_APPLICABLE_CARD }));
    }
}
