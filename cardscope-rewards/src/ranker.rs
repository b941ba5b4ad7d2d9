use cardscope_shared::{CardSuggestion, HeldCard, SuggestionEntry};
use rust_decimal::prelude::*;
use std::cmp::Ordering;

use crate::resolver::RateSource;

/// Suggestions returned per request
pub const MAX_SUGGESTIONS: usize = 3;

/// Weight of the base rate in the score: a card strong everywhere beats a
/// purely promotional one at the same resolved rate.
pub const STABILITY_WEIGHT: f64 = 0.1;

/// Per-card result of resolution. Never leaves the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct CardScore {
    pub card: HeldCard,
    pub rate: f64,
    pub score: f64,
    pub source: RateSource,
}

pub fn calculate_score(best_rate: f64, base_rate: f64) -> f64 {
    best_rate + STABILITY_WEIGHT * base_rate
}

/// Percentage with one decimal place, rounding halves away from zero (1.25 -> "1.3%")
pub fn format_rate(rate: f64) -> String {
    let exact = rate
        .to_string()
        .parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_f64(rate))
        .unwrap_or_default();
    let rounded = exact
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or(rate);
    format!("{:.1}%", rounded)
}

/// Drop zero-rate cards, order by score (stable on ties), keep the top
/// `MAX_SUGGESTIONS`. An empty ranking becomes one "no applicable card" entry.
pub fn rank_cards(scores: Vec<CardScore>, category: &str) -> Vec<SuggestionEntry> {
    let mut ranked: Vec<CardScore> = scores.into_iter().filter(|s| s.rate > 0.0).collect();

    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

    let suggestions: Vec<SuggestionEntry> = ranked
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|s| {
            SuggestionEntry::Card(CardSuggestion {
                issuer: s.card.issuer,
                product: s.card.product,
                reward_rate: format_rate(s.rate),
                reasoning: format!(
                    "Best reward rate ({}) for {} category",
                    format_rate(s.rate),
                    category
                ),
            })
        })
        .collect();

    if suggestions.is_empty() {
        return vec![SuggestionEntry::no_applicable_card()];
    }

    suggestions
}
