use cardscope_core::{CoreError, CoreResult, MerchantDirectory, ProfileStore};
use cardscope_shared::{HeldCard, Period, SuggestionRequest, SuggestionResponse};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::ranker::{calculate_score, rank_cards, CardScore};
use crate::resolver::{RateSource, RewardResolver};

/// Answers "which of my cards should I use here?"
pub struct SuggestionEngine {
    profiles: Arc<dyn ProfileStore>,
    merchants: Arc<dyn MerchantDirectory>,
    resolver: RewardResolver,
}

impl SuggestionEngine {
    pub fn new(
        profiles: Arc<dyn ProfileStore>,
        merchants: Arc<dyn MerchantDirectory>,
        resolver: RewardResolver,
    ) -> Self {
        Self {
            profiles,
            merchants,
            resolver,
        }
    }

    pub async fn suggest(&self, req: SuggestionRequest) -> CoreResult<SuggestionResponse> {
        // 1. Period defaults to the quarter we are in
        let period = match non_blank(req.period) {
            Some(label) => label
                .parse::<Period>()
                .map_err(|e| CoreError::ValidationError(e.to_string()))?,
            None => Period::current(),
        };

        // 2. Category from the request, else from the merchant directory
        let merchant = non_blank(req.merchant);
        let mut category = non_blank(req.category);
        if merchant.is_none() && category.is_none() {
            return Err(CoreError::ValidationError(
                "Merchant name or category required".to_string(),
            ));
        }
        if category.is_none() {
            if let Some(name) = merchant.as_deref() {
                category = self.lookup_category(name).await;
            }
        }

        // 3. Resolve every held card
        let mut scores = Vec::with_capacity(req.held_cards.len());
        for card in req.held_cards {
            if let Some(score) = self
                .score_card(card, category.as_deref(), merchant.as_deref(), period)
                .await
            {
                scores.push(score);
            }
        }

        // 4. Rank
        let suggestions = rank_cards(scores, category.as_deref().unwrap_or_default());

        Ok(SuggestionResponse {
            merchant,
            category,
            period,
            suggestions,
        })
    }

    async fn lookup_category(&self, merchant: &str) -> Option<String> {
        match self.merchants.find_category(merchant).await {
            Ok(found) => {
                debug!(merchant = %merchant, category = ?found, "Resolved merchant category");
                found
            }
            Err(e) => {
                warn!(merchant = %merchant, error = %e, "Merchant category lookup failed");
                None
            }
        }
    }

    /// Put an unknown card in the catalogue so the next refresh run fetches it
    async fn register_unknown(&self, card: &HeldCard) {
        match self.profiles.register_card(&card.issuer, &card.product).await {
            Ok(()) => info!(
                issuer = %card.issuer,
                product = %card.product,
                "Registered unknown card for refresh"
            ),
            Err(e) => warn!(
                issuer = %card.issuer,
                product = %card.product,
                error = %e,
                "Failed to register unknown card"
            ),
        }
    }

    /// `None` when the card has no stored profile or the store could not be read
    async fn score_card(
        &self,
        card: HeldCard,
        category: Option<&str>,
        merchant: Option<&str>,
        period: Period,
    ) -> Option<CardScore> {
        let profile = match self.profiles.find_profile(&card.issuer, &card.product).await {
            Ok(Some(profile)) => profile,
            Ok(None) => {
                self.register_unknown(&card).await;
                return None;
            }
            Err(e) => {
                warn!(
                    issuer = %card.issuer,
                    product = %card.product,
                    error = %e,
                    "Failed to load reward profile, skipping card"
                );
                return None;
            }
        };

        let Some(schedule) = profile.schedule() else {
            return Some(CardScore {
                card,
                rate: 0.0,
                score: 0.0,
                source: RateSource::Unavailable,
            });
        };

        let resolved = self
            .resolver
            .resolve_schedule(schedule, category, merchant, period);
        let score = calculate_score(resolved.rate, self.resolver.base_rate(schedule));

        debug!(
            issuer = %card.issuer,
            product = %card.product,
            rate = resolved.rate,
            source = ?resolved.source,
            score,
            "Resolved card reward"
        );

        Some(CardScore {
            card,
            rate: resolved.rate,
            score,
            source: resolved.source,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
