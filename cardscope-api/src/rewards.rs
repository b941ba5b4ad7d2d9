use axum::{extract::State, routing::post, Json, Router};
use cardscope_shared::RewardData;
use serde::Deserialize;
use tracing::info;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LookupRequest {
    pub card_name: String,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/rewards/lookup", post(lookup_rewards))
}

/// POST /v1/rewards/lookup
/// Ask the provider directly. Nothing is stored.
pub async fn lookup_rewards(
    State(state): State<AppState>,
    Json(req): Json<LookupRequest>,
) -> Result<Json<RewardData>, AppError> {
    let card_name = req.card_name.trim();
    if card_name.is_empty() {
        return Err(AppError::ValidationError("card_name is required".to_string()));
    }

    info!(card = %card_name, "Live reward lookup");
    let data = state.provider.fetch_reward_profile(card_name).await?;
    Ok(Json(data))
}
