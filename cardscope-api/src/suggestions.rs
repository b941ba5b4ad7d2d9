use axum::{extract::State, routing::post, Json, Router};
use cardscope_shared::{SuggestionRequest, SuggestionResponse};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/suggestions", post(suggest_cards))
}

/// POST /v1/suggestions
/// Rank the caller's cards for a merchant or category
pub async fn suggest_cards(
    State(state): State<AppState>,
    Json(req): Json<SuggestionRequest>,
) -> Result<Json<SuggestionResponse>, AppError> {
    let response = state.engine.suggest(req).await?;
    Ok(Json(response))
}
