use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct IssuerQuery {
    #[serde(default)]
    pub search: String,
}

#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    pub issuer: String,
    #[serde(default)]
    pub search: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/cards/issuers", get(list_issuers))
        .route("/v1/cards/products", get(list_products))
}

/// GET /v1/cards/issuers?search=
pub async fn list_issuers(
    State(state): State<AppState>,
    Query(query): Query<IssuerQuery>,
) -> Result<Json<Vec<String>>, AppError> {
    let issuers = state.profiles.list_issuers(&query.search).await?;
    Ok(Json(issuers))
}

/// GET /v1/cards/products?issuer=&search=
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Vec<String>>, AppError> {
    let products = state
        .profiles
        .list_products(&query.issuer, &query.search)
        .await?;
    Ok(Json(products))
}
