//! Trending endpoint.

use axum::{Json, Router, extract::State, routing::get};
use pulse_common::AppResult;
use pulse_core::TrendingSnapshot;
use serde::Deserialize;
use validator::Validate;

use crate::{extractors::ValidatedQuery, middleware::AppState};

/// Trending request; omitted values fall back to configured defaults.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TrendingQuery {
    #[validate(range(min = 1))]
    pub window_hours: Option<u32>,
    #[validate(range(min = 1))]
    pub limit: Option<u32>,
}

async fn get_trending(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<TrendingQuery>,
) -> AppResult<Json<TrendingSnapshot>> {
    let snapshot = state
        .trending_service
        .compute(query.window_hours, query.limit)
        .await?;
    Ok(Json(snapshot))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_trending))
}
