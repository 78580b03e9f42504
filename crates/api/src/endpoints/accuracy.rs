//! Voter accuracy endpoint.

use axum::{Json, Router, extract::State, routing::get};
use pulse_common::{AppError, AppResult};
use pulse_core::AccuracySummary;
use serde::Deserialize;
use validator::Validate;

use crate::{extractors::ValidatedQuery, middleware::AppState};

/// Accuracy request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AccuracyQuery {
    #[validate(required, length(min = 1))]
    pub voter_id: Option<String>,
}

async fn get_accuracy(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<AccuracyQuery>,
) -> AppResult<Json<AccuracySummary>> {
    let voter_id = query
        .voter_id
        .ok_or_else(|| AppError::missing_field("voterId"))?;
    let summary = state.accuracy_service.compute(&voter_id).await?;
    Ok(Json(summary))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_accuracy))
}
