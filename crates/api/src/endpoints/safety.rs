//! Token safety endpoint.

use axum::{Json, Router, extract::State, routing::get};
use pulse_common::{AppError, AppResult};
use pulse_core::SafetyAssessment;
use serde::Deserialize;
use validator::Validate;

use crate::{extractors::ValidatedQuery, middleware::AppState};

/// Safety request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SafetyQuery {
    #[validate(required, length(min = 1))]
    pub token_id: Option<String>,
}

/// Blend the external risk report with vote sentiment.
async fn get_safety(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<SafetyQuery>,
) -> AppResult<Json<SafetyAssessment>> {
    let token_id = query
        .token_id
        .ok_or_else(|| AppError::missing_field("tokenId"))?;
    let assessment = state.safety_service.assess(&token_id).await?;
    Ok(Json(assessment))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_safety))
}
