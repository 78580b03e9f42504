//! Vote ledger endpoints.

use axum::{Json, Router, extract::State, routing::get};
use pulse_common::{AppError, AppResult};
use pulse_core::{CastVoteInput, VoteCounts};
use pulse_db::entities::vote::Direction;
use serde::{Deserialize, Serialize};
use tracing::debug;
use validator::Validate;

use crate::{
    extractors::{ValidatedJson, ValidatedQuery},
    middleware::AppState,
};

/// Cast or change vote request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CastVoteRequest {
    #[validate(required, length(min = 1, max = 64))]
    pub token_id: Option<String>,
    #[validate(required)]
    pub direction: Option<Direction>,
    #[validate(length(max = 64))]
    pub voter_id: Option<String>,
    pub price_at_vote: Option<f64>,
}

/// Counts lookup request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CountsQuery {
    #[validate(required, length(min = 1))]
    pub token_id: Option<String>,
}

/// Retract request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RetractQuery {
    #[validate(required, length(min = 1))]
    pub token_id: Option<String>,
    #[validate(required, length(min = 1))]
    pub voter_id: Option<String>,
}

/// Mutation response: success flag plus recounted aggregates.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteMutationResponse {
    pub success: bool,
    #[serde(flatten)]
    pub counts: VoteCounts,
}

fn required<T>(value: Option<T>, field: &str) -> AppResult<T> {
    value.ok_or_else(|| AppError::missing_field(field))
}

/// Cast a vote or change the caller's existing one.
async fn cast_vote(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CastVoteRequest>,
) -> AppResult<Json<VoteMutationResponse>> {
    let input = CastVoteInput {
        token_id: required(req.token_id, "tokenId")?,
        direction: required(req.direction, "direction")?,
        voter_id: req.voter_id,
        price_at_vote: req.price_at_vote,
    };

    let token_id = input.token_id.clone();
    let direction = input.direction;
    let result = state.vote_service.cast_or_change(input).await?;
    debug!(
        token_id = %token_id,
        direction = ?direction,
        outcome = ?result.outcome,
        total = result.counts.total_count,
        "Vote cast"
    );

    Ok(Json(VoteMutationResponse {
        success: true,
        counts: result.counts,
    }))
}

/// Current counts for a token.
async fn get_counts(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<CountsQuery>,
) -> AppResult<Json<VoteCounts>> {
    let token_id = required(query.token_id, "tokenId")?;
    let counts = state.vote_service.get_counts(&token_id).await?;
    Ok(Json(counts))
}

/// Retract the caller's vote. Succeeds when there was nothing to retract.
async fn retract_vote(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<RetractQuery>,
) -> AppResult<Json<VoteMutationResponse>> {
    let token_id = required(query.token_id, "tokenId")?;
    let voter_id = required(query.voter_id, "voterId")?;

    let result = state.vote_service.retract(&token_id, &voter_id).await?;
    debug!(token_id = %token_id, removed = result.removed, "Vote retracted");

    Ok(Json(VoteMutationResponse {
        success: true,
        counts: result.counts,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_counts).post(cast_vote).delete(retract_vote))
}
