//! API endpoints.

mod accuracy;
mod safety;
mod trending;
mod vote;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/vote", vote::router())
        .nest("/accuracy", accuracy::router())
        .nest("/trending", trending::router())
        .nest("/safety", safety::router())
}
