//! HTTP API layer for token-pulse.
//!
//! - **Endpoints**: vote ledger, accuracy, trending and safety routes
//! - **Extractors**: query and body validation
//! - **Middleware**: shared application state
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;

pub use endpoints::router;
pub use middleware::AppState;
