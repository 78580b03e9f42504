//! Client error type.

use thiserror::Error;

/// Errors returned by [`crate::VoteClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status} ({code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    /// Whether the server rejected the request as malformed.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::Api { status, .. } if *status >= 400 && *status < 500)
    }
}
