//! Typed client for the vote API.

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::{
    cache::VoteCache,
    error::ClientError,
    types::{
        AccuracySummary, CastVoteBody, ErrorEnvelope, SafetySummary, TrendingResponse,
        VoteCounts, VoteDirection, VoteMutation,
    },
};

/// What a toggle click turned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleAction {
    /// Cast a new vote or change the held one.
    Cast,
    /// Clicked the held direction.
    Retract,
}

/// How the counts returned by a toggle were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// The server answered; counts are authoritative.
    Confirmed,
    /// The server call failed; counts are a local estimate.
    Degraded,
    /// No server call was made (anonymous retract); cached counts are unchanged.
    LocalOnly,
}

/// Result of [`VoteClient::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleResult {
    pub action: ToggleAction,
    pub state: SyncState,
    pub counts: VoteCounts,
    pub held: Option<VoteDirection>,
}

/// HTTP client for the token-pulse API.
pub struct VoteClient {
    http: Client,
    base_url: Url,
    cache: VoteCache,
}

impl VoteClient {
    /// Create a client for a server such as `http://localhost:3000`.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_cache(base_url, VoteCache::new())
    }

    /// Create a client that starts from a previously saved cache.
    pub fn with_cache(base_url: &str, cache: VoteCache) -> Result<Self, ClientError> {
        let base_url =
            Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(format!("{base_url}: {e}")))?;
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self {
            http,
            base_url,
            cache,
        })
    }

    #[must_use]
    pub const fn cache(&self) -> &VoteCache {
        &self.cache
    }

    /// Hand the cache back for persisting.
    #[must_use]
    pub fn into_cache(self) -> VoteCache {
        self.cache
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::InvalidUrl(e.to_string()))
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ClientError> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let (code, message) = match serde_json::from_str::<ErrorEnvelope>(&body) {
            Ok(envelope) => (envelope.error.code, envelope.error.message),
            Err(_) => ("UNKNOWN".to_string(), body),
        };
        Err(ClientError::Api {
            status: status.as_u16(),
            code,
            message,
        })
    }

    /// `POST /api/vote`.
    pub async fn cast(
        &self,
        token_id: &str,
        direction: VoteDirection,
        voter_id: Option<&str>,
        price_at_vote: Option<f64>,
    ) -> Result<VoteCounts, ClientError> {
        let body = CastVoteBody {
            token_id,
            direction,
            voter_id,
            price_at_vote,
        };
        let request = self.http.post(self.endpoint("/api/vote")?).json(&body);
        let mutation: VoteMutation = Self::send(request).await?;
        Ok(mutation.counts)
    }

    /// `GET /api/vote`.
    pub async fn counts(&self, token_id: &str) -> Result<VoteCounts, ClientError> {
        let request = self
            .http
            .get(self.endpoint("/api/vote")?)
            .query(&[("tokenId", token_id)]);
        Self::send(request).await
    }

    /// `DELETE /api/vote`.
    pub async fn retract(&self, token_id: &str, voter_id: &str) -> Result<VoteCounts, ClientError> {
        let request = self
            .http
            .delete(self.endpoint("/api/vote")?)
            .query(&[("tokenId", token_id), ("voterId", voter_id)]);
        let mutation: VoteMutation = Self::send(request).await?;
        Ok(mutation.counts)
    }

    /// `GET /api/accuracy`.
    pub async fn accuracy(&self, voter_id: &str) -> Result<AccuracySummary, ClientError> {
        let request = self
            .http
            .get(self.endpoint("/api/accuracy")?)
            .query(&[("voterId", voter_id)]);
        Self::send(request).await
    }

    /// `GET /api/trending`; omitted values use the server defaults.
    pub async fn trending(
        &self,
        window_hours: Option<u32>,
        limit: Option<u32>,
    ) -> Result<TrendingResponse, ClientError> {
        let mut params = Vec::new();
        if let Some(hours) = window_hours {
            params.push(("windowHours", hours.to_string()));
        }
        if let Some(limit) = limit {
            params.push(("limit", limit.to_string()));
        }
        let request = self
            .http
            .get(self.endpoint("/api/trending")?)
            .query(&params);
        Self::send(request).await
    }

    /// `GET /api/safety`.
    pub async fn safety(&self, token_id: &str) -> Result<SafetySummary, ClientError> {
        let request = self
            .http
            .get(self.endpoint("/api/safety")?)
            .query(&[("tokenId", token_id)]);
        Self::send(request).await
    }

    /// Handle a click on a direction button.
    ///
    /// Clicking the held direction retracts; the server is only called when a
    /// voter id is known, and an empty id counts as anonymous. Any other click
    /// casts or changes. When the server call fails the cache is adjusted
    /// locally and the result is `Degraded`.
    pub async fn toggle(
        &mut self,
        token_id: &str,
        clicked: VoteDirection,
        voter_id: Option<&str>,
        price_at_vote: Option<f64>,
    ) -> ToggleResult {
        let voter_id = voter_id.filter(|v| !v.is_empty());
        let held = self.cache.held(token_id);

        if held == Some(clicked) {
            let outcome = match voter_id {
                Some(voter_id) => Some(self.retract(token_id, voter_id).await),
                None => None,
            };
            return match outcome {
                Some(Ok(counts)) => {
                    self.cache.set_held(token_id, None);
                    self.cache.confirm(token_id, counts);
                    self.result(token_id, ToggleAction::Retract, SyncState::Confirmed)
                }
                Some(Err(e)) => {
                    warn!(token_id = %token_id, error = %e, "Retract failed, adjusting locally");
                    self.cache.apply_degraded(token_id, clicked);
                    self.result(token_id, ToggleAction::Retract, SyncState::Degraded)
                }
                None => {
                    self.cache.set_held(token_id, None);
                    self.result(token_id, ToggleAction::Retract, SyncState::LocalOnly)
                }
            };
        }

        match self.cast(token_id, clicked, voter_id, price_at_vote).await {
            Ok(counts) => {
                debug!(token_id = %token_id, direction = ?clicked, "Vote confirmed");
                self.cache.set_held(token_id, Some(clicked));
                self.cache.confirm(token_id, counts);
                self.result(token_id, ToggleAction::Cast, SyncState::Confirmed)
            }
            Err(e) => {
                warn!(token_id = %token_id, error = %e, "Vote failed, adjusting locally");
                self.cache.apply_degraded(token_id, clicked);
                self.result(token_id, ToggleAction::Cast, SyncState::Degraded)
            }
        }
    }

    fn result(&self, token_id: &str, action: ToggleAction, state: SyncState) -> ToggleResult {
        let cached = self.cache.get(token_id);
        ToggleResult {
            action,
            state,
            counts: cached.counts,
            held: cached.held,
        }
    }
}
