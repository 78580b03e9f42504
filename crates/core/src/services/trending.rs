//! Time-windowed trending ranking.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use pulse_common::{AppError, AppResult, config::TrendingConfig};
use pulse_db::{
    entities::vote::Direction,
    repositories::{TokenDirectionTally, VoteRepository},
};
use serde::Serialize;
use tracing::debug;

use super::token_directory;

/// One ranked token.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingEntry {
    pub token_id: String,
    pub symbol: String,
    pub name: String,
    pub pump_count: u64,
    pub dump_count: u64,
    pub total_count: u64,
    pub score: f64,
}

/// A computed ranking and the window it covers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingSnapshot {
    pub trending: Vec<TrendingEntry>,
    pub window_hours: u32,
    pub computed_at: DateTime<Utc>,
}

/// Start of a trailing window ending at `now`. Votes at exactly this instant count.
///
/// `None` when the window reaches past the earliest representable instant.
#[must_use]
pub fn window_start(now: DateTime<Utc>, window_hours: u32) -> Option<DateTime<Utc>> {
    now.checked_sub_signed(Duration::hours(i64::from(window_hours)))
}

/// Rank windowed tallies: score descending, token id ascending on ties.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn rank_trending(tallies: &[TokenDirectionTally], limit: usize) -> Vec<TrendingEntry> {
    let mut per_token: BTreeMap<&str, (u64, u64)> = BTreeMap::new();
    for tally in tallies {
        let n = u64::try_from(tally.count).unwrap_or(0);
        let entry = per_token.entry(tally.token_id.as_str()).or_default();
        match tally.direction {
            Direction::Pump => entry.0 += n,
            Direction::Dump => entry.1 += n,
        }
    }

    let mut entries: Vec<TrendingEntry> = per_token
        .into_iter()
        .filter(|(_, (pump, dump))| pump + dump > 0)
        .map(|(token_id, (pump, dump))| {
            let total = pump + dump;
            let display = token_directory::lookup(token_id);
            TrendingEntry {
                token_id: token_id.to_string(),
                symbol: display.symbol,
                name: display.name,
                pump_count: pump,
                dump_count: dump,
                total_count: total,
                score: total as f64 * (pump as f64 / total as f64),
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.token_id.cmp(&b.token_id))
    });
    entries.truncate(limit);
    entries
}

/// Trending service.
#[derive(Clone)]
pub struct TrendingService {
    vote_repo: VoteRepository,
    defaults: TrendingConfig,
}

impl TrendingService {
    /// Create a new trending service.
    #[must_use]
    pub const fn new(vote_repo: VoteRepository, defaults: TrendingConfig) -> Self {
        Self {
            vote_repo,
            defaults,
        }
    }

    /// Rank tokens by recent pump sentiment, falling back to configured defaults.
    pub async fn compute(
        &self,
        window_hours: Option<u32>,
        limit: Option<u32>,
    ) -> AppResult<TrendingSnapshot> {
        self.compute_at(
            window_hours.unwrap_or(self.defaults.default_window_hours),
            limit.unwrap_or(self.defaults.default_limit),
            Utc::now(),
        )
        .await
    }

    /// Rank tokens over the window ending at `now`.
    pub async fn compute_at(
        &self,
        window_hours: u32,
        limit: u32,
        now: DateTime<Utc>,
    ) -> AppResult<TrendingSnapshot> {
        if window_hours == 0 {
            return Err(AppError::Validation(
                "windowHours must be a positive integer".to_string(),
            ));
        }
        if limit == 0 {
            return Err(AppError::Validation(
                "limit must be a positive integer".to_string(),
            ));
        }

        let cutoff = window_start(now, window_hours).ok_or_else(|| {
            AppError::Validation(format!("windowHours {window_hours} is out of range"))
        })?;
        let tallies = self.vote_repo.count_since_by_token(cutoff).await?;
        let trending = rank_trending(&tallies, usize::try_from(limit).unwrap_or(usize::MAX));

        debug!(
            window_hours,
            tokens = tallies.len(),
            returned = trending.len(),
            "Computed trending"
        );

        Ok(TrendingSnapshot {
            trending,
            window_hours,
            computed_at: now,
        })
    }
}
