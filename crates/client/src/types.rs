//! Wire types of the token-pulse API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentiment of a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Pump,
    Dump,
}

/// Aggregate vote counts for a token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteCounts {
    pub pump_count: u64,
    pub dump_count: u64,
    pub total_count: u64,
}

impl VoteCounts {
    pub(crate) fn add(&mut self, direction: VoteDirection) {
        match direction {
            VoteDirection::Pump => self.pump_count += 1,
            VoteDirection::Dump => self.dump_count += 1,
        }
        self.total_count = self.pump_count + self.dump_count;
    }

    pub(crate) fn remove(&mut self, direction: VoteDirection) {
        match direction {
            VoteDirection::Pump => self.pump_count = self.pump_count.saturating_sub(1),
            VoteDirection::Dump => self.dump_count = self.dump_count.saturating_sub(1),
        }
        self.total_count = self.pump_count + self.dump_count;
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CastVoteBody<'a> {
    pub token_id: &'a str,
    pub direction: VoteDirection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voter_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_at_vote: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VoteMutation {
    #[allow(dead_code)]
    pub success: bool,
    #[serde(flatten)]
    pub counts: VoteCounts,
}

/// Per-voter accuracy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccuracySummary {
    pub total_votes: u64,
    pub verified_votes: u64,
    pub correct_votes: u64,
    pub accuracy_pct: u32,
    pub has_hot_streak: bool,
}

/// One ranked token.
#[derive(Debug, Clone, PartialEq, Deserialize)]
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

/// Trending ranking.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingResponse {
    pub trending: Vec<TrendingEntry>,
    pub window_hours: u32,
    pub computed_at: DateTime<Utc>,
}

/// Safety assessment; provider details are left out.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetySummary {
    pub token_id: String,
    pub aggregated_score: u32,
    pub rating: String,
    pub votes: VoteCounts,
    pub report_error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub code: String,
    pub message: String,
}
