//! Per-voter prediction accuracy.

use pulse_common::{AppError, AppResult};
use pulse_db::repositories::{OutcomeTally, VoteRepository};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Minimum rounded accuracy for a hot streak.
pub const HOT_STREAK_MIN_ACCURACY_PCT: u32 = 70;

/// Minimum number of settled votes for a hot streak.
pub const HOT_STREAK_MIN_VERIFIED: u64 = 3;

/// Accuracy of one voter over their settled votes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccuracySummary {
    pub total_votes: u64,
    pub verified_votes: u64,
    pub correct_votes: u64,
    pub accuracy_pct: u32,
    pub has_hot_streak: bool,
}

impl AccuracySummary {
    /// Build a summary from votes grouped by outcome label.
    #[must_use]
    pub fn from_tallies(tallies: &[OutcomeTally]) -> Self {
        let (mut total, mut verified, mut correct) = (0u64, 0u64, 0u64);
        for tally in tallies {
            let n = u64::try_from(tally.count).unwrap_or(0);
            total += n;
            match tally.is_correct {
                Some(true) => {
                    verified += n;
                    correct += n;
                }
                Some(false) => verified += n,
                None => {}
            }
        }
        Self::from_counts(total, verified, correct)
    }

    /// Build a summary from raw counts.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn from_counts(total_votes: u64, verified_votes: u64, correct_votes: u64) -> Self {
        let accuracy_pct = if verified_votes == 0 {
            0
        } else {
            (100.0 * correct_votes as f64 / verified_votes as f64).round() as u32
        };

        Self {
            total_votes,
            verified_votes,
            correct_votes,
            accuracy_pct,
            has_hot_streak: accuracy_pct >= HOT_STREAK_MIN_ACCURACY_PCT
                && verified_votes >= HOT_STREAK_MIN_VERIFIED,
        }
    }
}

/// Accuracy service.
#[derive(Clone)]
pub struct AccuracyService {
    vote_repo: VoteRepository,
}

impl AccuracyService {
    /// Create a new accuracy service.
    #[must_use]
    pub const fn new(vote_repo: VoteRepository) -> Self {
        Self { vote_repo }
    }

    /// Compute the accuracy of a voter. Read only.
    pub async fn compute(&self, voter_id: &str) -> AppResult<AccuracySummary> {
        if voter_id.is_empty() {
            return Err(AppError::missing_field("voterId"));
        }

        let tallies = self.vote_repo.count_outcomes_by_voter(voter_id).await?;
        let summary = AccuracySummary::from_tallies(&tallies);

        debug!(
            voter_id = %voter_id,
            verified = summary.verified_votes,
            accuracy_pct = summary.accuracy_pct,
            "Computed accuracy"
        );

        Ok(summary)
    }
}
