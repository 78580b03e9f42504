//! Vote ledger service.

use chrono::Utc;
use pulse_common::{AppError, AppResult, IdGenerator};
use pulse_db::{
    entities::vote::{self, Direction},
    repositories::{DirectionTally, VoteRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Aggregate vote counts for a token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteCounts {
    pub pump_count: u64,
    pub dump_count: u64,
    pub total_count: u64,
}

impl VoteCounts {
    /// Fold grouped direction counts into totals.
    #[must_use]
    pub fn from_tallies(tallies: &[DirectionTally]) -> Self {
        let mut counts = Self::default();
        for tally in tallies {
            let n = u64::try_from(tally.count).unwrap_or(0);
            match tally.direction {
                Direction::Pump => counts.pump_count += n,
                Direction::Dump => counts.dump_count += n,
            }
        }
        counts.total_count = counts.pump_count + counts.dump_count;
        counts
    }

    /// Share of pump votes in percent, 50 when nobody has voted.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn pump_percentage(&self) -> f64 {
        if self.total_count == 0 {
            return 50.0;
        }
        self.pump_count as f64 / self.total_count as f64 * 100.0
    }
}

/// Input for casting or changing a vote.
#[derive(Debug, Clone)]
pub struct CastVoteInput {
    pub token_id: String,
    pub direction: Direction,
    pub voter_id: Option<String>,
    pub price_at_vote: Option<f64>,
}

/// What a cast did to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastOutcome {
    /// A new row was inserted.
    Created,
    /// An existing row switched direction.
    Changed,
    /// The voter already held this direction.
    Unchanged,
}

/// Result of a cast: what happened plus the recounted aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastResult {
    pub outcome: CastOutcome,
    pub counts: VoteCounts,
}

/// Result of a retraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetractResult {
    /// Whether a row was actually removed.
    pub removed: bool,
    pub counts: VoteCounts,
}

/// Vote ledger: one vote per identified voter per token.
#[derive(Clone)]
pub struct VoteService {
    vote_repo: VoteRepository,
    id_gen: IdGenerator,
}

impl VoteService {
    /// Create a new vote service.
    #[must_use]
    pub const fn new(vote_repo: VoteRepository) -> Self {
        Self {
            vote_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Cast a vote, or change the voter's existing one.
    ///
    /// Anonymous votes (no voter id) are always inserted as independent rows.
    pub async fn cast_or_change(&self, input: CastVoteInput) -> AppResult<CastResult> {
        if input.token_id.is_empty() {
            return Err(AppError::missing_field("tokenId"));
        }

        let outcome = match input.voter_id.as_deref().filter(|v| !v.is_empty()) {
            Some(voter_id) => self.upsert_identified(&input, voter_id).await?,
            None => {
                self.vote_repo.create(self.new_vote(&input, None)).await?;
                CastOutcome::Created
            }
        };

        let counts = self.get_counts(&input.token_id).await?;

        info!(
            token_id = %input.token_id,
            direction = %input.direction,
            outcome = ?outcome,
            total = counts.total_count,
            "Vote recorded"
        );

        Ok(CastResult { outcome, counts })
    }

    /// Remove the vote a voter holds on a token. Removing nothing succeeds.
    pub async fn retract(&self, token_id: &str, voter_id: &str) -> AppResult<RetractResult> {
        if token_id.is_empty() {
            return Err(AppError::missing_field("tokenId"));
        }
        if voter_id.is_empty() {
            return Err(AppError::missing_field("voterId"));
        }

        let removed = self
            .vote_repo
            .delete_by_token_and_voter(token_id, voter_id)
            .await?
            > 0;
        let counts = self.get_counts(token_id).await?;

        info!(token_id = %token_id, removed, total = counts.total_count, "Vote retracted");

        Ok(RetractResult { removed, counts })
    }

    /// Current counts for a token.
    pub async fn get_counts(&self, token_id: &str) -> AppResult<VoteCounts> {
        if token_id.is_empty() {
            return Err(AppError::missing_field("tokenId"));
        }
        let tallies = self.vote_repo.count_by_direction(token_id).await?;
        Ok(VoteCounts::from_tallies(&tallies))
    }

    async fn upsert_identified(
        &self,
        input: &CastVoteInput,
        voter_id: &str,
    ) -> AppResult<CastOutcome> {
        if let Some(existing) = self
            .vote_repo
            .find_by_token_and_voter(&input.token_id, voter_id)
            .await?
        {
            return self.apply_change(existing, input).await;
        }

        if self
            .vote_repo
            .create_unless_exists(self.new_vote(input, Some(voter_id)))
            .await?
            .is_some()
        {
            return Ok(CastOutcome::Created);
        }

        // A concurrent insert won; its row is the one to change now.
        debug!(token_id = %input.token_id, "Vote insert raced, re-reading");
        match self
            .vote_repo
            .find_by_token_and_voter(&input.token_id, voter_id)
            .await?
        {
            Some(existing) => self.apply_change(existing, input).await,
            None => {
                self.vote_repo
                    .create(self.new_vote(input, Some(voter_id)))
                    .await?;
                Ok(CastOutcome::Created)
            }
        }
    }

    async fn apply_change(
        &self,
        existing: vote::Model,
        input: &CastVoteInput,
    ) -> AppResult<CastOutcome> {
        if existing.direction == input.direction {
            return Ok(CastOutcome::Unchanged);
        }

        let mut active: vote::ActiveModel = existing.into();
        active.direction = Set(input.direction);
        active.price_at_vote = Set(input.price_at_vote);
        active.updated_at = Set(Utc::now().into());
        // The old label was about the old direction.
        active.is_correct = Set(None);
        active.checked_at = Set(None);

        self.vote_repo.update(active).await?;
        Ok(CastOutcome::Changed)
    }

    fn new_vote(&self, input: &CastVoteInput, voter_id: Option<&str>) -> vote::ActiveModel {
        let now = Utc::now();
        vote::ActiveModel {
            id: Set(self.id_gen.generate()),
            token_id: Set(input.token_id.clone()),
            voter_id: Set(voter_id.map(str::to_string)),
            direction: Set(input.direction),
            price_at_vote: Set(input.price_at_vote),
            is_correct: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            checked_at: Set(None),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use maplit::btreemap;
    use pulse_db::entities::vote::Model;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use std::sync::Arc;

    fn held_vote(direction: Direction, is_correct: Option<bool>) -> Model {
        let now = Utc::now();
        Model {
            id: "v1".to_string(),
            token_id: "X".to_string(),
            voter_id: Some("w1".to_string()),
            direction,
            price_at_vote: Some(1.0),
            is_correct,
            created_at: now.into(),
            updated_at: now.into(),
            checked_at: is_correct.map(|_| now.into()),
        }
    }

    fn input(direction: Direction, voter_id: Option<&str>) -> CastVoteInput {
        CastVoteInput {
            token_id: "X".to_string(),
            direction,
            voter_id: voter_id.map(str::to_string),
            price_at_vote: Some(1.5),
        }
    }

    fn tally_rows(pump: i64, dump: i64) -> Vec<std::collections::BTreeMap<&'static str, Value>> {
        vec![
            btreemap! { "direction" => Value::from("pump"), "count" => Value::from(pump) },
            btreemap! { "direction" => Value::from("dump"), "count" => Value::from(dump) },
        ]
    }

    #[test]
    fn test_counts_from_tallies() {
        let counts = VoteCounts::from_tallies(&[
            DirectionTally {
                direction: Direction::Dump,
                count: 2,
            },
            DirectionTally {
                direction: Direction::Pump,
                count: 5,
            },
        ]);
        assert_eq!(counts.pump_count, 5);
        assert_eq!(counts.dump_count, 2);
        assert_eq!(counts.total_count, 7);
    }

    #[test]
    fn test_counts_from_no_tallies() {
        let counts = VoteCounts::from_tallies(&[]);
        assert_eq!(counts, VoteCounts::default());
        assert!((counts.pump_percentage() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_counts_serialize_camel_case() {
        let json = serde_json::to_value(VoteCounts {
            pump_count: 1,
            dump_count: 0,
            total_count: 1,
        })
        .unwrap();
        assert_eq!(json["pumpCount"], 1);
        assert_eq!(json["totalCount"], 1);
    }

    #[tokio::test]
    async fn test_first_identified_vote_is_created() {
        let created = held_vote(Direction::Pump, None);
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<Model>::new()])
                .append_query_results([[created]])
                .append_query_results([tally_rows(1, 0)])
                .into_connection(),
        );

        let service = VoteService::new(VoteRepository::new(db));
        let result = service
            .cast_or_change(input(Direction::Pump, Some("w1")))
            .await
            .unwrap();

        assert_eq!(result.outcome, CastOutcome::Created);
        assert_eq!(result.counts.pump_count, 1);
        assert_eq!(result.counts.total_count, 1);
    }

    #[tokio::test]
    async fn test_same_direction_is_unchanged() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[held_vote(Direction::Pump, Some(true))]])
                .append_query_results([tally_rows(1, 0)])
                .into_connection(),
        );

        let service = VoteService::new(VoteRepository::new(db));
        let result = service
            .cast_or_change(input(Direction::Pump, Some("w1")))
            .await
            .unwrap();

        assert_eq!(result.outcome, CastOutcome::Unchanged);
        assert_eq!(result.counts.total_count, 1);
    }

    #[tokio::test]
    async fn test_change_switches_direction() {
        let mut changed = held_vote(Direction::Dump, None);
        changed.price_at_vote = Some(1.5);
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[held_vote(Direction::Pump, Some(true))]])
                .append_query_results([[changed]])
                .append_query_results([tally_rows(0, 1)])
                .into_connection(),
        );

        let service = VoteService::new(VoteRepository::new(Arc::clone(&db)));
        let result = service
            .cast_or_change(input(Direction::Dump, Some("w1")))
            .await
            .unwrap();

        assert_eq!(result.outcome, CastOutcome::Changed);
        assert_eq!(result.counts.dump_count, 1);
        assert_eq!(result.counts.pump_count, 0);

        drop(service);
        let Ok(conn) = Arc::try_unwrap(db) else {
            panic!("connection still shared");
        };
        let log = conn.into_transaction_log();
        let update = log
            .iter()
            .flat_map(|txn| txn.statements())
            .find(|stmt| stmt.sql.starts_with("UPDATE"))
            .unwrap();

        assert!(update.sql.contains(r#""is_correct" = "#));
        assert!(update.sql.contains(r#""checked_at" = "#));
        let values = &update.values.as_ref().unwrap().0;
        assert!(values.contains(&Value::from(None::<bool>)));
        assert!(values.contains(&Value::from(
            None::<sea_orm::prelude::DateTimeWithTimeZone>
        )));
        assert!(values.contains(&Value::from("dump")));
    }

    #[tokio::test]
    async fn test_anonymous_vote_always_inserts() {
        let mut anonymous = held_vote(Direction::Pump, None);
        anonymous.voter_id = None;
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[anonymous]])
                .append_query_results([tally_rows(3, 0)])
                .into_connection(),
        );

        let service = VoteService::new(VoteRepository::new(db));
        let result = service
            .cast_or_change(input(Direction::Pump, None))
            .await
            .unwrap();

        assert_eq!(result.outcome, CastOutcome::Created);
        assert_eq!(result.counts.pump_count, 3);
    }

    #[tokio::test]
    async fn test_cast_requires_token_id() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = VoteService::new(VoteRepository::new(db));

        let mut bad = input(Direction::Pump, Some("w1"));
        bad.token_id = String::new();
        let result = service.cast_or_change(bad).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_store_failure_surfaces() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_errors([sea_orm::DbErr::Custom("down".to_string())])
                .into_connection(),
        );
        let service = VoteService::new(VoteRepository::new(db));

        let result = service
            .cast_or_change(input(Direction::Pump, Some("w1")))
            .await;

        assert!(matches!(result, Err(AppError::StoreUnavailable(_))));
    }

    #[tokio::test]
    async fn test_retract_missing_vote_succeeds() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .append_query_results([tally_rows(2, 1)])
                .into_connection(),
        );

        let service = VoteService::new(VoteRepository::new(db));
        let result = service.retract("X", "w9").await.unwrap();

        assert!(!result.removed);
        assert_eq!(result.counts.total_count, 3);
    }

    #[tokio::test]
    async fn test_retract_requires_voter_id() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = VoteService::new(VoteRepository::new(db));

        let result = service.retract("X", "").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
