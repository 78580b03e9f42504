//! Vote repository.

use std::sync::Arc;

use crate::entities::{
    Vote,
    vote::{self, Direction},
};
use chrono::{DateTime, Utc};
use pulse_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, FromQueryResult,
    QueryFilter, QuerySelect, SqlErr,
};

/// Vote count for one direction of one token.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct DirectionTally {
    pub direction: Direction,
    pub count: i64,
}

/// Vote count for one outcome label of one voter.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct OutcomeTally {
    pub is_correct: Option<bool>,
    pub count: i64,
}

/// Vote count for one (token, direction) pair inside a time window.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct TokenDirectionTally {
    pub token_id: String,
    pub direction: Direction,
    pub count: i64,
}

fn store_error(e: DbErr) -> AppError {
    AppError::StoreUnavailable(e.to_string())
}

/// Vote repository for database operations.
#[derive(Clone)]
pub struct VoteRepository {
    db: Arc<DatabaseConnection>,
}

impl VoteRepository {
    /// Create a new vote repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the vote a voter holds on a token.
    pub async fn find_by_token_and_voter(
        &self,
        token_id: &str,
        voter_id: &str,
    ) -> AppResult<Option<vote::Model>> {
        Vote::find()
            .filter(vote::Column::TokenId.eq(token_id))
            .filter(vote::Column::VoterId.eq(voter_id))
            .one(self.db.as_ref())
            .await
            .map_err(store_error)
    }

    /// Insert a new vote.
    pub async fn create(&self, model: vote::ActiveModel) -> AppResult<vote::Model> {
        model.insert(self.db.as_ref()).await.map_err(store_error)
    }

    /// Insert a new vote, returning `None` when the (token, voter) pair already exists.
    pub async fn create_unless_exists(
        &self,
        model: vote::ActiveModel,
    ) -> AppResult<Option<vote::Model>> {
        match model.insert(self.db.as_ref()).await {
            Ok(created) => Ok(Some(created)),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Ok(None)
            }
            Err(e) => Err(store_error(e)),
        }
    }

    /// Update a vote.
    pub async fn update(&self, model: vote::ActiveModel) -> AppResult<vote::Model> {
        model.update(self.db.as_ref()).await.map_err(store_error)
    }

    /// Delete the vote a voter holds on a token. Returns the number of rows removed.
    pub async fn delete_by_token_and_voter(&self, token_id: &str, voter_id: &str) -> AppResult<u64> {
        let result = Vote::delete_many()
            .filter(vote::Column::TokenId.eq(token_id))
            .filter(vote::Column::VoterId.eq(voter_id))
            .exec(self.db.as_ref())
            .await
            .map_err(store_error)?;
        Ok(result.rows_affected)
    }

    /// Count votes on a token grouped by direction (anonymous and identified alike).
    pub async fn count_by_direction(&self, token_id: &str) -> AppResult<Vec<DirectionTally>> {
        Vote::find()
            .select_only()
            .column(vote::Column::Direction)
            .column_as(vote::Column::Id.count(), "count")
            .filter(vote::Column::TokenId.eq(token_id))
            .group_by(vote::Column::Direction)
            .into_model::<DirectionTally>()
            .all(self.db.as_ref())
            .await
            .map_err(store_error)
    }

    /// Count a voter's votes grouped by outcome label.
    pub async fn count_outcomes_by_voter(&self, voter_id: &str) -> AppResult<Vec<OutcomeTally>> {
        Vote::find()
            .select_only()
            .column(vote::Column::IsCorrect)
            .column_as(vote::Column::Id.count(), "count")
            .filter(vote::Column::VoterId.eq(voter_id))
            .group_by(vote::Column::IsCorrect)
            .into_model::<OutcomeTally>()
            .all(self.db.as_ref())
            .await
            .map_err(store_error)
    }

    /// Count votes created at or after `since`, grouped by token and direction.
    pub async fn count_since_by_token(
        &self,
        since: DateTime<Utc>,
    ) -> AppResult<Vec<TokenDirectionTally>> {
        Vote::find()
            .select_only()
            .column(vote::Column::TokenId)
            .column(vote::Column::Direction)
            .column_as(vote::Column::Id.count(), "count")
            .filter(vote::Column::CreatedAt.gte(since))
            .group_by(vote::Column::TokenId)
            .group_by(vote::Column::Direction)
            .into_model::<TokenDirectionTally>()
            .all(self.db.as_ref())
            .await
            .map_err(store_error)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};

    fn create_test_vote(
        id: &str,
        token_id: &str,
        voter_id: Option<&str>,
        direction: Direction,
    ) -> vote::Model {
        let now = Utc::now();
        vote::Model {
            id: id.to_string(),
            token_id: token_id.to_string(),
            voter_id: voter_id.map(str::to_string),
            direction,
            price_at_vote: Some(0.42),
            is_correct: None,
            created_at: now.into(),
            updated_at: now.into(),
            checked_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_token_and_voter_found() {
        let vote = create_test_vote("v1", "token1", Some("w1"), Direction::Pump);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[vote.clone()]])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);
        let result = repo.find_by_token_and_voter("token1", "w1").await.unwrap();

        let found = result.unwrap();
        assert_eq!(found.id, "v1");
        assert_eq!(found.direction, Direction::Pump);
    }

    #[tokio::test]
    async fn test_find_by_token_and_voter_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<vote::Model>::new()])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);
        let result = repo.find_by_token_and_voter("token1", "w2").await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_query_error_maps_to_store_unavailable() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_errors([DbErr::Custom("connection reset".to_string())])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);
        let result = repo.count_by_direction("token1").await;

        assert!(matches!(result, Err(AppError::StoreUnavailable(_))));
    }

    #[tokio::test]
    async fn test_delete_by_token_and_voter_reports_rows() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 0,
                    },
                ])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);
        assert_eq!(repo.delete_by_token_and_voter("token1", "w1").await.unwrap(), 1);
        assert_eq!(repo.delete_by_token_and_voter("token1", "w1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_count_by_direction() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    btreemap! {
                        "direction" => Value::from("pump"),
                        "count" => Value::from(3i64),
                    },
                    btreemap! {
                        "direction" => Value::from("dump"),
                        "count" => Value::from(2i64),
                    },
                ]])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);
        let tallies = repo.count_by_direction("token1").await.unwrap();

        assert_eq!(
            tallies,
            vec![
                DirectionTally {
                    direction: Direction::Pump,
                    count: 3
                },
                DirectionTally {
                    direction: Direction::Dump,
                    count: 2
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_count_outcomes_by_voter() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    btreemap! {
                        "is_correct" => Value::Bool(None),
                        "count" => Value::from(4i64),
                    },
                    btreemap! {
                        "is_correct" => Value::from(true),
                        "count" => Value::from(2i64),
                    },
                ]])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);
        let tallies = repo.count_outcomes_by_voter("w1").await.unwrap();

        assert_eq!(tallies.len(), 2);
        assert_eq!(tallies[0].is_correct, None);
        assert_eq!(tallies[1].is_correct, Some(true));
        assert_eq!(tallies[1].count, 2);
    }

    #[tokio::test]
    async fn test_count_since_by_token() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    btreemap! {
                        "token_id" => Value::from("token1"),
                        "direction" => Value::from("pump"),
                        "count" => Value::from(8i64),
                    },
                    btreemap! {
                        "token_id" => Value::from("token1"),
                        "direction" => Value::from("dump"),
                        "count" => Value::from(2i64),
                    },
                ]])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);
        let tallies = repo
            .count_since_by_token(Utc::now() - chrono::Duration::hours(1))
            .await
            .unwrap();

        assert_eq!(tallies.len(), 2);
        assert_eq!(tallies[0].token_id, "token1");
        assert_eq!(tallies[0].direction, Direction::Pump);
        assert_eq!(tallies[0].count, 8);
        assert_eq!(tallies[1].direction, Direction::Dump);
    }
}
