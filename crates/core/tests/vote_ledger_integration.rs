//! Vote ledger integration tests against `PostgreSQL`.
//!
//! Run with: `cargo test -p pulse-core --test vote_ledger_integration -- --ignored`

#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::{Duration, SubsecRound, Utc};
use pulse_common::config::TrendingConfig;
use pulse_core::{
    AccuracyService, CastOutcome, CastVoteInput, TrendingService, VoteService,
};
use pulse_db::{
    entities::{Vote, vote::{self, Direction}},
    repositories::VoteRepository,
    test_utils::TestDatabase,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};

fn cast(token_id: &str, direction: Direction, voter_id: Option<&str>) -> CastVoteInput {
    CastVoteInput {
        token_id: token_id.to_string(),
        direction,
        voter_id: voter_id.map(str::to_string),
        price_at_vote: Some(0.01),
    }
}

async fn setup() -> (TestDatabase, VoteRepository) {
    let db = TestDatabase::create_unique().await.expect("Failed to create database");
    let repo = VoteRepository::new(db.shared());
    (db, repo)
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_cast_change_retract_scenario() {
    let (db, repo) = setup().await;
    let ledger = VoteService::new(repo);

    let first = ledger.cast_or_change(cast("X", Direction::Pump, Some("w1"))).await.unwrap();
    assert_eq!(first.outcome, CastOutcome::Created);
    assert_eq!((first.counts.pump_count, first.counts.dump_count), (1, 0));

    let changed = ledger.cast_or_change(cast("X", Direction::Dump, Some("w1"))).await.unwrap();
    assert_eq!(changed.outcome, CastOutcome::Changed);
    assert_eq!((changed.counts.pump_count, changed.counts.dump_count), (0, 1));

    let retracted = ledger.retract("X", "w1").await.unwrap();
    assert!(retracted.removed);
    assert_eq!(retracted.counts.total_count, 0);

    let again = ledger.retract("X", "w1").await.unwrap();
    assert!(!again.removed);
    assert_eq!(again.counts.total_count, 0);

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_repeated_casts_keep_single_row() {
    let (db, repo) = setup().await;
    let ledger = VoteService::new(repo);

    for direction in [Direction::Pump, Direction::Pump, Direction::Dump, Direction::Pump] {
        ledger.cast_or_change(cast("X", direction, Some("w1"))).await.unwrap();
    }
    ledger.cast_or_change(cast("X", Direction::Dump, None)).await.unwrap();
    ledger.cast_or_change(cast("X", Direction::Dump, None)).await.unwrap();

    let identified = Vote::find()
        .filter(vote::Column::TokenId.eq("X"))
        .filter(vote::Column::VoterId.eq("w1"))
        .count(db.connection())
        .await
        .unwrap();
    assert_eq!(identified, 1);

    let counts = ledger.get_counts("X").await.unwrap();
    assert_eq!(counts.pump_count, 1);
    assert_eq!(counts.dump_count, 2);
    assert_eq!(counts.total_count, counts.pump_count + counts.dump_count);

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_concurrent_first_votes_keep_single_row() {
    let (db, repo) = setup().await;
    let ledger = VoteService::new(repo);

    let a = ledger.clone();
    let b = ledger.clone();
    let (ra, rb) = tokio::join!(
        a.cast_or_change(cast("X", Direction::Pump, Some("w1"))),
        b.cast_or_change(cast("X", Direction::Dump, Some("w1"))),
    );
    ra.unwrap();
    rb.unwrap();

    let counts = ledger.get_counts("X").await.unwrap();
    assert_eq!(counts.total_count, 1);

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_change_resets_outcome_label() {
    let (db, repo) = setup().await;
    let ledger = VoteService::new(repo.clone());

    ledger.cast_or_change(cast("X", Direction::Pump, Some("w1"))).await.unwrap();

    let held = repo.find_by_token_and_voter("X", "w1").await.unwrap().unwrap();
    let mut labelled: vote::ActiveModel = held.into();
    labelled.is_correct = Set(Some(true));
    labelled.checked_at = Set(Some(Utc::now().into()));
    labelled.update(db.connection()).await.unwrap();

    ledger.cast_or_change(cast("X", Direction::Dump, Some("w1"))).await.unwrap();

    let held = repo.find_by_token_and_voter("X", "w1").await.unwrap().unwrap();
    assert_eq!(held.direction, Direction::Dump);
    assert_eq!(held.is_correct, None);
    assert_eq!(held.checked_at, None);

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_accuracy_over_labelled_votes() {
    let (db, repo) = setup().await;
    let ledger = VoteService::new(repo.clone());
    let accuracy = AccuracyService::new(repo.clone());

    for (token, label) in [("A", Some(true)), ("B", Some(true)), ("C", Some(false)), ("D", None)] {
        ledger.cast_or_change(cast(token, Direction::Pump, Some("w1"))).await.unwrap();
        let held = repo.find_by_token_and_voter(token, "w1").await.unwrap().unwrap();
        let mut active: vote::ActiveModel = held.into();
        active.is_correct = Set(label);
        active.update(db.connection()).await.unwrap();
    }

    let summary = accuracy.compute("w1").await.unwrap();
    assert_eq!(summary.total_votes, 4);
    assert_eq!(summary.verified_votes, 3);
    assert_eq!(summary.correct_votes, 2);
    assert_eq!(summary.accuracy_pct, 67);
    assert!(!summary.has_hot_streak);

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_trending_window_lower_bound_is_inclusive() {
    let (db, repo) = setup().await;
    let ledger = VoteService::new(repo.clone());
    let trending = TrendingService::new(
        repo.clone(),
        TrendingConfig {
            default_window_hours: 1,
            default_limit: 10,
        },
    );

    ledger.cast_or_change(cast("edge", Direction::Pump, Some("w1"))).await.unwrap();
    ledger.cast_or_change(cast("stale", Direction::Pump, Some("w1"))).await.unwrap();

    // Postgres keeps microseconds; align so the edge vote sits exactly on the cutoff.
    let now = Utc::now().trunc_subsecs(6);
    for (token, created) in [
        ("edge", now - Duration::hours(1)),
        ("stale", now - Duration::hours(1) - Duration::seconds(1)),
    ] {
        let held = repo.find_by_token_and_voter(token, "w1").await.unwrap().unwrap();
        let mut active: vote::ActiveModel = held.into();
        active.created_at = Set(created.into());
        active.update(db.connection()).await.unwrap();
    }

    let snapshot = trending.compute_at(1, 10, now).await.unwrap();
    let tokens: Vec<&str> = snapshot.trending.iter().map(|e| e.token_id.as_str()).collect();
    assert_eq!(tokens, vec!["edge"]);

    db.drop_database().await.unwrap();
}
