//! HTTP client for the token-pulse API.
//!
//! [`VoteClient`] wraps every route and keeps a [`VoteCache`] of the vote the
//! caller holds per token, so a click on the held direction retracts while a
//! click on the other direction casts or changes.

pub mod cache;
pub mod client;
pub mod error;
pub mod types;

pub use cache::{CachedVote, VoteCache};
pub use client::{SyncState, ToggleAction, ToggleResult, VoteClient};
pub use error::ClientError;
pub use types::{
    AccuracySummary, SafetySummary, TrendingEntry, TrendingResponse, VoteCounts, VoteDirection,
};
