//! Repository layer over the database entities.

pub mod vote;

pub use vote::{DirectionTally, OutcomeTally, TokenDirectionTally, VoteRepository};
