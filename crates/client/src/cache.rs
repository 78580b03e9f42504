//! Local mirror of the caller's votes.
//!
//! The cache remembers which direction the caller holds on each token and the
//! last counts seen. It is never the source of truth: every confirmed server
//! response overwrites the cached counts.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{VoteCounts, VoteDirection};

/// Cached state for one token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedVote {
    pub held: Option<VoteDirection>,
    pub counts: VoteCounts,
}

/// Per-token vote cache. Serializable so callers can persist it between sessions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VoteCache {
    entries: HashMap<String, CachedVote>,
}

impl VoteCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached state for a token; empty when never seen.
    #[must_use]
    pub fn get(&self, token_id: &str) -> CachedVote {
        self.entries.get(token_id).copied().unwrap_or_default()
    }

    /// Direction the caller holds on a token.
    #[must_use]
    pub fn held(&self, token_id: &str) -> Option<VoteDirection> {
        self.entries.get(token_id).and_then(|e| e.held)
    }

    pub fn set_held(&mut self, token_id: &str, held: Option<VoteDirection>) {
        self.entry(token_id).held = held;
    }

    /// Overwrite cached counts with a server answer.
    pub fn confirm(&mut self, token_id: &str, counts: VoteCounts) {
        self.entry(token_id).counts = counts;
    }

    /// Adjust cached counts as if a click on `clicked` had succeeded.
    ///
    /// The held vote is removed; `clicked` is added unless it was the held
    /// direction (a retract). Returns the adjusted counts.
    pub fn apply_degraded(&mut self, token_id: &str, clicked: VoteDirection) -> VoteCounts {
        let entry = self.entry(token_id);
        let previous = entry.held;

        if let Some(held) = previous {
            entry.counts.remove(held);
        }
        if previous == Some(clicked) {
            entry.held = None;
        } else {
            entry.counts.add(clicked);
            entry.held = Some(clicked);
        }
        entry.counts
    }

    fn entry(&mut self, token_id: &str) -> &mut CachedVote {
        self.entries.entry(token_id.to_string()).or_default()
    }
}
