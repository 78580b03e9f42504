//! API middleware.

use pulse_core::{AccuracyService, SafetyService, TrendingService, VoteService};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub vote_service: VoteService,
    pub accuracy_service: AccuracyService,
    pub trending_service: TrendingService,
    pub safety_service: SafetyService,
}
