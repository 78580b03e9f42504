//! Business logic services.

pub mod accuracy;
pub mod risk_report;
pub mod safety;
pub mod token_directory;
pub mod trending;
pub mod vote;

pub use accuracy::{AccuracyService, AccuracySummary};
pub use risk_report::{RiskItem, RiskReport, RiskReportProvider, RiskReportService, RugCheckClient};
pub use safety::{SafetyAssessment, SafetyBreakdown, SafetyRating, SafetyService};
pub use token_directory::TokenDisplay;
pub use trending::{TrendingEntry, TrendingService, TrendingSnapshot};
pub use vote::{CastOutcome, CastResult, CastVoteInput, RetractResult, VoteCounts, VoteService};
