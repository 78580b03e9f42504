//! Token safety aggregation.
//!
//! Blends an external risk report with vote sentiment into a single score.
//! Each component is on a 0 to 10 scale; the weighted blend is scaled to
//! 0 to 1000.

use pulse_common::{AppError, AppResult};
use serde::Serialize;
use tracing::{info, warn};

use super::risk_report::{RiskReport, RiskReportService};
use super::vote::{VoteCounts, VoteService};

pub const RISK_REPORT_WEIGHT: f64 = 0.4;
pub const SECURITY_WEIGHT: f64 = 0.3;
pub const LIQUIDITY_WEIGHT: f64 = 0.2;
pub const COMMUNITY_WEIGHT: f64 = 0.1;

/// Security component until on-chain security checks exist.
pub const SECURITY_BASELINE: f64 = 5.0;

/// Community sentiment stays neutral up to this many votes.
pub const COMMUNITY_MIN_VOTES: u64 = 10;

const NEUTRAL_COMMUNITY: f64 = 5.0;

/// Human-readable rating derived from the raw provider score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SafetyRating {
    Excellent,
    Good,
    Fair,
    Poor,
    Dangerous,
}

impl SafetyRating {
    /// Rating for a provider score on the 0 to 10000 scale.
    #[must_use]
    pub fn from_risk_score(score: f64) -> Self {
        if score >= 8000.0 {
            Self::Excellent
        } else if score >= 6000.0 {
            Self::Good
        } else if score >= 4000.0 {
            Self::Fair
        } else if score >= 2000.0 {
            Self::Poor
        } else {
            Self::Dangerous
        }
    }
}

/// Per-component scores, each 0 to 10.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyBreakdown {
    pub risk_report: f64,
    pub security: f64,
    pub liquidity: f64,
    pub community: f64,
}

impl SafetyBreakdown {
    /// Compute every component from the available inputs.
    #[must_use]
    pub fn compute(report: Option<&RiskReport>, votes: &VoteCounts) -> Self {
        Self {
            risk_report: risk_report_score(report),
            security: SECURITY_BASELINE,
            liquidity: liquidity_score(report.map_or(0.0, |r| r.liquidity)),
            community: community_score(votes),
        }
    }

    /// Weighted blend on a 0 to 1000 scale.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn aggregated_score(&self) -> u32 {
        let blended = self.risk_report * RISK_REPORT_WEIGHT
            + self.security * SECURITY_WEIGHT
            + self.liquidity * LIQUIDITY_WEIGHT
            + self.community * COMMUNITY_WEIGHT;
        (blended * 100.0).round().max(0.0) as u32
    }
}

/// Provider score scaled to 0..10, or the security baseline without a usable report.
#[must_use]
pub fn risk_report_score(report: Option<&RiskReport>) -> f64 {
    match report {
        Some(r) if r.score > 0.0 => r.score / 1000.0,
        _ => SECURITY_BASELINE,
    }
}

/// Liquidity tier in USD.
#[must_use]
pub fn liquidity_score(liquidity_usd: f64) -> f64 {
    match liquidity_usd {
        l if l > 5_000_000.0 => 10.0,
        l if l > 1_000_000.0 => 8.0,
        l if l > 500_000.0 => 6.0,
        l if l > 100_000.0 => 4.0,
        l if l > 10_000.0 => 2.0,
        _ => 0.0,
    }
}

/// Pump share scaled to 0..10 once enough votes exist.
#[must_use]
pub fn community_score(votes: &VoteCounts) -> f64 {
    if votes.total_count > COMMUNITY_MIN_VOTES {
        (votes.pump_percentage() / 10.0).clamp(0.0, 10.0)
    } else {
        NEUTRAL_COMMUNITY
    }
}

/// Full safety assessment of a token.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyAssessment {
    pub token_id: String,
    pub aggregated_score: u32,
    pub rating: SafetyRating,
    pub breakdown: SafetyBreakdown,
    pub votes: VoteCounts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<RiskReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_error: Option<String>,
}

/// Safety aggregation service.
#[derive(Clone)]
pub struct SafetyService {
    risk_reports: RiskReportService,
    vote_service: VoteService,
}

impl SafetyService {
    /// Create a new safety service.
    #[must_use]
    pub fn new(risk_reports: RiskReportService, vote_service: VoteService) -> Self {
        Self {
            risk_reports,
            vote_service,
        }
    }

    /// Assess a token. A failed report fetch degrades the result; a store failure does not.
    pub async fn assess(&self, token_id: &str) -> AppResult<SafetyAssessment> {
        if token_id.is_empty() {
            return Err(AppError::missing_field("tokenId"));
        }

        let (report, report_error) = match self.risk_reports.fetch_report(token_id).await {
            Ok(report) => (Some(report), None),
            Err(e) => {
                warn!(token_id = %token_id, error = %e, "Risk report unavailable");
                (None, Some(e.to_string()))
            }
        };
        let votes = self.vote_service.get_counts(token_id).await?;

        let breakdown = SafetyBreakdown::compute(report.as_ref(), &votes);
        let aggregated_score = breakdown.aggregated_score();
        let rating = SafetyRating::from_risk_score(report.as_ref().map_or(0.0, |r| r.score));

        info!(token_id = %token_id, aggregated_score, rating = ?rating, "Assessed token safety");

        Ok(SafetyAssessment {
            token_id: token_id.to_string(),
            aggregated_score,
            rating,
            breakdown,
            votes,
            report,
            report_error,
        })
    }
}
