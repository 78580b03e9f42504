//! External token risk reports.
//!
//! The safety aggregator only depends on [`RiskReportProvider`]; the
//! [`RugCheckClient`] is the HTTP implementation used by the server.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pulse_common::{AppError, AppResult, config::RiskReportConfig};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

/// Number of largest holders summed into the concentration figure.
const TOP_HOLDER_COUNT: usize = 10;

/// A risk flagged by the report provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskItem {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub score: f64,
}

/// Normalised risk report for one token.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskReport {
    /// Provider score, 0 to 10000.
    pub score: f64,
    /// Liquidity in USD summed over all markets.
    pub liquidity: f64,
    /// Mean LP locked percentage across markets.
    pub liquidity_locked: f64,
    /// Share of supply held by the largest holders.
    pub top_holders_pct: f64,
    pub holders: usize,
    /// Risks at `danger` or `warn` level.
    pub risks: Vec<RiskItem>,
    pub freezeable: bool,
    pub mintable: bool,
}

/// Source of token risk reports.
#[async_trait]
pub trait RiskReportProvider: Send + Sync {
    /// Fetch the risk report for a token.
    async fn fetch_report(&self, token_id: &str) -> AppResult<RiskReport>;
}

/// Shared handle to a risk report provider.
pub type RiskReportService = Arc<dyn RiskReportProvider>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReport {
    score: Option<f64>,
    risks: Option<Vec<RiskItem>>,
    markets: Option<Vec<RawMarket>>,
    top_holders: Option<Vec<RawHolder>>,
    file_meta: Option<RawFileMeta>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMarket {
    lp_locked_pct: Option<f64>,
    liquidity: Option<RawLiquidity>,
}

#[derive(Debug, Deserialize)]
struct RawLiquidity {
    usd: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawHolder {
    pct: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawFileMeta {
    error: Option<String>,
}

impl RiskReport {
    /// Normalise a provider payload.
    ///
    /// # Errors
    /// Returns `ExternalService` when the payload is malformed or carries a provider error.
    #[allow(clippy::cast_precision_loss)]
    pub fn from_json(payload: &str) -> AppResult<Self> {
        let raw: RawReport = serde_json::from_str(payload).map_err(|e| {
            AppError::ExternalService(format!("Malformed risk report: {e}"))
        })?;

        if let Some(error) = raw.file_meta.and_then(|m| m.error).filter(|e| !e.is_empty()) {
            return Err(AppError::ExternalService(format!(
                "Risk report provider error: {error}"
            )));
        }

        let markets = raw.markets.unwrap_or_default();
        let holders = raw.top_holders.unwrap_or_default();
        let risks = raw.risks.unwrap_or_default();

        let liquidity = markets
            .iter()
            .filter_map(|m| m.liquidity.as_ref().and_then(|l| l.usd))
            .sum();
        let liquidity_locked = if markets.is_empty() {
            0.0
        } else {
            markets.iter().filter_map(|m| m.lp_locked_pct).sum::<f64>() / markets.len() as f64
        };
        let top_holders_pct = holders
            .iter()
            .take(TOP_HOLDER_COUNT)
            .filter_map(|h| h.pct)
            .sum();

        let names_contain = |needle: &str| {
            risks
                .iter()
                .any(|r| r.name.to_lowercase().contains(needle))
        };
        let freezeable = names_contain("freeze");
        let mintable = names_contain("mint");

        Ok(Self {
            score: raw.score.unwrap_or(0.0),
            liquidity,
            liquidity_locked,
            top_holders_pct,
            holders: holders.len(),
            freezeable,
            mintable,
            risks: risks
                .into_iter()
                .filter(|r| r.level == "danger" || r.level == "warn")
                .collect(),
        })
    }
}

/// HTTP client for the `RugCheck` report API.
#[derive(Clone)]
pub struct RugCheckClient {
    http: Client,
    base_url: Url,
}

impl RugCheckClient {
    /// Create a new client.
    ///
    /// # Errors
    /// Returns `Config` if the base URL is invalid or the HTTP client cannot be built.
    pub fn new(config: &RiskReportConfig) -> AppResult<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| AppError::Config(format!("Invalid risk report base URL: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Config(format!(
                "Risk report base URL cannot carry a path: {base_url}"
            )));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.timeout_secs.min(5)))
            .user_agent(concat!("token-pulse/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { http, base_url })
    }

    /// `{base}/tokens/{token_id}/report`, with the token id kept to one path segment.
    fn report_url(&self, token_id: &str) -> AppResult<Url> {
        // Dot segments would be dropped by the url serializer.
        if token_id.is_empty() || token_id == "." || token_id == ".." {
            return Err(AppError::Validation(format!(
                "tokenId {token_id:?} is not a valid path segment"
            )));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                AppError::Config(format!(
                    "Risk report base URL cannot carry a path: {}",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(["tokens", token_id, "report"]);
        Ok(url)
    }
}

#[async_trait]
impl RiskReportProvider for RugCheckClient {
    async fn fetch_report(&self, token_id: &str) -> AppResult<RiskReport> {
        let url = self.report_url(token_id)?;
        debug!(url = %url, "Fetching risk report");

        let response = self.http.get(url).send().await.map_err(|e| {
            AppError::ExternalService(format!("Risk report request failed: {e}"))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            warn!(token_id = %token_id, status = %status, "Risk report request rejected");
            return Err(AppError::ExternalService(format!(
                "Risk report provider returned {status}"
            )));
        }

        let body = response.text().await.map_err(|e| {
            AppError::ExternalService(format!("Failed to read risk report: {e}"))
        })?;

        RiskReport::from_json(&body)
    }
}
