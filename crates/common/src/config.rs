//! Application configuration.

use serde::Deserialize;
use std::path::Path;
use url::Url;

use crate::{AppError, AppResult};

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Risk report provider configuration.
    #[serde(default)]
    pub risk_report: RiskReportConfig,
    /// Trending ranker defaults.
    #[serde(default)]
    pub trending: TrendingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// External token risk report service.
#[derive(Debug, Clone, Deserialize)]
pub struct RiskReportConfig {
    /// Base URL of the report API; reports live under `/tokens/{id}/report`.
    #[serde(default = "default_risk_report_url")]
    pub base_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_risk_report_timeout")]
    pub timeout_secs: u64,
}

/// Defaults applied when a trending request omits its parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct TrendingConfig {
    /// Trailing window in hours.
    #[serde(default = "default_window_hours")]
    pub default_window_hours: u32,
    /// Maximum number of entries returned.
    #[serde(default = "default_trending_limit")]
    pub default_limit: u32,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

fn default_risk_report_url() -> String {
    "https://api.rugcheck.xyz/v1".to_string()
}

const fn default_risk_report_timeout() -> u64 {
    10
}

const fn default_window_hours() -> u32 {
    1
}

const fn default_trending_limit() -> u32 {
    10
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for RiskReportConfig {
    fn default() -> Self {
        Self {
            base_url: default_risk_report_url(),
            timeout_secs: default_risk_report_timeout(),
        }
    }
}

impl Default for TrendingConfig {
    fn default() -> Self {
        Self {
            default_window_hours: default_window_hours(),
            default_limit: default_trending_limit(),
        }
    }
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `PULSE_ENV`)
    /// 3. Environment variables with `PULSE_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("PULSE_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("PULSE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("PULSE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Reject settings the services cannot run with.
    pub fn validate(&self) -> AppResult<()> {
        Url::parse(&self.risk_report.base_url).map_err(|e| {
            AppError::Config(format!(
                "invalid risk_report.base_url {}: {e}",
                self.risk_report.base_url
            ))
        })?;

        if self.trending.default_window_hours == 0 {
            return Err(AppError::Config(
                "trending.default_window_hours must be positive".to_string(),
            ));
        }
        if self.trending.default_limit == 0 {
            return Err(AppError::Config(
                "trending.default_limit must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
