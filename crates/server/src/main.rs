//! Token Pulse server entry point.

use std::sync::Arc;

use axum::{Json, Router, routing::get};
use pulse_api::{AppState, router as api_router};
use pulse_common::Config;
use pulse_core::{
    AccuracyService, RiskReportService, RugCheckClient, SafetyService, TrendingService,
    VoteService,
};
use pulse_db::repositories::VoteRepository;
use serde_json::{Value, json};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Assemble the HTTP application.
fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api", api_router())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pulse=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting token-pulse server...");

    // Load configuration
    let config = Config::load()?;
    config.validate()?;

    // Connect to database
    let db = Arc::new(pulse_db::init(&config).await?);
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    pulse_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize services
    let vote_repo = VoteRepository::new(Arc::clone(&db));
    let vote_service = VoteService::new(vote_repo.clone());
    let accuracy_service = AccuracyService::new(vote_repo.clone());
    let trending_service = TrendingService::new(vote_repo, config.trending.clone());

    let risk_reports: RiskReportService = Arc::new(RugCheckClient::new(&config.risk_report)?);
    let safety_service = SafetyService::new(risk_reports, vote_service.clone());
    info!(provider = %config.risk_report.base_url, "Risk report provider configured");

    let state = AppState {
        vote_service,
        accuracy_service,
        trending_service,
        safety_service,
    };

    let app = build_app(state);

    // Start server with graceful shutdown
    let listener =
        tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
