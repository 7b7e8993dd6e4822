//! vitals: aggregated dependency health service.
//!
//! This is the application entry point. It merges the environment file for
//! the active deployment environment, builds the configuration, initializes
//! tracing, wires the dependency indicators into the aggregator, and serves
//! the health endpoint until shutdown is signalled.

mod config;
mod error;
mod health;
mod middleware;
mod routes;
mod secret;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::{AppConfig, AppEnv, DEFAULT_LOG_FILTER};
use health::aggregator::HealthAggregator;
use health::indicators::database::DatabaseIndicator;
use health::indicators::redis::RedisIndicator;
use health::indicators::website::WebsiteIndicator;
use health::indicators::HealthIndicator;
use routes::create_router;
use state::AppState;

/// vitals: aggregated dependency health service
#[derive(Parser, Debug)]
#[command(name = "vitals", version, about)]
struct Args {
    /// Path to an environment file (overrides the APP_ENV-based selection)
    #[arg(short, long)]
    env_file: Option<String>,

    /// Log level filter (e.g., "vitals=debug,tower_http=info")
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args = Args::parse();

    // Merge the env file before anything reads the environment
    let app_env = AppEnv::from_env();
    let env_file = args
        .env_file
        .unwrap_or_else(|| app_env.env_file().to_string());
    config::load_env_file(&env_file)?;

    // Configuration must exist before tracing: the log format lives in it
    let config = AppConfig::from_env()?;

    // Initialize tracing with priority: CLI > env > default
    let log_filter = args
        .log_level
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    let registry =
        tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::new(&log_filter));
    if config.logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!(environment = %app_env, "Loaded configuration");
    tracing::info!(
        database = %config.database.host,
        cache_configured = config.redis.is_some(),
        website = %config.website.url,
        "Dependency probes configured"
    );

    // Wire indicators explicitly: the aggregator receives constructed
    // instances, the endpoint receives the constructed aggregator.
    let database = DatabaseIndicator::from_config(&config.database);
    let redis = RedisIndicator::from_config(config.redis.as_ref());
    let website = WebsiteIndicator::new(&config.website)?;

    let aggregator = HealthAggregator::new(vec![
        Arc::new(database) as Arc<dyn HealthIndicator>,
        Arc::new(redis),
        Arc::new(website),
    ]);

    // Create application state and router
    let state = AppState::new(config.clone(), aggregator);
    let app = create_router(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.http.host, config.http.port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Resolves when SIGTERM or Ctrl+C is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }
}
