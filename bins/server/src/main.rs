//! Expensa API Server
//!
//! Main entry point for the Expensa backend service.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use expensa_api::middleware::RateLimiter;
use expensa_api::rates::HttpRateProvider;
use expensa_api::{AppState, create_router};
use expensa_db::connect_with;
use expensa_shared::{AppConfig, JwtConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "expensa=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = connect_with(&config.database).await?;
    info!(
        max_connections = config.database.max_connections,
        "Connected to database"
    );

    let jwt_service = JwtService::new(JwtConfig::from(&config.jwt));

    let rates = HttpRateProvider::new(&config.currency)
        .context("Failed to build exchange rate client")?;
    info!(api_url = %config.currency.api_url, "Exchange rate provider configured");

    let approval_limiter = RateLimiter::new(
        config.server.approval_rate_limit,
        Duration::from_secs(config.server.approval_rate_window_secs),
    );

    let state = AppState::with_postgres(db, jwt_service, Arc::new(rates), approval_limiter);
    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    // Peer addresses feed the per-client rate limiter
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
