//! Barter Exchange API
//!
//! Users publish ads for items they are willing to trade and send exchange
//! proposals from one of their own ads to somebody else's. The receiving
//! side accepts or rejects a proposal; either party may reject it.

mod auth;
mod config;
mod db;
mod error;
mod market;
mod models;
mod routes;
mod state;

use crate::config::Settings;
use crate::db::postgres::PgStore;
use crate::routes::create_router;
use crate::state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber for structured logging
    init_tracing();

    info!("🚀 Starting Barter Exchange API...");

    // Load configuration
    let settings = Settings::load()?;
    info!("📋 Configuration loaded successfully");

    // Initialize database pool
    let pool = db::create_pool(&settings.database)?;
    db::verify_connection(&pool).await?;
    info!(
        "✅ Database connection successful (TLS: {})",
        settings.database.require_tls
    );
    db::init_schema(&pool).await?;

    let store = Arc::new(PgStore::new(pool));
    let state = Arc::new(AppState::new(
        store,
        settings.auth.clone(),
        settings.pagination,
    ));

    // Build the router
    let app = create_router(state, &settings.cors);

    // Create socket address
    let addr = SocketAddr::from((settings.server.host, settings.server.port));

    info!("🌐 Server listening on http://{}", addr);
    info!("");
    info!("📚 API Endpoints:");
    info!("   ─── Authentication ───");
    info!("   POST   /api/auth/register            - Register new account");
    info!("   POST   /api/auth/login               - Login with username/password");
    info!("   POST   /api/auth/refresh             - Refresh access token");
    info!("   GET    /api/auth/me                  - Get current user");
    info!("");
    info!("   ─── Ads ───");
    info!("   GET    /api/ads                      - List, filter and search ads");
    info!("   POST   /api/ads                      - Publish an ad");
    info!("   GET    /api/ads/{{id}}                 - Get one ad");
    info!("   PUT    /api/ads/{{id}}                 - Replace an ad (owner only)");
    info!("   PATCH  /api/ads/{{id}}                 - Update an ad (owner only)");
    info!("   DELETE /api/ads/{{id}}                 - Delete an ad (owner only)");
    info!("");
    info!("   ─── Exchange Proposals ───");
    info!("   GET    /api/proposals                - List proposals");
    info!("   POST   /api/proposals                - Propose an exchange");
    info!("   PUT    /api/proposals/{{id}}/update    - Accept or reject");
    info!("");

    // Create TCP listener and serve
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Server shutdown complete");
    Ok(())
}

/// Initialize tracing with structured logging
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,barter_exchange_api=debug,tower_http=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .compact(),
        )
        .init();
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("📴 Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            info!("📴 Received terminate signal, initiating graceful shutdown...");
        },
    }
}
