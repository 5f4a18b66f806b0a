//! Widget Entitlement Service - Main Application Entry Point
//!
//! Backend for embeddable voice/chat widgets. It decides which voice
//! provider credentials a widget call uses, which subscription tier and
//! widget quota an account has, and manages widgets, profiles, role
//! invitations and demo settings.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx (async queries)
//! - **Authentication**: HS256 JWTs issued by the hosted auth provider
//! - **Providers**: Retell (voice/chat) over REST, Stripe (billing) via async-stripe
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Create database connection pool and run migrations
//! 3. Build provider clients
//! 4. Build HTTP router with routes and middleware
//! 5. Start server on configured port

mod config;
mod db;
mod error;
mod handlers;
mod middleware;
mod models;
mod providers;
mod routes;
mod services;
mod state;

#[cfg(test)]
mod test_support;

use std::{sync::Arc, time::Duration};

use tracing_subscriber::EnvFilter;

use crate::{
    providers::{retell::RetellClient, stripe::StripeClient},
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Reads RUST_LOG, defaults to "info"
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = config::Config::from_env()?;
    tracing::info!("Configuration loaded");

    if config.retell_api_key.is_none() {
        tracing::warn!("RETELL_API_KEY is not set; calls without overrides will fail");
    }
    if config.stripe_secret_key.is_none() {
        tracing::warn!("STRIPE_SECRET_KEY is not set; subscription checks will fail for non-admins");
    }

    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Database pool created");

    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    let timeout = Duration::from_secs(config.upstream_timeout_secs);
    let billing = StripeClient::new(config.stripe_secret_key.clone(), timeout);
    let voice = RetellClient::new(&config.retell_api_base, timeout)?;

    let addr = format!("0.0.0.0:{}", config.server_port);
    let state = AppState::new(pool, config, Arc::new(billing), Arc::new(voice));
    let app = routes::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
