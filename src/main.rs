mod domain;
mod clients;

mod app_system;
mod auth;
mod config;
mod http;

#[cfg(test)]
mod mock_framework;

mod actor_framework;
mod user_actor;
mod product_actor;
mod order_actor;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, Instrument};

use crate::app_system::{setup_tracing, StoreSystem};
use crate::auth::TokenSigner;
use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Setup tracing once for the entire application
    setup_tracing();

    let config = Config::load()?;

    info!("Starting storefront");

    // Create the entire store system (starts all actors)
    let system = StoreSystem::new(config.actor_buffer_size);

    if let Some(seed) = &config.admin {
        let span = tracing::info_span!("admin_seed");
        system
            .ensure_admin(&seed.email, &seed.password)
            .instrument(span)
            .await
            .context("Failed to seed admin account")?;
    }

    let state = http::AppState::new(&system, TokenSigner::new(config.jwt_secret, config.token_ttl));
    let cors = http::cors_layer(&config.cors_origin).context("Invalid CORS_ORIGIN")?;
    let app = http::router(state, cors);

    let address = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(http::shutdown_signal())
        .await
        .context("Server error")?;

    // The router's clients are gone with `serve`; the actors can drain now.
    system.shutdown().await.map_err(anyhow::Error::msg)?;

    info!("Storefront stopped");
    Ok(())
}
