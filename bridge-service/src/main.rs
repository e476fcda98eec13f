//! Dynamic Content → Algolia bridge server.
//!
//! Startup is strictly sequential: configuration, Dynamic Content credential
//! check, Algolia credential check, then listen. Any failure exits with
//! status 1 before a request is served.

use std::net::SocketAddr;
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use dc_algolia_bridge::{router, validate_all, AlgoliaClient, AppState, Config, DcClient};

#[tokio::main]
async fn main() -> Result<()> {
    // .env may set RUST_LOG, so it loads before the filter is built.
    dotenv::dotenv().ok();

    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("bridge_starting");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(errors = ?e.messages, "environment_configuration_error");
            process::exit(1);
        }
    };
    info!(
        port = config.port,
        algolia_index = %config.algolia_index_name,
        dc_api_url = %config.dc_api_url,
        content_type_whitelist = ?config.content_type_whitelist,
        property_whitelist = ?config.content_type_property_whitelist,
        "config_loaded"
    );

    let dc = DcClient::from_config(&config).context("Failed to build Dynamic Content client")?;
    let algolia = AlgoliaClient::from_config(&config).context("Failed to build Algolia client")?;

    if let Err(e) = validate_all(&[&dc, &algolia]).await {
        error!(error = %e, "credential_validation_failed");
        process::exit(1);
    }
    info!("credentials_validated");

    let port = config.port;
    let state = AppState::new(config, Arc::new(dc), Arc::new(algolia));
    let app = router(state);

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "bridge_listening");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("bridge_shutdown_complete");

    Ok(())
}

/// Create a future that completes when a shutdown signal is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }

    info!("bridge_shutting_down");
}
