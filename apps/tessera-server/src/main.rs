//! tessera server
//!
//! Provisions pass/subscription entitlements from payment provider webhook
//! notifications and reconciles gaps against the provider's transaction
//! ledger.

mod config;
mod health;
mod logging;
mod openapi;
mod worker;

use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tower_http::trace::TraceLayer;
use tracing::info;

use config::Config;
use health::health_router;
use openapi::openapi_router;
use tessera_api::{api_router, ApiState};
use tessera_db::{run_migrations, PgContentStore};
use tessera_engine::{Provisioner, ReconciliationScanner, ScanConfig, WebhookVerifier};
use tessera_pay::RestLedgerClient;
use worker::ReconciliationWorker;

#[tokio::main]
async fn main() {
    // Load configuration (fail-fast on missing required values)
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    logging::init_logging(&config.rust_log);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.host,
        port = config.port,
        "Starting tessera server"
    );

    // Database pool and migrations
    let pool = match PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("FATAL: Failed to connect to database: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = run_migrations(&pool).await {
        eprintln!("FATAL: {e}");
        std::process::exit(1);
    }

    // Collaborators, injected explicitly
    let store = Arc::new(PgContentStore::new(pool.clone()));
    let ledger = match RestLedgerClient::new(
        config.payment_api_base_url.clone(),
        config.payment_api_token.clone(),
    ) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            eprintln!("FATAL: {e}");
            std::process::exit(1);
        }
    };

    let mut verifier = WebhookVerifier::new(config.webhook_secret.clone());
    if let Some(previous) = &config.webhook_secret_previous {
        verifier = verifier.with_previous(previous.clone());
        info!("Webhook secret rotation active");
    }

    let provisioner = Arc::new(Provisioner::new(store));
    let scanner = Arc::new(ReconciliationScanner::with_config(
        ledger,
        provisioner.clone(),
        ScanConfig {
            window_days: config.reconcile_window_days,
        },
    ));
    let scan_shutdown = scanner.shutdown_handle();

    // Scheduled reconciliation (0 disables; on-demand runs stay available)
    let worker_handle = if config.reconcile_interval_secs > 0 {
        let worker = ReconciliationWorker::new(
            scanner.clone(),
            Duration::from_secs(config.reconcile_interval_secs),
        );
        Some(tokio::spawn(async move { worker.run().await }))
    } else {
        info!("Scheduled reconciliation disabled");
        None
    };

    let state = ApiState::new(verifier, provisioner, scanner);
    let app = api_router(state)
        .merge(health_router(pool))
        .merge(openapi_router())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = match format!("{}:{}", config.host, config.port).parse() {
        Ok(addr) => addr,
        Err(e) => {
            eprintln!("FATAL: Invalid bind address: {e}");
            std::process::exit(1);
        }
    };

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("FATAL: Failed to bind {addr}: {e}");
            std::process::exit(1);
        }
    };

    info!(addr = %addr, "Listening");
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        eprintln!("FATAL: Server error: {e}");
        std::process::exit(1);
    }

    // Cancel any in-flight scan and stop the worker.
    scan_shutdown.store(true, Ordering::SeqCst);
    if let Some(handle) = worker_handle {
        handle.abort();
    }
    info!("Shutdown complete");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    info!("Shutdown signal received");
}
