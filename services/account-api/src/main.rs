//! Lab account API
//!
//! Single-binary Rust service that:
//! 1. Loads TOML + environment configuration
//! 2. Connects the configured cache backend (Redis or in-memory)
//! 3. Loads the provisioned credential file and generates the account pool
//! 4. Serves the participant and admin routes until SIGTERM/SIGINT

mod admin;
mod config;
mod metrics;
mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use account_pool::{AccountPool, PoolSettings};
use lab_cache::{CacheStore, MemoryStore, RedisStore};
use lab_credentials::PasswordSource;

use crate::admin::{AdminState, build_admin_router};
use crate::config::Config;
use crate::routes::{AppState, build_router};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and LOG_LEVEL / RUST_LOG support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("starting lab-account-api");

    // Install Prometheus metrics recorder before any metrics are emitted
    let prometheus_handle = metrics::install_recorder();

    // CLI: simple --config flag parsing
    let args: Vec<String> = std::env::args().collect();
    let cli_config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str());

    let config_path = Config::resolve_path(cli_config_path);
    info!(path = %config_path.display(), "loading configuration");

    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    info!(
        listen_addr = %config.server.listen_addr,
        accounts = config.accounts.count,
        prefix = %config.accounts.prefix,
        cache_provider = %config.cache.provider,
        event = %config.event.title,
        "configuration loaded"
    );

    let store: Arc<dyn CacheStore> = match config.cache.provider.as_str() {
        "redis" => Arc::new(
            RedisStore::connect(
                &config.cache.effective_url(),
                config.cache.key_prefix.clone(),
            )
            .await
            .context("failed to connect to redis")?,
        ),
        // Config::load only admits "redis" and "memory"
        _ => {
            warn!("using in-memory cache, assignments will not survive a restart");
            Arc::new(MemoryStore::new())
        }
    };

    let passwords = match config.accounts.credentials_file {
        Some(ref path) => PasswordSource::load(path)
            .map_err(|e| anyhow::anyhow!("failed to load credentials from {}: {e}", path.display()))?,
        None => {
            warn!("no credentials file configured, accounts will carry no passwords");
            PasswordSource::empty()
        }
    };

    let settings = PoolSettings {
        count: config.accounts.count,
        prefix: config.accounts.prefix.clone(),
        pad_zeroes: config.accounts.pad_zeroes,
        blocklist: config.accounts.blocklist.clone(),
    };
    let pool = Arc::new(
        AccountPool::generate(store.clone(), &passwords, &settings)
            .await
            .context("failed to generate account pool")?,
    );

    let summary = pool.summary().await.context("failed to read pool state")?;
    metrics::set_pool_gauges(&summary);
    info!(
        total = summary.total,
        assignable = summary.assignable,
        disabled = summary.disabled,
        "account pool ready"
    );

    let app_state = AppState {
        pool: pool.clone(),
        store,
        event: config.event.clone(),
        prometheus: prometheus_handle,
    };

    let app = build_router(app_state)
        .merge(build_admin_router(AdminState::new(pool)))
        .layer(tower::limit::ConcurrencyLimitLayer::new(
            config.server.max_connections,
        ));

    let listener = TcpListener::bind(config.server.listen_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.server.listen_addr))?;
    info!(addr = %config.server.listen_addr, "accepting requests");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("shutdown complete");
    Ok(())
}

/// Wait for SIGTERM or SIGINT for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
