use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use raas_core::{load_config, load_config_from_env, validate_config, AddonService, Config};
use raas_server::api::create_router;
use raas_server::state::AppState;

/// Default config file, used when present and `RAAS_CONFIG` is unset
const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    let json = std::env::var("RAAS_LOG_JSON")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// `RAAS_CONFIG` must exist when set; otherwise `config.toml` is optional.
fn load() -> Result<Config> {
    let explicit = std::env::var("RAAS_CONFIG").ok().map(PathBuf::from);
    let path = explicit
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    if explicit.is_some() || path.exists() {
        info!("Loading configuration from {:?}", path);
        load_config(&path).with_context(|| format!("Failed to load config from {:?}", path))
    } else {
        info!("No config file, using defaults and environment");
        load_config_from_env().context("Failed to load config from environment")
    }
}

async fn run() -> Result<()> {
    init_tracing();

    let config = load()?;
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Site: {}", config.site.base_url);
    info!(
        "Limits: {} attempts per fetch, {} pages per walk",
        config.fetcher.max_attempts, config.walker.max_pages
    );

    let addr = SocketAddr::new(config.server.host, config.server.port);

    let service =
        Arc::new(AddonService::from_config(config).context("Failed to create add-on service")?);

    // Catalog discovery failures are logged; the server starts with none
    let catalogs = service.initialize().await;
    info!("{} catalogs available", catalogs.len());

    let state = Arc::new(AppState::new(service));
    let app = create_router(state);

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
