//! Hotel guest portal: service-request lifecycle and real-time sync engine.
//!
//! - QR token to guest session resolution
//! - Service request creation, listing and staff status updates
//! - Per-tenant change fan-out to guest and staff WebSocket streams
//! - Background workers for session sweeping, health probes and heartbeats

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};

use api::middleware::rate_limit::RateLimitConfig;
use api::{router, AppState, PortalSettings};
use realtime::{ChangeBus, RealtimeConfig};
use request_store::{
    DirectoryConfig, MemoryStore, SessionConfig, SessionRegistry, SessionResolver, ShortLinks,
    StaticDirectory,
};
use telemetry::{init_tracing_from_env, HealthRegistry};
use worker::{WorkerConfig, WorkerScheduler};

/// Application configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct Config {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,

    #[serde(default)]
    sessions: SessionConfig,

    #[serde(default)]
    realtime: RealtimeConfig,

    #[serde(default)]
    workers: WorkerConfig,

    #[serde(default)]
    rate_limit: RateLimitConfig,

    #[serde(default)]
    shortlinks: PortalSettings,

    #[serde(default)]
    directory: DirectoryConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            sessions: SessionConfig::default(),
            realtime: RealtimeConfig::default(),
            workers: WorkerConfig::default(),
            rate_limit: RateLimitConfig::default(),
            shortlinks: PortalSettings::default(),
            directory: DirectoryConfig::default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing_from_env();

    info!("Starting Guest Portal v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config()?;

    let directory =
        StaticDirectory::from_config(&config.directory).context("Invalid directory seed data")?;

    let resolver = SessionResolver::new(Arc::new(directory), SessionRegistry::new(&config.sessions));
    let store = Arc::new(MemoryStore::new());
    let bus = Arc::new(ChangeBus::new(config.realtime.channel_capacity));
    let health = Arc::new(HealthRegistry::new());
    let shortlinks = Arc::new(ShortLinks::from_seeds(&config.directory.short_links));

    let state = AppState::new(store, bus.clone(), resolver, health)
        .with_rate_limit(config.rate_limit.clone())
        .with_shortlinks(shortlinks)
        .with_realtime(config.realtime.clone())
        .with_settings(config.shortlinks.clone());
    let connections = state.connections.clone();

    // Start background workers
    let workers = WorkerScheduler::new(&config.workers, &state).start();

    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid server address")?;

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    // Closing the streams lets the server's graceful shutdown finish even
    // with WebSocket clients attached.
    let serve_result = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            connections.shutdown_all();
            bus.close();
        })
        .await;

    info!("Shutting down...");
    workers.shutdown().await;

    if let Err(e) = serve_result {
        error!(error = %e, "Server error");
        return Err(e).context("Server error");
    }

    info!("Shutdown complete");
    Ok(())
}

/// Load configuration from files and environment.
fn load_config() -> Result<Config> {
    let config = config::Config::builder()
        // Start with defaults
        .add_source(config::Config::try_from(&Config::default())?)
        // Load from config file if exists
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        // Override with environment variables
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("PORTAL")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    config
        .try_deserialize()
        .context("Failed to deserialize configuration")
}

/// Graceful shutdown signal handler.
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
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}
