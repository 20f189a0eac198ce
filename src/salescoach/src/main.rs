//! SalesCoach — sales-training backend: lead management, practice-call
//! prompts, and funnel analytics.
//!
//! Main entry point that initializes the store and starts the server.

use clap::Parser;
use coach_core::config::AppConfig;
use coach_management::{coach_router, CoachStore};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "salescoach")]
#[command(about = "Sales-training backend: leads, practice calls, and funnel analytics")]
#[command(version)]
struct Cli {
    /// Node identifier (overrides config)
    #[arg(long, env = "SALESCOACH__NODE_ID")]
    node_id: Option<String>,

    /// HTTP port (overrides config)
    #[arg(long, env = "SALESCOACH__API__HTTP_PORT")]
    http_port: Option<u16>,

    /// Seed a demo organization with leads, prompts, and call history
    #[arg(long, default_value_t = false)]
    seed_demo: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "salescoach=info,coach_management=info,tower_http=info".into()),
        )
        .json()
        .init();

    let cli = Cli::parse();

    info!("SalesCoach starting up");

    // Load configuration
    let mut config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    // Apply CLI overrides
    if let Some(node_id) = cli.node_id {
        config.node_id = node_id;
    }
    if let Some(port) = cli.http_port {
        config.api.http_port = port;
    }
    if cli.seed_demo {
        config.seed_demo_data = true;
    }

    info!(
        node_id = %config.node_id,
        http_port = config.api.http_port,
        metrics_port = config.metrics.port,
        "Configuration loaded"
    );

    // Initialize the store
    let store = Arc::new(CoachStore::new());
    if config.seed_demo_data {
        store.seed_demo_data();
    }

    // Start metrics exporter
    if let Err(e) = start_metrics(&config) {
        error!(error = %e, "Failed to start metrics exporter");
    }

    // Start HTTP server (blocks until shutdown)
    let app = coach_router(store, config.auth.token_ttl_hours);
    let addr = SocketAddr::new(config.api.host.parse()?, config.api.http_port);

    info!(addr = %addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Start the Prometheus exporter on its own port.
fn start_metrics(config: &AppConfig) -> anyhow::Result<()> {
    let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    builder
        .with_http_listener(SocketAddr::new(
            config.api.host.parse()?,
            config.metrics.port,
        ))
        .install()?;

    info!(port = config.metrics.port, "Metrics exporter started");
    Ok(())
}
