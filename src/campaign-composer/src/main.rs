//! Campaign Composer: multi-channel campaign creation wizard backend.
//!
//! Main entry point that loads configuration, builds the wizard state and
//! starts the server.

use campaign_api::ApiServer;
use campaign_core::config::AppConfig;
use campaign_management::{ManagementState, ManagementStore};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "campaign-composer")]
#[command(about = "Multi-channel campaign creation wizard backend")]
#[command(version)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, short, env = "CAMPAIGN_COMPOSER_CONFIG")]
    config: Option<PathBuf>,

    /// Node identifier (overrides config)
    #[arg(long, env = "CAMPAIGN_COMPOSER__NODE_ID")]
    node_id: Option<String>,

    /// Bind address (overrides config)
    #[arg(long, env = "CAMPAIGN_COMPOSER__API__HOST")]
    host: Option<String>,

    /// HTTP port (overrides config)
    #[arg(long, env = "CAMPAIGN_COMPOSER__API__HTTP_PORT")]
    http_port: Option<u16>,

    /// Seed the store with sample campaigns for name suggestions
    #[arg(long, default_value_t = false)]
    demo_data: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "campaign_composer=info,campaign_management=info,tower_http=info".into()),
        )
        .json()
        .init();

    let cli = Cli::parse();

    info!("Campaign Composer starting up");

    // Load configuration
    let mut config = AppConfig::load(cli.config.as_deref()).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    // Apply CLI overrides
    if let Some(node_id) = cli.node_id {
        config.node_id = node_id;
    }
    if let Some(host) = cli.host {
        config.api.host = host;
    }
    if let Some(port) = cli.http_port {
        config.api.http_port = port;
    }

    info!(
        node_id = %config.node_id,
        http_port = config.api.http_port,
        evaluator = ?config.validation.evaluator,
        "Configuration loaded"
    );

    let store = if cli.demo_data {
        Arc::new(ManagementStore::with_demo_data())
    } else {
        Arc::new(ManagementStore::new())
    };
    let management = ManagementState::new(&config, store)?;
    let _sweeper = management.spawn_session_sweeper();
    info!(
        ttl_secs = config.wizard.session_ttl_secs,
        sweep_secs = config.wizard.session_sweep_secs,
        "Idle session sweeper started"
    );

    let api_server = ApiServer::new(config.clone(), management);

    // Start metrics exporter
    if config.metrics.enabled {
        if let Err(e) = api_server.start_metrics().await {
            error!(error = %e, "Failed to start metrics exporter");
        }
    }

    info!("Campaign Composer is ready to serve traffic");

    // Start HTTP server (blocks until shutdown)
    api_server.start_http().await?;

    Ok(())
}
