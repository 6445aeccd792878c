//! jcr-qs (Query Service) - HTTP front end over the journal tables
//!
//! Opens `jcr.db` read-only and serves search, trend, comparison, filter,
//! warning-list and batch queries.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

use jcr_common::config::{database_path, resolve_root_folder, TomlConfig};
use jcr_common::db::{self, TableStore};
use jcr_qs::{build_router, AppState};

#[derive(Debug, Parser)]
#[command(name = "jcr-qs", version, about = "Journal metrics query service")]
struct Args {
    /// Root folder holding jcr.db
    #[arg(long)]
    root_folder: Option<PathBuf>,

    /// Explicit TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Listen address (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Listen port (overrides config)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = TomlConfig::load_or_default(args.config.as_deref())?;

    // RUST_LOG wins; otherwise the [logging] level from the config file
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .init();

    // Build identification before any database work
    info!(
        "Starting JCR Query Service (jcr-qs) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let root_folder = resolve_root_folder(args.root_folder.as_deref(), &config);
    let db_path = database_path(&root_folder);
    info!("Database path: {}", db_path.display());

    let pool = match db::connect_readonly(&db_path).await {
        Ok(pool) => {
            info!("✓ Connected to database (read-only)");
            pool
        }
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            return Err(e.into());
        }
    };

    let state = AppState::new(TableStore::new(pool), db_path);
    let app = build_router(state);

    let mut server = config.server.clone();
    if let Some(host) = args.host {
        server.host = host;
    }
    if let Some(port) = args.port {
        server.port = port;
    }
    let address = server.bind_address();

    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("jcr-qs listening on http://{}", address);
    info!("Health check: http://{}/health", address);

    axum::serve(listener, app).await?;

    Ok(())
}
