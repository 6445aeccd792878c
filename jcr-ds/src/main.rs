//! jcr-ds (Data Sync) - Journal table ingestion CLI
//!
//! `sync` rebuilds the tables in jcr.db from the published CSV files,
//! `status` lists the last load of each table, `validate` checks that every
//! table has a `Journal` column and at least one row.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

use jcr_common::config::{database_path, resolve_root_folder, SyncConfig, TomlConfig};
use jcr_common::db::{self, TableStore};
use jcr_ds::fetcher::is_remote;
use jcr_ds::{
    sync_status, validate, HttpFetcher, LocalFetcher, SourceOutcome, SyncOptions, SyncReport,
    Syncer,
};

#[derive(Parser, Debug)]
#[command(name = "jcr-ds")]
#[command(about = "Journal metrics table synchronization")]
#[command(version)]
struct Args {
    /// Root folder holding jcr.db
    #[arg(long)]
    root_folder: Option<PathBuf>,

    /// Explicit TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download every configured source and replace its table
    Sync {
        /// Only sync these tables (repeatable)
        #[arg(long = "table")]
        tables: Vec<String>,

        /// Keep tables whose source file is byte-identical to the last load
        #[arg(long, default_value_t = false)]
        skip_unchanged: bool,

        /// Override the source base URL or local mirror directory
        #[arg(long)]
        base_url: Option<String>,
    },
    /// Show last update time and row count per table
    Status {
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Check every table for a Journal column and a non-zero row count
    Validate {
        #[arg(long, default_value_t = false)]
        json: bool,
    },
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

    info!(
        "Starting JCR Data Sync (jcr-ds) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let root_folder = resolve_root_folder(args.root_folder.as_deref(), &config);
    let db_path = database_path(&root_folder);
    info!("Database path: {}", db_path.display());

    let pool = db::init_database(&db_path).await?;
    let store = TableStore::new(pool);

    match args.command {
        Command::Sync {
            tables,
            skip_unchanged,
            base_url,
        } => {
            let mut sync_config = config.sync.clone();
            if let Some(base_url) = base_url {
                sync_config.base_url = base_url;
            }
            for table in &tables {
                if !sync_config.sources.iter().any(|s| &s.table == table) {
                    warn!(table = %table, "No configured source for table");
                }
            }

            let options = SyncOptions {
                tables,
                skip_unchanged,
            };
            let report = run_sync(store, sync_config, &options).await?;
            print_sync_report(&report);

            if !report.results.is_empty() && report.succeeded() == 0 {
                bail!("no source could be synchronized");
            }
        }
        Command::Status { json } => {
            let status = sync_status(&store).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                println!("📊 同步状态:");
                println!("总表数: {}", status.total_tables);
                for table in &status.tables {
                    println!("  📋 {}", table.table_name);
                    println!("      最后更新: {}", table.last_updated);
                    println!("      记录数: {}", table.record_count);
                }
            }
        }
        Command::Validate { json } => {
            let report = validate(&store).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("🔍 数据完整性验证");
                println!("总表数: {}", report.total_tables);
                println!("有效表数: {}", report.valid_tables);
                let issues = report.issues();
                if issues.is_empty() {
                    println!("✅ 数据完整性验证通过");
                } else {
                    println!("\n⚠️ 发现问题:");
                    for (table, issue) in issues {
                        println!("  • {}: {}", table, issue);
                    }
                }
            }
            if !report.is_valid() {
                bail!("integrity check failed");
            }
        }
    }

    Ok(())
}

/// Pick the fetcher from the base location and run the sync
async fn run_sync(store: TableStore, config: SyncConfig, options: &SyncOptions) -> Result<SyncReport> {
    let report = if is_remote(&config.base_url) {
        let fetcher = HttpFetcher::new(Duration::from_secs(config.timeout_secs))?;
        Syncer::new(store, fetcher, config).sync(options).await
    } else {
        info!("Reading sources from local directory {}", config.base_url);
        Syncer::new(store, LocalFetcher, config).sync(options).await
    };
    Ok(report)
}

fn print_sync_report(report: &SyncReport) {
    println!(
        "\n📊 同步完成: {}/{} 成功",
        report.succeeded(),
        report.results.len()
    );
    for result in &report.results {
        match &result.outcome {
            SourceOutcome::Loaded { records, .. } => {
                println!("  ✅ {} ({} 条记录)", result.table, records)
            }
            SourceOutcome::Unchanged { .. } => println!("  ⏭️ {} (未变化)", result.table),
            SourceOutcome::Failed(e) => println!("  ❌ {}: {}", result.table, e),
        }
    }
}
