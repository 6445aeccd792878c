//! Database access layer
//!
//! One SQLite file (`jcr.db`) holds every raw yearly table plus the
//! `sync_metadata` bookkeeping table.

use crate::{Error, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod metadata;
pub mod store;

pub use metadata::{SyncMetadata, SYNC_METADATA_TABLE};
pub use store::{ColumnAffinity, ColumnDef, Predicate, TableInfo, TableStore};

/// Open (or create) the database read-write and ensure bookkeeping tables exist
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        // Rollback journal so read-only connections never need a -shm file
        .journal_mode(SqliteJournalMode::Delete)
        .busy_timeout(Duration::from_secs(5));
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    metadata::create_sync_metadata_table(&pool).await?;

    Ok(pool)
}

/// Connect to an existing database in read-only mode
pub async fn connect_readonly(db_path: &Path) -> Result<SqlitePool> {
    if !db_path.exists() {
        return Err(Error::NotFound(format!(
            "Database not found: {}\nRun `jcr-ds sync` first to download the journal tables.",
            db_path.display()
        )));
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .read_only(true)
        .busy_timeout(Duration::from_secs(5));
    let pool = SqlitePool::connect_with(options).await?;

    Ok(pool)
}

/// In-memory database with bookkeeping tables, for tests and tooling
///
/// Limited to a single connection: every pooled connection to
/// `sqlite::memory:` would otherwise see its own empty database.
pub async fn in_memory() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    metadata::create_sync_metadata_table(&pool).await?;
    Ok(pool)
}
