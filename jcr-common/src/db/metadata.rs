//! `sync_metadata` bookkeeping: one row per imported table

use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};

use crate::Result;

pub const SYNC_METADATA_TABLE: &str = "sync_metadata";

/// Last import of one raw table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SyncMetadata {
    pub table_name: String,
    /// RFC 3339 timestamp of the last successful replace
    pub last_updated: String,
    pub record_count: i64,
    /// SHA-256 of the source file the table was loaded from
    pub file_hash: String,
}

pub(crate) async fn create_sync_metadata_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sync_metadata (
            table_name TEXT PRIMARY KEY,
            last_updated TEXT NOT NULL,
            record_count INTEGER NOT NULL,
            file_hash TEXT NOT NULL DEFAULT ''
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Insert or replace the bookkeeping row for `meta.table_name`
pub(crate) async fn upsert(conn: &mut SqliteConnection, meta: &SyncMetadata) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO sync_metadata (table_name, last_updated, record_count, file_hash)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(table_name) DO UPDATE SET
            last_updated = excluded.last_updated,
            record_count = excluded.record_count,
            file_hash = excluded.file_hash
        "#,
    )
    .bind(&meta.table_name)
    .bind(&meta.last_updated)
    .bind(meta.record_count)
    .bind(&meta.file_hash)
    .execute(conn)
    .await?;
    Ok(())
}

/// All bookkeeping rows, most recently updated first
pub async fn list(pool: &SqlitePool) -> Result<Vec<SyncMetadata>> {
    let rows = sqlx::query_as::<_, SyncMetadata>(
        "SELECT table_name, last_updated, record_count, file_hash
         FROM sync_metadata
         ORDER BY last_updated DESC, table_name ASC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Bookkeeping row for one table
pub async fn get(pool: &SqlitePool, table_name: &str) -> Result<Option<SyncMetadata>> {
    let row = sqlx::query_as::<_, SyncMetadata>(
        "SELECT table_name, last_updated, record_count, file_hash
         FROM sync_metadata WHERE table_name = ?",
    )
    .bind(table_name)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}
