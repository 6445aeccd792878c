//! Sync status and data integrity checks

use serde::Serialize;
use tracing::warn;

use jcr_common::db::{metadata, SyncMetadata, TableStore, SYNC_METADATA_TABLE};
use jcr_common::JOURNAL_COLUMN;

use crate::error::SyncResult;

/// Bookkeeping rows, most recently updated first
#[derive(Debug, Clone, Serialize)]
pub struct SyncStatus {
    pub total_tables: usize,
    pub tables: Vec<SyncMetadata>,
}

pub async fn sync_status(store: &TableStore) -> SyncResult<SyncStatus> {
    let tables = metadata::list(store.pool()).await?;
    Ok(SyncStatus {
        total_tables: tables.len(),
        tables,
    })
}

/// Integrity of one loaded table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableCheck {
    pub table: String,
    pub has_journal_column: bool,
    pub row_count: i64,
    /// Set when the table could not be inspected
    pub error: Option<String>,
}

impl TableCheck {
    pub fn is_valid(&self) -> bool {
        self.error.is_none() && self.has_journal_column && self.row_count > 0
    }

    pub fn issue(&self) -> Option<String> {
        if let Some(error) = &self.error {
            return Some(format!("验证失败: {}", error));
        }
        if self.is_valid() {
            None
        } else {
            Some(format!("表结构异常或无数据 (记录数: {})", self.row_count))
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub total_tables: usize,
    pub valid_tables: usize,
    pub tables: Vec<TableCheck>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.valid_tables == self.total_tables
    }

    /// `(table, issue)` for every failing table
    pub fn issues(&self) -> Vec<(&str, String)> {
        self.tables
            .iter()
            .filter_map(|t| t.issue().map(|issue| (t.table.as_str(), issue)))
            .collect()
    }
}

async fn check_table(store: &TableStore, table: &str) -> SyncResult<TableCheck> {
    let columns = store.columns(table).await?;
    let row_count = store.row_count(table).await?;
    Ok(TableCheck {
        table: table.to_string(),
        has_journal_column: columns.iter().any(|c| c == JOURNAL_COLUMN),
        row_count,
        error: None,
    })
}

/// Check every table except bookkeeping for a `Journal` column and rows
pub async fn validate(store: &TableStore) -> SyncResult<ValidationReport> {
    let mut tables = Vec::new();
    for table in store.list_tables().await? {
        if table == SYNC_METADATA_TABLE {
            continue;
        }
        let check = match check_table(store, &table).await {
            Ok(check) => check,
            Err(e) => {
                warn!(table = %table, error = %e, "Table check failed");
                TableCheck {
                    table: table.clone(),
                    has_journal_column: false,
                    row_count: 0,
                    error: Some(e.to_string()),
                }
            }
        };
        tables.push(check);
    }

    Ok(ValidationReport {
        total_tables: tables.len(),
        valid_tables: tables.iter().filter(|t| t.is_valid()).count(),
        tables,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(has_journal_column: bool, row_count: i64) -> TableCheck {
        TableCheck {
            table: "JCR2024".to_string(),
            has_journal_column,
            row_count,
            error: None,
        }
    }

    #[test]
    fn test_table_check_validity() {
        assert!(check(true, 10).is_valid());
        assert!(!check(false, 10).is_valid());
        assert!(!check(true, 0).is_valid());
        assert_eq!(check(true, 0).issue().unwrap(), "表结构异常或无数据 (记录数: 0)");
        assert_eq!(check(true, 3).issue(), None);
    }
}
