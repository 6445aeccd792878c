//! Raw table store
//!
//! Thin layer over SQLite giving the query engine what it needs and nothing
//! more: table listing, schema introspection, row scan, predicate selects and
//! atomic per-table replacement.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool, ValueRef};
use std::sync::Arc;
use tracing::debug;

use super::metadata::{self, SyncMetadata};
use crate::kind::split_table_name;
use crate::{Error, RawRow, Result, Scalar};

/// Table metadata for introspection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    pub name: String,
    pub row_count: i64,
}

/// Declared storage class of a loaded column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnAffinity {
    Integer,
    Real,
    Text,
}

impl ColumnAffinity {
    fn sql(self) -> &'static str {
        match self {
            ColumnAffinity::Integer => "INTEGER",
            ColumnAffinity::Real => "REAL",
            ColumnAffinity::Text => "TEXT",
        }
    }
}

/// Column definition for `bulk_load`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub affinity: ColumnAffinity,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, affinity: ColumnAffinity) -> Self {
        Self {
            name: name.into(),
            affinity,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, ColumnAffinity::Text)
    }
}

/// Row predicate for `select`
///
/// Values are compared on their text form, so a `Top` column stored as
/// INTEGER `1` still matches `"1"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Case-insensitive (ASCII) substring match
    Contains { column: String, needle: String },
    /// Trimmed value equals one of `values`
    OneOf { column: String, values: Vec<String> },
    /// Value is null or equals none of `values`
    NoneOf { column: String, values: Vec<String> },
    /// At least one of the inner predicates holds
    AnyOf(Vec<Predicate>),
}

/// Handle to the raw table store
///
/// Cheap to clone; constructed once by the binary and passed to every query.
#[derive(Debug, Clone)]
pub struct TableStore {
    pool: SqlitePool,
}

impl TableStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// All user tables in alphabetical order, SQLite internals excluded
    pub async fn list_tables(&self) -> Result<Vec<String>> {
        let tables = sqlx::query_scalar::<_, String>(
            r#"
            SELECT name
            FROM sqlite_master
            WHERE type = 'table'
              AND name NOT LIKE 'sqlite_%'
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(tables)
    }

    /// Tables whose name carries a dataset-kind prefix
    pub async fn list_dataset_tables(&self) -> Result<Vec<String>> {
        Ok(self
            .list_tables()
            .await?
            .into_iter()
            .filter(|name| split_table_name(name).is_some())
            .collect())
    }

    pub async fn table_exists(&self, table: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
        )
        .bind(table)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    /// Column names in declaration order (empty if the table does not exist)
    pub async fn columns(&self, table: &str) -> Result<Vec<String>> {
        let columns = sqlx::query_scalar::<_, String>(
            "SELECT name FROM pragma_table_info(?) ORDER BY cid",
        )
        .bind(table)
        .fetch_all(&self.pool)
        .await?;
        Ok(columns)
    }

    pub async fn row_count(&self, table: &str) -> Result<i64> {
        validate_table_name(table)?;
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", quote_ident(table)))
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Every table with its row count
    pub async fn table_infos(&self) -> Result<Vec<TableInfo>> {
        let mut infos = Vec::new();
        for name in self.list_tables().await? {
            let row_count = self.row_count(&name).await?;
            infos.push(TableInfo { name, row_count });
        }
        Ok(infos)
    }

    /// All rows of `table` in storage order
    pub async fn scan(&self, table: &str) -> Result<Vec<RawRow>> {
        self.select(table, &[], None).await
    }

    /// Rows of `table` matching every predicate, capped at `limit`
    pub async fn select(
        &self,
        table: &str,
        predicates: &[Predicate],
        limit: Option<i64>,
    ) -> Result<Vec<RawRow>> {
        validate_table_name(table)?;
        let columns = Arc::new(self.columns(table).await?);
        if columns.is_empty() {
            return Err(Error::NotFound(format!("table {}", table)));
        }

        let column_list = columns
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ");
        let mut sql = format!("SELECT {} FROM {}", column_list, quote_ident(table));

        let mut binds: Vec<String> = Vec::new();
        let clauses: Vec<String> = predicates
            .iter()
            .map(|p| predicate_sql(p, &mut binds))
            .collect();
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY rowid");
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {}", limit.max(0)));
        }

        debug!(table, sql = %sql, "Selecting rows");

        let mut query = sqlx::query(&sql);
        for value in binds {
            query = query.bind(value);
        }
        let rows = query.fetch_all(&self.pool).await?;

        Ok(rows
            .iter()
            .map(|row| RawRow::new(Arc::clone(&columns), decode_row(row)))
            .collect())
    }

    /// Replace `table` with `rows` and record the load in `sync_metadata`
    ///
    /// Drop, create, insert and bookkeeping happen in one transaction, so a
    /// failed load leaves the previous table contents in place.
    pub async fn bulk_load(
        &self,
        table: &str,
        columns: &[ColumnDef],
        rows: &[Vec<Scalar>],
        file_hash: &str,
    ) -> Result<i64> {
        validate_table_name(table)?;
        if columns.is_empty() {
            return Err(Error::InvalidInput(format!("no columns for table {}", table)));
        }

        let mut tx = self.pool.begin().await?;

        sqlx::query(&format!("DROP TABLE IF EXISTS {}", quote_ident(table)))
            .execute(&mut *tx)
            .await?;

        let column_sql = columns
            .iter()
            .map(|c| format!("{} {}", quote_ident(&c.name), c.affinity.sql()))
            .collect::<Vec<_>>()
            .join(", ");
        sqlx::query(&format!("CREATE TABLE {} ({})", quote_ident(table), column_sql))
            .execute(&mut *tx)
            .await?;

        let placeholders = vec!["?"; columns.len()].join(", ");
        let insert_sql = format!("INSERT INTO {} VALUES ({})", quote_ident(table), placeholders);

        for row in rows {
            let mut query = sqlx::query(&insert_sql);
            for i in 0..columns.len() {
                query = match row.get(i).unwrap_or(&Scalar::Null) {
                    Scalar::Null => query.bind(None::<String>),
                    Scalar::Integer(v) => query.bind(*v),
                    Scalar::Real(v) => query.bind(*v),
                    Scalar::Text(s) => query.bind(s.as_str()),
                };
            }
            query.execute(&mut *tx).await?;
        }

        let record_count = rows.len() as i64;
        metadata::upsert(
            &mut *tx,
            &SyncMetadata {
                table_name: table.to_string(),
                last_updated: Utc::now().to_rfc3339(),
                record_count,
                file_hash: file_hash.to_string(),
            },
        )
        .await?;

        tx.commit().await?;

        debug!(table, record_count, "Table replaced");
        Ok(record_count)
    }
}

/// Only alphanumeric and underscore, like every generated table name
fn validate_table_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name.len() < 100
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!("Invalid table name: {}", name)))
    }
}

/// Double-quote an SQL identifier
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn predicate_sql(predicate: &Predicate, binds: &mut Vec<String>) -> String {
    match predicate {
        Predicate::Contains { column, needle } => {
            binds.push(format!("%{}%", escape_like(needle)));
            format!("CAST({} AS TEXT) LIKE ? ESCAPE '\\'", quote_ident(column))
        }
        Predicate::OneOf { column, values } => {
            if values.is_empty() {
                return "0".to_string();
            }
            binds.extend(values.iter().cloned());
            format!(
                "TRIM(CAST({} AS TEXT)) IN ({})",
                quote_ident(column),
                vec!["?"; values.len()].join(", ")
            )
        }
        Predicate::NoneOf { column, values } => {
            if values.is_empty() {
                return "1".to_string();
            }
            binds.extend(values.iter().cloned());
            let ident = quote_ident(column);
            format!(
                "({} IS NULL OR TRIM(CAST({} AS TEXT)) NOT IN ({}))",
                ident,
                ident,
                vec!["?"; values.len()].join(", ")
            )
        }
        Predicate::AnyOf(inner) => {
            if inner.is_empty() {
                return "0".to_string();
            }
            let clauses: Vec<String> = inner.iter().map(|p| predicate_sql(p, binds)).collect();
            format!("({})", clauses.join(" OR "))
        }
    }
}

fn decode_row(row: &SqliteRow) -> Vec<Scalar> {
    (0..row.len()).map(|i| decode_value(row, i)).collect()
}

fn decode_value(row: &SqliteRow, index: usize) -> Scalar {
    match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => Scalar::Null,
        Ok(_) => row
            .try_get::<String, _>(index)
            .map(Scalar::Text)
            .or_else(|_| row.try_get::<i64, _>(index).map(Scalar::Integer))
            .or_else(|_| row.try_get::<f64, _>(index).map(Scalar::Real))
            .unwrap_or(Scalar::Null),
        Err(_) => Scalar::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_name_validation() {
        assert!(validate_table_name("JCR2024").is_ok());
        assert!(validate_table_name("sync_metadata").is_ok());
        assert!(validate_table_name("").is_err());
        assert!(validate_table_name("JCR2024; DROP TABLE x").is_err());
        assert!(validate_table_name("表").is_err());
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("IF(2022)"), "\"IF(2022)\"");
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn test_like_escaping() {
        let mut binds = Vec::new();
        let sql = predicate_sql(
            &Predicate::Contains {
                column: "学科".to_string(),
                needle: "100%_x".to_string(),
            },
            &mut binds,
        );
        assert!(sql.contains("LIKE ? ESCAPE"));
        assert_eq!(binds, vec!["%100\\%\\_x%".to_string()]);
    }

    #[test]
    fn test_empty_value_sets() {
        let mut binds = Vec::new();
        let one_of = Predicate::OneOf {
            column: "Top".to_string(),
            values: vec![],
        };
        let none_of = Predicate::NoneOf {
            column: "Top".to_string(),
            values: vec![],
        };
        assert_eq!(predicate_sql(&one_of, &mut binds), "0");
        assert_eq!(predicate_sql(&none_of, &mut binds), "1");
        assert_eq!(predicate_sql(&Predicate::AnyOf(vec![]), &mut binds), "0");
        assert!(binds.is_empty());
    }

    #[test]
    fn test_any_of_joins_with_or() {
        let mut binds = Vec::new();
        let sql = predicate_sql(
            &Predicate::AnyOf(vec![
                Predicate::Contains {
                    column: "大类分区".to_string(),
                    needle: "1区".to_string(),
                },
                Predicate::OneOf {
                    column: "大类分区".to_string(),
                    values: vec!["1".to_string()],
                },
            ]),
            &mut binds,
        );
        assert!(sql.starts_with('('));
        assert!(sql.contains(" OR "));
        assert_eq!(binds, vec!["%1区%".to_string(), "1".to_string()]);
    }
}
