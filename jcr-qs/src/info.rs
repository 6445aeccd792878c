//! Database introspection

use serde::Serialize;
use std::path::Path;

use jcr_common::db::{TableInfo, TableStore};

use crate::error::QueryResult;
use crate::format::{rule, TextReport};

#[derive(Debug, Clone, Serialize)]
pub struct DatabaseInfo {
    pub database_path: String,
    pub table_count: usize,
    /// Alphabetical, with row counts
    pub tables: Vec<TableInfo>,
}

pub async fn database_info(store: &TableStore, db_path: &Path) -> QueryResult<DatabaseInfo> {
    let tables = store.table_infos().await?;
    Ok(DatabaseInfo {
        database_path: db_path.display().to_string(),
        table_count: tables.len(),
        tables,
    })
}

impl TextReport for DatabaseInfo {
    fn render_text(&self) -> String {
        let mut info = vec![
            "📊 JCR分区表数据库信息".to_string(),
            rule('=', 30),
            format!("数据库路径: {}", self.database_path),
            format!("数据表数量: {}", self.table_count),
            "\n📋 可用数据表:".to_string(),
        ];
        for table in &self.tables {
            info.push(format!("  • {}: {} 条记录", table.name, table.row_count));
        }
        info.join("\n")
    }
}
