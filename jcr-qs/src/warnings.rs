//! International journal warning list lookup

use serde::Serialize;

use jcr_common::db::TableStore;
use jcr_common::kind::split_table_name;
use jcr_common::resolver::{resolve_field, Field};
use jcr_common::{DatasetKind, RawRow, JOURNAL_COLUMN};

use crate::error::QueryResult;
use crate::format::{rule, TextReport};

/// Reason columns in preference order
const REASON_COLUMNS: &[&str] = &["预警原因", "预警等级"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WarningEntry {
    pub journal: String,
    pub reason: String,
}

/// One year's warning list
#[derive(Debug, Clone, Serialize)]
pub struct WarningSection {
    pub table: String,
    pub year: Option<String>,
    pub entries: Vec<WarningEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WarningReport {
    pub keywords: Option<String>,
    /// Newest year first
    pub sections: Vec<WarningSection>,
}

fn reason(row: &RawRow) -> String {
    REASON_COLUMNS
        .iter()
        .find_map(|c| row.get(c).and_then(|v| v.as_text()))
        .or_else(|| {
            resolve_field(row.columns(), DatasetKind::WarningList, Field::Warning)
                .and_then(|c| row.get(c))
                .and_then(|v| v.as_text())
        })
        .unwrap_or_else(|| "未知原因".to_string())
}

/// List warned journals per year, optionally narrowed by name keywords
pub async fn check_warnings(store: &TableStore, keywords: Option<&str>) -> QueryResult<WarningReport> {
    let keywords = keywords.map(str::trim).filter(|k| !k.is_empty());
    let needle = keywords.map(str::to_lowercase);

    let mut tables: Vec<(String, Option<String>)> = store
        .list_dataset_tables()
        .await?
        .into_iter()
        .filter_map(|table| match split_table_name(&table) {
            Some((DatasetKind::WarningList, year)) => {
                let year = year.map(str::to_string);
                Some((table, year))
            }
            _ => None,
        })
        .collect();
    tables.sort_by(|a, b| b.0.cmp(&a.0));

    let mut sections = Vec::with_capacity(tables.len());
    for (table, year) in tables {
        let entries = store
            .scan(&table)
            .await?
            .iter()
            .filter_map(|row| {
                let journal = row.get(JOURNAL_COLUMN).and_then(|v| v.as_text());
                if let Some(needle) = &needle {
                    let hit = journal
                        .as_ref()
                        .map(|j| j.to_lowercase().contains(needle.as_str()))
                        .unwrap_or(false);
                    if !hit {
                        return None;
                    }
                }
                Some(WarningEntry {
                    journal: journal.unwrap_or_else(|| "未知期刊".to_string()),
                    reason: reason(row),
                })
            })
            .collect();

        sections.push(WarningSection { table, year, entries });
    }

    Ok(WarningReport {
        keywords: keywords.map(str::to_string),
        sections,
    })
}

impl TextReport for WarningReport {
    fn render_text(&self) -> String {
        if self.sections.is_empty() {
            return "未找到预警期刊数据表".to_string();
        }

        let mut output = vec!["🚨 国际期刊预警名单查询结果".to_string(), rule('=', 40)];
        for section in &self.sections {
            output.push(format!(
                "\n📅 {}年预警名单:",
                section.year.as_deref().unwrap_or("未知")
            ));
            if section.entries.is_empty() {
                match &self.keywords {
                    Some(keywords) => output.push(format!("  无匹配 '{}' 的预警期刊", keywords)),
                    None => output.push("  该年度无预警期刊数据".to_string()),
                }
                continue;
            }
            for entry in &section.entries {
                output.push(format!("  • {}: {}", entry.journal, entry.reason));
            }
        }
        output.join("\n")
    }
}
