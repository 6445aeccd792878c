//! Journal index and fuzzy name search
//!
//! Every dataset table that has a `Journal` column takes part; tables are
//! scanned in alphabetical order and rows in storage order.

use serde::Serialize;
use tracing::debug;

use jcr_common::db::TableStore;
use jcr_common::kind::{split_table_name, table_year};
use jcr_common::{normalize, JournalYearRecord, JOURNAL_COLUMN};

use crate::error::{QueryError, QueryResult};
use crate::format::{fmt_if, rule, TextReport, RULE_WIDTH};

/// Records matching a name pattern
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub query: String,
    pub year: Option<String>,
    pub records: Vec<JournalYearRecord>,
    /// Matching rows dropped by normalization
    pub rejected: usize,
}

impl SearchOutcome {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Case-insensitive substring search over every journal-bearing table
///
/// With `year`, only tables of that year are scanned.
pub async fn search(
    store: &TableStore,
    pattern: &str,
    year: Option<&str>,
) -> QueryResult<SearchOutcome> {
    let pattern = pattern.trim();
    if pattern.is_empty() {
        return Err(QueryError::InsufficientInput("请提供期刊名称".to_string()));
    }
    let year = year.map(str::trim).filter(|y| !y.is_empty());
    let needle = pattern.to_lowercase();

    let mut records = Vec::new();
    let mut rejected = 0;

    for table in store.list_dataset_tables().await? {
        let Some((kind, _)) = split_table_name(&table) else {
            continue;
        };
        if let Some(year) = year {
            if table_year(&table) != Some(year) {
                continue;
            }
        }

        let columns = store.columns(&table).await?;
        if !columns.iter().any(|c| c == JOURNAL_COLUMN) {
            debug!(table = %table, "No Journal column, skipping");
            continue;
        }

        for row in store.scan(&table).await? {
            let matches = row
                .get(JOURNAL_COLUMN)
                .map(|v| v.to_string().to_lowercase().contains(&needle))
                .unwrap_or(false);
            if !matches {
                continue;
            }

            match normalize(&row, kind, &table) {
                Ok(record) => records.push(record),
                Err(rejection) => {
                    debug!(table = %table, %rejection, "Row rejected");
                    rejected += 1;
                }
            }
        }
    }

    debug!(pattern, hits = records.len(), rejected, "Search complete");

    Ok(SearchOutcome {
        query: pattern.to_string(),
        year: year.map(str::to_string),
        records,
        rejected,
    })
}

/// Records grouped by journal name, groups in first-seen order
pub fn group_by_journal(records: &[JournalYearRecord]) -> Vec<(&str, Vec<&JournalYearRecord>)> {
    let mut groups: Vec<(&str, Vec<&JournalYearRecord>)> = Vec::new();
    for record in records {
        match groups
            .iter_mut()
            .find(|(name, _)| *name == record.journal_name)
        {
            Some((_, group)) => group.push(record),
            None => groups.push((record.journal_name.as_str(), vec![record])),
        }
    }
    groups
}

/// Indented field lines for one record, empty fields omitted
pub(crate) fn record_lines(record: &JournalYearRecord) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(value) = fmt_if(record.impact_factor) {
        lines.push(format!("  📊 影响因子: {}", value));
    }
    if let Some(partition) = &record.partition {
        lines.push(format!("  🏆 分区: {}", partition));
    }
    if let Some(category) = &record.category {
        lines.push(format!("  📖 学科类别: {}", category));
    }
    if let Some(warning) = &record.warning_status {
        lines.push(format!("  ⚠️ 预警状态: {}", warning));
    }
    if let Some(level) = &record.ccf_level {
        lines.push(format!("  🏅 CCF推荐等级: {}", level));
    }
    lines
}

pub(crate) fn year_heading(year: Option<&str>) -> String {
    match year {
        Some(year) => format!("【{}年】", year),
        None => "【未知年份】".to_string(),
    }
}

impl TextReport for SearchOutcome {
    fn render_text(&self) -> String {
        if self.records.is_empty() {
            return format!("未找到期刊 '{}' 的相关信息", self.query);
        }

        let mut output = Vec::new();
        for (journal, mut group) in group_by_journal(&self.records) {
            output.push(format!("\n📚 期刊名称: {}", journal));
            output.push(rule('=', RULE_WIDTH));

            // Newest first; stable so same-year records keep scan order
            group.sort_by(|a, b| {
                let a = a.year.as_deref().unwrap_or("0000");
                let b = b.year.as_deref().unwrap_or("0000");
                b.cmp(a)
            });

            for record in group {
                output.push(format!("\n{}", year_heading(record.year.as_deref())));
                output.extend(record_lines(record));
            }
        }
        output.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jcr_common::DatasetKind;

    fn record(name: &str, year: &str, kind: DatasetKind) -> JournalYearRecord {
        let table = kind.table_name(year);
        let mut r = JournalYearRecord::new(name, kind, &table);
        r.year = Some(year.to_string());
        r
    }

    #[test]
    fn test_group_by_journal_keeps_first_seen_order() {
        let records = vec![
            record("B", "2022", DatasetKind::Jcr),
            record("A", "2022", DatasetKind::Jcr),
            record("B", "2023", DatasetKind::Jcr),
        ];
        let groups = group_by_journal(&records);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "B");
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].0, "A");
    }

    #[test]
    fn test_render_sorts_years_descending() {
        let mut old = record("Test J", "2022", DatasetKind::Jcr);
        old.impact_factor = Some(3.5);
        let mut new = record("Test J", "2024", DatasetKind::Jcr);
        new.partition = Some("Q1".to_string());

        let outcome = SearchOutcome {
            query: "test".to_string(),
            year: None,
            records: vec![old, new],
            rejected: 0,
        };
        let text = outcome.render_text();
        let pos_2024 = text.find("【2024年】").unwrap();
        let pos_2022 = text.find("【2022年】").unwrap();
        assert!(pos_2024 < pos_2022);
        assert!(text.contains("📊 影响因子: 3.5"));
        assert!(text.contains("🏆 分区: Q1"));
    }

    #[test]
    fn test_render_empty() {
        let outcome = SearchOutcome {
            query: "nothing".to_string(),
            year: None,
            records: vec![],
            rejected: 0,
        };
        assert_eq!(outcome.render_text(), "未找到期刊 'nothing' 的相关信息");
    }
}
