//! Independent per-journal summaries for a list of names

use serde::Serialize;

use jcr_common::db::TableStore;
use jcr_common::JournalYearRecord;

use super::compare::split_names;
use crate::error::{QueryError, QueryResult};
use crate::format::{fmt_if, rule, TextReport, RULE_WIDTH};
use crate::search::{record_lines, search, year_heading};

/// Summary of one requested name
///
/// Summary fields take the FIRST non-empty value in scan order.
#[derive(Debug, Clone, Serialize)]
pub struct JournalSummary {
    pub query: String,
    pub found: bool,
    pub impact_factor: Option<f64>,
    pub partition: Option<String>,
    pub category: Option<String>,
    pub warning: bool,
    /// Every matching record, in scan order
    pub years: Vec<JournalYearRecord>,
}

impl JournalSummary {
    pub fn from_records(query: &str, records: Vec<JournalYearRecord>) -> Self {
        let impact_factor = records.iter().find_map(|r| r.impact_factor);
        let partition = records.iter().find_map(|r| r.partition.clone());
        let category = records.iter().find_map(|r| r.category.clone());
        let warning = records.iter().any(|r| r.warning_status.is_some());

        Self {
            query: query.to_string(),
            found: !records.is_empty(),
            impact_factor,
            partition,
            category,
            warning,
            years: records,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub total: usize,
    pub found: usize,
    pub journals: Vec<JournalSummary>,
}

/// Search each comma-separated name on its own
pub async fn batch_query(store: &TableStore, journal_names: &str) -> QueryResult<BatchReport> {
    let names = split_names(journal_names);
    if names.is_empty() {
        return Err(QueryError::InsufficientInput(
            "请提供至少一个期刊名称".to_string(),
        ));
    }

    let mut journals = Vec::with_capacity(names.len());
    for name in &names {
        let outcome = search(store, name, None).await?;
        journals.push(JournalSummary::from_records(name, outcome.records));
    }

    Ok(BatchReport {
        total: journals.len(),
        found: journals.iter().filter(|j| j.found).count(),
        journals,
    })
}

impl TextReport for BatchReport {
    fn render_text(&self) -> String {
        let mut output = vec![
            "📋 批量期刊查询结果".to_string(),
            rule('=', RULE_WIDTH),
            format!("查询 {} 个期刊，找到 {} 个", self.total, self.found),
        ];

        for summary in &self.journals {
            output.push(format!("\n🔎 {}", summary.query));
            output.push(rule('-', RULE_WIDTH));
            if !summary.found {
                output.push("  未找到相关信息".to_string());
                continue;
            }

            if let Some(value) = fmt_if(summary.impact_factor) {
                output.push(format!("  影响因子: {}", value));
            }
            if let Some(partition) = &summary.partition {
                output.push(format!("  分区: {}", partition));
            }
            if let Some(category) = &summary.category {
                output.push(format!("  学科类别: {}", category));
            }
            output.push(format!(
                "  预警状态: {}",
                if summary.warning { "⚠️预警" } else { "正常" }
            ));

            for record in &summary.years {
                output.push(format!(
                    "\n  {} {} ({})",
                    year_heading(record.year.as_deref()),
                    record.journal_name,
                    record.source_table
                ));
                output.extend(record_lines(record).into_iter().map(|l| format!("  {}", l)));
            }
        }

        output.join("\n")
    }
}
