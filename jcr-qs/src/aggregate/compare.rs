//! Side-by-side comparison of several journals
//!
//! "Latest" values are the last non-empty ones met in scan order, which is
//! alphabetical by table name rather than chronological. The scan for a
//! journal stops at its first warning-list record.

use serde::Serialize;

use jcr_common::db::TableStore;
use jcr_common::JournalYearRecord;

use super::{is_second_tier, is_top_tier};
use crate::error::{QueryError, QueryResult};
use crate::format::{fmt_if, rule, TextReport, RULE_WIDTH};
use crate::search::search;

const NO_DATA: &str = "无数据";

/// Submission advice for one journal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Avoid,
    StronglyRecommend,
    Recommend,
    Consider,
}

impl Recommendation {
    fn advice(self) -> (&'static str, &'static str) {
        match self {
            Recommendation::Avoid => ("❌", "该期刊在预警名单中，不建议投稿"),
            Recommendation::StronglyRecommend => ("⭐", "顶级期刊，强烈推荐"),
            Recommendation::Recommend => ("✅", "优质期刊，推荐投稿"),
            Recommendation::Consider => ("📝", "可考虑投稿"),
        }
    }
}

/// One line of the comparison table, keyed by the name as given
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub journal: String,
    pub has_data: bool,
    pub latest_impact_factor: Option<f64>,
    pub latest_partition: Option<String>,
    pub warning: bool,
    /// Absent when the journal has no data
    pub recommendation: Option<Recommendation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub rows: Vec<ComparisonRow>,
}

/// Split a comma-separated name list, dropping empty entries
pub fn split_names(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Summarize one journal's records
pub fn summarize(journal: &str, records: &[JournalYearRecord]) -> ComparisonRow {
    if records.is_empty() {
        return ComparisonRow {
            journal: journal.to_string(),
            has_data: false,
            latest_impact_factor: None,
            latest_partition: None,
            warning: false,
            recommendation: None,
        };
    }

    let mut latest_impact_factor = None;
    let mut latest_partition = None;
    let mut warning = false;

    for record in records {
        if record.impact_factor.is_some() {
            latest_impact_factor = record.impact_factor;
        }
        if record.partition.is_some() {
            latest_partition = record.partition.clone();
        }
        if record.warning_status.is_some() {
            warning = true;
            break;
        }
    }

    let recommendation = if warning {
        Recommendation::Avoid
    } else {
        match latest_partition.as_deref() {
            Some(p) if is_top_tier(p) => Recommendation::StronglyRecommend,
            Some(p) if is_second_tier(p) => Recommendation::Recommend,
            _ => Recommendation::Consider,
        }
    };

    ComparisonRow {
        journal: journal.to_string(),
        has_data: true,
        latest_impact_factor,
        latest_partition,
        warning,
        recommendation: Some(recommendation),
    }
}

/// Compare two or more comma-separated journals
pub async fn compare(store: &TableStore, journal_list: &str) -> QueryResult<Comparison> {
    let names = split_names(journal_list);
    if names.len() < 2 {
        return Err(QueryError::InsufficientInput(
            "请至少提供2个期刊名称进行比较".to_string(),
        ));
    }

    let mut rows = Vec::with_capacity(names.len());
    for name in &names {
        let outcome = search(store, name, None).await?;
        rows.push(summarize(name, &outcome.records));
    }

    Ok(Comparison { rows })
}

impl TextReport for Comparison {
    fn render_text(&self) -> String {
        let mut output = vec!["📊 期刊对比分析结果".to_string(), rule('=', RULE_WIDTH)];
        output.push(format!(
            "\n{:<30} {:<15} {:<15} {:<15}",
            "期刊名称", "最新影响因子", "最新分区", "预警状态"
        ));
        output.push(rule('-', 80));

        for row in &self.rows {
            if !row.has_data {
                output.push(format!(
                    "{:<30} {:<15} {:<15} {:<15}",
                    row.journal, NO_DATA, NO_DATA, NO_DATA
                ));
                continue;
            }
            let impact_factor = fmt_if(row.latest_impact_factor).unwrap_or_else(|| NO_DATA.to_string());
            let partition = row.latest_partition.as_deref().unwrap_or(NO_DATA);
            let warning = if row.warning { "⚠️预警" } else { "正常" };
            output.push(format!(
                "{:<30} {:<15} {:<15} {:<15}",
                row.journal, impact_factor, partition, warning
            ));
        }

        output.push("\n💡 投稿建议:".to_string());
        for row in &self.rows {
            if let Some(recommendation) = row.recommendation {
                let (icon, advice) = recommendation.advice();
                output.push(format!("  {} {}: {}", icon, row.journal, advice));
            }
        }

        output.join("\n")
    }
}
