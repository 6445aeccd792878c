//! Partition history of a journal

use serde::Serialize;

use jcr_common::db::TableStore;
use jcr_common::JournalYearRecord;

use super::{is_bottom_tier, is_top_tier};
use crate::error::QueryResult;
use crate::format::{rule, TextReport};
use crate::search::search;

/// Qualitative reading of the most recent partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendVerdict {
    TopTierStable,
    MidTierStable,
    LowTierCaution,
}

impl TrendVerdict {
    pub fn from_partition(partition: &str) -> Self {
        if is_top_tier(partition) {
            TrendVerdict::TopTierStable
        } else if is_bottom_tier(partition) {
            TrendVerdict::LowTierCaution
        } else {
            TrendVerdict::MidTierStable
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            TrendVerdict::TopTierStable => "✅ 该期刊保持在顶级分区",
            TrendVerdict::MidTierStable => "📊 该期刊分区稳定，属于中等水平",
            TrendVerdict::LowTierCaution => "⚠️ 该期刊分区较低，发表需谨慎",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub year: String,
    pub partition: String,
    pub journal_name: String,
}

/// Dated partitions in ascending year order plus a verdict
#[derive(Debug, Clone, Serialize)]
pub struct PartitionTrend {
    pub query: String,
    /// Records the search returned, dated or not
    pub matched: usize,
    pub points: Vec<TrendPoint>,
    /// Present only with two or more points
    pub verdict: Option<TrendVerdict>,
}

/// Build the trend from already-searched records
pub fn partition_trends(query: &str, records: &[JournalYearRecord]) -> PartitionTrend {
    let mut points: Vec<TrendPoint> = records
        .iter()
        .filter_map(|r| match (&r.year, &r.partition) {
            (Some(year), Some(partition)) => Some(TrendPoint {
                year: year.clone(),
                partition: partition.clone(),
                journal_name: r.journal_name.clone(),
            }),
            _ => None,
        })
        .collect();

    // Lexicographic; four-digit years sort correctly
    points.sort_by(|a, b| a.year.cmp(&b.year));

    let verdict = if points.len() > 1 {
        points
            .last()
            .map(|p| TrendVerdict::from_partition(&p.partition))
    } else {
        None
    };

    PartitionTrend {
        query: query.to_string(),
        matched: records.len(),
        points,
        verdict,
    }
}

/// Search every year and kind for `journal_name` and build its trend
pub async fn trends(store: &TableStore, journal_name: &str) -> QueryResult<PartitionTrend> {
    let outcome = search(store, journal_name, None).await?;
    Ok(partition_trends(&outcome.query, &outcome.records))
}

impl TextReport for PartitionTrend {
    fn render_text(&self) -> String {
        if self.matched == 0 {
            return format!("未找到期刊 '{}' 的相关信息", self.query);
        }
        if self.points.is_empty() {
            return format!("未找到期刊 '{}' 的分区信息", self.query);
        }

        let mut output = vec!["📈 期刊分区变化趋势分析".to_string(), rule('=', 40)];
        for point in &self.points {
            output.push(format!("{}年: {}", point.year, point.partition));
        }
        if let Some(verdict) = self.verdict {
            output.push("\n📊 趋势分析:".to_string());
            output.push(verdict.message().to_string());
        }
        output.join("\n")
    }
}
