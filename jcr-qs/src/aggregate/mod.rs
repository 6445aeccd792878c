//! Cross-year and cross-journal aggregation over search results

pub mod batch;
pub mod compare;
pub mod trends;

pub use batch::{batch_query, BatchReport, JournalSummary};
pub use compare::{compare, split_names, Comparison, ComparisonRow, Recommendation};
pub use trends::{partition_trends, trends, PartitionTrend, TrendPoint, TrendVerdict};

/// "1区" or "Q1"
pub fn is_top_tier(partition: &str) -> bool {
    partition.contains("1区") || partition.contains("Q1")
}

/// "2区" or "Q2"
pub fn is_second_tier(partition: &str) -> bool {
    partition.contains("2区") || partition.contains("Q2")
}

/// "4区" or "Q4"
pub fn is_bottom_tier(partition: &str) -> bool {
    partition.contains("4区") || partition.contains("Q4")
}
