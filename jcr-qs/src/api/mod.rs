//! HTTP API handlers for jcr-qs

pub mod filters;
pub mod health;
pub mod info;
pub mod search;
pub mod warnings;

pub use filters::filter_journals;
pub use health::health_routes;
pub use info::{get_database_info, get_journal_analysis_prompt};
pub use search::{batch_query_journals, compare_journals, get_partition_trends, search_journal};
pub use warnings::check_warning_journals;

/// Treat `?param=` like an absent parameter
pub(crate) fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
