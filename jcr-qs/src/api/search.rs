//! Journal lookup endpoints: search, trends, compare and batch

use axum::{
    extract::{Query, State},
    response::Response,
};
use serde::Deserialize;

use super::present;
use crate::aggregate::{batch_query, compare, trends};
use crate::format::{reply, OutputFormat};
use crate::search::search;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Name fragment, matched case-insensitively
    #[serde(default)]
    pub journal_name: String,
    pub year: Option<String>,
    #[serde(default)]
    pub format: OutputFormat,
}

#[derive(Debug, Deserialize)]
pub struct TrendsQuery {
    #[serde(default)]
    pub journal_name: String,
    #[serde(default)]
    pub format: OutputFormat,
}

#[derive(Debug, Deserialize)]
pub struct CompareQuery {
    /// Comma-separated names
    #[serde(default)]
    pub journal_list: String,
    #[serde(default)]
    pub format: OutputFormat,
}

#[derive(Debug, Deserialize)]
pub struct BatchQuery {
    /// Comma-separated names
    #[serde(default)]
    pub journal_names: String,
    #[serde(default)]
    pub format: OutputFormat,
}

/// GET /api/search?journal_name=...&year=...
pub async fn search_journal(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Response {
    let year = present(query.year);
    let result = search(&state.store, &query.journal_name, year.as_deref()).await;
    reply(query.format, result)
}

/// GET /api/trends?journal_name=...
pub async fn get_partition_trends(
    State(state): State<AppState>,
    Query(query): Query<TrendsQuery>,
) -> Response {
    reply(query.format, trends(&state.store, &query.journal_name).await)
}

/// GET /api/compare?journal_list=Nature,Science
pub async fn compare_journals(
    State(state): State<AppState>,
    Query(query): Query<CompareQuery>,
) -> Response {
    reply(query.format, compare(&state.store, &query.journal_list).await)
}

/// GET /api/batch?journal_names=Nature,Science&format=json
pub async fn batch_query_journals(
    State(state): State<AppState>,
    Query(query): Query<BatchQuery>,
) -> Response {
    reply(query.format, batch_query(&state.store, &query.journal_names).await)
}
