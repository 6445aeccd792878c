//! Database information and prompt endpoints

use axum::{
    extract::{Query, State},
    response::Response,
};
use serde::Deserialize;

use crate::format::{reply, OutputFormat};
use crate::info::database_info;
use crate::prompt::journal_analysis_prompt;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct FormatQuery {
    #[serde(default)]
    pub format: OutputFormat,
}

#[derive(Debug, Deserialize)]
pub struct PromptQuery {
    #[serde(default)]
    pub journal_name: String,
    #[serde(default)]
    pub format: OutputFormat,
}

/// GET /api/info
pub async fn get_database_info(
    State(state): State<AppState>,
    Query(query): Query<FormatQuery>,
) -> Response {
    reply(query.format, database_info(&state.store, &state.db_path).await)
}

/// GET /api/prompt/journal-analysis?journal_name=...
pub async fn get_journal_analysis_prompt(Query(query): Query<PromptQuery>) -> Response {
    reply(query.format, journal_analysis_prompt(&query.journal_name))
}
