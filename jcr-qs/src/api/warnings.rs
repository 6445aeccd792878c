//! Warning list endpoint

use axum::{
    extract::{Query, State},
    response::Response,
};
use serde::Deserialize;

use super::present;
use crate::format::{reply, OutputFormat};
use crate::warnings::check_warnings;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct WarningsQuery {
    pub keywords: Option<String>,
    #[serde(default)]
    pub format: OutputFormat,
}

/// GET /api/warnings?keywords=...
pub async fn check_warning_journals(
    State(state): State<AppState>,
    Query(query): Query<WarningsQuery>,
) -> Response {
    let keywords = present(query.keywords);
    reply(query.format, check_warnings(&state.store, keywords.as_deref()).await)
}
