//! Journal filter endpoint
//!
//! Numeric and flag parameters arrive as strings and are parsed here, so a
//! malformed value is reported in the requested format like any other
//! query error.

use axum::{
    extract::{Query, State},
    response::Response,
};
use serde::Deserialize;
use std::str::FromStr;

use super::present;
use crate::error::{QueryError, QueryResult};
use crate::filter::{filter, FilterCriteria, DEFAULT_LIMIT, DEFAULT_YEAR, FALSY_VALUES, TRUTHY_VALUES};
use crate::format::{reply, OutputFormat};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    pub partition: Option<String>,
    pub min_if: Option<String>,
    pub max_if: Option<String>,
    pub category: Option<String>,
    pub is_top: Option<String>,
    pub is_oa: Option<String>,
    pub year: Option<String>,
    pub limit: Option<String>,
    #[serde(default)]
    pub format: OutputFormat,
}

fn parse_number<T: FromStr>(name: &str, value: Option<String>) -> QueryResult<Option<T>> {
    match present(value) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| QueryError::InsufficientInput(format!("参数 {} 不是有效数字: {}", name, raw))),
    }
}

fn parse_flag(name: &str, value: Option<String>) -> QueryResult<Option<bool>> {
    let Some(raw) = present(value) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if TRUTHY_VALUES.contains(&trimmed) {
        Ok(Some(true))
    } else if FALSY_VALUES.contains(&trimmed) {
        Ok(Some(false))
    } else {
        Err(QueryError::InsufficientInput(format!(
            "参数 {} 应为是/否 (true/false): {}",
            name, raw
        )))
    }
}

impl TryFrom<FilterQuery> for FilterCriteria {
    type Error = QueryError;

    fn try_from(query: FilterQuery) -> QueryResult<Self> {
        Ok(FilterCriteria {
            year: present(query.year).unwrap_or_else(|| DEFAULT_YEAR.to_string()),
            partition: present(query.partition),
            min_if: parse_number("min_if", query.min_if)?,
            max_if: parse_number("max_if", query.max_if)?,
            category: present(query.category),
            is_top: parse_flag("is_top", query.is_top)?,
            is_oa: parse_flag("is_oa", query.is_oa)?,
            limit: parse_number::<i64>("limit", query.limit)?
                .unwrap_or(DEFAULT_LIMIT)
                .max(0),
        })
    }
}

/// GET /api/filter?partition=1区&min_if=5&year=2025&limit=50
pub async fn filter_journals(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Response {
    let format = query.format;
    let result = match FilterCriteria::try_from(query) {
        Ok(criteria) => filter(&state.store, &criteria).await,
        Err(e) => Err(e),
    };
    reply(format, result)
}
