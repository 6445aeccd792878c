//! Text and JSON rendering of operation results

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;
use tracing::error;

use crate::error::{QueryError, QueryResult};

/// Requested reply format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Anything other than `json` (any case) falls back to text, so a bad
/// `format` value never turns into an extractor rejection
impl<'de> Deserialize<'de> for OutputFormat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        if value.trim().eq_ignore_ascii_case("json") {
            Ok(OutputFormat::Json)
        } else {
            Ok(OutputFormat::Text)
        }
    }
}

/// Human-readable rendering of a report
pub trait TextReport {
    fn render_text(&self) -> String;
}

/// Width of section rules in text reports
pub const RULE_WIDTH: usize = 50;

pub fn rule(ch: char, width: usize) -> String {
    std::iter::repeat(ch).take(width).collect()
}

/// Convert an operation result into an HTTP response in the requested format
pub fn reply<T>(format: OutputFormat, result: QueryResult<T>) -> Response
where
    T: Serialize + TextReport,
{
    match result {
        Ok(report) => match format {
            OutputFormat::Text => report.render_text().into_response(),
            OutputFormat::Json => Json(report).into_response(),
        },
        Err(err) => error_reply(format, err),
    }
}

pub fn error_reply(format: OutputFormat, err: QueryError) -> Response {
    if let QueryError::Store(ref e) = err {
        error!("Query failed: {}", e);
    }

    let status = err.status();
    match format {
        OutputFormat::Text => {
            let message = match &err {
                QueryError::Store(_) => format!("查询出错: {}", err),
                _ => err.to_string(),
            };
            (status, message).into_response()
        }
        OutputFormat::Json => {
            let body = Json(json!({
                "error": {
                    "code": err.code(),
                    "message": err.to_string(),
                }
            }));
            (status, body).into_response()
        }
    }
}

/// Display helper for optional impact factors
pub fn fmt_if(value: Option<f64>) -> Option<String> {
    value.map(|v| {
        let s = format!("{:.3}", v);
        let s = s.trim_end_matches('0').trim_end_matches('.');
        s.to_string()
    })
}
