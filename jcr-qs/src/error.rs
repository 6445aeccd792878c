//! Query error taxonomy
//!
//! Every variant is converted into a well-formed reply at the operation
//! boundary (see `format::reply`); nothing reaches the transport as a crash.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors surfaced by query operations
#[derive(Debug, Error)]
pub enum QueryError {
    /// Neither `FQBJCR{year}` nor `JCR{year}` exists
    #[error("未找到 {0} 年的分区表或JCR数据")]
    NoDataForYear(String),

    /// Caller supplied too few names or an empty query
    #[error("{0}")]
    InsufficientInput(String),

    /// Table store failure
    #[error("数据库错误: {0}")]
    Store(#[from] jcr_common::Error),
}

impl QueryError {
    pub fn code(&self) -> &'static str {
        match self {
            QueryError::NoDataForYear(_) => "NO_DATA_FOR_YEAR",
            QueryError::InsufficientInput(_) => "INSUFFICIENT_INPUT",
            QueryError::Store(_) => "STORE_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            QueryError::NoDataForYear(_) => StatusCode::NOT_FOUND,
            QueryError::InsufficientInput(_) => StatusCode::BAD_REQUEST,
            QueryError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;
