//! Ingestion error taxonomy
//!
//! Every variant is confined to the source that produced it; the sync
//! report records it and the remaining sources carry on.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    /// Network failure, non-2xx status or timeout
    #[error("source unavailable: {url}: {reason}")]
    SourceUnavailable { url: String, reason: String },

    /// Bytes are not valid text in any supported encoding
    #[error("file could not be decoded as UTF-8 or GBK")]
    UnreadableEncoding,

    /// Decoded table has no data rows
    #[error("file contains no data rows")]
    EmptySource,

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("store error: {0}")]
    Store(#[from] jcr_common::Error),
}

impl SyncError {
    pub fn unavailable(url: &str, reason: impl ToString) -> Self {
        SyncError::SourceUnavailable {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type SyncResult<T> = Result<T, SyncError>;
