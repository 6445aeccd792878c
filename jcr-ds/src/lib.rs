//! jcr-ds library - Journal table synchronization
//!
//! Downloads the published CSV tables, decodes them (UTF-8 or GBK) and
//! replaces the matching tables in `jcr.db`, one transaction per table.

pub mod decode;
pub mod error;
pub mod fetcher;
pub mod integrity;
pub mod sync;

pub use error::{SyncError, SyncResult};
pub use fetcher::{Fetcher, HttpFetcher, LocalFetcher};
pub use integrity::{sync_status, validate, SyncStatus, ValidationReport};
pub use sync::{SourceOutcome, SyncOptions, SyncReport, Syncer};
