//! # JCR Common Library
//!
//! Shared code for the JCR services including:
//! - Dataset kinds and the canonical journal record model
//! - Column resolution and row normalization over heterogeneous yearly tables
//! - The SQLite-backed raw table store
//! - Configuration loading and root folder resolution

pub mod config;
pub mod db;
pub mod error;
pub mod kind;
pub mod model;
pub mod normalizer;
pub mod resolver;

pub use error::{Error, Result};
pub use kind::DatasetKind;
pub use model::{JournalYearRecord, RawRow, Scalar};
pub use normalizer::{normalize, tier_label, tier_number, RowRejection};

/// Column holding the journal title in every dataset table
pub const JOURNAL_COLUMN: &str = "Journal";
