//! Raw row → `JournalYearRecord`
//!
//! Normalization never fails a query: a row that cannot be turned into a
//! record comes back as a `RowRejection`, which callers count and drop.

use serde::Serialize;
use thiserror::Error;

use crate::kind::table_year;
use crate::resolver::{resolve_field, Field};
use crate::{DatasetKind, JournalYearRecord, RawRow, Scalar, JOURNAL_COLUMN};

/// Why a raw row produced no record
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum RowRejection {
    /// `Journal` column missing, null or blank
    #[error("row has no journal name")]
    MissingName,

    /// Row content is structurally wrong (e.g. a number where the title belongs)
    #[error("malformed row: {0}")]
    Malformed(String),
}

/// Build the canonical record for one row of `table_name`
///
/// Which optional fields get populated depends only on `kind`:
/// - `Jcr` / `PartitionUpgraded`: impact factor, partition, category
/// - `WarningList`: warning status
/// - `CcfRecommendation`: CCF level, category
pub fn normalize(
    row: &RawRow,
    kind: DatasetKind,
    table_name: &str,
) -> Result<JournalYearRecord, RowRejection> {
    let journal_name = match row.get(JOURNAL_COLUMN) {
        None | Some(Scalar::Null) => return Err(RowRejection::MissingName),
        Some(Scalar::Text(name)) => {
            let name = name.trim();
            if name.is_empty() {
                return Err(RowRejection::MissingName);
            }
            name.to_string()
        }
        Some(other) => {
            return Err(RowRejection::Malformed(format!(
                "numeric value {} in {} column",
                other, JOURNAL_COLUMN
            )))
        }
    };

    let columns = row.columns();
    let text = |field: Field| -> Option<String> {
        resolve_field(columns, kind, field)
            .and_then(|column| row.get(column))
            .and_then(Scalar::as_text)
    };

    let mut record = JournalYearRecord::new(journal_name, kind, table_name);
    record.year = table_year(table_name).map(str::to_string);

    match kind {
        DatasetKind::Jcr | DatasetKind::PartitionUpgraded => {
            record.impact_factor = resolve_field(columns, kind, Field::ImpactFactor)
                .and_then(|column| row.get(column))
                .and_then(Scalar::as_f64);
            record.partition = text(Field::Partition).map(|p| match kind {
                DatasetKind::PartitionUpgraded => tier_label(p),
                _ => p,
            });
            record.category = text(Field::Category);
        }
        DatasetKind::WarningList => {
            record.warning_status = text(Field::Warning);
        }
        DatasetKind::CcfRecommendation => {
            record.ccf_level = text(Field::CcfLevel);
            record.category = text(Field::Category);
        }
    }

    Ok(record)
}

/// Bare tier numbers in partition tables ("1".."4") read as "1区".."4区"
pub fn tier_label(partition: String) -> String {
    match partition.as_str() {
        "1" | "2" | "3" | "4" => format!("{}区", partition),
        _ => partition,
    }
}

/// Inverse of `tier_label`: the bare tier number a "N区" label is stored as
pub fn tier_number(label: &str) -> Option<&str> {
    match label.trim().strip_suffix('区') {
        Some(n @ ("1" | "2" | "3" | "4")) => Some(n),
        _ => None,
    }
}
