//! CSV decoding: text encoding detection, header cleanup, type inference
//!
//! Upstream files are mostly UTF-8 (sometimes with a BOM) but older
//! releases are GBK. Columns whose every non-missing cell is an integer
//! load as INTEGER, likewise REAL; anything else stays TEXT.

use encoding_rs::{Encoding, GBK, UTF_8};
use std::collections::HashSet;
use tracing::debug;

use jcr_common::db::{ColumnAffinity, ColumnDef};
use jcr_common::Scalar;

use crate::error::{SyncError, SyncResult};

/// Encodings tried in order when the file has no BOM
fn fallback_encodings() -> [&'static Encoding; 2] {
    [UTF_8, GBK]
}

/// Cell spellings read as missing
const MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-NaN", "-nan", "<NA>", "N/A", "NA", "NULL", "NaN", "None",
    "n/a", "nan", "null",
];

/// A decoded source file ready for `TableStore::bulk_load`
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTable {
    pub columns: Vec<ColumnDef>,
    pub rows: Vec<Vec<Scalar>>,
    /// Name of the text encoding that decoded the file
    pub encoding: &'static str,
}

impl ParsedTable {
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

/// Decode raw bytes to text
///
/// A BOM wins; otherwise UTF-8 then GBK are tried without replacement.
pub fn decode_text(bytes: &[u8]) -> SyncResult<(String, &'static str)> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let body = &bytes[bom_len..];
        return encoding
            .decode_without_bom_handling_and_without_replacement(body)
            .map(|text| (text.into_owned(), encoding.name()))
            .ok_or(SyncError::UnreadableEncoding);
    }

    fallback_encodings()
        .into_iter()
        .find_map(|encoding| {
            encoding
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|text| (text.into_owned(), encoding.name()))
        })
        .ok_or(SyncError::UnreadableEncoding)
}

/// Decode and parse a CSV file
pub fn parse_csv(bytes: &[u8]) -> SyncResult<ParsedTable> {
    let (text, encoding) = decode_text(bytes)?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = clean_headers(reader.headers()?.iter());
    if headers.is_empty() {
        return Err(SyncError::EmptySource);
    }

    let mut raw_rows: Vec<Vec<Option<String>>> = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut cells: Vec<Option<String>> = record
            .iter()
            .take(headers.len())
            .map(|cell| {
                if is_missing(cell) {
                    None
                } else {
                    Some(cell.to_string())
                }
            })
            .collect();
        if cells.iter().all(Option::is_none) {
            continue;
        }
        cells.resize(headers.len(), None);
        raw_rows.push(cells);
    }

    if raw_rows.is_empty() {
        return Err(SyncError::EmptySource);
    }

    let affinities: Vec<ColumnAffinity> = (0..headers.len())
        .map(|i| infer_affinity(raw_rows.iter().filter_map(|row| row[i].as_deref())))
        .collect();

    let rows = raw_rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .zip(&affinities)
                .map(|(cell, affinity)| to_scalar(cell, *affinity))
                .collect()
        })
        .collect();

    let columns = headers
        .into_iter()
        .zip(affinities)
        .map(|(name, affinity)| ColumnDef::new(name, affinity))
        .collect();

    debug!(encoding, "Parsed CSV");

    Ok(ParsedTable {
        columns,
        rows,
        encoding,
    })
}

fn is_missing(cell: &str) -> bool {
    MISSING_MARKERS.contains(&cell.trim())
}

/// Trim names, name blank headers `Unnamed: {i}` and suffix repeats `.1`, `.2`
fn clean_headers<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut headers = Vec::new();

    for (i, name) in raw.enumerate() {
        let name = name.trim();
        let base = if name.is_empty() {
            format!("Unnamed: {}", i)
        } else {
            name.to_string()
        };

        let mut candidate = base.clone();
        let mut n = 1;
        while seen.contains(&candidate) {
            candidate = format!("{}.{}", base, n);
            n += 1;
        }
        seen.insert(candidate.clone());
        headers.push(candidate);
    }

    // A header row of only blank names means there is no header at all
    if headers.iter().all(|h| h.starts_with("Unnamed: ")) {
        headers.clear();
    }
    headers
}

fn parse_integer(cell: &str) -> Option<i64> {
    cell.trim().parse::<i64>().ok()
}

fn parse_real(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn infer_affinity<'a>(mut cells: impl Iterator<Item = &'a str> + Clone) -> ColumnAffinity {
    if cells.clone().all(|c| parse_integer(c).is_some()) {
        ColumnAffinity::Integer
    } else if cells.all(|c| parse_real(c).is_some()) {
        ColumnAffinity::Real
    } else {
        ColumnAffinity::Text
    }
}

fn to_scalar(cell: Option<String>, affinity: ColumnAffinity) -> Scalar {
    let Some(cell) = cell else {
        return Scalar::Null;
    };
    match affinity {
        ColumnAffinity::Integer => parse_integer(&cell).map(Scalar::Integer),
        ColumnAffinity::Real => parse_real(&cell).map(Scalar::Real),
        ColumnAffinity::Text => None,
    }
    .unwrap_or(Scalar::Text(cell))
}
