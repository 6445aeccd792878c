//! Raw row and canonical record types

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;

use crate::DatasetKind;

/// A single cell value as stored in SQLite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Scalar {
    /// Numeric view of the value
    ///
    /// Text is trimmed and parsed; anything that is not a finite number
    /// (`"N/A"`, `"<0.1"`, empty) yields `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Null => None,
            Scalar::Integer(v) => Some(*v as f64),
            Scalar::Real(v) if v.is_finite() => Some(*v),
            Scalar::Real(_) => None,
            Scalar::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        }
    }

    /// Display text of the value, `None` for null or blank text
    pub fn as_text(&self) -> Option<String> {
        match self {
            Scalar::Null => None,
            Scalar::Integer(v) => Some(v.to_string()),
            Scalar::Real(v) => Some(v.to_string()),
            Scalar::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Scalar::Null => Value::Null,
            Scalar::Integer(v) => json!(v),
            Scalar::Real(v) => json!(v),
            Scalar::Text(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => Ok(()),
            Scalar::Integer(v) => write!(f, "{}", v),
            Scalar::Real(v) => write!(f, "{}", v),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Integer(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Real(value)
    }
}

/// One row of a raw table: column name → value, in table column order
///
/// Rows scanned from the same table share one column list.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    columns: Arc<Vec<String>>,
    values: Vec<Scalar>,
}

impl RawRow {
    /// Build a row; missing trailing values are padded with `Null`
    pub fn new(columns: Arc<Vec<String>>, mut values: Vec<Scalar>) -> Self {
        values.resize(columns.len(), Scalar::Null);
        Self { columns, values }
    }

    /// Convenience constructor from `(column, value)` pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Scalar>,
    {
        let (columns, values): (Vec<String>, Vec<Scalar>) = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .unzip();
        Self::new(Arc::new(columns), values)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Value of a named column, `None` if the column does not exist
    pub fn get(&self, column: &str) -> Option<&Scalar> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.values.get(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    /// JSON object keyed by column name
    pub fn to_json(&self) -> Value {
        let map = self
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_json()))
            .collect::<serde_json::Map<_, _>>();
        Value::Object(map)
    }
}

/// Canonical per-journal, per-year record derived from one raw row
///
/// Constructed on demand for each query and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JournalYearRecord {
    pub journal_name: String,
    pub year: Option<String>,
    pub impact_factor: Option<f64>,
    pub partition: Option<String>,
    pub category: Option<String>,
    pub warning_status: Option<String>,
    pub ccf_level: Option<String>,
    /// Kind of the source table
    pub kind: DatasetKind,
    /// Physical table the row was read from
    pub source_table: String,
}

impl JournalYearRecord {
    pub fn new(journal_name: impl Into<String>, kind: DatasetKind, source_table: impl Into<String>) -> Self {
        Self {
            journal_name: journal_name.into(),
            year: None,
            impact_factor: None,
            partition: None,
            category: None,
            warning_status: None,
            ccf_level: None,
            kind,
            source_table: source_table.into(),
        }
    }
}
