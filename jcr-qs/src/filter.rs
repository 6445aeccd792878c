//! Multi-criteria journal filter over one year's partition or JCR table
//!
//! Predicates are attached only for columns the chosen table actually has.
//! The row cap is applied in SQL before the impact-factor bounds, so a
//! bounded query can return fewer than `limit` rows even when more qualify.

use serde::{Serialize, Serializer};
use tracing::debug;

use jcr_common::db::{Predicate, TableStore};
use jcr_common::resolver::{keywords, resolve_field, resolve_strict, Field};
use jcr_common::{tier_label, tier_number, DatasetKind, RawRow, JOURNAL_COLUMN};

use crate::error::{QueryError, QueryResult};
use crate::format::{fmt_if, rule, TextReport, RULE_WIDTH};

pub const DEFAULT_YEAR: &str = "2025";
pub const DEFAULT_LIMIT: i64 = 50;

/// Spellings of "yes" in Top / open access columns
pub const TRUTHY_VALUES: &[&str] = &["是", "Y", "y", "Yes", "YES", "yes", "TRUE", "True", "true", "1"];

/// Spellings of "no" accepted for the Top / open access criteria
pub const FALSY_VALUES: &[&str] = &["否", "N", "n", "No", "NO", "no", "FALSE", "False", "false", "0"];

#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriteria {
    pub year: String,
    pub partition: Option<String>,
    pub min_if: Option<f64>,
    pub max_if: Option<f64>,
    pub category: Option<String>,
    pub is_top: Option<bool>,
    pub is_oa: Option<bool>,
    pub limit: i64,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            year: DEFAULT_YEAR.to_string(),
            partition: None,
            min_if: None,
            max_if: None,
            category: None,
            is_top: None,
            is_oa: None,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl FilterCriteria {
    /// Inclusive bound check; a missing value fails any supplied bound
    pub fn impact_factor_in_bounds(&self, value: Option<f64>) -> bool {
        if self.min_if.is_none() && self.max_if.is_none() {
            return true;
        }
        let Some(value) = value else {
            return false;
        };
        self.min_if.map_or(true, |min| value >= min) && self.max_if.map_or(true, |max| value <= max)
    }
}

/// Rows of the chosen table that passed every criterion
#[derive(Debug, Clone, Serialize)]
pub struct FilterOutcome {
    pub table: String,
    pub kind: DatasetKind,
    pub impact_factor_column: Option<String>,
    pub partition_column: Option<String>,
    pub category_column: Option<String>,
    pub count: usize,
    #[serde(serialize_with = "rows_as_json")]
    pub rows: Vec<RawRow>,
}

fn rows_as_json<S: Serializer>(rows: &[RawRow], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(rows.iter().map(RawRow::to_json))
}

/// Pick `FQBJCR{year}`, else `JCR{year}`
async fn choose_table(store: &TableStore, year: &str) -> QueryResult<(String, DatasetKind)> {
    for kind in [DatasetKind::PartitionUpgraded, DatasetKind::Jcr] {
        let table = kind.table_name(year);
        if store.table_exists(&table).await? {
            return Ok((table, kind));
        }
    }
    Err(QueryError::NoDataForYear(year.to_string()))
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn flag_predicate(column: &str, wanted: bool) -> Predicate {
    let values = TRUTHY_VALUES.iter().map(|v| v.to_string()).collect();
    if wanted {
        Predicate::OneOf {
            column: column.to_string(),
            values,
        }
    } else {
        Predicate::NoneOf {
            column: column.to_string(),
            values,
        }
    }
}

/// Partition tables may store the tier as a bare number, so "1区" also
/// matches a cell holding `1`
fn partition_predicate(column: &str, kind: DatasetKind, partition: &str) -> Predicate {
    let contains = Predicate::Contains {
        column: column.to_string(),
        needle: partition.to_string(),
    };
    match (kind, tier_number(partition)) {
        (DatasetKind::PartitionUpgraded, Some(tier)) => Predicate::AnyOf(vec![
            contains,
            Predicate::OneOf {
                column: column.to_string(),
                values: vec![tier.to_string()],
            },
        ]),
        _ => contains,
    }
}

pub async fn filter(store: &TableStore, criteria: &FilterCriteria) -> QueryResult<FilterOutcome> {
    let year = criteria.year.trim();
    let (table, kind) = choose_table(store, year).await?;
    let columns = store.columns(&table).await?;

    let partition_column = resolve_field(&columns, kind, Field::Partition).map(str::to_string);
    let category_column = resolve_field(&columns, kind, Field::Category).map(str::to_string);
    let impact_factor_column = resolve_field(&columns, kind, Field::ImpactFactor).map(str::to_string);
    let top_column = resolve_field(&columns, kind, Field::Top);
    let oa_column = resolve_strict(&columns, keywords(kind, Field::OpenAccess));

    let mut predicates = Vec::new();
    if let (Some(column), Some(partition)) = (&partition_column, non_blank(&criteria.partition)) {
        predicates.push(partition_predicate(column, kind, partition));
    }
    if let (Some(column), Some(category)) = (&category_column, non_blank(&criteria.category)) {
        predicates.push(Predicate::Contains {
            column: column.clone(),
            needle: category.to_string(),
        });
    }
    if let (Some(column), Some(wanted)) = (top_column, criteria.is_top) {
        predicates.push(flag_predicate(column, wanted));
    }
    if let (Some(column), Some(wanted)) = (oa_column, criteria.is_oa) {
        predicates.push(flag_predicate(column, wanted));
    }

    debug!(
        table = %table,
        predicates = predicates.len(),
        impact_factor_column = ?impact_factor_column,
        "Filtering"
    );

    let rows: Vec<RawRow> = store
        .select(&table, &predicates, Some(criteria.limit))
        .await?
        .into_iter()
        .filter(|row| {
            let value = impact_factor_column
                .as_deref()
                .and_then(|c| row.get(c))
                .and_then(|v| v.as_f64());
            criteria.impact_factor_in_bounds(value)
        })
        .collect();

    Ok(FilterOutcome {
        table,
        kind,
        impact_factor_column,
        partition_column,
        category_column,
        count: rows.len(),
        rows,
    })
}

impl TextReport for FilterOutcome {
    fn render_text(&self) -> String {
        if self.rows.is_empty() {
            return format!("在 {} 中未找到符合条件的期刊", self.table);
        }

        let mut output = vec![
            format!("🔍 期刊筛选结果 ({})", self.table),
            rule('=', RULE_WIDTH),
            format!("共找到 {} 本期刊", self.rows.len()),
            String::new(),
        ];

        for row in &self.rows {
            let name = row
                .get(JOURNAL_COLUMN)
                .and_then(|v| v.as_text())
                .unwrap_or_else(|| "未知期刊".to_string());
            let mut parts = vec![format!("• {}", name)];

            let cell = |column: &Option<String>| column.as_deref().and_then(|c| row.get(c));
            if let Some(value) = fmt_if(cell(&self.impact_factor_column).and_then(|v| v.as_f64())) {
                parts.push(format!("IF: {}", value));
            }
            if let Some(partition) = cell(&self.partition_column).and_then(|v| v.as_text()) {
                let partition = match self.kind {
                    DatasetKind::PartitionUpgraded => tier_label(partition),
                    _ => partition,
                };
                parts.push(format!("分区: {}", partition));
            }
            if let Some(category) = cell(&self.category_column).and_then(|v| v.as_text()) {
                parts.push(format!("学科: {}", category));
            }
            output.push(parts.join(" | "));
        }

        output.join("\n")
    }
}
