//! Column resolution over evolving yearly schemas
//!
//! Source tables rename their columns from year to year ("IF(2022)" vs
//! "影响因子"). Each semantic field has an ordered list of accepted keyword
//! synonyms per dataset kind; the physical column is the first one, in table
//! order, whose name contains any keyword (case-insensitive).

use serde::Serialize;

use crate::DatasetKind;

/// Semantic field a physical column can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    ImpactFactor,
    Partition,
    Category,
    Warning,
    CcfLevel,
    Top,
    OpenAccess,
}

const NONE: &[&str] = &[];

const TOP_KEYWORDS: &[&str] = &["Top"];
const OPEN_ACCESS_KEYWORDS: &[&str] = &["Open Access", "OA"];

/// Keyword synonyms accepted for `field` in tables of `kind`
///
/// An empty list means the field is not carried by that kind.
pub fn keywords(kind: DatasetKind, field: Field) -> &'static [&'static str] {
    use DatasetKind::*;
    use Field::*;

    match (kind, field) {
        (Jcr, ImpactFactor) => &["IF(", "IF ", "Impact Factor"],
        (Jcr, Partition) => &["Quartile", "分区", "Partition"],
        (Jcr, Category) => &["Category", "类别", "学科"],

        (PartitionUpgraded, ImpactFactor) => &["IF", "影响因子"],
        (PartitionUpgraded, Partition) => &["大类分区", "Partition", "分区"],
        (PartitionUpgraded, Category) => &["学科", "Subject", "Category"],

        (WarningList, Warning) => &["预警等级", "预警原因", "Warning"],

        (CcfRecommendation, CcfLevel) => &["CCF推荐类型", "推荐类型", "CCF Level", "分级", "Level"],
        (CcfRecommendation, Category) => &["领域", "Field", "Category"],

        (_, Top) => TOP_KEYWORDS,
        (_, OpenAccess) => OPEN_ACCESS_KEYWORDS,

        _ => NONE,
    }
}

/// First column (in table order) whose lowercased name contains any keyword
///
/// Returns `None` when nothing matches; callers treat that as "field not
/// available in this table".
pub fn resolve<'a, S: AsRef<str>>(columns: &'a [S], keywords: &[&str]) -> Option<&'a str> {
    if keywords.is_empty() {
        return None;
    }
    let lowered: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();

    columns
        .iter()
        .map(AsRef::as_ref)
        .find(|column| {
            let name = column.to_lowercase();
            lowered.iter().any(|k| name.contains(k.as_str()))
        })
}

/// Resolve a semantic field using the policy table
pub fn resolve_field<S: AsRef<str>>(columns: &[S], kind: DatasetKind, field: Field) -> Option<&str> {
    resolve(columns, keywords(kind, field))
}

/// Exact-name column match (used for the open access `OA` short form)
///
/// `OA` as a substring would hit unrelated names such as "BOARD", so short
/// keywords (two characters or fewer) only match whole column names.
pub fn resolve_strict<'a, S: AsRef<str>>(columns: &'a [S], keywords: &[&str]) -> Option<&'a str> {
    columns.iter().map(AsRef::as_ref).find(|column| {
        let name = column.to_lowercase();
        keywords.iter().any(|k| {
            let k = k.to_lowercase();
            if k.chars().count() <= 2 {
                name.trim() == k
            } else {
                name.contains(&k)
            }
        })
    })
}
