//! Dataset kinds and table-name conventions
//!
//! Every raw table is named `{prefix}{year}`, e.g. `FQBJCR2025`, `JCR2024`,
//! `GJQKYJMD2023`, `CCF2022` or `CCFT2022`. The prefix identifies the kind.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a source table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    /// Journal Citation Reports metrics (impact factor, quartile)
    Jcr,
    /// 中科院分区表 upgraded edition
    PartitionUpgraded,
    /// 国际期刊预警名单
    WarningList,
    /// CCF recommended venues and graded journal lists
    CcfRecommendation,
}

/// Prefixes in match order. Longer prefixes come first so `FQBJCR2025`
/// never classifies as `Jcr` and `CCFT2022` keeps its own prefix.
const PREFIXES: &[(&str, DatasetKind)] = &[
    ("GJQKYJMD", DatasetKind::WarningList),
    ("FQBJCR", DatasetKind::PartitionUpgraded),
    ("CCFT", DatasetKind::CcfRecommendation),
    ("CCF", DatasetKind::CcfRecommendation),
    ("JCR", DatasetKind::Jcr),
];

impl DatasetKind {
    pub const ALL: [DatasetKind; 4] = [
        DatasetKind::Jcr,
        DatasetKind::PartitionUpgraded,
        DatasetKind::WarningList,
        DatasetKind::CcfRecommendation,
    ];

    /// Canonical table-name prefix (CCF has a second one, `CCFT`)
    pub fn prefix(self) -> &'static str {
        match self {
            DatasetKind::Jcr => "JCR",
            DatasetKind::PartitionUpgraded => "FQBJCR",
            DatasetKind::WarningList => "GJQKYJMD",
            DatasetKind::CcfRecommendation => "CCF",
        }
    }

    /// Physical table name for this kind and year
    pub fn table_name(self, year: &str) -> String {
        format!("{}{}", self.prefix(), year)
    }

    /// Classify a table by its name
    ///
    /// Returns `None` for tables that are not dataset tables (e.g. `sync_metadata`).
    pub fn from_table_name(table_name: &str) -> Option<DatasetKind> {
        split_table_name(table_name).map(|(kind, _)| kind)
    }

    pub fn label(self) -> &'static str {
        match self {
            DatasetKind::Jcr => "JCR",
            DatasetKind::PartitionUpgraded => "中科院分区表升级版",
            DatasetKind::WarningList => "国际期刊预警名单",
            DatasetKind::CcfRecommendation => "CCF推荐目录",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Split a table name into its kind and year suffix
///
/// The year is whatever remains after the prefix; an empty remainder yields `None`.
pub fn split_table_name(table_name: &str) -> Option<(DatasetKind, Option<&str>)> {
    PREFIXES.iter().find_map(|(prefix, kind)| {
        table_name.strip_prefix(prefix).map(|rest| {
            let year = if rest.is_empty() { None } else { Some(rest) };
            (*kind, year)
        })
    })
}

/// Year suffix of a dataset table, if any
pub fn table_year(table_name: &str) -> Option<&str> {
    split_table_name(table_name).and_then(|(_, year)| year)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_table_not_classified_as_jcr() {
        assert_eq!(
            split_table_name("FQBJCR2025"),
            Some((DatasetKind::PartitionUpgraded, Some("2025")))
        );
        assert_eq!(
            split_table_name("JCR2024"),
            Some((DatasetKind::Jcr, Some("2024")))
        );
    }

    #[test]
    fn test_ccf_prefixes() {
        assert_eq!(
            split_table_name("CCFT2022"),
            Some((DatasetKind::CcfRecommendation, Some("2022")))
        );
        assert_eq!(
            split_table_name("CCF2022"),
            Some((DatasetKind::CcfRecommendation, Some("2022")))
        );
    }

    #[test]
    fn test_non_dataset_tables() {
        assert_eq!(split_table_name("sync_metadata"), None);
        assert_eq!(DatasetKind::from_table_name("settings"), None);
    }

    #[test]
    fn test_bare_prefix_has_no_year() {
        assert_eq!(
            split_table_name("GJQKYJMD"),
            Some((DatasetKind::WarningList, None))
        );
        assert_eq!(table_year("GJQKYJMD"), None);
    }

    #[test]
    fn test_table_name_round_trip() {
        for kind in DatasetKind::ALL {
            let name = kind.table_name("2023");
            assert_eq!(DatasetKind::from_table_name(&name), Some(kind));
            assert_eq!(table_year(&name), Some("2023"));
        }
    }
}
