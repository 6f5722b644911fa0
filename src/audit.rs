//! Read-only data quality checks, plus the opt-in de-duplication they motivate.

use log::{info, warn};
use polars::prelude::*;
use serde::Serialize;

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnNulls {
    pub column: String,
    pub nulls: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DuplicateReport {
    pub total: usize,
    pub distinct: usize,
}

impl DuplicateReport {
    pub fn duplicates(&self) -> usize {
        self.total - self.distinct
    }
}

/// Null count per column, in column order.
pub fn missing_values(df: &DataFrame) -> Vec<ColumnNulls> {
    let nulls: Vec<ColumnNulls> = df
        .get_columns()
        .iter()
        .map(|series| ColumnNulls {
            column: series.name().to_string(),
            nulls: series.null_count(),
        })
        .collect();

    let total: usize = nulls.iter().map(|c| c.nulls).sum();
    if total > 0 {
        warn!("{} missing values across {} columns", total, df.width());
    } else {
        info!("No missing values in {} columns", df.width());
    }
    nulls
}

fn subset_names(subset: Option<&[&str]>) -> Option<Vec<String>> {
    subset.map(|columns| columns.iter().map(|c| c.to_string()).collect())
}

pub fn duplicate_report(df: &DataFrame, subset: Option<&[&str]>) -> Result<DuplicateReport> {
    let distinct = drop_duplicates(df, subset)?.height();
    let report = DuplicateReport {
        total: df.height(),
        distinct,
    };
    info!(
        "{} rows, {} distinct, {} duplicated",
        report.total,
        report.distinct,
        report.duplicates()
    );
    Ok(report)
}

/// Keeps the first occurrence of each row, preserving input order.
pub fn drop_duplicates(df: &DataFrame, subset: Option<&[&str]>) -> Result<DataFrame> {
    let deduped = df
        .clone()
        .lazy()
        .unique_stable(subset_names(subset), UniqueKeepStrategy::First)
        .collect()?;
    Ok(deduped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> DataFrame {
        df!(
            "id" => &[1i64, 2, 3, 4],
            "gender" => &[Some(1i64), Some(2), Some(2), None],
            "weight" => &[70.0f64, 50.0, 50.0, 90.0]
        )
        .unwrap()
    }

    #[test]
    fn test_missing_values_counts_per_column() {
        let nulls = missing_values(&frame());
        assert_eq!(
            nulls,
            vec![
                ColumnNulls { column: "id".to_string(), nulls: 0 },
                ColumnNulls { column: "gender".to_string(), nulls: 1 },
                ColumnNulls { column: "weight".to_string(), nulls: 0 },
            ]
        );
    }

    #[test]
    fn test_duplicate_report_whole_rows() {
        let report = duplicate_report(&frame(), None).unwrap();
        assert_eq!(report, DuplicateReport { total: 4, distinct: 4 });
        assert_eq!(report.duplicates(), 0);
    }

    #[test]
    fn test_duplicate_report_subset() {
        let report = duplicate_report(&frame(), Some(&["gender", "weight"][..])).unwrap();
        assert_eq!(report.total, 4);
        assert_eq!(report.distinct, 3);
    }

    #[test]
    fn test_report_does_not_mutate() {
        let df = frame();
        duplicate_report(&df, Some(&["gender", "weight"][..])).unwrap();
        assert_eq!(df.height(), 4);
    }

    #[test]
    fn test_drop_duplicates_keeps_first_in_order() {
        let deduped = drop_duplicates(&frame(), Some(&["gender", "weight"][..])).unwrap();
        let ids: Vec<i64> = deduped.column("id").unwrap().i64().unwrap().into_no_null_iter().collect();
        assert_eq!(ids, vec![1, 2, 4]);
    }

    #[test]
    fn test_drop_duplicates_is_idempotent() {
        let df = df!(
            "a" => &[1i64, 1, 2, 2, 3],
            "b" => &["x", "x", "y", "z", "x"]
        )
        .unwrap();
        let once = drop_duplicates(&df, None).unwrap();
        let twice = drop_duplicates(&once, None).unwrap();
        assert_eq!(once.height(), 4);
        assert_eq!(twice.height(), once.height());
        assert!(twice.frame_equal(&once));
    }
}
