//! Row filtering, column projection and sorting over a table.

use log::info;
use polars::prelude::*;

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub column: String,
    pub descending: bool,
}

/// A filter / select / sort applied in that order. Sorting happens before the
/// projection so sort keys do not have to be selected.
#[derive(Debug, Clone, Default)]
pub struct Query {
    predicates: Vec<Expr>,
    columns: Vec<String>,
    sort: Vec<SortKey>,
}

impl Query {
    pub fn new() -> Self {
        Query::default()
    }

    /// Adds a predicate; all predicates must hold. Rows where a predicate is
    /// null are dropped.
    pub fn filter(mut self, predicate: Expr) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn select(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn sort_by(mut self, column: &str, descending: bool) -> Self {
        self.sort.push(SortKey {
            column: column.to_string(),
            descending,
        });
        self
    }

    pub fn apply(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut lf = df.clone().lazy();
        if let Some(predicate) = self.predicates.iter().cloned().reduce(|a, b| a.and(b)) {
            lf = lf.filter(predicate);
        }
        let mut out = lf.collect()?;

        if !self.sort.is_empty() {
            let by: Vec<&str> = self.sort.iter().map(|k| k.column.as_str()).collect();
            let descending: Vec<bool> = self.sort.iter().map(|k| k.descending).collect();
            out = out.sort(by, descending)?;
        }
        if !self.columns.is_empty() {
            out = out.select(&self.columns)?;
        }

        info!("Query kept {} of {} rows", out.height(), df.height());
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> DataFrame {
        df!(
            "id" => &[0i64, 1, 2, 3, 4],
            "age_years" => &[50i64, 61, 50, 44, 61],
            "bmi" => &[Some(31.2f64), Some(22.0), None, Some(35.0), Some(30.5)]
        )
        .unwrap()
    }

    fn ids(df: &DataFrame) -> Vec<i64> {
        df.column("id").unwrap().i64().unwrap().into_no_null_iter().collect()
    }

    #[test]
    fn test_filter_excludes_nulls() {
        let out = Query::new().filter(col("bmi").gt(lit(30.0))).apply(&frame()).unwrap();
        assert_eq!(ids(&out), vec![0, 3, 4]);
    }

    #[test]
    fn test_filter_conjunction() {
        let out = Query::new()
            .filter(col("bmi").gt(lit(30.0)))
            .filter(col("age_years").gt_eq(lit(50i64)))
            .apply(&frame())
            .unwrap();
        assert_eq!(ids(&out), vec![0, 4]);
    }

    #[test]
    fn test_stable_descending_sort() {
        let out = Query::new().sort_by("age_years", true).apply(&frame()).unwrap();
        assert_eq!(ids(&out), vec![1, 4, 0, 2, 3]);
    }

    #[test]
    fn test_descending_sort_keeps_tie_order() {
        let row_ids: Vec<i64> = (0..10_000).collect();
        let keys: Vec<i64> = row_ids.iter().map(|i| i % 7).collect();
        let df = df!("id" => &row_ids, "age_years" => &keys).unwrap();

        let out = Query::new().sort_by("age_years", true).apply(&df).unwrap();
        let sorted_keys: Vec<i64> = out.column("age_years").unwrap().i64().unwrap().into_no_null_iter().collect();
        let sorted_ids = ids(&out);
        for (k, i) in sorted_keys.windows(2).zip(sorted_ids.windows(2)) {
            assert!(k[0] >= k[1]);
            if k[0] == k[1] {
                assert!(i[0] < i[1]);
            }
        }
    }

    #[test]
    fn test_multi_key_sort_and_projection() {
        let out = Query::new()
            .sort_by("age_years", false)
            .sort_by("id", true)
            .select(&["id"])
            .apply(&frame())
            .unwrap();
        assert_eq!(out.width(), 1);
        assert_eq!(ids(&out), vec![3, 2, 0, 4, 1]);
    }
}
