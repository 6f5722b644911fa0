//! Wide <-> long conversion for exam results.

use log::info;
use polars::prelude::*;

use crate::error::Result;
use crate::records::{CHOLESTEROL, GLUCOSE};

pub const EXAM_TYPE: &str = "exam_type";
pub const RESULT: &str = "result";

/// Exam columns stacked into the long table.
pub const EXAM_COLUMNS: [&str; 2] = [CHOLESTEROL, GLUCOSE];

/// Unpivots `value_columns` into (`exam_type`, `result`) pairs. Every other
/// column is carried along as an identifier.
pub fn to_long(df: &DataFrame, value_columns: &[&str]) -> Result<DataFrame> {
    let id_vars: Vec<String> = df
        .get_column_names()
        .into_iter()
        .filter(|name| !value_columns.contains(name))
        .map(String::from)
        .collect();
    let value_vars: Vec<String> = value_columns.iter().map(|c| c.to_string()).collect();

    let mut long = df.melt(id_vars, value_vars)?;
    long.rename("variable", EXAM_TYPE)?;
    long.rename("value", RESULT)?;
    info!("Unpivoted {:?}: {} rows -> {} rows", value_columns, df.height(), long.height());
    Ok(long)
}

/// Pivots (`exam_type`, `result`) pairs back into one column per exam.
///
/// Rows are identified by `index`; rows sharing an index collapse into the
/// first one, so the round trip through [`to_long`] is exact only when the
/// index columns are unique per row.
pub fn to_wide(long: &DataFrame, index: &[&str], value_columns: &[&str]) -> Result<DataFrame> {
    let by: Vec<Expr> = index.iter().map(|c| col(c)).collect();
    let aggs: Vec<Expr> = value_columns
        .iter()
        .map(|name| {
            col(RESULT)
                .filter(col(EXAM_TYPE).eq(lit(*name)))
                .first()
                .alias(name)
        })
        .collect();

    let wide = long.clone().lazy().groupby_stable(by).agg(aggs).collect()?;
    info!("Pivoted {:?}: {} rows -> {} rows", value_columns, long.height(), wide.height());
    Ok(wide)
}
