use log::info;
use polars::prelude::*;

use crate::error::Result;
use crate::records::{AGE_GROUP, BMI, CARDIO, CHOLESTEROL, GENDER, GLUCOSE, HEIGHT, ID, SMOKE, WEIGHT};

/// Key columns of the disease profile table.
pub const PROFILE_KEYS: [&str; 6] = [CARDIO, AGE_GROUP, GENDER, SMOKE, CHOLESTEROL, GLUCOSE];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggKind {
    Mean,
    Median,
    Count,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregation {
    pub column: String,
    pub kind: AggKind,
    pub alias: String,
}

impl Aggregation {
    pub fn new(column: &str, kind: AggKind, alias: &str) -> Self {
        Aggregation {
            column: column.to_string(),
            kind,
            alias: alias.to_string(),
        }
    }

    fn expr(&self) -> Expr {
        let column = col(&self.column);
        let agg = match self.kind {
            AggKind::Mean => column.mean(),
            AggKind::Median => column.median(),
            // Non-null values only
            AggKind::Count => column
                .is_not_null()
                .cast(DataType::UInt32)
                .sum()
                .cast(DataType::UInt32),
        };
        agg.alias(&self.alias)
    }
}

/// One row per distinct key combination, in order of first appearance.
pub fn group_aggregate(df: &DataFrame, keys: &[&str], aggs: &[Aggregation]) -> Result<DataFrame> {
    let by: Vec<Expr> = keys.iter().map(|k| col(k)).collect();
    let exprs: Vec<Expr> = aggs.iter().map(Aggregation::expr).collect();

    let out = df.clone().lazy().groupby_stable(by).agg(exprs).collect()?;
    info!("Grouped {} rows by {:?} into {} groups", df.height(), keys, out.height());
    Ok(out)
}

/// Mean body measurements and row count per disease profile.
pub fn disease_profile(df: &DataFrame) -> Result<DataFrame> {
    group_aggregate(
        df,
        &PROFILE_KEYS,
        &[
            Aggregation::new(BMI, AggKind::Mean, "mean_bmi"),
            Aggregation::new(WEIGHT, AggKind::Mean, "mean_weight"),
            Aggregation::new(HEIGHT, AggKind::Mean, "mean_height"),
            Aggregation::new(ID, AggKind::Count, "count"),
        ],
    )
}
