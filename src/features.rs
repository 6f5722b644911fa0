use log::info;
use polars::prelude::*;

use crate::error::Result;
use crate::records::{AGE_DAYS, AGE_YEARS, BMI, HEIGHT, WEIGHT};

pub const DAYS_PER_YEAR: f64 = 365.25;

/// Adds `age_years`, the age in days converted to whole years.
///
/// Integer day counts never land on a half year, so the rounding mode
/// does not matter here.
pub fn derive_age_years(df: &DataFrame) -> Result<DataFrame> {
    let out = df
        .clone()
        .lazy()
        .with_column(
            (col(AGE_DAYS).cast(DataType::Float64) / lit(DAYS_PER_YEAR))
                .round(0)
                .cast(DataType::Int64)
                .alias(AGE_YEARS),
        )
        .collect()?;
    info!("Derived {} for {} rows", AGE_YEARS, out.height());
    Ok(out)
}

/// Adds `bmi` = weight (kg) / height (m) squared.
pub fn derive_bmi(df: &DataFrame) -> Result<DataFrame> {
    let height_m = col(HEIGHT).cast(DataType::Float64) / lit(100.0);
    let out = df
        .clone()
        .lazy()
        .with_column((col(WEIGHT).cast(DataType::Float64) / (height_m.clone() * height_m)).alias(BMI))
        .collect()?;
    info!("Derived {} for {} rows", BMI, out.height());
    Ok(out)
}
