//! Integer codes to labelled categories, using the dataset codebook.

use lazy_static::lazy_static;
use log::info;
use polars::prelude::*;

use crate::error::Result;
use crate::records::{ACTIVE, ALCOHOL, CARDIO, CHOLESTEROL, GENDER, GLUCOSE, SMOKE};

/// Fixed code -> label table. Entry order is the level order.
#[derive(Debug)]
pub struct Codebook {
    entries: Vec<(i64, &'static str)>,
}

impl Codebook {
    pub fn new(entries: &[(i64, &'static str)]) -> Self {
        Codebook {
            entries: entries.to_vec(),
        }
    }

    pub fn label(&self, code: i64) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, label)| *label)
    }

    pub fn levels(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(_, label)| *label).collect()
    }

    /// Codes missing from the table become null.
    pub fn recode(&self, column: &Series) -> PolarsResult<Series> {
        let codes = column.cast(&DataType::Int64)?;
        let labels: Vec<Option<&str>> = codes
            .i64()?
            .into_iter()
            .map(|code| code.and_then(|c| self.label(c)))
            .collect();
        Ok(Series::new(column.name(), labels))
    }
}

lazy_static! {
    pub static ref GENDER_CODES: Codebook = Codebook::new(&[(1, "female"), (2, "male")]);
    pub static ref LEVEL_CODES: Codebook =
        Codebook::new(&[(1, "normal"), (2, "above normal"), (3, "well above normal")]);
    pub static ref BINARY_CODES: Codebook = Codebook::new(&[(0, "0"), (1, "1")]);
}

/// Column -> codebook assignments applied by [`recode_categories`].
pub fn codebook_for(column: &str) -> Option<&'static Codebook> {
    match column {
        GENDER => Some(&*GENDER_CODES),
        CHOLESTEROL | GLUCOSE => Some(&*LEVEL_CODES),
        SMOKE | ALCOHOL | ACTIVE | CARDIO => Some(&*BINARY_CODES),
        _ => None,
    }
}

fn recode_lazy(
    codebook: &'static Codebook,
) -> impl Fn(Series) -> PolarsResult<Option<Series>> + Send + Sync + 'static {
    move |column| codebook.recode(&column).map(Some)
}

pub fn recode_categories(df: &DataFrame) -> Result<DataFrame> {
    let mut lf = df.clone().lazy();
    let mut recoded = Vec::new();
    for name in df.get_column_names() {
        if let Some(codebook) = codebook_for(name) {
            lf = lf.with_column(
                col(name)
                    .map(recode_lazy(codebook), GetOutput::from_type(DataType::Utf8))
                    .alias(name),
            );
            recoded.push(name);
        }
    }
    let out = lf.collect()?;
    info!("Recoded categorical columns {:?}", recoded);
    Ok(out)
}
