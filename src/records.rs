use polars::prelude::{DataType, Field, Schema};
use serde::{Deserialize, Serialize};

pub const ID: &str = "id";
pub const AGE_DAYS: &str = "age";
pub const GENDER: &str = "gender";
pub const HEIGHT: &str = "height";
pub const WEIGHT: &str = "weight";
pub const AP_HI: &str = "ap_hi";
pub const AP_LO: &str = "ap_lo";
pub const CHOLESTEROL: &str = "cholesterol";
pub const GLUCOSE: &str = "gluc";
pub const SMOKE: &str = "smoke";
pub const ALCOHOL: &str = "alco";
pub const ACTIVE: &str = "active";
pub const CARDIO: &str = "cardio";

// Derived
pub const AGE_YEARS: &str = "age_years";
pub const BMI: &str = "bmi";
pub const AGE_GROUP: &str = "age_group";

// Mortality
pub const LOCATION: &str = "location";
pub const YEAR: &str = "year";
pub const DEATH_RATE: &str = "death_rate";
pub const MEAN_DEATH_RATE: &str = "mean_death_rate";

/// One row of the cardiovascular disease dataset.
pub struct CardioRecord {}

impl CardioRecord {
    /// Column layout of the semicolon-delimited source file.
    pub fn raw_schema() -> Schema {
        Schema::from_iter(vec![
            Field::new(ID, DataType::Int64),
            Field::new(AGE_DAYS, DataType::Int64),
            Field::new(GENDER, DataType::Int64),
            Field::new(HEIGHT, DataType::Int64),
            Field::new(WEIGHT, DataType::Float64),
            Field::new(AP_HI, DataType::Int64),
            Field::new(AP_LO, DataType::Int64),
            Field::new(CHOLESTEROL, DataType::Int64),
            Field::new(GLUCOSE, DataType::Int64),
            Field::new(SMOKE, DataType::Int64),
            Field::new(ALCOHOL, DataType::Int64),
            Field::new(ACTIVE, DataType::Int64),
            Field::new(CARDIO, DataType::Int64),
        ])
    }

    pub fn column_names() -> [&'static str; 13] {
        [
            ID,
            AGE_DAYS,
            GENDER,
            HEIGHT,
            WEIGHT,
            AP_HI,
            AP_LO,
            CHOLESTEROL,
            GLUCOSE,
            SMOKE,
            ALCOHOL,
            ACTIVE,
            CARDIO,
        ]
    }
}

/// A row of a GBD mortality export. Columns not named here are ignored.
#[derive(Deserialize, Debug, Clone)]
pub struct MortalityRecord {
    /// Location, or SDI category for the aggregated regions
    #[serde(rename = "location_name")]
    pub location: String,

    #[serde(rename = "sex_name")]
    pub sex: String,

    /// Age band, e.g. "70+ years"
    #[serde(rename = "age_name")]
    pub age: String,

    pub year: i32,

    /// Death rate per 100,000
    #[serde(rename = "val")]
    pub value: Option<f64>,
}

/// A normalized mortality row, labelled the same way as the recoded records.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MortalityRate {
    pub location: String,
    pub year: i32,
    pub age_group: String,
    pub gender: String,
    pub death_rate: Option<f64>,
}
