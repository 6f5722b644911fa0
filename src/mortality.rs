//! External mortality rates: loading the GBD exports, normalizing their labels
//! to match the recoded records, and joining them onto the profile table.

use std::fs::File;
use std::path::Path;

use log::{info, warn};
use polars::prelude::*;

use crate::error::{PipelineError, Result};
use crate::records::{
    MortalityRate, MortalityRecord, AGE_GROUP, DEATH_RATE, GENDER, LOCATION, MEAN_DEATH_RATE, YEAR,
};

/// Socio-demographic index categories kept from the source files.
pub const SDI_CATEGORIES: [&str; 5] = [
    "High SDI",
    "High-middle SDI",
    "Middle SDI",
    "Low-middle SDI",
    "Low SDI",
];

/// "70+ years" -> "70+", matching the age group labels.
pub fn normalize_age_band(age: &str) -> String {
    let age = age.trim();
    age.strip_suffix("years").unwrap_or(age).trim().to_string()
}

/// "Male" -> "male", matching the recoded gender labels.
pub fn normalize_gender(sex: &str) -> String {
    sex.trim().to_lowercase()
}

impl MortalityRecord {
    pub fn is_sdi_category(&self) -> bool {
        SDI_CATEGORIES.contains(&self.location.trim())
    }

    pub fn normalize(self) -> MortalityRate {
        MortalityRate {
            location: self.location.trim().to_string(),
            year: self.year,
            age_group: normalize_age_band(&self.age),
            gender: normalize_gender(&self.sex),
            death_rate: self.value,
        }
    }
}

/// I/O failures inside the csv reader or writer surface as I/O errors; the
/// rest are row errors.
pub(crate) fn csv_error(path: &Path, source: csv::Error) -> PipelineError {
    if !source.is_io_error() {
        return PipelineError::Record {
            path: path.to_path_buf(),
            source,
        };
    }
    match source.into_kind() {
        csv::ErrorKind::Io(e) => PipelineError::io(path, e),
        kind => PipelineError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::Other, format!("{:?}", kind)),
        ),
    }
}

/// Reads one source file, keeping only the SDI category rows.
pub fn read_mortality_file<P: AsRef<Path>>(path: P) -> Result<Vec<MortalityRate>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| PipelineError::io(path, e))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut rates = Vec::new();
    let mut skipped = 0usize;
    for result in reader.deserialize::<MortalityRecord>() {
        let record = result.map_err(|source| csv_error(path, source))?;
        if record.is_sdi_category() {
            rates.push(record.normalize());
        } else {
            skipped += 1;
        }
    }

    info!("Read {} SDI rows from {:?} ({} other locations skipped)", rates.len(), path, skipped);
    Ok(rates)
}

/// Concatenates the SDI rows of every source file, in file order.
pub fn load_mortality<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<MortalityRate>> {
    let mut rates = Vec::new();
    for path in paths {
        rates.extend(read_mortality_file(path)?);
    }
    info!("Concatenated {} mortality rows from {} files", rates.len(), paths.len());
    Ok(rates)
}

pub fn write_mortality<P: AsRef<Path>>(path: P, rates: &[MortalityRate]) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| PipelineError::io(path, e))?;
    let mut writer = csv::Writer::from_writer(file);

    for rate in rates {
        writer.serialize(rate).map_err(|source| csv_error(path, source))?;
    }
    writer.flush().map_err(|e| PipelineError::io(path, e))?;

    info!("Wrote {} mortality rows to {:?}", rates.len(), path);
    Ok(())
}

pub fn mortality_frame(rates: &[MortalityRate]) -> Result<DataFrame> {
    let df = DataFrame::new(vec![
        Series::new(LOCATION, rates.iter().map(|r| r.location.as_str()).collect::<Vec<_>>()),
        Series::new(YEAR, rates.iter().map(|r| r.year).collect::<Vec<_>>()),
        Series::new(AGE_GROUP, rates.iter().map(|r| r.age_group.as_str()).collect::<Vec<_>>()),
        Series::new(GENDER, rates.iter().map(|r| r.gender.as_str()).collect::<Vec<_>>()),
        Series::new(DEATH_RATE, rates.iter().map(|r| r.death_rate).collect::<Vec<_>>()),
    ])?;
    Ok(df)
}

/// Mean death rate per (age group, gender).
pub fn mean_rate_by_group(mortality: &DataFrame) -> Result<DataFrame> {
    let out = mortality
        .clone()
        .lazy()
        .groupby_stable([col(AGE_GROUP), col(GENDER)])
        .agg([col(DEATH_RATE).mean().alias(MEAN_DEATH_RATE)])
        .collect()?;
    Ok(out)
}

/// Attaches the mean death rate to every profile row. Profile rows are all
/// kept; those with no matching (age group, gender) get a null rate.
pub fn attach_mortality(profile: &DataFrame, rates: &DataFrame) -> Result<DataFrame> {
    let keys = [col(AGE_GROUP), col(GENDER)];
    let joined = profile
        .clone()
        .lazy()
        .join_builder()
        .with(rates.clone().lazy())
        .left_on(keys.clone())
        .right_on(keys)
        .how(JoinType::Left)
        .finish()
        .collect()?;

    let unmatched = joined.column(MEAN_DEATH_RATE)?.null_count();
    if unmatched == joined.height() && joined.height() > 0 {
        warn!("No profile row matched a mortality rate; check the age group and gender labels");
    } else if unmatched > 0 {
        warn!("{} of {} profile rows have no mortality rate", unmatched, joined.height());
    }
    info!("Joined mortality rates onto {} profile rows", joined.height());
    Ok(joined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const GBD_HEADER: &str = "measure_name,location_name,sex_name,age_name,cause_name,metric_name,year,val,upper,lower";

    #[test]
    fn test_normalize_labels() {
        assert_eq!(normalize_age_band("70+ years"), "70+");
        assert_eq!(normalize_age_band(" 15-49 years"), "15-49");
        assert_eq!(normalize_age_band("50-69"), "50-69");
        assert_eq!(normalize_gender("Female"), "female");
    }

    #[test]
    fn test_read_mortality_file_filters_sdi() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gbd.csv");
        fs::write(
            &path,
            format!(
                "{}\n\
                 Deaths,High SDI,Male,70+ years,Cardiovascular diseases,Rate,2019,2500.5,2600,2400\n\
                 Deaths,Global,Male,70+ years,Cardiovascular diseases,Rate,2019,3000,3100,2900\n\
                 Deaths,Low SDI,Female,50-69 years,Cardiovascular diseases,Rate,2019,,,\n",
                GBD_HEADER
            ),
        )
        .unwrap();

        let rates = read_mortality_file(&path).unwrap();
        assert_eq!(
            rates,
            vec![
                MortalityRate {
                    location: "High SDI".to_string(),
                    year: 2019,
                    age_group: "70+".to_string(),
                    gender: "male".to_string(),
                    death_rate: Some(2500.5),
                },
                MortalityRate {
                    location: "Low SDI".to_string(),
                    year: 2019,
                    age_group: "50-69".to_string(),
                    gender: "female".to_string(),
                    death_rate: None,
                },
            ]
        );
    }

    #[test]
    fn test_csv_io_failure_is_io_error() {
        let source = csv::Error::from(std::io::Error::new(std::io::ErrorKind::WriteZero, "disk full"));
        let err = csv_error(Path::new("mortality.csv"), source);
        assert!(matches!(err, PipelineError::Io { .. }));
    }

    #[test]
    fn test_malformed_row_is_record_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gbd.csv");
        fs::write(
            &path,
            format!("{}\nDeaths,High SDI,Male,70+ years,CVD,Rate,not-a-year,10,11,9\n", GBD_HEADER),
        )
        .unwrap();

        let err = read_mortality_file(&path).unwrap_err();
        assert!(matches!(err, PipelineError::Record { .. }));
    }

    #[test]
    fn test_read_mortality_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_mortality_file(dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, PipelineError::Io { .. }));
    }

    #[test]
    fn test_load_mortality_concatenates_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a.csv");
        let second = dir.path().join("b.csv");
        fs::write(&first, format!("{}\nDeaths,High SDI,Male,70+ years,CVD,Rate,2018,10,11,9\n", GBD_HEADER)).unwrap();
        fs::write(&second, format!("{}\nDeaths,Middle SDI,Female,5-14 years,CVD,Rate,2019,2,3,1\n", GBD_HEADER)).unwrap();

        let rates = load_mortality(&[first, second]).unwrap();
        let years: Vec<i32> = rates.iter().map(|r| r.year).collect();
        assert_eq!(years, vec![2018, 2019]);
    }

    #[test]
    fn test_write_mortality_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mortality.csv");
        let rates = vec![MortalityRate {
            location: "High SDI".to_string(),
            year: 2019,
            age_group: "70+".to_string(),
            gender: "male".to_string(),
            death_rate: Some(12.5),
        }];

        write_mortality(&path, &rates).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["location,year,age_group,gender,death_rate", "High SDI,2019,70+,male,12.5"]);
    }

    fn rates() -> DataFrame {
        let rates = vec![
            MortalityRate {
                location: "High SDI".to_string(),
                year: 2019,
                age_group: "70+".to_string(),
                gender: "male".to_string(),
                death_rate: Some(100.0),
            },
            MortalityRate {
                location: "Low SDI".to_string(),
                year: 2019,
                age_group: "70+".to_string(),
                gender: "male".to_string(),
                death_rate: Some(300.0),
            },
            MortalityRate {
                location: "Low SDI".to_string(),
                year: 2019,
                age_group: "15-49".to_string(),
                gender: "female".to_string(),
                death_rate: Some(20.0),
            },
        ];
        mean_rate_by_group(&mortality_frame(&rates).unwrap()).unwrap()
    }

    #[test]
    fn test_mean_rate_by_group() {
        let means = rates();
        assert_eq!(means.height(), 2);
        let values: Vec<f64> = means.column(MEAN_DEATH_RATE).unwrap().f64().unwrap().into_no_null_iter().collect();
        assert_eq!(values, vec![200.0, 20.0]);
    }

    #[test]
    fn test_attach_mortality_keeps_every_profile_row() {
        let profile = df!(
            "age_group" => &["70+", "5-14", "70+", "15-49"],
            "gender" => &["male", "male", "female", "female"],
            "count" => &[3u32, 1, 2, 5]
        )
        .unwrap();

        let joined = attach_mortality(&profile, &rates()).unwrap();
        assert_eq!(joined.height(), profile.height());
        let values: Vec<Option<f64>> = joined.column(MEAN_DEATH_RATE).unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(200.0), None, None, Some(20.0)]);
    }

    #[test]
    fn test_mortality_frame_empty() {
        let df = mortality_frame(&[]).unwrap();
        assert_eq!(df.height(), 0);
        assert_eq!(df.width(), 5);
    }
}
