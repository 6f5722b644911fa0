use std::fs::File;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::bucket::AGE_GROUP_LABELS;
use crate::error::{PipelineError, Result};

static RECORDS_PATH: &str = "data/cardio_train.csv";
static MORTALITY_SOURCES: [&str; 2] = [
    "data/mortality/IHME-GBD_2019_DATA-1.csv",
    "data/mortality/IHME-GBD_2019_DATA-2.csv",
];
static MORTALITY_OUTPUT: &str = "data/output/mortality.csv";
static OUTPUT_PATH: &str = "data/output/cardio_clean.csv";

/// File locations and step switches for a pipeline run. Every field has a
/// default, so a config file only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub records: PathBuf,
    pub mortality_sources: Vec<PathBuf>,
    pub mortality_output: PathBuf,
    pub output: PathBuf,
    pub report: Option<PathBuf>,
    pub drop_duplicates: bool,
    pub duplicate_subset: Option<Vec<String>>,
    pub age_labels: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            records: PathBuf::from(RECORDS_PATH),
            mortality_sources: MORTALITY_SOURCES.iter().map(PathBuf::from).collect(),
            mortality_output: PathBuf::from(MORTALITY_OUTPUT),
            output: PathBuf::from(OUTPUT_PATH),
            report: None,
            drop_duplicates: false,
            duplicate_subset: None,
            age_labels: AGE_GROUP_LABELS.iter().map(|l| l.to_string()).collect(),
        }
    }
}

impl PipelineConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| PipelineError::io(path, e))?;
        serde_json::from_reader(file).map_err(|source| PipelineError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}
