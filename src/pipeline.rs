//! The cleaning, reshaping and export run, start to finish.
//!
//! Steps run in a fixed order, each reading the previous table and producing a
//! new one. The first failing step aborts the run.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use log::{debug, info};
use polars::prelude::*;
use serde::Serialize;
use sysinfo::{get_current_pid, ProcessExt, System, SystemExt};

use crate::aggregate::disease_profile;
use crate::audit::{drop_duplicates, duplicate_report, missing_values, ColumnNulls, DuplicateReport};
use crate::bucket::bucket_equal_width;
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::features::{derive_age_years, derive_bmi};
use crate::io::{export_table, load_records};
use crate::mortality::{attach_mortality, load_mortality, mean_rate_by_group, mortality_frame};
use crate::query::Query;
use crate::records::{MortalityRate, AGE_GROUP, AGE_YEARS, BMI, MEAN_DEATH_RATE};
use crate::recode::recode_categories;
use crate::reshape::{to_long, EXAM_COLUMNS};

/// BMI above which a record counts as obese.
pub const OBESITY_BMI: f64 = 30.0;

/// Resident memory of this process in bytes, 0 when it cannot be read.
pub fn monitor_memory() -> u64 {
    let pid = match get_current_pid() {
        Ok(pid) => pid,
        Err(_) => return 0,
    };
    let mut sys = System::new();
    sys.refresh_process(pid);
    sys.process(pid).map(|p| p.memory()).unwrap_or(0)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub input_rows: usize,
    pub null_counts: Vec<ColumnNulls>,
    pub duplicates: DuplicateReport,
    pub rows_after_dedup: usize,
    pub obese_rows: usize,
    pub age_bin_edges: Vec<f64>,
    pub profile_groups: usize,
    pub mortality_rows: usize,
    pub joined_rows: usize,
    pub unmatched_rows: usize,
    pub long_rows: usize,
    pub output: Option<PathBuf>,
    pub elapsed_ms: u64,
    pub memory_bytes: u64,
}

/// Every named table a run produces, plus its report.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub records: DataFrame,
    pub obese: DataFrame,
    pub profile: DataFrame,
    pub mortality: DataFrame,
    pub joined: DataFrame,
    pub long: DataFrame,
    pub report: RunReport,
}

/// Serializes the report as pretty JSON. `path` only labels the error.
pub fn write_report<W: Write>(writer: W, path: &Path, report: &RunReport) -> Result<()> {
    serde_json::to_writer_pretty(writer, report).map_err(|source| PipelineError::Report {
        path: path.to_path_buf(),
        source,
    })
}

pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Pipeline { config }
    }

    /// Loads the inputs, transforms them and writes the final table (and the
    /// report, when configured).
    pub fn run(&self) -> Result<PipelineOutput> {
        let start_time = Instant::now();
        let start_memory = monitor_memory();

        let records = load_records(&self.config.records)?;
        let mortality = load_mortality(&self.config.mortality_sources)?;
        let mut output = self.transform(&records, &mortality)?;

        let written = export_table(&self.config.output, &output.long)?;
        output.report.output = Some(written);
        output.report.elapsed_ms = start_time.elapsed().as_millis() as u64;
        output.report.memory_bytes = monitor_memory().saturating_sub(start_memory);

        if let Some(path) = &self.config.report {
            let file = File::create(path).map_err(|e| PipelineError::io(path, e))?;
            write_report(file, path, &output.report)?;
            info!("Wrote run report to {:?}", path);
        }

        info!(
            "Pipeline finished in {:?}, memory grew by {} bytes",
            start_time.elapsed(),
            output.report.memory_bytes
        );
        Ok(output)
    }

    /// The in-memory steps, from the raw record table to the long-format table.
    pub fn transform(&self, records: &DataFrame, mortality: &[MortalityRate]) -> Result<PipelineOutput> {
        let input_rows = records.height();
        let null_counts = missing_values(records);

        let subset: Option<Vec<&str>> = self
            .config
            .duplicate_subset
            .as_ref()
            .map(|columns| columns.iter().map(String::as_str).collect());
        let duplicates = duplicate_report(records, subset.as_deref())?;
        let records = if self.config.drop_duplicates {
            drop_duplicates(records, subset.as_deref())?
        } else {
            records.clone()
        };
        info!("{} rows after de-duplication step", records.height());

        let records = derive_age_years(&records)?;
        let records = derive_bmi(&records)?;
        let records = recode_categories(&records)?;

        let obese = Query::new()
            .filter(col(BMI).gt(lit(OBESITY_BMI)))
            .sort_by(AGE_YEARS, true)
            .apply(&records)?;
        info!("{} rows with {} > {}", obese.height(), BMI, OBESITY_BMI);
        debug!("{}", obese.head(Some(5)));

        let labels: Vec<&str> = self.config.age_labels.iter().map(String::as_str).collect();
        let (records, edges) = bucket_equal_width(&records, AGE_YEARS, &labels, AGE_GROUP)?;

        let profile = disease_profile(&records)?;
        debug!("{}", profile.head(Some(5)));

        let mortality = mortality_frame(mortality)?;
        let rates = mean_rate_by_group(&mortality)?;
        let joined = attach_mortality(&profile, &rates)?;
        let unmatched_rows = joined.column(MEAN_DEATH_RATE)?.null_count();

        let long = to_long(&joined, &EXAM_COLUMNS)?;
        debug!("{}", long.head(Some(5)));

        let report = RunReport {
            input_rows,
            null_counts,
            duplicates,
            rows_after_dedup: records.height(),
            obese_rows: obese.height(),
            age_bin_edges: edges.edges().to_vec(),
            profile_groups: profile.height(),
            mortality_rows: mortality.height(),
            joined_rows: joined.height(),
            unmatched_rows,
            long_rows: long.height(),
            output: None,
            elapsed_ms: 0,
            memory_bytes: 0,
        };

        Ok(PipelineOutput {
            records,
            obese,
            profile,
            mortality,
            joined,
            long,
            report,
        })
    }
}
