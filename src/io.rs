//! Flat-file reading and writing.
//!
//! Handles are opened right before each read or write and dropped when the call returns.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info};
use polars::prelude::*;
use polars_io::parquet::{ParquetReader, ParquetWriter};

use crate::error::{PipelineError, Result};
use crate::records::CardioRecord;

pub const RECORD_DELIMITER: u8 = b';';
pub const EXPORT_DELIMITER: u8 = b',';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Parquet,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Result<FileFormat> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Ok(FileFormat::Csv),
            Some(ext) if ext.eq_ignore_ascii_case("parquet") => Ok(FileFormat::Parquet),
            _ => Err(PipelineError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| PipelineError::io(path, e))
}

fn create(path: &Path) -> Result<File> {
    File::create(path).map_err(|e| PipelineError::io(path, e))
}

fn parse_error(path: &Path) -> impl FnOnce(PolarsError) -> PipelineError {
    let path = path.to_path_buf();
    move |source| PipelineError::Parse { path, source }
}

pub fn read_csv<P: AsRef<Path>>(path: P, delimiter: u8, schema: Schema) -> Result<DataFrame> {
    let path = path.as_ref();
    let file = open(path)?;

    CsvReader::new(file)
        .has_header(true)
        .with_delimiter(delimiter)
        .with_dtypes(Option::from(Arc::new(schema)))
        .finish()
        .map_err(parse_error(path))
}

pub fn read_parquet<P: AsRef<Path>>(path: P) -> Result<DataFrame> {
    let path = path.as_ref();
    let file = open(path)?;

    ParquetReader::new(file).finish().map_err(parse_error(path))
}

pub fn write_csv<P: AsRef<Path>>(path: P, df: &mut DataFrame) -> Result<()> {
    let path = path.as_ref();
    let mut file = create(path)?;

    CsvWriter::new(&mut file)
        .has_header(true)
        .with_delimiter(EXPORT_DELIMITER)
        .finish(df)?;

    Ok(())
}

pub fn write_parquet<P: AsRef<Path>>(path: P, df: &mut DataFrame) -> Result<()> {
    let path = path.as_ref();
    let mut file = create(path)?;

    ParquetWriter::new(&mut file).finish(df)?;

    Ok(())
}

/// Loads the record table and checks that every expected column came through.
///
/// A wrong delimiter shows up here as a single mangled column, so it is
/// reported as a schema error rather than passing silently.
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<DataFrame> {
    let path = path.as_ref();
    let df = match FileFormat::from_path(path) {
        Ok(FileFormat::Parquet) => read_parquet(path)?,
        // The source ships as .csv but anything delimited is accepted.
        _ => read_csv(path, RECORD_DELIMITER, CardioRecord::raw_schema())?,
    };

    let present = df.get_column_names();
    let missing: Vec<String> = CardioRecord::column_names()
        .iter()
        .filter(|name| !present.contains(*name))
        .map(|name| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(PipelineError::Schema {
            path: path.to_path_buf(),
            missing,
        });
    }

    info!("Loaded {} rows x {} columns from {:?}", df.height(), df.width(), path);
    debug!("{}", df.head(Some(5)));
    Ok(df)
}

/// Writes `df` to `path` in the format named by its extension.
pub fn export_table<P: AsRef<Path>>(path: P, df: &DataFrame) -> Result<PathBuf> {
    let path = path.as_ref();
    let format = FileFormat::from_path(path)?;
    let mut df = df.clone();

    match format {
        FileFormat::Csv => write_csv(path, &mut df)?,
        FileFormat::Parquet => write_parquet(path, &mut df)?,
    }

    info!("Wrote {} rows to {:?}", df.height(), path);
    Ok(path.to_path_buf())
}
