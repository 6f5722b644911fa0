use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("cannot access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },
    #[error("malformed mortality row in {path:?}: {source}")]
    Record {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("{path:?} is missing expected columns {missing:?}")]
    Schema { path: PathBuf, missing: Vec<String> },
    #[error("column {column:?} has no values to bin")]
    EmptyColumn { column: String },
    #[error("unsupported file format {path:?}")]
    UnsupportedFormat { path: PathBuf },
    #[error("invalid config {path:?}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write run report {path:?}: {source}")]
    Report {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Polars(#[from] PolarsError),
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
