//! Cleaning, reshaping and mortality-join pipeline for the cardiovascular
//! disease dataset.
//!
//! [`pipeline::Pipeline`] runs the steps in order: load, audit, derive,
//! recode, filter, bucket, aggregate, join, unpivot, export. Each step is a
//! function from one table to a new one and can be called on its own.

pub mod aggregate;
pub mod audit;
pub mod bucket;
pub mod config;
pub mod error;
pub mod features;
pub mod io;
pub mod logging;
pub mod mortality;
pub mod pipeline;
pub mod query;
pub mod recode;
pub mod records;
pub mod reshape;

pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use pipeline::{Pipeline, PipelineOutput, RunReport};
