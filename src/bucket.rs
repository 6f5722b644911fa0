//! Equal-width binning of a numeric column into labelled groups.
//!
//! Edges come from the observed range of the column while labels are handed in
//! by the caller, so the labels only describe the bins if the caller picked
//! them with that range in mind. The edges are logged next to the labels so the
//! two can be compared; nothing reconciles them.

use std::fmt;

use log::{debug, info, warn};
use polars::prelude::*;

use crate::error::{PipelineError, Result};

/// Labels for the age bands used by the mortality source.
pub const AGE_GROUP_LABELS: [&str; 4] = ["5-14", "15-49", "50-69", "70+"];

/// Share of the range the lowest edge is pushed down by, so the minimum
/// falls inside the first right-closed interval.
const EDGE_ADJUST: f64 = 0.001;

#[derive(Debug, Clone, PartialEq)]
pub struct BinEdges(Vec<f64>);

impl BinEdges {
    /// `bins + 1` edges splitting `[min, max]` into equal-width intervals.
    pub fn equal_width(min: f64, max: f64, bins: usize) -> BinEdges {
        let (mut lo, mut hi) = (min, max);
        if lo == hi {
            let pad = if lo == 0.0 { EDGE_ADJUST } else { lo.abs() * EDGE_ADJUST };
            lo -= pad;
            hi += pad;
        }
        let width = (hi - lo) / bins as f64;
        let mut edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();
        edges[bins] = hi;
        if min != max {
            edges[0] -= (hi - lo) * EDGE_ADJUST;
        }
        BinEdges(edges)
    }

    pub fn edges(&self) -> &[f64] {
        &self.0
    }

    pub fn bins(&self) -> usize {
        self.0.len() - 1
    }

    /// Index of the right-closed interval holding `value`.
    pub fn bin_of(&self, value: f64) -> Option<usize> {
        if value <= self.0[0] || value > self.0[self.bins()] {
            return None;
        }
        self.0[1..].iter().position(|edge| value <= *edge)
    }
}

impl fmt::Display for BinEdges {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let intervals: Vec<String> = self
            .0
            .windows(2)
            .map(|w| format!("({:.3}, {:.3}]", w[0], w[1]))
            .collect();
        write!(f, "{}", intervals.join(" "))
    }
}

fn bucket_series(column: &Series, edges: &BinEdges, labels: &[&str], name: &str) -> PolarsResult<Series> {
    let values = column.cast(&DataType::Float64)?;
    let buckets: Vec<Option<&str>> = values
        .f64()?
        .into_iter()
        .map(|v| v.and_then(|v| edges.bin_of(v)).map(|i| labels[i]))
        .collect();
    Ok(Series::new(name, buckets))
}

/// Splits `column` into `labels.len()` equal-width bins and adds the label of
/// each row's bin as `name`. Nulls stay null.
pub fn bucket_equal_width(
    df: &DataFrame,
    column: &str,
    labels: &[&str],
    name: &str,
) -> Result<(DataFrame, BinEdges)> {
    let series = df.column(column)?;
    let (min, max) = match (series.min::<f64>(), series.max::<f64>()) {
        (Some(min), Some(max)) if !labels.is_empty() => (min, max),
        _ => {
            return Err(PipelineError::EmptyColumn {
                column: column.to_string(),
            })
        }
    };

    let edges = BinEdges::equal_width(min, max, labels.len());
    for (label, interval) in labels.iter().zip(edges.edges().windows(2)) {
        debug!("{} <- ({:.3}, {:.3}]", label, interval[0], interval[1]);
    }
    warn!(
        "{} labels {:?} are fixed but the bins {} come from the data range; check they agree",
        name, labels, edges
    );

    let mut out = df.clone();
    out.with_column(bucket_series(series, &edges, labels, name)?)?;
    info!("Bucketed {} into {} bins as {}", column, edges.bins(), name);
    Ok((out, edges))
}
