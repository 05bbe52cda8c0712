//! Canonical rows → traces → points structure.
//!
//! User input arrives as a ragged [`Value`]. The normalizers here check its
//! depth and promote it to the canonical three-level [`NestedSamples`]:
//! every row holds at least one trace and every trace at least one point.

use crate::error::{Error, Result};
use crate::shape::{infer_shape, Value};

/// A density estimate or user-supplied curve.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityCurve {
    /// Evaluation points.
    pub x: Vec<f64>,
    /// Density at each point.
    pub y: Vec<f64>,
}

impl DensityCurve {
    /// Create a curve from equal-length, non-empty coordinate vectors.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Shape`] if the lengths differ or are zero.
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self> {
        if x.len() != y.len() {
            return Err(Error::shape(format!(
                "density curve has {} x values but {} y values",
                x.len(),
                y.len()
            )));
        }
        if x.is_empty() {
            return Err(Error::shape("density curve has no points"));
        }
        Ok(Self { x, y })
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Whether the curve has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Scale `y` so it sums to 1 (or 100 for [`Norm::Percent`]).
    ///
    /// A curve whose `y` sums to zero is returned unchanged.
    #[must_use]
    pub fn normalized(&self, norm: Norm) -> Self {
        let total: f64 = self.y.iter().sum();
        if total == 0.0 || !total.is_finite() {
            return self.clone();
        }
        let factor = norm.scale() / total;
        Self { x: self.x.clone(), y: self.y.iter().map(|y| y * factor).collect() }
    }
}

/// How density values are rescaled before drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Norm {
    /// Each trace sums to 1.
    Probability,
    /// Each trace sums to 100.
    Percent,
}

impl Norm {
    fn scale(self) -> f64 {
        match self {
            Norm::Probability => 1.0,
            Norm::Percent => 100.0,
        }
    }
}

impl std::str::FromStr for Norm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "probability" => Ok(Norm::Probability),
            "percent" => Ok(Norm::Percent),
            _ => Err(Error::validation(format!(
                "invalid normalisation option {s:?}, expected \"percent\" or \"probability\""
            ))),
        }
    }
}

/// One trace's data: raw draws or a finished curve.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceData {
    /// Raw samples from one distribution.
    Samples(Vec<f64>),
    /// A precomputed density curve.
    Density(DensityCurve),
}

impl TraceData {
    /// Number of points (samples, or curve points).
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            TraceData::Samples(s) => s.len(),
            TraceData::Density(c) => c.len(),
        }
    }

    /// Whether the trace has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn to_value(&self) -> Value {
        match self {
            TraceData::Samples(s) => Value::from(s.as_slice()),
            TraceData::Density(c) => {
                Value::Seq(vec![Value::from(c.x.as_slice()), Value::from(c.y.as_slice())])
            }
        }
    }
}

/// Rows → traces → [`TraceData`], ragged.
#[derive(Debug, Clone, PartialEq)]
pub struct NestedSamples {
    rows: Vec<Vec<TraceData>>,
}

impl NestedSamples {
    /// Validate and wrap canonical rows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Shape`] for no rows, a row with no traces, or a trace
    /// with no points.
    pub fn from_rows(rows: Vec<Vec<TraceData>>) -> Result<Self> {
        if rows.is_empty() {
            return Err(Error::shape("no rows were given"));
        }
        for (i, row) in rows.iter().enumerate() {
            if row.is_empty() {
                return Err(Error::shape(format!("row {i} has no traces")));
            }
            for (j, trace) in row.iter().enumerate() {
                if trace.is_empty() {
                    return Err(Error::shape(format!("row {i}, trace {j} has no points")));
                }
            }
        }
        Ok(Self { rows })
    }

    /// The rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<TraceData>] {
        &self.rows
    }

    /// Consume into the rows.
    #[must_use]
    pub fn into_rows(self) -> Vec<Vec<TraceData>> {
        self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Total number of traces over all rows.
    #[must_use]
    pub fn n_traces(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    /// Largest number of traces in any row.
    #[must_use]
    pub fn max_traces_per_row(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// `(row, trace_in_row, data)` for every trace, in order.
    pub fn iter_traces(&self) -> impl Iterator<Item = (usize, usize, &TraceData)> {
        self.rows
            .iter()
            .enumerate()
            .flat_map(|(i, row)| row.iter().enumerate().map(move |(j, t)| (i, j, t)))
    }

    /// Whether any trace is a precomputed density.
    #[must_use]
    pub fn has_densities(&self) -> bool {
        self.iter_traces().any(|(_, _, t)| matches!(t, TraceData::Density(_)))
    }

    /// Back to the canonical ragged value (depth 3 for samples, 4 for densities).
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Seq(
            self.rows
                .iter()
                .map(|row| Value::Seq(row.iter().map(TraceData::to_value).collect()))
                .collect(),
        )
    }
}

impl TryFrom<Vec<Vec<f64>>> for NestedSamples {
    type Error = Error;

    /// One single-trace row per inner vector.
    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self> {
        Self::from_rows(rows.into_iter().map(|r| vec![TraceData::Samples(r)]).collect())
    }
}

impl TryFrom<Vec<Vec<Vec<f64>>>> for NestedSamples {
    type Error = Error;

    fn try_from(rows: Vec<Vec<Vec<f64>>>) -> Result<Self> {
        Self::from_rows(
            rows.into_iter()
                .map(|row| row.into_iter().map(TraceData::Samples).collect())
                .collect(),
        )
    }
}

fn rows_of(value: &Value) -> &[Value] {
    value.as_seq().unwrap_or_default()
}

fn numbers(value: &Value, row: usize, trace: usize) -> Result<Vec<f64>> {
    value.to_numbers().ok_or_else(|| {
        Error::shape(format!("row {row}, trace {trace} must be a sequence of numbers"))
    })
}

fn density_pair(value: &Value, row: usize, trace: usize) -> Result<DensityCurve> {
    let pair = match value.as_seq() {
        Some(pair) if pair.len() == 2 => pair,
        _ => {
            return Err(Error::shape(format!(
                "row {row}, trace {trace}: a density trace must be an [x, y] pair"
            )))
        }
    };
    let x = numbers(&pair[0], row, trace)?;
    let y = numbers(&pair[1], row, trace)?;
    DensityCurve::new(x, y).map_err(|e| match e {
        Error::Shape(msg) => Error::shape(format!("row {row}, trace {trace}: {msg}")),
        other => other,
    })
}

/// Normalize raw samples into [`NestedSamples`].
///
/// Depth 2 (rows of numbers) becomes one trace per row; depth 3 passes
/// through.
///
/// # Errors
///
/// Returns [`Error::Shape`] for any other depth, inconsistent element
/// types, empty rows, or empty traces.
pub fn normalize_samples(value: &Value) -> Result<NestedSamples> {
    let shape = infer_shape(value)?;
    let rows = match shape.depth() {
        2 => rows_of(value)
            .iter()
            .enumerate()
            .map(|(i, row)| Ok(vec![TraceData::Samples(numbers(row, i, 0)?)]))
            .collect::<Result<Vec<_>>>()?,
        3 => rows_of(value)
            .iter()
            .enumerate()
            .map(|(i, row)| {
                rows_of(row)
                    .iter()
                    .enumerate()
                    .map(|(j, trace)| Ok(TraceData::Samples(numbers(trace, i, j)?)))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?,
        1 if rows_of(value).is_empty() => return Err(Error::shape("no rows were given")),
        depth => {
            return Err(Error::shape(format!(
                "expected samples nested 2 or 3 levels deep, got {depth} (shape {shape})"
            )))
        }
    };
    NestedSamples::from_rows(rows)
}

/// Normalize precomputed densities into [`NestedSamples`].
///
/// A density trace is an `[xs, ys]` pair. Depth 3 (rows of pairs) becomes
/// one trace per row; depth 4 passes through.
///
/// # Errors
///
/// Returns [`Error::Shape`] for any other depth, a trace that is not a pair
/// of equal-length numeric sequences, or empty rows.
pub fn normalize_densities(value: &Value) -> Result<NestedSamples> {
    let shape = infer_shape(value)?;
    let rows = match shape.depth() {
        3 => rows_of(value)
            .iter()
            .enumerate()
            .map(|(i, pair)| Ok(vec![TraceData::Density(density_pair(pair, i, 0)?)]))
            .collect::<Result<Vec<_>>>()?,
        4 => rows_of(value)
            .iter()
            .enumerate()
            .map(|(i, row)| {
                rows_of(row)
                    .iter()
                    .enumerate()
                    .map(|(j, pair)| Ok(TraceData::Density(density_pair(pair, i, j)?)))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?,
        1 if rows_of(value).is_empty() => return Err(Error::shape("no rows were given")),
        depth => {
            return Err(Error::shape(format!(
                "expected densities nested 3 or 4 levels deep, got {depth} (shape {shape})"
            )))
        }
    };
    NestedSamples::from_rows(rows)
}

/// Optional per-sample weights.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SampleWeights {
    /// Uniform weights.
    #[default]
    None,
    /// One weights vector used for every trace.
    Shared(Vec<f64>),
    /// Weights mirroring the samples.
    ///
    /// Depth 2 gives one weights vector per row, applied to every trace in
    /// it. Depth 3 gives one per trace; a row with a single entry is
    /// broadcast to all of that row's traces. Every weights vector must match
    /// its trace point for point; use [`SampleWeights::None`] for uniform
    /// weights.
    PerTrace(Value),
}

/// Per-trace weights, `None` for uniform.
pub type TraceWeights = Vec<Vec<Option<Vec<f64>>>>;

/// Expand `weights` to one entry per trace of `samples`.
///
/// # Errors
///
/// Returns [`Error::Shape`] naming the row (and trace) when the weights do
/// not line up with the samples.
pub fn normalize_weights(weights: &SampleWeights, samples: &NestedSamples) -> Result<TraceWeights> {
    let per_row: Vec<Vec<Option<Vec<f64>>>> = match weights {
        SampleWeights::None => {
            return Ok(samples.rows().iter().map(|row| vec![None; row.len()]).collect())
        }
        SampleWeights::Shared(w) => {
            samples.rows().iter().map(|_| vec![Some(w.clone())]).collect()
        }
        SampleWeights::PerTrace(value) => {
            let shape = infer_shape(value)?;
            match shape.depth() {
                2 => rows_of(value)
                    .iter()
                    .enumerate()
                    .map(|(i, row)| Ok(vec![Some(numbers(row, i, 0)?)]))
                    .collect::<Result<_>>()?,
                3 => rows_of(value)
                    .iter()
                    .enumerate()
                    .map(|(i, row)| {
                        rows_of(row)
                            .iter()
                            .enumerate()
                            .map(|(j, t)| Ok(Some(numbers(t, i, j)?)))
                            .collect::<Result<Vec<_>>>()
                    })
                    .collect::<Result<_>>()?,
                depth => {
                    return Err(Error::shape(format!(
                        "expected sample weights nested 2 or 3 levels deep, got {depth}"
                    )))
                }
            }
        }
    };

    if per_row.len() != samples.n_rows() {
        return Err(Error::shape(format!(
            "got sample weights for {} rows but there are {} rows",
            per_row.len(),
            samples.n_rows()
        )));
    }

    samples
        .rows()
        .iter()
        .zip(per_row)
        .enumerate()
        .map(|(i, (row, row_weights))| {
            let row_weights = match row_weights.len() {
                n if n == row.len() => row_weights,
                1 => vec![row_weights[0].clone(); row.len()],
                n => {
                    return Err(Error::shape(format!(
                        "mismatch between number of traces ({}) and number of sample weights \
                         ({n}) for row {i}",
                        row.len()
                    )))
                }
            };
            for (j, (trace, w)) in row.iter().zip(&row_weights).enumerate() {
                if let Some(w) = w {
                    if w.len() != trace.len() {
                        return Err(Error::shape(format!(
                            "row {i}, trace {j}: {} weights for {} samples",
                            w.len(),
                            trace.len()
                        )));
                    }
                }
            }
            Ok(row_weights)
        })
        .collect()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn normalizer_is_idempotent(
            rows in prop::collection::vec(
                prop::collection::vec(prop::collection::vec(-100.0..100.0f64, 1..20), 1..4),
                1..6,
            ),
        ) {
            let once = normalize_samples(&Value::from(rows)).expect("valid input");
            let twice = normalize_samples(&once.to_value()).expect("canonical input");
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn percent_sums_to_hundred(y in prop::collection::vec(0.01..10.0f64, 1..50)) {
            let x: Vec<f64> = (0..y.len()).map(|i| i as f64).collect();
            let curve = DensityCurve::new(x, y).expect("valid");
            let total: f64 = curve.normalized(Norm::Percent).y.iter().sum();
            prop_assert!((total - 100.0).abs() < 1e-9);
        }
    }
}
