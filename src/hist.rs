//! Histogram binning.
//!
//! An alternative to KDE: each samples trace is binned into equal-width bins
//! over its own range and drawn as bars. Supports a fixed bin count or the
//! Sturges, Scott, and Freedman-Diaconis rules.

use tracing::debug;

use crate::error::{Error, Result};
use crate::kde::{linspace, regroup};
use crate::samples::{DensityCurve, NestedSamples, TraceData, TraceWeights};

/// Upper bound on the number of bins a trace is split into.
pub const MAX_BINS: usize = 10_000;

/// Binning strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BinStrategy {
    /// Sturges' rule: ceil(log2(n) + 1)
    #[default]
    Sturges,
    /// Scott's rule: 3.5 * std / n^(1/3)
    Scott,
    /// Freedman-Diaconis rule: 2 * IQR / n^(1/3)
    FreedmanDiaconis,
    /// Fixed number of bins
    Fixed(usize),
}

impl BinStrategy {
    /// Check a fixed bin count is usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for `Fixed(0)` or a count above
    /// [`MAX_BINS`].
    pub fn validate(self) -> Result<()> {
        match self {
            BinStrategy::Fixed(0) => Err(Error::validation("nbins must be at least 1")),
            BinStrategy::Fixed(n) if n > MAX_BINS => Err(Error::validation(format!(
                "nbins should be at most {MAX_BINS}, got {n}"
            ))),
            _ => Ok(()),
        }
    }

    /// Number of bins for `data`; always in `1..=MAX_BINS`.
    #[must_use]
    pub fn bin_count(self, data: &[f64]) -> usize {
        let n = data.len();
        if n == 0 {
            return 1;
        }
        let sturges = ((n as f64).log2().ceil() + 1.0) as usize;
        let range = data_range(data);

        match self {
            BinStrategy::Sturges => sturges,
            BinStrategy::Scott => {
                let width = 3.5 * std_dev(data) / (n as f64).cbrt();
                if width > 0.0 {
                    rule_count(range, width)
                } else {
                    sturges
                }
            }
            BinStrategy::FreedmanDiaconis => {
                let width = 2.0 * iqr(data) / (n as f64).cbrt();
                if width > 0.0 {
                    rule_count(range, width)
                } else {
                    sturges
                }
            }
            BinStrategy::Fixed(bins) => bins,
        }
        .clamp(1, MAX_BINS)
    }
}

fn rule_count(range: f64, width: f64) -> usize {
    (range / width).ceil().min(MAX_BINS as f64) as usize
}

fn data_range(data: &[f64]) -> f64 {
    crate::scale::extent(data).map_or(0.0, |(min, max)| max - min)
}

fn std_dev(data: &[f64]) -> f64 {
    if data.len() < 2 {
        return 0.0;
    }
    let mean = data.iter().sum::<f64>() / data.len() as f64;
    let variance =
        data.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (data.len() - 1) as f64;
    variance.sqrt()
}

fn iqr(data: &[f64]) -> f64 {
    if data.len() < 4 {
        return data_range(data);
    }
    let mut sorted = data.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted[3 * sorted.len() / 4] - sorted[sorted.len() / 4]
}

/// Bin one trace.
///
/// `x` holds the left bin edges and `y` the (weighted) counts, so the counts
/// sum to the number of samples (or the total weight). A constant sample is
/// binned over `[v - 0.5, v + 0.5]`.
///
/// # Errors
///
/// Returns [`Error::Validation`] for non-finite samples or weights, a
/// weights length mismatch, or an out-of-range fixed bin count.
pub fn bin_trace_samples(
    samples: &[f64],
    strategy: BinStrategy,
    weights: Option<&[f64]>,
) -> Result<DensityCurve> {
    strategy.validate()?;
    if samples.iter().any(|x| !x.is_finite()) {
        return Err(Error::validation("the samples array should not contain any infs or NaNs"));
    }
    if let Some(w) = weights {
        if w.len() != samples.len() {
            return Err(Error::validation(format!(
                "the weights array should have the same length as the samples array ({} != {})",
                w.len(),
                samples.len()
            )));
        }
        if w.iter().any(|x| !x.is_finite()) {
            return Err(Error::validation("the weights array should not contain any infs or NaNs"));
        }
    }
    let (mut lo, mut hi) =
        crate::scale::extent(samples).ok_or_else(|| Error::shape("the samples array is empty"))?;
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    let nbins = strategy.bin_count(samples);
    let n_edges =
        nbins.checked_add(1).ok_or_else(|| Error::validation("too many bins requested"))?;
    let edges = linspace(lo, hi, n_edges);
    let width = hi - lo;
    let mut counts = vec![0.0; nbins];
    for (i, &v) in samples.iter().enumerate() {
        let bin = (((v - lo) / width) * nbins as f64).floor() as usize;
        counts[bin.min(nbins - 1)] += weights.map_or(1.0, |w| w[i]);
    }

    DensityCurve::new(edges[..nbins].to_vec(), counts)
}

/// Bin every samples trace; density traces pass through.
///
/// # Errors
///
/// The first failing trace's error, located by row and trace.
pub fn bin_samples(
    samples: &NestedSamples,
    strategy: BinStrategy,
    weights: &TraceWeights,
) -> Result<NestedSamples> {
    let binned = samples
        .iter_traces()
        .map(|(i, j, t)| match t {
            TraceData::Density(curve) => Ok(TraceData::Density(curve.clone())),
            TraceData::Samples(s) => {
                let w = weights.get(i).and_then(|row| row.get(j)).and_then(|w| w.as_deref());
                bin_trace_samples(s, strategy, w).map(TraceData::Density).map_err(|e| e.at(i, j))
            }
        })
        .collect::<Result<Vec<_>>>()?;
    debug!(traces = binned.len(), ?strategy, "binned samples");
    regroup(samples, binned)
}
