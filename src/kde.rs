//! Kernel density estimation.
//!
//! Each samples trace becomes a [`DensityCurve`] evaluated at either `n`
//! evenly spaced points over the sample range or a caller-supplied grid.
//! Precomputed density traces pass through untouched.

use std::f64::consts::PI;
use std::str::FromStr;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::samples::{DensityCurve, NestedSamples, TraceData, TraceWeights};

/// Default number of evaluation points per trace.
pub const DEFAULT_KDE_POINTS: usize = 500;

/// Smoothing kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Kernel {
    /// Standard normal density.
    #[default]
    Gaussian,
    /// `3/4 (1 - u²)` on `[-1, 1]`.
    Epanechnikov,
    /// `15/16 (1 - u²)²` on `[-1, 1]`.
    Biweight,
    /// `35/32 (1 - u²)³` on `[-1, 1]`.
    Triweight,
    /// `1/2` on `[-1, 1]`.
    Uniform,
    /// `1 - |u|` on `[-1, 1]`.
    Triangular,
    /// `π/4 cos(πu/2)` on `[-1, 1]`.
    Cosine,
}

impl Kernel {
    /// Kernel value at `u`.
    #[must_use]
    pub fn evaluate(self, u: f64) -> f64 {
        if self != Kernel::Gaussian && u.abs() > 1.0 {
            return 0.0;
        }
        let s = 1.0 - u * u;
        match self {
            Kernel::Gaussian => (-0.5 * u * u).exp() / (2.0 * PI).sqrt(),
            Kernel::Epanechnikov => 0.75 * s,
            Kernel::Biweight => 15.0 / 16.0 * s * s,
            Kernel::Triweight => 35.0 / 32.0 * s * s * s,
            Kernel::Uniform => 0.5,
            Kernel::Triangular => 1.0 - u.abs(),
            Kernel::Cosine => PI / 4.0 * (PI * u / 2.0).cos(),
        }
    }

    /// `∫ K(u)² du`.
    fn roughness(self) -> f64 {
        match self {
            Kernel::Gaussian => 1.0 / (2.0 * PI.sqrt()),
            Kernel::Epanechnikov => 3.0 / 5.0,
            Kernel::Biweight => 5.0 / 7.0,
            Kernel::Triweight => 350.0 / 429.0,
            Kernel::Uniform => 0.5,
            Kernel::Triangular => 2.0 / 3.0,
            Kernel::Cosine => PI * PI / 16.0,
        }
    }

    /// `∫ u² K(u) du`.
    fn second_moment(self) -> f64 {
        match self {
            Kernel::Gaussian => 1.0,
            Kernel::Epanechnikov => 1.0 / 5.0,
            Kernel::Biweight => 1.0 / 7.0,
            Kernel::Triweight => 1.0 / 9.0,
            Kernel::Uniform => 1.0 / 3.0,
            Kernel::Triangular => 1.0 / 6.0,
            Kernel::Cosine => 1.0 - 8.0 / (PI * PI),
        }
    }

    /// Rule-of-thumb constant `(8√π R(K) / 3κ₂²)^(1/5)`; about 1.059 for the
    /// Gaussian kernel.
    #[must_use]
    pub fn normal_reference_constant(self) -> f64 {
        let k2 = self.second_moment();
        (8.0 * PI.sqrt() * self.roughness() / (3.0 * k2 * k2)).powf(0.2)
    }
}

impl FromStr for Kernel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gau" | "gaussian" => Ok(Kernel::Gaussian),
            "epa" | "epanechnikov" => Ok(Kernel::Epanechnikov),
            "biw" | "biweight" => Ok(Kernel::Biweight),
            "triw" | "triweight" => Ok(Kernel::Triweight),
            "uni" | "uniform" => Ok(Kernel::Uniform),
            "tri" | "triangular" => Ok(Kernel::Triangular),
            "cos" | "cosine" => Ok(Kernel::Cosine),
            _ => Err(Error::validation(format!("unknown kernel {s:?}"))),
        }
    }
}

/// Bandwidth selection.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Bandwidth {
    /// `C_k · A · n^(-1/5)` with the kernel's own constant.
    #[default]
    NormalReference,
    /// `1.059 · A · n^(-1/5)`.
    Scott,
    /// `0.9 · A · n^(-1/5)`.
    Silverman,
    /// A fixed positive bandwidth.
    Fixed(f64),
}

impl FromStr for Bandwidth {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal_reference" => Ok(Bandwidth::NormalReference),
            "scott" => Ok(Bandwidth::Scott),
            "silverman" => Ok(Bandwidth::Silverman),
            other => other
                .parse::<f64>()
                .map(Bandwidth::Fixed)
                .map_err(|_| Error::validation(format!("unknown bandwidth rule {s:?}"))),
        }
    }
}

/// Where each density is evaluated.
#[derive(Debug, Clone, PartialEq)]
pub enum KdePoints {
    /// This many evenly spaced points over each trace's own sample range.
    Count(usize),
    /// The same explicit grid for every trace.
    Explicit(Vec<f64>),
}

impl Default for KdePoints {
    fn default() -> Self {
        KdePoints::Count(DEFAULT_KDE_POINTS)
    }
}

impl KdePoints {
    /// Check the grid is usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a zero count or an empty or
    /// non-finite explicit grid.
    pub fn validate(&self) -> Result<()> {
        match self {
            KdePoints::Count(0) => Err(Error::validation("kde_points must be at least 1")),
            KdePoints::Explicit(xs) if xs.is_empty() => {
                Err(Error::validation("kde_points must not be empty"))
            }
            KdePoints::Explicit(xs) if xs.iter().any(|x| !x.is_finite()) => {
                Err(Error::validation("kde_points must all be finite"))
            }
            _ => Ok(()),
        }
    }
}

/// Density estimation settings.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KdeOptions {
    /// Evaluation grid.
    pub points: KdePoints,
    /// Smoothing kernel.
    pub kernel: Kernel,
    /// Bandwidth rule.
    pub bandwidth: Bandwidth,
}

/// `n` evenly spaced values from `start` to `stop` inclusive.
pub(crate) fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { stop } else { start + i as f64 * step })
                .collect()
        }
    }
}

/// Linear-interpolated percentile of sorted data, `q` in `[0, 1]`.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Robust spread `min(std, IQR / 1.349)`, or `std` when the IQR is zero.
fn spread(samples: &[f64]) -> f64 {
    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    let var = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let std = var.sqrt();

    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);
    let iqr = (percentile(&sorted, 0.75) - percentile(&sorted, 0.25)) / 1.349;
    if iqr > 0.0 {
        std.min(iqr)
    } else {
        std
    }
}

/// Resolve a bandwidth for `samples`.
///
/// Rule-based bandwidths are `NaN` for a single sample and zero for a
/// constant one; the caller rejects both.
#[must_use]
pub fn select_bandwidth(samples: &[f64], kernel: Kernel, bandwidth: Bandwidth) -> f64 {
    let factor = match bandwidth {
        Bandwidth::Fixed(h) => return h,
        Bandwidth::NormalReference => kernel.normal_reference_constant(),
        Bandwidth::Scott => 1.059,
        Bandwidth::Silverman => 0.9,
    };
    factor * spread(samples) * (samples.len() as f64).powf(-0.2)
}

fn check_weights(weights: &[f64], n: usize) -> Result<Vec<f64>> {
    if weights.len() != n {
        return Err(Error::validation(format!(
            "the weights array should have the same length as the samples array ({} != {n})",
            weights.len()
        )));
    }
    if weights.iter().any(|w| !w.is_finite()) {
        return Err(Error::validation("the weights array should not contain any infs or NaNs"));
    }
    if weights.iter().any(|&w| w < 0.0) {
        return Err(Error::validation("the weights array should not contain negative values"));
    }
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return Err(Error::validation("the weights array should have a positive sum"));
    }
    Ok(weights.iter().map(|w| w / total).collect())
}

/// Estimate one trace's density.
///
/// # Errors
///
/// Returns [`Error::Validation`] for non-finite samples or malformed weights,
/// and [`Error::Computation`] when the bandwidth or the resulting density is
/// degenerate. Locations in the error refer to row 0, trace 0; see
/// [`estimate_densities`] for located errors.
pub fn estimate_density_trace(
    samples: &[f64],
    options: &KdeOptions,
    weights: Option<&[f64]>,
) -> Result<DensityCurve> {
    let degenerate = |reason: String| Error::Computation { row: 0, trace: 0, reason };

    if samples.is_empty() {
        return Err(Error::shape("the samples array is empty"));
    }
    if samples.iter().any(|x| !x.is_finite()) {
        return Err(Error::validation("the samples array should not contain any infs or NaNs"));
    }
    let weights = weights.map(|w| check_weights(w, samples.len())).transpose()?;

    let h = select_bandwidth(samples, options.kernel, options.bandwidth);
    if !h.is_finite() || h <= 0.0 {
        return Err(degenerate(format!(
            "bandwidth is {h} (is the sample degenerate, e.g. zero variance or a single value?)"
        )));
    }

    let x = match &options.points {
        KdePoints::Count(n) => {
            let (lo, hi) = crate::scale::extent(samples).unwrap_or((0.0, 0.0));
            linspace(lo, hi, *n)
        }
        KdePoints::Explicit(xs) => xs.clone(),
    };

    let uniform = 1.0 / samples.len() as f64;
    let kernel = options.kernel;
    let y: Vec<f64> = x
        .iter()
        .map(|&xi| {
            let sum: f64 = match &weights {
                Some(w) => samples
                    .iter()
                    .zip(w)
                    .map(|(&s, &wi)| wi * kernel.evaluate((xi - s) / h))
                    .sum(),
                None => samples.iter().map(|&s| uniform * kernel.evaluate((xi - s) / h)).sum(),
            };
            sum / h
        })
        .collect();

    if y.iter().any(|v| !v.is_finite()) {
        return Err(degenerate("density estimate contains non-finite values".to_string()));
    }
    trace!(n = samples.len(), bandwidth = h, points = x.len(), "estimated density");
    DensityCurve::new(x, y)
}

/// Estimate every samples trace; density traces pass through.
///
/// With the `parallel` feature traces are processed concurrently; the output
/// is identical either way.
///
/// # Errors
///
/// The first failing trace's error, located by row and trace.
pub fn estimate_densities(
    samples: &NestedSamples,
    options: &KdeOptions,
    weights: &TraceWeights,
) -> Result<NestedSamples> {
    let jobs: Vec<(usize, usize, &TraceData, Option<&[f64]>)> = samples
        .iter_traces()
        .map(|(i, j, t)| {
            let w = weights.get(i).and_then(|row| row.get(j)).and_then(|w| w.as_deref());
            (i, j, t, w)
        })
        .collect();

    let run = |&(i, j, t, w): &(usize, usize, &TraceData, Option<&[f64]>)| -> Result<TraceData> {
        match t {
            TraceData::Density(curve) => Ok(TraceData::Density(curve.clone())),
            TraceData::Samples(s) => {
                estimate_density_trace(s, options, w).map(TraceData::Density).map_err(|e| e.at(i, j))
            }
        }
    };

    #[cfg(feature = "parallel")]
    let estimated: Vec<TraceData> = jobs.par_iter().map(run).collect::<Result<_>>()?;
    #[cfg(not(feature = "parallel"))]
    let estimated: Vec<TraceData> = jobs.iter().map(run).collect::<Result<_>>()?;

    debug!(traces = estimated.len(), kernel = ?options.kernel, "estimated densities");
    regroup(samples, estimated)
}

/// Split a flat, in-order list of traces back into `like`'s rows.
pub(crate) fn regroup(like: &NestedSamples, flat: Vec<TraceData>) -> Result<NestedSamples> {
    let mut flat = flat.into_iter();
    let rows = like.rows().iter().map(|row| flat.by_ref().take(row.len()).collect()).collect();
    NestedSamples::from_rows(rows)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn density_is_non_negative(
            samples in prop::collection::vec(-50.0..50.0f64, 2..40),
            kernel in prop::sample::select(vec![
                Kernel::Gaussian, Kernel::Epanechnikov, Kernel::Uniform, Kernel::Cosine,
            ]),
        ) {
            let options = KdeOptions { points: KdePoints::Count(64), kernel, ..KdeOptions::default() };
            if let Ok(curve) = estimate_density_trace(&samples, &options, None) {
                prop_assert_eq!(curve.len(), 64);
                prop_assert!(curve.y.iter().all(|&y| y >= 0.0 && y.is_finite()));
            }
        }

        #[test]
        fn fixed_bandwidth_never_degenerate(
            samples in prop::collection::vec(-5.0..5.0f64, 1..20),
            h in 0.01..5.0f64,
        ) {
            let options = KdeOptions {
                points: KdePoints::Count(16),
                bandwidth: Bandwidth::Fixed(h),
                ..KdeOptions::default()
            };
            prop_assert!(estimate_density_trace(&samples, &options, None).is_ok());
        }
    }
}
