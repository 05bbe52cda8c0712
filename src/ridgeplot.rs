//! The ridgeline figure builder.
//!
//! ```
//! use ridgeplot::prelude::*;
//!
//! let figure = Ridgeplot::new()
//!     .samples(vec![vec![1.0, 2.0, 2.0, 3.0], vec![5.0, 5.0, 6.0, 7.0]])
//!     .labels(["first", "second"])
//!     .colorscale("viridis")
//!     .build()
//!     .unwrap();
//! assert_eq!(figure.n_traces(), 2);
//! ```

use tracing::debug;

use crate::colormode::{compute_trace_colors, ColorMode, ColorSpec};
use crate::deprecation::{self, CanonicalArgs, DeprecationNotice, LegacyArgs};
use crate::error::{Error, Result};
use crate::figure::{Axis, FigureLayout, FigureSpec, TraceKind};
use crate::geometry::{
    build_traces, max_density, row_baselines, GeometryOptions, LineColor, DEFAULT_SPACING,
};
use crate::hist::{bin_samples, BinStrategy};
use crate::kde::{estimate_densities, Bandwidth, KdeOptions, KdePoints, Kernel};
use crate::samples::{
    normalize_densities, normalize_samples, normalize_weights, NestedSamples, Norm, SampleWeights,
    TraceData,
};
use crate::scale::extent;
use crate::shape::Value;
use crate::theme::Theme;

/// Default horizontal padding, as a fraction of the x range.
pub const DEFAULT_XPAD: f64 = 0.05;

/// Trace labels.
#[derive(Debug, Clone, PartialEq)]
pub enum Labels {
    /// One label per row.
    Rows(Vec<String>),
    /// Labels grouped by row; a row with a single label shares it.
    Traces(Vec<Vec<String>>),
}

/// Ridgeline figure builder.
#[derive(Debug, Clone)]
pub struct Ridgeplot {
    samples: Option<Value>,
    densities: Option<Value>,
    kde: KdeOptions,
    sample_weights: SampleWeights,
    bins: Option<BinStrategy>,
    colorscale: ColorSpec,
    colormode: Option<String>,
    opacity: Option<f64>,
    labels: Option<Labels>,
    norm: Option<Norm>,
    spacing: f64,
    line_width: Option<f64>,
    line_color: LineColor,
    trace_type: Option<TraceKind>,
    show_yticklabels: Option<bool>,
    xpad: f64,
    theme: Theme,
    legacy: LegacyArgs,
}

impl Default for Ridgeplot {
    fn default() -> Self {
        Self::new()
    }
}

impl Ridgeplot {
    /// Create a builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            samples: None,
            densities: None,
            kde: KdeOptions::default(),
            sample_weights: SampleWeights::None,
            bins: None,
            colorscale: ColorSpec::Auto,
            colormode: None,
            opacity: None,
            labels: None,
            norm: None,
            spacing: DEFAULT_SPACING,
            line_width: None,
            line_color: LineColor::default(),
            trace_type: None,
            show_yticklabels: None,
            xpad: DEFAULT_XPAD,
            theme: Theme::default(),
            legacy: LegacyArgs::default(),
        }
    }

    /// Raw samples, one list per row (depth 2) or per trace (depth 3).
    #[must_use]
    pub fn samples(mut self, samples: impl Into<Value>) -> Self {
        self.samples = Some(samples.into());
        self
    }

    /// Precomputed densities: `[xs, ys]` per trace, grouped by row.
    #[must_use]
    pub fn densities(mut self, densities: impl Into<Value>) -> Self {
        self.densities = Some(densities.into());
        self
    }

    /// Number of KDE evaluation points per trace.
    #[must_use]
    pub fn kde_points(mut self, n: usize) -> Self {
        self.kde.points = KdePoints::Count(n);
        self
    }

    /// Explicit KDE evaluation grid shared by all traces.
    #[must_use]
    pub fn kde_grid(mut self, xs: Vec<f64>) -> Self {
        self.kde.points = KdePoints::Explicit(xs);
        self
    }

    /// KDE bandwidth rule.
    #[must_use]
    pub fn bandwidth(mut self, bandwidth: Bandwidth) -> Self {
        self.kde.bandwidth = bandwidth;
        self
    }

    /// KDE kernel.
    #[must_use]
    pub fn kernel(mut self, kernel: Kernel) -> Self {
        self.kde.kernel = kernel;
        self
    }

    /// Per-sample weights.
    #[must_use]
    pub fn sample_weights(mut self, weights: SampleWeights) -> Self {
        self.sample_weights = weights;
        self
    }

    /// Bin samples into `nbins` equal-width bins instead of estimating a KDE.
    #[must_use]
    pub fn nbins(mut self, nbins: usize) -> Self {
        self.bins = Some(BinStrategy::Fixed(nbins));
        self
    }

    /// Bin samples with a bin-count rule instead of estimating a KDE.
    #[must_use]
    pub fn bins(mut self, strategy: BinStrategy) -> Self {
        self.bins = Some(strategy);
        self
    }

    /// Colorscale: a name, a list of colors, or explicit breakpoints.
    #[must_use]
    pub fn colorscale(mut self, colorscale: impl Into<ColorSpec>) -> Self {
        self.colorscale = colorscale.into();
        self
    }

    /// Evenly spaced colorscale from color strings.
    #[must_use]
    pub fn colors<S: Into<String>>(mut self, colors: impl IntoIterator<Item = S>) -> Self {
        self.colorscale = ColorSpec::Colors(colors.into_iter().map(Into::into).collect());
        self
    }

    /// Color mode.
    #[must_use]
    pub fn colormode(mut self, mode: ColorMode) -> Self {
        self.colormode = Some(mode.name().to_string());
        self
    }

    /// Color mode by name; parsed when the figure is built.
    #[must_use]
    pub fn colormode_name(mut self, name: impl Into<String>) -> Self {
        self.colormode = Some(name.into());
        self
    }

    /// Fill opacity in `[0, 1]`.
    #[must_use]
    pub fn opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    /// Row labels.
    #[must_use]
    pub fn labels<S: Into<String>>(mut self, labels: impl IntoIterator<Item = S>) -> Self {
        self.labels = Some(Labels::Rows(labels.into_iter().map(Into::into).collect()));
        self
    }

    /// Per-trace labels, grouped by row.
    #[must_use]
    pub fn trace_labels(mut self, labels: Vec<Vec<String>>) -> Self {
        self.labels = Some(Labels::Traces(labels));
        self
    }

    /// Rescale every trace's densities.
    #[must_use]
    pub fn norm(mut self, norm: Norm) -> Self {
        self.norm = Some(norm);
        self
    }

    /// Vertical spacing between rows, in units of the tallest density.
    #[must_use]
    pub fn spacing(mut self, spacing: f64) -> Self {
        self.spacing = spacing;
        self
    }

    /// Outline width.
    #[must_use]
    pub fn line_width(mut self, width: f64) -> Self {
        self.line_width = Some(width);
        self
    }

    /// Outline color, or [`LineColor::FillColor`].
    #[must_use]
    pub fn line_color(mut self, color: impl Into<LineColor>) -> Self {
        self.line_color = color.into();
        self
    }

    /// Draw areas or bars. Defaults to bars when binning, areas otherwise.
    #[must_use]
    pub fn trace_type(mut self, kind: TraceKind) -> Self {
        self.trace_type = Some(kind);
        self
    }

    /// Show row labels on the y axis.
    #[must_use]
    pub fn show_yticklabels(mut self, show: bool) -> Self {
        self.show_yticklabels = Some(show);
        self
    }

    /// Horizontal padding, as a fraction of the x range.
    #[must_use]
    pub fn xpad(mut self, xpad: f64) -> Self {
        self.xpad = xpad;
        self
    }

    /// Visual theme; also supplies the automatic colorscale.
    #[must_use]
    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Deprecated alias of [`Ridgeplot::opacity`].
    #[must_use]
    pub fn coloralpha(mut self, alpha: f64) -> Self {
        self.legacy.coloralpha = Some(alpha);
        self
    }

    /// Deprecated alias of [`Ridgeplot::line_width`].
    #[must_use]
    pub fn linewidth(mut self, width: f64) -> Self {
        self.legacy.linewidth = Some(width);
        self
    }

    /// Deprecated alias of [`Ridgeplot::show_yticklabels`].
    #[must_use]
    pub fn show_annotations(mut self, show: bool) -> Self {
        self.legacy.show_annotations = Some(show);
        self
    }

    /// Build the figure.
    ///
    /// # Errors
    ///
    /// Any shape, validation, color or computation error aborts the build.
    pub fn build(self) -> Result<FigureSpec> {
        self.build_with_notices().map(|(figure, _)| figure)
    }

    /// Build the figure and return the deprecation notices raised on the way.
    ///
    /// # Errors
    ///
    /// Same as [`Ridgeplot::build`].
    pub fn build_with_notices(self) -> Result<(FigureSpec, Vec<DeprecationNotice>)> {
        let colorscale_name = match &self.colorscale {
            ColorSpec::Named(name) => Some(name.clone()),
            _ => None,
        };
        let resolved = deprecation::resolve(
            CanonicalArgs {
                opacity: self.opacity,
                line_width: self.line_width,
                show_yticklabels: self.show_yticklabels,
                colormode: self.colormode.clone(),
                colorscale_name,
            },
            &self.legacy,
        )?;

        let kind = self.trace_type.unwrap_or(if self.bins.is_some() {
            TraceKind::Bar
        } else {
            TraceKind::Area
        });
        let geometry = GeometryOptions {
            kind,
            spacing: self.spacing,
            line_color: self.line_color,
            line_width: resolved.line_width,
        };
        self.validate(&geometry, resolved.opacity)?;

        let input = match (&self.samples, &self.densities) {
            (Some(samples), None) => normalize_samples(samples)?,
            (None, Some(densities)) => normalize_densities(densities)?,
            _ => {
                return Err(Error::validation(
                    "you must specify exactly one of `samples` or `densities`",
                ))
            }
        };
        let per_trace_labels = expand_labels(self.labels.as_ref(), &input)?;
        let colorscale = self.colorscale.resolve(&self.theme)?;
        debug!(
            rows = input.n_rows(),
            traces = input.n_traces(),
            colorscale = colorscale.stops().len(),
            "normalized input"
        );

        let weights = normalize_weights(&self.sample_weights, &input)?;
        let mut densities = match self.bins {
            Some(strategy) => bin_samples(&input, strategy, &weights)?,
            None => estimate_densities(&input, &self.kde, &weights)?,
        };
        if let Some(norm) = self.norm {
            densities = apply_norm(densities, norm)?;
        }

        let mode = resolved.colormode.unwrap_or_default();
        let colors = compute_trace_colors(&densities, &colorscale, mode, resolved.opacity, kind)?;
        let (trace_labels, row_labels) = dedupe_labels(per_trace_labels);
        let traces = build_traces(&densities, &colors, &trace_labels, &geometry)?;

        let xs: Vec<f64> = densities
            .iter_traces()
            .filter_map(|(_, _, t)| match t {
                TraceData::Density(c) => Some(c.x.iter().copied()),
                TraceData::Samples(_) => None,
            })
            .flatten()
            .collect();
        let (x_min, x_max) = extent(&xs).unwrap_or((0.0, 0.0));
        let padding = self.xpad * (x_max - x_min);
        let baselines = row_baselines(densities.n_rows(), self.spacing, max_density(&densities));

        let layout = FigureLayout {
            xaxis: Axis {
                range: Some((x_min - padding, x_max + padding)),
                show_ticklabels: true,
                show_grid: self.theme.show_grid,
                ..Axis::default()
            },
            yaxis: Axis {
                range: None,
                tickvals: baselines,
                ticktext: row_labels,
                show_ticklabels: resolved.show_yticklabels.unwrap_or(true),
                show_grid: self.theme.show_grid,
            },
            spacing: self.spacing,
            theme: self.theme,
            width: None,
            height: None,
        };
        debug!(traces = traces.len(), ?mode, ?kind, "assembled figure");

        Ok((FigureSpec { traces, layout }, resolved.notices))
    }

    fn validate(&self, geometry: &GeometryOptions, opacity: Option<f64>) -> Result<()> {
        match (&self.samples, &self.densities) {
            (Some(_), Some(_)) => {
                return Err(Error::validation(
                    "you may not specify both `samples` and `densities` arguments",
                ))
            }
            (None, None) => {
                return Err(Error::validation("you must specify either `samples` or `densities`"))
            }
            _ => {}
        }
        if self.densities.is_some() {
            if self.sample_weights != SampleWeights::None {
                return Err(Error::validation("sample weights only apply to `samples` input"));
            }
            if self.kde.points != KdePoints::default() {
                return Err(Error::validation(
                    "kde points may not be specified when passing precomputed `densities`",
                ));
            }
            if self.bins.is_some() {
                return Err(Error::validation(
                    "`nbins` and `bins` may not be specified when passing precomputed `densities`",
                ));
            }
        }
        geometry.validate()?;
        self.kde.points.validate()?;
        if let Some(a) = opacity {
            if !(0.0..=1.0).contains(&a) {
                return Err(Error::validation(format!("opacity should be between 0 and 1, got {a}")));
            }
        }
        if !self.xpad.is_finite() || self.xpad < 0.0 {
            return Err(Error::validation(format!(
                "xpad should be a finite number >= 0, got {}",
                self.xpad
            )));
        }
        if let Some(strategy) = self.bins {
            strategy.validate()?;
        }
        Ok(())
    }
}

fn apply_norm(densities: NestedSamples, norm: Norm) -> Result<NestedSamples> {
    let rows = densities
        .into_rows()
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|t| match t {
                    TraceData::Density(c) => TraceData::Density(c.normalized(norm)),
                    samples @ TraceData::Samples(_) => samples,
                })
                .collect()
        })
        .collect();
    NestedSamples::from_rows(rows)
}

/// One label per trace, checked against the input's rows and traces.
fn expand_labels(labels: Option<&Labels>, input: &NestedSamples) -> Result<Vec<Vec<String>>> {
    let rows = input.rows();
    Ok(match labels {
        None => rows
            .iter()
            .enumerate()
            .map(|(i, row)| vec![i.to_string(); row.len()])
            .collect(),
        Some(Labels::Rows(names)) => {
            if names.len() != rows.len() {
                return Err(Error::validation(format!(
                    "got {} labels but there are {} rows",
                    names.len(),
                    rows.len()
                )));
            }
            rows.iter().zip(names).map(|(row, name)| vec![name.clone(); row.len()]).collect()
        }
        Some(Labels::Traces(names)) => {
            if names.len() != rows.len() {
                return Err(Error::validation(format!(
                    "got labels for {} rows but there are {} rows",
                    names.len(),
                    rows.len()
                )));
            }
            rows.iter()
                .zip(names)
                .enumerate()
                .map(|(i, (row, row_names))| match row_names.len() {
                    n if n == row.len() => Ok(row_names.clone()),
                    1 => Ok(vec![row_names[0].clone(); row.len()]),
                    n => Err(Error::validation(format!(
                        "row {i} has {} traces but {n} labels",
                        row.len()
                    ))),
                })
                .collect::<Result<_>>()?
        }
    })
}

/// Legend names per trace and tick text per row.
///
/// A trace whose label repeats an earlier label in its row gets an empty
/// legend name, so every row is named once.
fn dedupe_labels(per_trace: Vec<Vec<String>>) -> (Vec<Vec<String>>, Vec<String>) {
    let mut legend = Vec::with_capacity(per_trace.len());
    let mut ticks = Vec::with_capacity(per_trace.len());
    for row in per_trace {
        let mut seen: Vec<String> = Vec::new();
        let names = row
            .into_iter()
            .map(|name| {
                if seen.contains(&name) {
                    String::new()
                } else {
                    seen.push(name.clone());
                    name
                }
            })
            .collect();
        legend.push(names);
        ticks.push(seen.join(", "));
    }
    (legend, ticks)
}

/// Build a ridgeline figure from samples with default settings.
///
/// # Errors
///
/// See [`Ridgeplot::build`].
pub fn ridgeplot(samples: impl Into<Value>) -> Result<FigureSpec> {
    Ridgeplot::new().samples(samples).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figure::{Fill, TraceGeometry};
    use crate::palettes;

    fn two_rows() -> Vec<Vec<f64>> {
        vec![vec![1.0, 2.0, 2.0, 3.0], vec![5.0, 5.0, 6.0, 7.0]]
    }

    #[test]
    fn test_default_build() {
        let fig = ridgeplot(two_rows()).unwrap();
        assert_eq!(fig.n_traces(), 2);
        assert!(fig.traces[1].baseline > fig.traces[0].baseline);
        assert_eq!(fig.traces[0].label, "0");
        assert_eq!(fig.layout.yaxis.ticktext, vec!["0", "1"]);
        assert_eq!(fig.layout.yaxis.tickvals, fig.baselines());
        assert!(matches!(fig.traces[0].fill, Fill::Gradient(_)));
        assert!(fig.layout.yaxis.show_ticklabels);
    }

    #[test]
    fn test_xaxis_padding() {
        let fig = Ridgeplot::new().samples(two_rows()).xpad(0.1).build().unwrap();
        let (lo, hi) = fig.layout.xaxis.range.unwrap();
        assert!((lo - (1.0 - 0.6)).abs() < 1e-9);
        assert!((hi - (7.0 + 0.6)).abs() < 1e-9);
    }

    #[test]
    fn test_samples_and_densities_are_exclusive() {
        let err = Ridgeplot::new()
            .samples(two_rows())
            .densities(vec![vec![vec![vec![0.0, 1.0], vec![1.0, 1.0]]]])
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(matches!(Ridgeplot::new().build(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_negative_spacing_fails_before_estimation() {
        let err = Ridgeplot::new().samples(vec![vec![1.0]]).spacing(-1.0).build().unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_label_count_mismatch() {
        let err = Ridgeplot::new().samples(two_rows()).labels(["only one"]).build().unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_label_mismatch_fails_before_estimation() {
        // The second row is degenerate, so reaching the KDE would raise a
        // computation error instead.
        let samples = vec![vec![1.0, 2.0, 3.0], vec![4.0, 4.0]];
        let err = Ridgeplot::new().samples(samples.clone()).labels(["only-one"]).build().unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let err = Ridgeplot::new()
            .samples(samples)
            .trace_labels(vec![vec!["a".into()], vec!["b".into(), "c".into()]])
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn test_density_passthrough_rejects_estimation_settings() {
        let densities = || vec![vec![vec![vec![0.0, 1.0], vec![1.0, 1.0]]]];
        let cases = [
            Ridgeplot::new().densities(densities()).kde_grid(vec![0.0, 0.5, 1.0]),
            Ridgeplot::new().densities(densities()).kde_points(20),
            Ridgeplot::new().densities(densities()).nbins(4),
            Ridgeplot::new().densities(densities()).bins(BinStrategy::Scott),
        ];
        for builder in cases {
            assert!(matches!(builder.build(), Err(Error::Validation(_))));
        }
    }

    #[test]
    fn test_nbins_upper_bound() {
        let err = Ridgeplot::new().samples(two_rows()).nbins(usize::MAX).build().unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_trace_labels_dedupe_within_row() {
        let fig = Ridgeplot::new()
            .samples(vec![vec![vec![1.0, 2.0, 3.0], vec![2.0, 3.0, 5.0], vec![0.0, 1.0, 3.0]]])
            .trace_labels(vec![vec!["a".into(), "a".into(), "b".into()]])
            .build()
            .unwrap();
        let names: Vec<&str> = fig.traces.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(names, vec!["a", "", "b"]);
        assert_eq!(fig.layout.yaxis.ticktext, vec!["a, b"]);
    }

    #[test]
    fn test_densities_input_passes_through() {
        let fig = Ridgeplot::new()
            .densities(vec![vec![vec![vec![0.0, 1.0, 2.0], vec![0.0, 3.0, 0.0]]]])
            .colormode(ColorMode::RowIndex)
            .colorscale(ColorSpec::Colors(vec!["red".into(), "blue".into()]))
            .build()
            .unwrap();
        assert_eq!(fig.traces[0].density, vec![0.0, 3.0, 0.0]);
        assert_eq!(fig.traces[0].fill, Fill::Solid(crate::color::Rgba::RED));
    }

    #[test]
    fn test_nbins_draws_bars() {
        let fig = Ridgeplot::new().samples(two_rows()).nbins(3).build().unwrap();
        assert!(fig.traces.iter().all(|t| t.kind() == TraceKind::Bar));
        let TraceGeometry::Bar { x, height } = &fig.traces[0].geometry else {
            panic!("expected bars");
        };
        assert_eq!(x.len(), 3);
        assert_eq!(height.iter().sum::<f64>(), 4.0);
        assert!(matches!(fig.traces[0].fill, Fill::PerBar(_)));
        let err = Ridgeplot::new().samples(two_rows()).nbins(0).build().unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_percent_norm() {
        let fig = Ridgeplot::new().samples(two_rows()).norm(Norm::Percent).build().unwrap();
        for t in &fig.traces {
            assert!((t.density.iter().sum::<f64>() - 100.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_deprecated_aliases() {
        let (fig, notices) = Ridgeplot::new()
            .samples(two_rows())
            .coloralpha(0.5)
            .linewidth(3.0)
            .show_annotations(false)
            .colormode_name("index")
            .colorscale("default")
            .build_with_notices()
            .unwrap();
        assert_eq!(notices.len(), 5);
        assert_eq!(fig.traces[0].line_width, 3.0);
        assert!(!fig.layout.yaxis.show_ticklabels);
        let first = palettes::get_colorscale("default").unwrap().interpolate(0.0).with_alpha(0.5);
        assert_eq!(fig.traces[0].fill, Fill::Solid(first));
    }

    #[test]
    fn test_weights_with_densities_rejected() {
        let err = Ridgeplot::new()
            .densities(vec![vec![vec![vec![0.0, 1.0], vec![1.0, 1.0]]]])
            .sample_weights(SampleWeights::Shared(vec![1.0, 1.0]))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_degenerate_sample_names_location() {
        let err = ridgeplot(vec![vec![1.0, 2.0, 3.0], vec![4.0, 4.0]]).unwrap_err();
        assert!(matches!(err, Error::Computation { row: 1, trace: 0, .. }));
    }
}
