//! Trace geometry.
//!
//! Turns density curves into shifted, drawable shapes: every row sits on its
//! own baseline and every trace becomes a closed polygon (area) or a set of
//! bars rising from that baseline.

use std::str::FromStr;

use crate::color::Rgba;
use crate::colormode::TraceColor;
use crate::error::{Error, Result};
use crate::figure::{Fill, ResolvedTrace, TraceGeometry, TraceKind};
use crate::samples::{DensityCurve, NestedSamples, TraceData};

/// Default vertical spacing, in units of the tallest density.
pub const DEFAULT_SPACING: f64 = 0.5;

/// Sentinel accepted by [`LineColor::from_str`] for [`LineColor::FillColor`].
pub const FILL_COLOR_SENTINEL: &str = "fill-color";

/// Outline color of every trace.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineColor {
    /// One fixed color.
    Color(Rgba),
    /// Copy each trace's solid fill color.
    FillColor,
}

impl Default for LineColor {
    fn default() -> Self {
        LineColor::Color(Rgba::BLACK)
    }
}

impl FromStr for LineColor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case(FILL_COLOR_SENTINEL) {
            Ok(LineColor::FillColor)
        } else {
            Rgba::parse(s).map(LineColor::Color)
        }
    }
}

impl From<Rgba> for LineColor {
    fn from(color: Rgba) -> Self {
        LineColor::Color(color)
    }
}

impl TraceKind {
    /// Outline width used when none is given.
    #[must_use]
    pub const fn default_line_width(self) -> f64 {
        match self {
            TraceKind::Area => 1.5,
            TraceKind::Bar => 0.5,
        }
    }
}

/// Figure-wide drawing options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryOptions {
    /// Trace kind.
    pub kind: TraceKind,
    /// Baseline spacing factor.
    pub spacing: f64,
    /// Outline color.
    pub line_color: LineColor,
    /// Outline width; the kind's default when `None`.
    pub line_width: Option<f64>,
}

impl Default for GeometryOptions {
    fn default() -> Self {
        Self {
            kind: TraceKind::Area,
            spacing: DEFAULT_SPACING,
            line_color: LineColor::default(),
            line_width: None,
        }
    }
}

impl GeometryOptions {
    /// Check spacing and line width.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a negative or non-finite spacing, or a
    /// negative or non-finite line width.
    pub fn validate(&self) -> Result<()> {
        if !self.spacing.is_finite() || self.spacing < 0.0 {
            return Err(Error::validation(format!(
                "spacing should be a finite number >= 0, got {}",
                self.spacing
            )));
        }
        if let Some(w) = self.line_width {
            if !w.is_finite() || w < 0.0 {
                return Err(Error::validation(format!(
                    "line_width should be a finite number >= 0, got {w}"
                )));
            }
        }
        Ok(())
    }
}

/// Largest density value over all traces.
#[must_use]
pub fn max_density(densities: &NestedSamples) -> f64 {
    densities
        .iter_traces()
        .filter_map(|(_, _, t)| match t {
            TraceData::Density(c) => c.y.iter().copied().reduce(f64::max),
            TraceData::Samples(_) => None,
        })
        .fold(0.0, f64::max)
}

/// Baseline of every row: `i * spacing * y_max`.
#[must_use]
pub fn row_baselines(n_rows: usize, spacing: f64, y_max: f64) -> Vec<f64> {
    (0..n_rows).map(|i| i as f64 * spacing * y_max).collect()
}

/// Closed polygon of a curve drawn on `baseline`.
///
/// The curve points `(x, y + baseline)` are followed by the baseline walked
/// back to the first point.
#[must_use]
pub fn area_polygon(curve: &DensityCurve, baseline: f64) -> (Vec<f64>, Vec<f64>) {
    let n = curve.len();
    let mut xs = Vec::with_capacity(2 * n);
    let mut ys = Vec::with_capacity(2 * n);
    xs.extend_from_slice(&curve.x);
    ys.extend(curve.y.iter().map(|y| y + baseline));
    xs.extend(curve.x.iter().rev());
    ys.extend(std::iter::repeat(baseline).take(n));
    (xs, ys)
}

/// Build every drawable trace.
///
/// `colors` and `labels` are grouped by row like `densities`. Labels are used
/// as given; the caller blanks repeated row labels.
///
/// # Errors
///
/// Returns [`Error::Validation`] for bad options and [`Error::Shape`] when
/// colors or labels do not mirror the densities or a trace is not a density.
pub fn build_traces(
    densities: &NestedSamples,
    colors: &[Vec<TraceColor>],
    labels: &[Vec<String>],
    options: &GeometryOptions,
) -> Result<Vec<ResolvedTrace>> {
    options.validate()?;
    let baselines = row_baselines(densities.n_rows(), options.spacing, max_density(densities));
    let line_width = options.line_width.unwrap_or_else(|| options.kind.default_line_width());

    let mut traces = Vec::with_capacity(densities.n_traces());
    for (i, j, trace) in densities.iter_traces() {
        let TraceData::Density(curve) = trace else {
            return Err(Error::shape(format!("row {i}, trace {j} has not been estimated yet")));
        };
        let color = colors
            .get(i)
            .and_then(|row| row.get(j))
            .ok_or_else(|| Error::shape(format!("no color was resolved for row {i}, trace {j}")))?;
        let label = labels
            .get(i)
            .and_then(|row| row.get(j))
            .ok_or_else(|| Error::shape(format!("no label was given for row {i}, trace {j}")))?;
        let baseline = baselines[i];

        let geometry = match options.kind {
            TraceKind::Area => {
                let (x, y) = area_polygon(curve, baseline);
                TraceGeometry::Area { x, y }
            }
            TraceKind::Bar => TraceGeometry::Bar { x: curve.x.clone(), height: curve.y.clone() },
        };
        let line_color = match options.line_color {
            LineColor::Color(c) => c,
            LineColor::FillColor => color.solid,
        };
        // Gradients only fill areas and per-bar colors only fill bars.
        let fill = match (&color.fill, options.kind) {
            (Fill::Gradient(_), TraceKind::Bar) | (Fill::PerBar(_), TraceKind::Area) => {
                Fill::Solid(color.solid)
            }
            (fill, _) => fill.clone(),
        };

        traces.push(ResolvedTrace {
            geometry,
            density: curve.y.clone(),
            fill,
            line_color,
            line_width,
            baseline,
            label: label.clone(),
            row: i,
            trace_in_row: j,
            zorder: i as i64,
        });
    }
    Ok(traces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale::ColorScale;

    fn two_rows() -> NestedSamples {
        NestedSamples::from_rows(vec![
            vec![
                TraceData::Density(DensityCurve::new(vec![0.0, 1.0, 2.0], vec![0.0, 2.0, 0.0]).unwrap()),
                TraceData::Density(DensityCurve::new(vec![1.0, 2.0], vec![1.0, 1.0]).unwrap()),
            ],
            vec![TraceData::Density(DensityCurve::new(vec![0.0, 1.0], vec![4.0, 0.0]).unwrap())],
        ])
        .unwrap()
    }

    fn solid(c: Rgba) -> TraceColor {
        TraceColor { fill: Fill::Solid(c), solid: c }
    }

    fn colors() -> Vec<Vec<TraceColor>> {
        vec![vec![solid(Rgba::RED), solid(Rgba::GREEN)], vec![solid(Rgba::BLUE)]]
    }

    fn labels() -> Vec<Vec<String>> {
        vec![vec!["a".into(), String::new()], vec!["b".into()]]
    }

    #[test]
    fn test_area_polygon_is_closed() {
        let curve = DensityCurve::new(vec![0.0, 1.0, 2.0], vec![0.0, 1.0, 0.5]).unwrap();
        let (x, y) = area_polygon(&curve, 10.0);
        assert_eq!(x, vec![0.0, 1.0, 2.0, 2.0, 1.0, 0.0]);
        assert_eq!(y, vec![10.0, 11.0, 10.5, 10.0, 10.0, 10.0]);
    }

    #[test]
    fn test_baselines() {
        assert_eq!(row_baselines(3, 0.5, 4.0), vec![0.0, 2.0, 4.0]);
        assert_eq!(row_baselines(3, 0.0, 4.0), vec![0.0; 3]);
        assert_eq!(max_density(&two_rows()), 4.0);
    }

    #[test]
    fn test_build_traces_shares_row_baseline() {
        let traces =
            build_traces(&two_rows(), &colors(), &labels(), &GeometryOptions::default()).unwrap();
        assert_eq!(traces.len(), 3);
        assert_eq!(traces[0].baseline, traces[1].baseline);
        assert_eq!(traces[2].baseline, 2.0);
        assert_eq!(traces[2].zorder, 1);
        assert_eq!(traces[1].label, "");
        assert_eq!(traces[0].line_width, 1.5);
        assert_eq!(traces[0].line_color, Rgba::BLACK);
        assert_eq!(traces[2].density, vec![4.0, 0.0]);
    }

    #[test]
    fn test_fill_color_outline() {
        let options = GeometryOptions { line_color: LineColor::FillColor, ..GeometryOptions::default() };
        let traces = build_traces(&two_rows(), &colors(), &labels(), &options).unwrap();
        assert_eq!(traces[1].line_color, Rgba::GREEN);
        assert_eq!(traces[2].line_color, Rgba::BLUE);
    }

    #[test]
    fn test_bar_geometry() {
        let options = GeometryOptions { kind: TraceKind::Bar, ..GeometryOptions::default() };
        let traces = build_traces(&two_rows(), &colors(), &labels(), &options).unwrap();
        assert_eq!(
            traces[0].geometry,
            TraceGeometry::Bar { x: vec![0.0, 1.0, 2.0], height: vec![0.0, 2.0, 0.0] }
        );
        assert_eq!(traces[0].line_width, 0.5);
        assert_eq!(traces[0].kind(), TraceKind::Bar);
    }

    #[test]
    fn test_gradient_on_bars_falls_back_to_solid() {
        let scale = ColorScale::from_colors(&[Rgba::BLACK, Rgba::WHITE]).unwrap();
        let mut colors = colors();
        colors[1][0] = TraceColor { fill: Fill::Gradient(scale), solid: Rgba::WHITE };
        let options = GeometryOptions { kind: TraceKind::Bar, ..GeometryOptions::default() };
        let traces = build_traces(&two_rows(), &colors, &labels(), &options).unwrap();
        assert_eq!(traces[2].fill, Fill::Solid(Rgba::WHITE));
    }

    #[test]
    fn test_per_bar_colors_on_areas_fall_back_to_solid() {
        let mut colors = colors();
        colors[0][1] =
            TraceColor { fill: Fill::PerBar(vec![Rgba::RED, Rgba::BLUE]), solid: Rgba::GREEN };
        let traces =
            build_traces(&two_rows(), &colors, &labels(), &GeometryOptions::default()).unwrap();
        assert_eq!(traces[1].kind(), TraceKind::Area);
        assert_eq!(traces[1].fill, Fill::Solid(Rgba::GREEN));
    }

    #[test]
    fn test_invalid_options() {
        let bad = GeometryOptions { spacing: -1.0, ..GeometryOptions::default() };
        assert!(matches!(bad.validate(), Err(Error::Validation(_))));
        let bad = GeometryOptions { line_width: Some(f64::NAN), ..GeometryOptions::default() };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_mismatched_colors() {
        let err = build_traces(&two_rows(), &colors()[..1], &labels(), &GeometryOptions::default())
            .unwrap_err();
        assert!(err.to_string().contains("row 1, trace 0"));
    }

    #[test]
    fn test_line_color_parse() {
        assert_eq!("fill-color".parse::<LineColor>().unwrap(), LineColor::FillColor);
        assert_eq!("red".parse::<LineColor>().unwrap(), LineColor::Color(Rgba::RED));
        assert!("nope".parse::<LineColor>().is_err());
    }
}
