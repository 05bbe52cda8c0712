//! Per-trace coloring.
//!
//! A [`ColorSpec`] resolves to a [`ColorScale`]; a [`ColorMode`] then picks a
//! position on that scale for every trace (or, for
//! [`ColorMode::FillGradient`], a slice of it).

use std::str::FromStr;

use trueno::Vector;

use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::figure::{Fill, TraceKind};
use crate::palettes;
use crate::samples::{DensityCurve, NestedSamples, TraceData};
use crate::scale::{extent, ColorScale, LinearScale};
use crate::theme::Theme;

/// How trace colors are picked from the colorscale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// Position by row.
    RowIndex,
    /// Position by trace across the whole figure.
    TraceIndex,
    /// Position by trace within its row.
    TraceIndexRowWise,
    /// Weighted mean of x, normalized to the global x range.
    MeanMinMax,
    /// Weighted mean of x, normalized to the range of all trace means.
    MeanMeans,
    /// Horizontal gradient following the x axis.
    #[default]
    FillGradient,
}

impl ColorMode {
    /// All modes, in canonical order.
    pub const ALL: [ColorMode; 6] = [
        ColorMode::RowIndex,
        ColorMode::TraceIndex,
        ColorMode::TraceIndexRowWise,
        ColorMode::MeanMinMax,
        ColorMode::MeanMeans,
        ColorMode::FillGradient,
    ];

    /// Canonical name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            ColorMode::RowIndex => "row-index",
            ColorMode::TraceIndex => "trace-index",
            ColorMode::TraceIndexRowWise => "trace-index-row-wise",
            ColorMode::MeanMinMax => "mean-minmax",
            ColorMode::MeanMeans => "mean-means",
            ColorMode::FillGradient => "fillgradient",
        }
    }
}

impl FromStr for ColorMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|m| m.name() == s).ok_or_else(|| {
            let names: Vec<&str> = Self::ALL.iter().map(|m| m.name()).collect();
            Error::validation(format!(
                "the colormode argument should be one of {names:?}, got {s:?}"
            ))
        })
    }
}

/// Where the colorscale comes from.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ColorSpec {
    /// The theme's sequential colorscale.
    #[default]
    Auto,
    /// A named continuous scale or discrete palette (`_r` reverses).
    Named(String),
    /// Colors spread evenly over `[0, 1]`.
    Colors(Vec<String>),
    /// Explicit breakpoints.
    Scale(ColorScale),
}

impl From<&str> for ColorSpec {
    fn from(name: &str) -> Self {
        ColorSpec::Named(name.to_string())
    }
}

impl From<ColorScale> for ColorSpec {
    fn from(scale: ColorScale) -> Self {
        ColorSpec::Scale(scale)
    }
}

impl ColorSpec {
    /// Resolve to a colorscale.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ColorResolution`] for unknown names, malformed colors
    /// or invalid breakpoints.
    pub fn resolve(&self, theme: &Theme) -> Result<ColorScale> {
        match self {
            ColorSpec::Auto => theme.sequential_colorscale(),
            ColorSpec::Named(name) => palettes::get_colorscale(name),
            ColorSpec::Colors(colors) => ColorScale::from_color_strings(colors),
            ColorSpec::Scale(scale) => ColorScale::new(scale.stops().to_vec()),
        }
    }
}

/// Figure-wide values the positions are computed against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterpolationContext {
    /// Number of rows.
    pub n_rows: usize,
    /// Number of traces across all rows.
    pub n_traces: usize,
    /// Largest number of traces in a row.
    pub max_traces_per_row: usize,
    /// Smallest x over all traces.
    pub x_min: f64,
    /// Largest x over all traces.
    pub x_max: f64,
}

impl InterpolationContext {
    /// Build from estimated densities.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Shape`] if a trace still holds raw samples.
    pub fn from_densities(densities: &NestedSamples) -> Result<Self> {
        let curves = curves(densities)?;
        let xs: Vec<f64> = curves.iter().flat_map(|(_, _, c)| c.x.iter().copied()).collect();
        let (x_min, x_max) = extent(&xs).unwrap_or((0.0, 0.0));
        Ok(Self {
            n_rows: densities.n_rows(),
            n_traces: densities.n_traces(),
            max_traces_per_row: densities.max_traces_per_row(),
            x_min,
            x_max,
        })
    }
}

fn curves(densities: &NestedSamples) -> Result<Vec<(usize, usize, &DensityCurve)>> {
    densities
        .iter_traces()
        .map(|(i, j, t)| match t {
            TraceData::Density(c) => Ok((i, j, c)),
            TraceData::Samples(_) => {
                Err(Error::shape(format!("row {i}, trace {j} has not been estimated yet")))
            }
        })
        .collect()
}

fn index_position(index: usize, count: usize) -> f64 {
    if count <= 1 {
        0.0
    } else {
        index as f64 / (count - 1) as f64
    }
}

/// Mean of `x` weighted by `y`. Falls back to the plain mean of `x` when the
/// weights sum to zero.
///
/// The SIMD reduction runs in `f32` on `x - min(x)`, so a large offset on the
/// x axis does not swamp the spread of the values.
#[must_use]
pub fn weighted_mean(x: &[f64], y: &[f64]) -> f64 {
    let Some((origin, _)) = extent(x) else {
        return 0.0;
    };
    let xs = Vector::from_vec(x.iter().map(|&v| (v - origin) as f32).collect());
    let ys = Vector::from_vec(y.iter().map(|&v| v as f32).collect());

    // mean(x * y) / mean(y) == sum(x * y) / sum(y)
    let simd = xs.mul(&ys).and_then(|xy| Ok((xy.mean()?, ys.mean()?)));
    let (xy_mean, y_mean) = match simd {
        Ok((xy, ym)) => (f64::from(xy), f64::from(ym)),
        Err(_) => {
            let n = x.len() as f64;
            let xy = x.iter().zip(y).map(|(a, b)| (a - origin) * b).sum::<f64>();
            (xy / n, y.iter().sum::<f64>() / n)
        }
    };
    if y_mean == 0.0 || !y_mean.is_finite() {
        return x.iter().sum::<f64>() / x.len() as f64;
    }
    origin + xy_mean / y_mean
}

/// Scale position of every trace, grouped by row.
///
/// [`ColorMode::FillGradient`] returns the [`ColorMode::MeanMinMax`]
/// positions, used as the trace's solid stand-in color.
///
/// # Errors
///
/// Returns [`Error::Shape`] if a trace still holds raw samples.
pub fn compute_interpolants(
    mode: ColorMode,
    densities: &NestedSamples,
    ctx: &InterpolationContext,
) -> Result<Vec<Vec<f64>>> {
    let curves = curves(densities)?;
    let flat: Vec<f64> = match mode {
        ColorMode::RowIndex => {
            curves.iter().map(|&(i, _, _)| index_position(i, ctx.n_rows)).collect()
        }
        ColorMode::TraceIndex => (0..curves.len())
            .map(|k| index_position(k, ctx.n_traces))
            .collect(),
        ColorMode::TraceIndexRowWise => curves
            .iter()
            .map(|&(_, j, _)| index_position(j, ctx.max_traces_per_row))
            .collect(),
        ColorMode::MeanMinMax | ColorMode::FillGradient => curves
            .iter()
            .map(|(_, _, c)| LinearScale::normalize(weighted_mean(&c.x, &c.y), ctx.x_min, ctx.x_max))
            .collect(),
        ColorMode::MeanMeans => {
            let means: Vec<f64> =
                curves.iter().map(|(_, _, c)| weighted_mean(&c.x, &c.y)).collect();
            let (lo, hi) = extent(&means).unwrap_or((0.0, 0.0));
            means.iter().map(|&m| LinearScale::normalize(m, lo, hi)).collect()
        }
    };

    let mut flat = flat.into_iter();
    Ok(densities
        .rows()
        .iter()
        .map(|row| flat.by_ref().take(row.len()).collect())
        .collect())
}

/// Resolved color of one trace.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceColor {
    /// What fills the trace.
    pub fill: Fill,
    /// Single representative color, used for "match fill" outlines.
    pub solid: Rgba,
}

/// Colors for every trace, grouped by row.
///
/// `opacity`, when set, replaces the alpha of every resolved color and of
/// every gradient breakpoint.
///
/// # Errors
///
/// Returns [`Error::Validation`] for an opacity outside `[0, 1]` and
/// [`Error::Shape`] if a trace still holds raw samples.
pub fn compute_trace_colors(
    densities: &NestedSamples,
    colorscale: &ColorScale,
    mode: ColorMode,
    opacity: Option<f64>,
    kind: TraceKind,
) -> Result<Vec<Vec<TraceColor>>> {
    let scale = match opacity {
        Some(a) if !(0.0..=1.0).contains(&a) => {
            return Err(Error::validation(format!(
                "opacity should be between 0 and 1, got {a}"
            )));
        }
        Some(a) => colorscale.with_opacity(a),
        None => colorscale.clone(),
    };
    let ctx = InterpolationContext::from_densities(densities)?;
    let positions = compute_interpolants(mode, densities, &ctx)?;

    densities
        .rows()
        .iter()
        .zip(&positions)
        .map(|(row, ps)| {
            row.iter()
                .zip(ps)
                .map(|(trace, &p)| {
                    let solid = scale.interpolate(p);
                    let fill = match (mode, trace, kind) {
                        (ColorMode::FillGradient, TraceData::Density(c), TraceKind::Area) => {
                            let (lo, hi) = extent(&c.x).unwrap_or((ctx.x_min, ctx.x_min));
                            Fill::Gradient(scale.slice(
                                LinearScale::normalize(lo, ctx.x_min, ctx.x_max),
                                LinearScale::normalize(hi, ctx.x_min, ctx.x_max),
                            ))
                        }
                        (ColorMode::FillGradient, TraceData::Density(c), TraceKind::Bar) => {
                            Fill::PerBar(
                                c.x.iter()
                                    .map(|&x| {
                                        scale.interpolate(LinearScale::normalize(
                                            x, ctx.x_min, ctx.x_max,
                                        ))
                                    })
                                    .collect(),
                            )
                        }
                        _ => Fill::Solid(solid),
                    };
                    Ok(TraceColor { fill, solid })
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn densities(rows: Vec<Vec<(Vec<f64>, Vec<f64>)>>) -> NestedSamples {
        NestedSamples::from_rows(
            rows.into_iter()
                .map(|row| {
                    row.into_iter()
                        .map(|(x, y)| TraceData::Density(DensityCurve::new(x, y).unwrap()))
                        .collect()
                })
                .collect(),
        )
        .unwrap()
    }

    fn bw() -> ColorScale {
        ColorScale::from_colors(&[Rgba::BLACK, Rgba::WHITE]).unwrap()
    }

    fn simple(n_rows: usize, per_row: usize) -> NestedSamples {
        densities(
            (0..n_rows)
                .map(|i| {
                    (0..per_row)
                        .map(|j| {
                            let shift = (i * per_row + j) as f64;
                            (vec![shift, shift + 1.0, shift + 2.0], vec![0.0, 1.0, 0.0])
                        })
                        .collect()
                })
                .collect(),
        )
    }

    #[test]
    fn test_colormode_parse() {
        for mode in ColorMode::ALL {
            assert_eq!(mode.name().parse::<ColorMode>().unwrap(), mode);
        }
        assert_eq!("Row-Index".parse::<ColorMode>().unwrap(), ColorMode::RowIndex);
        let err = "index".parse::<ColorMode>().unwrap_err();
        assert!(err.to_string().contains("\"index\""));
    }

    #[test]
    fn test_row_index_positions() {
        let d = simple(3, 2);
        let ctx = InterpolationContext::from_densities(&d).unwrap();
        let ps = compute_interpolants(ColorMode::RowIndex, &d, &ctx).unwrap();
        assert_eq!(ps, vec![vec![0.0, 0.0], vec![0.5, 0.5], vec![1.0, 1.0]]);
    }

    #[test]
    fn test_trace_index_positions() {
        let d = simple(2, 2);
        let ctx = InterpolationContext::from_densities(&d).unwrap();
        let ps = compute_interpolants(ColorMode::TraceIndex, &d, &ctx).unwrap();
        assert_relative_eq!(ps[1][0], 2.0 / 3.0);
        assert_eq!(ps[0][0], 0.0);
        assert_eq!(ps[1][1], 1.0);
    }

    #[test]
    fn test_row_wise_uses_widest_row() {
        let d = densities(vec![
            vec![(vec![0.0, 1.0], vec![1.0, 1.0]); 3],
            vec![(vec![0.0, 1.0], vec![1.0, 1.0])],
        ]);
        let ctx = InterpolationContext::from_densities(&d).unwrap();
        assert_eq!(ctx.max_traces_per_row, 3);
        let ps = compute_interpolants(ColorMode::TraceIndexRowWise, &d, &ctx).unwrap();
        assert_eq!(ps, vec![vec![0.0, 0.5, 1.0], vec![0.0]]);
    }

    #[test]
    fn test_single_trace_is_scale_start() {
        let d = simple(1, 1);
        for mode in [ColorMode::RowIndex, ColorMode::TraceIndex, ColorMode::TraceIndexRowWise] {
            let colors = compute_trace_colors(&d, &bw(), mode, None, TraceKind::Area).unwrap();
            assert_eq!(colors[0][0].fill, Fill::Solid(Rgba::BLACK));
        }
    }

    #[test]
    fn test_weighted_mean() {
        assert_relative_eq!(weighted_mean(&[0.0, 1.0, 2.0], &[0.0, 1.0, 0.0]), 1.0, epsilon = 1e-5);
        assert_relative_eq!(weighted_mean(&[0.0, 10.0], &[1.0, 3.0]), 7.5, epsilon = 1e-4);
        assert_relative_eq!(weighted_mean(&[2.0, 4.0], &[0.0, 0.0]), 3.0);
        assert_eq!(weighted_mean(&[], &[]), 0.0);
    }

    #[test]
    fn test_weighted_mean_far_from_origin() {
        let base = 1.7e9;
        assert_relative_eq!(
            weighted_mean(&[base, base + 1.0, base + 2.0], &[0.0, 1.0, 0.0]),
            base + 1.0,
            epsilon = 1e-3
        );
    }

    #[test]
    fn test_mean_modes_with_large_x_offset() {
        let base = 1.7e9;
        let d = densities(
            [0.0, 10.0, 20.0]
                .iter()
                .map(|&shift| {
                    let x: Vec<f64> = (0..=10).map(|k| base + shift + f64::from(k)).collect();
                    let y: Vec<f64> = (0..=10).map(|k| 1.0 - (f64::from(k) - 5.0).abs() / 5.0).collect();
                    vec![(x, y)]
                })
                .collect(),
        );
        let ctx = InterpolationContext::from_densities(&d).unwrap();
        let minmax = compute_interpolants(ColorMode::MeanMinMax, &d, &ctx).unwrap();
        // Means sit at base + 5, 15, 25 over the range [base, base + 30].
        assert_relative_eq!(minmax[0][0], 5.0 / 30.0, epsilon = 1e-4);
        assert_relative_eq!(minmax[1][0], 0.5, epsilon = 1e-4);
        assert_relative_eq!(minmax[2][0], 25.0 / 30.0, epsilon = 1e-4);

        let means = compute_interpolants(ColorMode::MeanMeans, &d, &ctx).unwrap();
        assert_relative_eq!(means[0][0], 0.0, epsilon = 1e-4);
        assert_relative_eq!(means[1][0], 0.5, epsilon = 1e-4);
        assert_relative_eq!(means[2][0], 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_mean_modes() {
        let d = densities(vec![
            vec![(vec![0.0, 1.0, 2.0], vec![0.0, 1.0, 0.0])],
            vec![(vec![2.0, 3.0, 4.0], vec![0.0, 1.0, 0.0])],
        ]);
        let ctx = InterpolationContext::from_densities(&d).unwrap();
        let minmax = compute_interpolants(ColorMode::MeanMinMax, &d, &ctx).unwrap();
        assert_relative_eq!(minmax[0][0], 0.25, epsilon = 1e-5);
        assert_relative_eq!(minmax[1][0], 0.75, epsilon = 1e-5);

        let means = compute_interpolants(ColorMode::MeanMeans, &d, &ctx).unwrap();
        assert_relative_eq!(means[0][0], 0.0, epsilon = 1e-5);
        assert_relative_eq!(means[1][0], 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_fillgradient_slices_scale() {
        let d = densities(vec![
            vec![(vec![0.0, 1.0, 2.0], vec![0.0, 1.0, 0.0])],
            vec![(vec![2.0, 3.0, 4.0], vec![0.0, 1.0, 0.0])],
        ]);
        let colors =
            compute_trace_colors(&d, &bw(), ColorMode::FillGradient, None, TraceKind::Area)
                .unwrap();
        let Fill::Gradient(first) = &colors[0][0].fill else {
            panic!("expected a gradient");
        };
        assert_eq!(first.interpolate(0.0), Rgba::BLACK);
        let mid = first.interpolate(1.0);
        assert_relative_eq!(mid.r, 127.5, epsilon = 1e-9);
    }

    #[test]
    fn test_fillgradient_bars_get_per_bar_colors() {
        let d = densities(vec![vec![(vec![0.0, 1.0, 2.0], vec![1.0, 2.0, 1.0])]]);
        let colors =
            compute_trace_colors(&d, &bw(), ColorMode::FillGradient, None, TraceKind::Bar)
                .unwrap();
        let Fill::PerBar(bars) = &colors[0][0].fill else {
            panic!("expected per-bar colors");
        };
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0], Rgba::BLACK);
        assert_eq!(bars[2], Rgba::WHITE);
    }

    #[test]
    fn test_opacity_overrides_alpha() {
        let d = simple(2, 1);
        let colors =
            compute_trace_colors(&d, &bw(), ColorMode::FillGradient, Some(0.4), TraceKind::Area)
                .unwrap();
        let Fill::Gradient(scale) = &colors[1][0].fill else {
            panic!("expected a gradient");
        };
        for (_, c) in scale.stops() {
            assert_relative_eq!(c.a, 0.4, epsilon = 1e-12);
        }
        assert_relative_eq!(colors[1][0].solid.a, 0.4, epsilon = 1e-12);

        let solid =
            compute_trace_colors(&d, &bw(), ColorMode::RowIndex, Some(0.2), TraceKind::Area)
                .unwrap();
        assert_eq!(solid[1][0].fill, Fill::Solid(Rgba::WHITE.with_alpha(0.2)));

        assert!(compute_trace_colors(&d, &bw(), ColorMode::RowIndex, Some(1.5), TraceKind::Area)
            .is_err());
    }

    #[test]
    fn test_undensified_samples_are_rejected() {
        let d = NestedSamples::from_rows(vec![vec![TraceData::Samples(vec![1.0, 2.0])]]).unwrap();
        assert!(matches!(InterpolationContext::from_densities(&d), Err(Error::Shape(_))));
    }

    #[test]
    fn test_color_spec_resolution() {
        let theme = Theme::default();
        let auto = ColorSpec::Auto.resolve(&theme).unwrap();
        assert_eq!(auto, palettes::get_colorscale("plasma").unwrap());

        let named = ColorSpec::from("viridis_r").resolve(&theme).unwrap();
        assert_eq!(named, palettes::get_colorscale("viridis").unwrap().reversed());

        let colors = ColorSpec::Colors(vec!["red".into(), "#0000ff".into()])
            .resolve(&theme)
            .unwrap();
        assert_eq!(colors.interpolate(0.0), Rgba::RED);
        assert_eq!(colors.interpolate(1.0), Rgba::BLUE);

        let err = ColorSpec::from("not-a-scale").resolve(&theme).unwrap_err();
        assert!(matches!(err, Error::ColorResolution(_)));
        assert!(err.to_string().contains("not-a-scale"));

        let err = ColorSpec::Colors(vec!["rgb(1, 2)".into()]).resolve(&theme).unwrap_err();
        assert!(matches!(err, Error::ColorResolution(_)));
    }
}
