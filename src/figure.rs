//! Figure specification.
//!
//! [`FigureSpec`] is the finished, backend-neutral description of a ridgeline
//! chart: an ordered list of [`ResolvedTrace`] plus layout. It serializes to
//! Plotly's figure JSON (`{"data": [...], "layout": {...}}`).

use std::str::FromStr;

use serde_json::{json, Map, Value as Json};

use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::scale::ColorScale;
use crate::theme::Theme;

/// Hover label showing the point and its unshifted density.
pub const DEFAULT_HOVERTEMPLATE: &str =
    "(%{x:.7}, %{customdata[0]:.7})<br><extra>%{fullData.name}</extra>";

/// How a trace is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraceKind {
    /// Filled area under the curve.
    #[default]
    Area,
    /// Bars (binned densities).
    Bar,
}

impl FromStr for TraceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "area" => Ok(TraceKind::Area),
            "bar" => Ok(TraceKind::Bar),
            _ => Err(Error::validation(format!(
                "invalid trace type {s:?}, expected \"area\" or \"bar\""
            ))),
        }
    }
}

/// Fill of one trace.
#[derive(Debug, Clone, PartialEq)]
pub enum Fill {
    /// A flat color.
    Solid(Rgba),
    /// A horizontal color ramp across the trace.
    Gradient(ColorScale),
    /// One color per bar.
    PerBar(Vec<Rgba>),
}

/// Drawable coordinates, already shifted to the row baseline.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceGeometry {
    /// Closed polygon: the curve at `y + baseline`, then back along the
    /// baseline to the start.
    Area {
        /// Polygon x coordinates.
        x: Vec<f64>,
        /// Polygon y coordinates.
        y: Vec<f64>,
    },
    /// Bars rising from the baseline.
    Bar {
        /// Bar positions.
        x: Vec<f64>,
        /// Bar heights above the baseline.
        height: Vec<f64>,
    },
}

/// One drawable trace. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTrace {
    /// Shifted coordinates.
    pub geometry: TraceGeometry,
    /// Unshifted density at each curve point, for hover labels.
    pub density: Vec<f64>,
    /// Fill color or ramp.
    pub fill: Fill,
    /// Outline color.
    pub line_color: Rgba,
    /// Outline width.
    pub line_width: f64,
    /// Vertical offset of the trace's row.
    pub baseline: f64,
    /// Legend name; empty for all but the first trace of a row.
    pub label: String,
    /// Row index.
    pub row: usize,
    /// Index within the row.
    pub trace_in_row: usize,
    /// Draw order; higher draws on top.
    pub zorder: i64,
}

impl ResolvedTrace {
    /// Kind of trace.
    #[must_use]
    pub fn kind(&self) -> TraceKind {
        match self.geometry {
            TraceGeometry::Area { .. } => TraceKind::Area,
            TraceGeometry::Bar { .. } => TraceKind::Bar,
        }
    }

    fn to_plotly_json(&self) -> Json {
        let mut trace = Map::new();
        trace.insert("name".into(), json!(self.label));
        trace.insert("showlegend".into(), json!(!self.label.is_empty()));
        trace.insert("legendgroup".into(), json!(format!("row-{}", self.row)));
        trace.insert("zorder".into(), json!(self.zorder));
        trace.insert("hovertemplate".into(), json!(DEFAULT_HOVERTEMPLATE));

        match &self.geometry {
            TraceGeometry::Area { x, y } => {
                // the closing baseline path has zero density
                let mut customdata: Vec<[f64; 1]> = self.density.iter().map(|&d| [d]).collect();
                customdata.resize(x.len(), [0.0]);

                trace.insert("type".into(), json!("scatter"));
                trace.insert("mode".into(), json!("lines"));
                trace.insert("fill".into(), json!("toself"));
                trace.insert("x".into(), json!(x));
                trace.insert("y".into(), json!(y));
                trace.insert("customdata".into(), json!(customdata));
                trace.insert(
                    "line".into(),
                    json!({ "color": self.line_color.to_string(), "width": self.line_width }),
                );
                match &self.fill {
                    Fill::Gradient(scale) => {
                        trace.insert(
                            "fillgradient".into(),
                            json!({ "type": "horizontal", "colorscale": scale }),
                        );
                    }
                    Fill::Solid(c) => {
                        trace.insert("fillcolor".into(), json!(c.to_string()));
                    }
                    // `build_traces` never pairs an area with per-bar colors; a
                    // hand-built trace gets its first color.
                    Fill::PerBar(colors) => {
                        let c = colors.first().copied().unwrap_or(self.line_color);
                        trace.insert("fillcolor".into(), json!(c.to_string()));
                    }
                }
            }
            TraceGeometry::Bar { x, height } => {
                let color = match &self.fill {
                    Fill::Solid(c) => json!(c.to_string()),
                    Fill::PerBar(colors) => {
                        json!(colors.iter().map(ToString::to_string).collect::<Vec<_>>())
                    }
                    Fill::Gradient(scale) => json!(scale.interpolate(0.5).to_string()),
                };
                let customdata: Vec<[f64; 1]> = self.density.iter().map(|&d| [d]).collect();

                trace.insert("type".into(), json!("bar"));
                trace.insert("x".into(), json!(x));
                trace.insert("y".into(), json!(height));
                trace.insert("base".into(), json!(self.baseline));
                trace.insert("customdata".into(), json!(customdata));
                trace.insert(
                    "marker".into(),
                    json!({
                        "color": color,
                        "line": { "color": self.line_color.to_string(), "width": self.line_width },
                    }),
                );
            }
        }
        Json::Object(trace)
    }
}

/// One axis.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Axis {
    /// Visible range.
    pub range: Option<(f64, f64)>,
    /// Tick positions.
    pub tickvals: Vec<f64>,
    /// Tick labels, parallel to `tickvals`.
    pub ticktext: Vec<String>,
    /// Show tick labels.
    pub show_ticklabels: bool,
    /// Show grid lines.
    pub show_grid: bool,
}

impl Axis {
    fn to_plotly_json(&self, theme: &Theme) -> Json {
        let mut axis = Map::new();
        axis.insert("zeroline".into(), json!(false));
        axis.insert("showgrid".into(), json!(self.show_grid));
        axis.insert("gridcolor".into(), json!(theme.grid_color.to_string()));
        axis.insert("showticklabels".into(), json!(self.show_ticklabels));
        if let Some((lo, hi)) = self.range {
            axis.insert("range".into(), json!([lo, hi]));
        }
        if !self.tickvals.is_empty() {
            axis.insert("tickmode".into(), json!("array"));
            axis.insert("tickvals".into(), json!(self.tickvals));
            axis.insert("ticktext".into(), json!(self.ticktext));
        }
        Json::Object(axis)
    }
}

/// Axis and page configuration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FigureLayout {
    /// Horizontal axis, padded around the data.
    pub xaxis: Axis,
    /// Vertical axis, one tick per row baseline.
    pub yaxis: Axis,
    /// Vertical spacing factor used for the baselines.
    pub spacing: f64,
    /// Visual theme.
    pub theme: Theme,
    /// Figure width in pixels.
    pub width: Option<u32>,
    /// Figure height in pixels.
    pub height: Option<u32>,
}

/// A complete ridgeline figure.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FigureSpec {
    /// Traces in draw order.
    pub traces: Vec<ResolvedTrace>,
    /// Layout.
    pub layout: FigureLayout,
}

impl FigureSpec {
    /// Number of traces.
    #[must_use]
    pub fn n_traces(&self) -> usize {
        self.traces.len()
    }

    /// Distinct row baselines, in row order.
    #[must_use]
    pub fn baselines(&self) -> Vec<f64> {
        let mut out: Vec<f64> = Vec::new();
        let mut last_row = None;
        for t in &self.traces {
            if last_row != Some(t.row) {
                out.push(t.baseline);
                last_row = Some(t.row);
            }
        }
        out
    }

    /// Plotly figure JSON.
    #[must_use]
    pub fn to_plotly_json(&self) -> Json {
        let theme = &self.layout.theme;
        let data: Vec<Json> = self.traces.iter().map(ResolvedTrace::to_plotly_json).collect();

        let mut layout = Map::new();
        layout.insert("legend".into(), json!({ "traceorder": "normal" }));
        layout.insert("paper_bgcolor".into(), json!(theme.paper_background.to_string()));
        layout.insert("plot_bgcolor".into(), json!(theme.plot_background.to_string()));
        layout.insert("font".into(), json!({ "color": theme.text_color.to_string() }));
        layout.insert("xaxis".into(), self.layout.xaxis.to_plotly_json(theme));
        layout.insert("yaxis".into(), self.layout.yaxis.to_plotly_json(theme));
        if self.traces.iter().any(|t| t.kind() == TraceKind::Bar) {
            layout.insert("barmode".into(), json!("overlay"));
            layout.insert("bargap".into(), json!(0));
        }
        if let Some(w) = self.layout.width {
            layout.insert("width".into(), json!(w));
        }
        if let Some(h) = self.layout.height {
            layout.insert("height".into(), json!(h));
        }

        json!({ "data": data, "layout": layout })
    }

    /// Plotly figure JSON as a string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if encoding fails.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_plotly_json())?)
    }

    /// Pretty-printed Plotly figure JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if encoding fails.
    pub fn to_json_string_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_plotly_json())?)
    }
}

impl batuta_common::display::WithDimensions for FigureSpec {
    fn set_dimensions(&mut self, width: u32, height: u32) {
        self.layout.width = Some(width);
        self.layout.height = Some(height);
    }
}
