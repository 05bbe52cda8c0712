//! Figure themes.
//!
//! A theme controls the non-data appearance of the figure (backgrounds, grid,
//! text) and supplies the sequential colorscale used when no colorscale is
//! given. Themes are plain values passed to the builder; there is no global
//! "current theme".

use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::palettes;
use crate::scale::ColorScale;

/// Colorscale used when neither the caller nor the theme provides one.
pub const FALLBACK_COLORSCALE: &str = "viridis";

/// Theme specification.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    /// Preset name, emitted as the figure's template name.
    pub name: String,
    /// Sequential colorscale used for automatic coloring.
    pub sequential: Option<ColorScale>,
    /// Figure background color.
    pub paper_background: Rgba,
    /// Plotting-area background color.
    pub plot_background: Rgba,
    /// Grid line color.
    pub grid_color: Rgba,
    /// Text color.
    pub text_color: Rgba,
    /// Show x-axis grid lines.
    pub show_grid: bool,
}

impl Default for Theme {
    fn default() -> Self {
        Self::plotly()
    }
}

impl Theme {
    /// Names accepted by [`Theme::by_name`].
    pub const PRESETS: [&'static str; 7] =
        ["ggplot2", "none", "plotly", "plotly_dark", "plotly_white", "seaborn", "simple_white"];

    fn preset(name: &str, sequential: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            sequential: sequential.and_then(|s| palettes::get_colorscale(s).ok()),
            paper_background: Rgba::WHITE,
            plot_background: Rgba::WHITE,
            grid_color: Rgba::WHITE,
            text_color: Rgba::BLACK,
            show_grid: true,
        }
    }

    /// Plotly's default look.
    #[must_use]
    pub fn plotly() -> Self {
        Self {
            plot_background: Rgba::rgb(229.0, 236.0, 246.0),
            text_color: Rgba::rgb(42.0, 63.0, 95.0),
            ..Self::preset("plotly", Some("plasma"))
        }
    }

    /// Plotly look on a white plotting area.
    #[must_use]
    pub fn plotly_white() -> Self {
        Self {
            grid_color: Rgba::rgb(235.0, 240.0, 248.0),
            text_color: Rgba::rgb(42.0, 63.0, 95.0),
            ..Self::preset("plotly_white", Some("plasma"))
        }
    }

    /// Plotly dark mode.
    #[must_use]
    pub fn plotly_dark() -> Self {
        Self {
            paper_background: Rgba::rgb(17.0, 17.0, 17.0),
            plot_background: Rgba::rgb(17.0, 17.0, 17.0),
            grid_color: Rgba::rgb(40.0, 52.0, 66.0),
            text_color: Rgba::rgb(242.0, 245.0, 250.0),
            ..Self::preset("plotly_dark", Some("plasma"))
        }
    }

    /// ggplot2-like grey panel.
    #[must_use]
    pub fn ggplot2() -> Self {
        let sequential = ColorScale::new(vec![
            (0.0, Rgba::rgb(20.0, 44.0, 66.0)),
            (1.0, Rgba::rgb(90.0, 179.0, 244.0)),
        ])
        .ok();
        Self {
            sequential,
            plot_background: Rgba::rgb(237.0, 237.0, 237.0),
            text_color: Rgba::rgb(51.0, 51.0, 51.0),
            ..Self::preset("ggplot2", None)
        }
    }

    /// seaborn-like blue-grey panel.
    #[must_use]
    pub fn seaborn() -> Self {
        Self {
            plot_background: Rgba::rgb(234.0, 234.0, 242.0),
            text_color: Rgba::rgb(36.0, 36.0, 36.0),
            ..Self::preset("seaborn", None)
        }
    }

    /// Plain white, no grid.
    #[must_use]
    pub fn simple_white() -> Self {
        Self {
            grid_color: Rgba::rgb(232.0, 232.0, 232.0),
            text_color: Rgba::rgb(36.0, 36.0, 36.0),
            show_grid: false,
            ..Self::preset("simple_white", Some("viridis"))
        }
    }

    /// No styling at all.
    #[must_use]
    pub fn none() -> Self {
        Self::preset("none", None)
    }

    /// Look up a preset by name (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an unknown preset.
    pub fn by_name(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "plotly" => Ok(Self::plotly()),
            "plotly_white" => Ok(Self::plotly_white()),
            "plotly_dark" => Ok(Self::plotly_dark()),
            "ggplot2" => Ok(Self::ggplot2()),
            "seaborn" => Ok(Self::seaborn()),
            "simple_white" => Ok(Self::simple_white()),
            "none" => Ok(Self::none()),
            _ => Err(Error::validation(format!(
                "unknown theme {name:?}, expected one of {:?}",
                Self::PRESETS
            ))),
        }
    }

    /// The colorscale used for automatic coloring.
    ///
    /// Falls back to Viridis when the theme has no sequential scale.
    pub fn sequential_colorscale(&self) -> Result<ColorScale> {
        match &self.sequential {
            Some(scale) => Ok(scale.clone()),
            None => palettes::get_colorscale(FALLBACK_COLORSCALE),
        }
    }

    /// Set the sequential colorscale.
    #[must_use]
    pub fn sequential(mut self, scale: ColorScale) -> Self {
        self.sequential = Some(scale);
        self
    }

    /// Set the plotting-area background color.
    #[must_use]
    pub fn plot_background(mut self, color: Rgba) -> Self {
        self.plot_background = color;
        self
    }

    /// Set the grid color.
    #[must_use]
    pub fn grid_color(mut self, color: Rgba) -> Self {
        self.grid_color = color;
        self
    }

    /// Enable or disable grid lines.
    #[must_use]
    pub fn grid(mut self, show: bool) -> Self {
        self.show_grid = show;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_default_is_plotly() {
        let t = Theme::default();
        assert_eq!(t.name, "plotly");
        assert!(t.show_grid);
    }

    #[test]
    fn test_plotly_sequential_is_plasma() {
        let scale = Theme::plotly().sequential_colorscale().expect("resolves");
        assert_eq!(scale, palettes::get_colorscale("plasma").expect("known"));
    }

    #[test]
    fn test_none_falls_back_to_viridis() {
        let scale = Theme::none().sequential_colorscale().expect("resolves");
        assert_eq!(scale, palettes::get_colorscale("viridis").expect("known"));
        let seaborn = Theme::seaborn().sequential_colorscale().expect("resolves");
        assert_eq!(seaborn, scale);
    }

    #[test]
    fn test_ggplot2_custom_sequential() {
        let scale = Theme::ggplot2().sequential_colorscale().expect("resolves");
        assert_eq!(scale.interpolate(0.0), Rgba::rgb(20.0, 44.0, 66.0));
    }

    #[test]
    fn test_theme_dark() {
        let t = Theme::plotly_dark();
        assert_eq!(t.paper_background.r, 17.0);
    }

    #[test]
    fn test_simple_white_has_no_grid() {
        assert!(!Theme::simple_white().show_grid);
    }

    #[test]
    fn test_by_name_covers_presets() {
        for name in Theme::PRESETS {
            assert_eq!(Theme::by_name(name).expect("preset").name, name);
        }
        assert_eq!(Theme::by_name("Plotly_Dark").expect("preset"), Theme::plotly_dark());
        assert!(matches!(Theme::by_name("solarized"), Err(Error::Validation(_))));
    }

    #[test]
    fn test_theme_customization() {
        let t = Theme::none()
            .plot_background(Rgba::rgb(250.0, 250.0, 250.0))
            .grid_color(Rgba::BLACK)
            .grid(false)
            .sequential(palettes::get_colorscale("greys").expect("known"));
        assert!(!t.show_grid);
        assert_eq!(t.grid_color, Rgba::BLACK);
        assert_eq!(
            t.sequential_colorscale().expect("resolves").interpolate(0.0),
            Rgba::WHITE
        );
    }
}
