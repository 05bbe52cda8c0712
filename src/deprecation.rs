//! Deprecated argument aliases.
//!
//! Legacy names are mapped onto their replacements once, before validation.
//! Each use is logged with `tracing::warn!` and recorded as a
//! [`DeprecationNotice`] on the result.

use std::fmt;

use tracing::warn;

use crate::colormode::ColorMode;
use crate::error::{Error, Result};
use crate::palettes::DEFAULT_ALIAS;

/// Legacy colormode name for [`ColorMode::RowIndex`].
pub const LEGACY_INDEX_COLORMODE: &str = "index";

/// Every legacy alias and what replaces it.
pub const DEPRECATIONS: [(&str, &str); 5] = [
    ("coloralpha", "opacity"),
    ("linewidth", "line_width"),
    ("show_annotations", "show_yticklabels"),
    ("colormode=\"index\"", "colormode=\"row-index\""),
    ("colorscale=\"default\"", "an explicit list of the Plotly default colors"),
];

/// One use of a deprecated argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeprecationNotice {
    /// What was used.
    pub legacy: &'static str,
    /// What to use instead.
    pub replacement: &'static str,
}

impl fmt::Display for DeprecationNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} is deprecated in favor of {}; support for it will be removed in a future version",
            self.legacy, self.replacement
        )
    }
}

/// Values given under legacy names.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LegacyArgs {
    /// Old name of `opacity`.
    pub coloralpha: Option<f64>,
    /// Old name of `line_width`.
    pub linewidth: Option<f64>,
    /// Old name of `show_yticklabels`.
    pub show_annotations: Option<bool>,
}

/// The canonical arguments a legacy alias can feed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CanonicalArgs {
    /// Fill opacity.
    pub opacity: Option<f64>,
    /// Outline width.
    pub line_width: Option<f64>,
    /// Show y tick labels.
    pub show_yticklabels: Option<bool>,
    /// Colormode name, possibly legacy.
    pub colormode: Option<String>,
    /// Colorscale name, if given by name.
    pub colorscale_name: Option<String>,
}

/// Canonical arguments after legacy aliases were applied.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolvedArgs {
    /// Fill opacity.
    pub opacity: Option<f64>,
    /// Outline width.
    pub line_width: Option<f64>,
    /// Show y tick labels.
    pub show_yticklabels: Option<bool>,
    /// Parsed colormode.
    pub colormode: Option<ColorMode>,
    /// Notices, one per legacy alias used.
    pub notices: Vec<DeprecationNotice>,
}

fn notice(notices: &mut Vec<DeprecationNotice>, index: usize) {
    let (legacy, replacement) = DEPRECATIONS[index];
    let n = DeprecationNotice { legacy, replacement };
    warn!(legacy, replacement, "{n}");
    notices.push(n);
}

/// Map legacy aliases onto canonical arguments.
///
/// # Errors
///
/// Returns [`Error::Validation`] when both `coloralpha` and `opacity` are set,
/// when a legacy alias conflicts with its replacement, or for an unknown
/// colormode.
pub fn resolve(canonical: CanonicalArgs, legacy: &LegacyArgs) -> Result<ResolvedArgs> {
    let mut notices = Vec::new();
    let mut out = ResolvedArgs {
        opacity: canonical.opacity,
        line_width: canonical.line_width,
        show_yticklabels: canonical.show_yticklabels,
        ..ResolvedArgs::default()
    };

    if let Some(alpha) = legacy.coloralpha {
        if canonical.opacity.is_some() {
            return Err(Error::validation(
                "you may not specify both the 'coloralpha' and 'opacity' arguments; \
                 use the new 'opacity' argument instead of the deprecated 'coloralpha'",
            ));
        }
        notice(&mut notices, 0);
        out.opacity = Some(alpha);
    }

    if let Some(width) = legacy.linewidth {
        notice(&mut notices, 1);
        out.line_width = Some(width);
    }

    if let Some(show) = legacy.show_annotations {
        if canonical.show_yticklabels.is_some_and(|s| s != show) {
            return Err(Error::validation(
                "'show_annotations' and 'show_yticklabels' disagree; \
                 use 'show_yticklabels' only",
            ));
        }
        notice(&mut notices, 2);
        out.show_yticklabels = Some(show);
    }

    if let Some(mode) = canonical.colormode.as_deref() {
        out.colormode = Some(if mode.trim().eq_ignore_ascii_case(LEGACY_INDEX_COLORMODE) {
            notice(&mut notices, 3);
            ColorMode::RowIndex
        } else {
            mode.parse()?
        });
    }

    let default_alias = canonical
        .colorscale_name
        .as_deref()
        .is_some_and(|n| n.trim().eq_ignore_ascii_case(DEFAULT_ALIAS));
    if default_alias {
        notice(&mut notices, 4);
    }

    out.notices = notices;
    Ok(out)
}
