//! Scale functions for data-to-visual mappings.
//!
//! [`LinearScale`] maps a numeric domain onto a numeric range (used for
//! min-max normalization of color positions). [`ColorScale`] maps a position
//! in `[0, 1]` onto a color through ordered breakpoints.

use crate::color::Rgba;
use crate::error::{Error, Result};

/// Trait for scale functions that map domain values to range values.
pub trait Scale<D, R> {
    /// Transform a domain value to a range value.
    fn scale(&self, value: D) -> R;

    /// Get the domain extent.
    fn domain(&self) -> (D, D);

    /// Get the range extent.
    fn range(&self) -> (R, R);
}

/// Linear scale for continuous-to-continuous mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain_min: f64,
    domain_max: f64,
    range_min: f64,
    range_max: f64,
}

impl LinearScale {
    /// Create a new linear scale.
    ///
    /// # Errors
    ///
    /// Returns an error if the domain is empty or not finite.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Result<Self> {
        if !domain.0.is_finite() || !domain.1.is_finite() {
            return Err(Error::validation("scale domain must be finite"));
        }
        if (domain.0 - domain.1).abs() < f64::EPSILON {
            return Err(Error::validation("scale domain min and max cannot be equal"));
        }

        Ok(Self { domain_min: domain.0, domain_max: domain.1, range_min: range.0, range_max: range.1 })
    }

    /// Create a scale from data extent.
    ///
    /// Returns `None` for empty or constant data.
    #[must_use]
    pub fn from_data(data: &[f64], range: (f64, f64)) -> Option<Self> {
        let (min, max) = extent(data)?;
        Self::new((min, max), range).ok()
    }

    /// Normalize `value` from `(min, max)` onto `[0, 1]`.
    ///
    /// A degenerate extent maps everything to `0`.
    #[must_use]
    pub fn normalize(value: f64, min: f64, max: f64) -> f64 {
        Self::new((min, max), (0.0, 1.0)).map_or(0.0, |s| s.scale(value))
    }

    /// Invert the scale (range to domain).
    #[must_use]
    pub fn invert(&self, value: f64) -> f64 {
        let t = (value - self.range_min) / (self.range_max - self.range_min);
        self.domain_min + t * (self.domain_max - self.domain_min)
    }
}

impl Scale<f64, f64> for LinearScale {
    fn scale(&self, value: f64) -> f64 {
        let t = (value - self.domain_min) / (self.domain_max - self.domain_min);
        self.range_min + t * (self.range_max - self.range_min)
    }

    fn domain(&self) -> (f64, f64) {
        (self.domain_min, self.domain_max)
    }

    fn range(&self) -> (f64, f64) {
        (self.range_min, self.range_max)
    }
}

/// Minimum and maximum of `data`, or `None` when empty.
pub(crate) fn extent(data: &[f64]) -> Option<(f64, f64)> {
    if data.is_empty() {
        return None;
    }
    let min = data.iter().copied().fold(f64::INFINITY, f64::min);
    let max = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some((min, max))
}

/// Continuous color scale defined by `(position, color)` breakpoints.
///
/// Positions are non-decreasing, start at `0.0` and end at `1.0`. Repeated
/// positions are allowed and produce a hard color step.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    stops: Vec<(f64, Rgba)>,
}

impl ColorScale {
    /// Create a color scale from explicit breakpoints.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ColorResolution`] when fewer than two stops are given,
    /// a position is outside `[0, 1]`, positions decrease, or the scale does
    /// not start at 0 and end at 1.
    pub fn new(stops: Vec<(f64, Rgba)>) -> Result<Self> {
        if stops.len() < 2 {
            return Err(Error::color(format!(
                "a colorscale needs at least 2 breakpoints, got {}",
                stops.len()
            )));
        }
        for &(p, _) in &stops {
            if !(0.0..=1.0).contains(&p) {
                return Err(Error::color(format!("colorscale position {p} is outside [0, 1]")));
            }
        }
        if stops.windows(2).any(|w| w[1].0 < w[0].0) {
            return Err(Error::color("colorscale positions must be non-decreasing"));
        }
        let first = stops[0].0;
        let last = stops[stops.len() - 1].0;
        if first != 0.0 || last != 1.0 {
            return Err(Error::color(format!(
                "colorscale must span [0, 1], got [{first}, {last}]"
            )));
        }
        Ok(Self { stops })
    }

    /// Evenly space `colors` over `[0, 1]`.
    ///
    /// A single color yields a constant scale.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ColorResolution`] when `colors` is empty.
    pub fn from_colors(colors: &[Rgba]) -> Result<Self> {
        match colors {
            [] => Err(Error::color("a colorscale needs at least one color")),
            [only] => Ok(Self { stops: vec![(0.0, *only), (1.0, *only)] }),
            _ => {
                let last = (colors.len() - 1) as f64;
                let stops =
                    colors.iter().enumerate().map(|(i, &c)| (i as f64 / last, c)).collect();
                Ok(Self { stops })
            }
        }
    }

    /// Parse every color string and evenly space the results.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ColorResolution`] naming the first malformed color.
    pub fn from_color_strings<S: AsRef<str>>(colors: &[S]) -> Result<Self> {
        let parsed =
            colors.iter().map(|c| Rgba::parse(c.as_ref())).collect::<Result<Vec<_>>>()?;
        Self::from_colors(&parsed)
    }

    /// The breakpoints.
    #[must_use]
    pub fn stops(&self) -> &[(f64, Rgba)] {
        &self.stops
    }

    /// Colors at each breakpoint, in order.
    #[must_use]
    pub fn colors(&self) -> Vec<Rgba> {
        self.stops.iter().map(|&(_, c)| c).collect()
    }

    /// Color at position `t`, clamped to `[0, 1]`.
    ///
    /// Exactly on a breakpoint the breakpoint color is returned unchanged.
    #[must_use]
    pub fn interpolate(&self, t: f64) -> Rgba {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

        // index of the first stop strictly past t
        let upper = self.stops.partition_point(|&(p, _)| p <= t);
        if upper == 0 {
            return self.stops[0].1;
        }
        if upper == self.stops.len() {
            return self.stops[upper - 1].1;
        }
        let (p0, c0) = self.stops[upper - 1];
        let (p1, c1) = self.stops[upper];
        if t == p0 {
            return c0;
        }
        c0.lerp(c1, (t - p0) / (p1 - p0))
    }

    /// The portion of the scale between `lo` and `hi`, re-spread over `[0, 1]`.
    ///
    /// Interior breakpoints are kept at their relative positions. An empty or
    /// inverted interval gives a constant scale with the color at `lo`.
    #[must_use]
    pub fn slice(&self, lo: f64, hi: f64) -> Self {
        let lo = lo.clamp(0.0, 1.0);
        let hi = hi.clamp(0.0, 1.0);
        let start = self.interpolate(lo);
        if hi <= lo {
            return Self { stops: vec![(0.0, start), (1.0, start)] };
        }

        let width = hi - lo;
        let mut stops = Vec::with_capacity(self.stops.len() + 2);
        stops.push((0.0, start));
        stops.extend(
            self.stops.iter().filter(|&&(p, _)| p > lo && p < hi).map(|&(p, c)| ((p - lo) / width, c)),
        );
        stops.push((1.0, self.interpolate(hi)));
        Self { stops }
    }

    /// The same colors in reverse order.
    #[must_use]
    pub fn reversed(&self) -> Self {
        let stops = self.stops.iter().rev().map(|&(p, c)| (1.0 - p, c)).collect();
        Self { stops }
    }

    /// Replace the alpha channel of every breakpoint.
    #[must_use]
    pub fn with_opacity(&self, alpha: f64) -> Self {
        let stops = self.stops.iter().map(|&(p, c)| (p, c.with_alpha(alpha))).collect();
        Self { stops }
    }
}

impl Scale<f64, Rgba> for ColorScale {
    fn scale(&self, value: f64) -> Rgba {
        self.interpolate(value)
    }

    fn domain(&self) -> (f64, f64) {
        (0.0, 1.0)
    }

    fn range(&self) -> (Rgba, Rgba) {
        (self.stops[0].1, self.stops[self.stops.len() - 1].1)
    }
}

impl serde::Serialize for ColorScale {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeSeq;

        let mut seq = serializer.serialize_seq(Some(self.stops.len()))?;
        for (p, c) in &self.stops {
            seq.serialize_element(&(p, c))?;
        }
        seq.end()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn color() -> impl Strategy<Value = Rgba> {
        (0.0..=255.0f64, 0.0..=255.0f64, 0.0..=255.0f64, 0.0..=1.0f64)
            .prop_map(|(r, g, b, a)| Rgba::new(r, g, b, a))
    }

    proptest! {
        #[test]
        fn interpolate_stays_within_channel_bounds(
            colors in prop::collection::vec(color(), 1..8),
            t in -1.0..2.0f64,
        ) {
            let scale = ColorScale::from_colors(&colors).expect("non-empty");
            let c = scale.interpolate(t);
            let tol = 1e-9;
            prop_assert!((-tol..=255.0 + tol).contains(&c.r));
            prop_assert!((-tol..=255.0 + tol).contains(&c.g));
            prop_assert!((-tol..=255.0 + tol).contains(&c.b));
            prop_assert!((-tol..=1.0 + tol).contains(&c.a));
        }

        #[test]
        fn endpoints_are_exact(colors in prop::collection::vec(color(), 1..8)) {
            let scale = ColorScale::from_colors(&colors).expect("non-empty");
            prop_assert_eq!(scale.interpolate(0.0), colors[0]);
            prop_assert_eq!(scale.interpolate(1.0), colors[colors.len() - 1]);
        }

        #[test]
        fn slice_endpoints_match_parent(
            colors in prop::collection::vec(color(), 2..6),
            lo in 0.0..0.5f64,
            hi in 0.5..1.0f64,
        ) {
            let scale = ColorScale::from_colors(&colors).expect("non-empty");
            let sliced = scale.slice(lo, hi);
            prop_assert_eq!(sliced.interpolate(0.0), scale.interpolate(lo));
            prop_assert_eq!(sliced.interpolate(1.0), scale.interpolate(hi));
        }
    }
}
