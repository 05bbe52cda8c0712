//! Color types, CSS color parsing and formatting.
//!
//! Channels are kept as floating point values so that interpolated colors are
//! not quantized: red/green/blue live in `[0, 255]` and alpha in `[0, 1]`,
//! matching the `rgb(...)`/`rgba(...)` strings understood by Plotly.
//!
//! Accepted string forms:
//!
//! - CSS named colors (`"steelblue"`, `"transparent"`)
//! - hex: `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`
//! - `rgb(r, g, b)` / `rgba(r, g, b, a)`, channels optionally in percent
//! - `hsl(h, s%, l%)` / `hsla(h, s%, l%, a)`

use std::fmt;
use std::str::FromStr;

use crate::css_colors;
use crate::error::{Error, Result};

/// Number of decimal digits kept when formatting channels.
const CHANNEL_DIGITS: i32 = 5;

/// RGBA color with floating-point components.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgba {
    /// Red component (0-255).
    pub r: f64,
    /// Green component (0-255).
    pub g: f64,
    /// Blue component (0-255).
    pub b: f64,
    /// Alpha component (0-1, 1 = fully opaque).
    pub a: f64,
}

impl Rgba {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);
    /// Opaque black.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    /// Opaque white.
    pub const WHITE: Self = Self::new(255.0, 255.0, 255.0, 1.0);
    /// Opaque red.
    pub const RED: Self = Self::new(255.0, 0.0, 0.0, 1.0);
    /// Opaque green.
    pub const GREEN: Self = Self::new(0.0, 255.0, 0.0, 1.0);
    /// Opaque blue.
    pub const BLUE: Self = Self::new(0.0, 0.0, 255.0, 1.0);

    /// Create a new RGBA color.
    #[must_use]
    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque RGB color (alpha = 1).
    #[must_use]
    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Create a color with modified alpha.
    #[must_use]
    pub const fn with_alpha(self, a: f64) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    /// Convert to array representation.
    #[must_use]
    pub const fn to_array(self) -> [f64; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Whether the color is fully opaque.
    #[must_use]
    pub fn is_opaque(self) -> bool {
        self.a >= 1.0
    }

    /// Linear interpolation between two colors, alpha included.
    ///
    /// `t` is clamped to `[0, 1]`; `t = 0` yields `self` and `t = 1` yields
    /// `other` exactly.
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let inv_t = 1.0 - t;

        Self::new(
            self.r * inv_t + other.r * t,
            self.g * inv_t + other.g * t,
            self.b * inv_t + other.b * t,
            self.a * inv_t + other.a * t,
        )
    }

    /// Parse any supported CSS color string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ColorResolution`] naming the value if it is not a
    /// recognized color.
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let lower = trimmed.to_ascii_lowercase();

        let parsed = if let Some(hex) = lower.strip_prefix('#') {
            parse_hex(hex)
        } else if let Some(args) = function_args(&lower, "rgba").or_else(|| function_args(&lower, "rgb"))
        {
            parse_rgb_args(args)
        } else if let Some(args) = function_args(&lower, "hsla").or_else(|| function_args(&lower, "hsl"))
        {
            parse_hsl_args(args)
        } else {
            css_colors::lookup(&lower)
        };

        parsed.ok_or_else(|| Error::color(format!("malformed or unknown color {trimmed:?}")))
    }
}

impl FromStr for Rgba {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Rgba {
    /// Formats as `rgb(r, g, b)` when opaque and `rgba(r, g, b, a)` otherwise.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_opaque() {
            write!(f, "rgb({}, {}, {})", fmt_channel(self.r), fmt_channel(self.g), fmt_channel(self.b))
        } else {
            write!(
                f,
                "rgba({}, {}, {}, {})",
                fmt_channel(self.r),
                fmt_channel(self.g),
                fmt_channel(self.b),
                fmt_channel(self.a)
            )
        }
    }
}

impl serde::Serialize for Rgba {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Round to [`CHANNEL_DIGITS`] and drop a zero fractional part.
fn fmt_channel(v: f64) -> String {
    let scale = 10f64.powi(CHANNEL_DIGITS);
    let rounded = (v * scale).round() / scale;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{rounded}")
    }
}

/// Return the text between `name(` and `)` if `s` is a call of `name`.
fn function_args<'a>(s: &'a str, name: &str) -> Option<&'a str> {
    s.strip_prefix(name)?.trim_start().strip_prefix('(')?.strip_suffix(')')
}

fn split_args(args: &str) -> Vec<&str> {
    args.split(',').map(str::trim).collect()
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(|v| f64::from(v * 17));
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok().map(f64::from);

    match hex.len() {
        3 => Some(Rgba::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
        4 => Some(Rgba::new(nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)? / 255.0)),
        6 => Some(Rgba::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Rgba::new(byte(0)?, byte(2)?, byte(4)?, byte(6)? / 255.0)),
        _ => None,
    }
}

/// A color channel: plain number in `[0, 255]` or a percentage.
fn parse_channel(s: &str) -> Option<f64> {
    let v = if let Some(pct) = s.strip_suffix('%') {
        pct.trim().parse::<f64>().ok()? / 100.0 * 255.0
    } else {
        s.parse::<f64>().ok()?
    };
    (v.is_finite() && (0.0..=255.0).contains(&v)).then_some(v)
}

/// An alpha value: number in `[0, 1]` or a percentage.
fn parse_alpha(s: &str) -> Option<f64> {
    let v = if let Some(pct) = s.strip_suffix('%') {
        pct.trim().parse::<f64>().ok()? / 100.0
    } else {
        s.parse::<f64>().ok()?
    };
    (v.is_finite() && (0.0..=1.0).contains(&v)).then_some(v)
}

fn parse_percent(s: &str) -> Option<f64> {
    let v = s.strip_suffix('%')?.trim().parse::<f64>().ok()? / 100.0;
    (v.is_finite() && (0.0..=1.0).contains(&v)).then_some(v)
}

fn parse_rgb_args(args: &str) -> Option<Rgba> {
    match split_args(args).as_slice() {
        [r, g, b] => Some(Rgba::rgb(parse_channel(r)?, parse_channel(g)?, parse_channel(b)?)),
        [r, g, b, a] => {
            Some(Rgba::new(parse_channel(r)?, parse_channel(g)?, parse_channel(b)?, parse_alpha(a)?))
        }
        _ => None,
    }
}

fn parse_hsl_args(args: &str) -> Option<Rgba> {
    let parts = split_args(args);
    let (h, s, l, a) = match parts.as_slice() {
        [h, s, l] => (*h, *s, *l, None),
        [h, s, l, a] => (*h, *s, *l, Some(*a)),
        _ => return None,
    };
    let h = h.strip_suffix("deg").unwrap_or(h).trim().parse::<f64>().ok()?;
    if !h.is_finite() {
        return None;
    }
    let alpha = match a {
        Some(a) => parse_alpha(a)?,
        None => 1.0,
    };
    Some(Hsla::new(h.rem_euclid(360.0), parse_percent(s)?, parse_percent(l)?, alpha).to_rgba())
}

/// HSLA color with floating-point components.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Hsla {
    /// Hue (0.0-360.0 degrees).
    pub h: f64,
    /// Saturation (0.0-1.0).
    pub s: f64,
    /// Lightness (0.0-1.0).
    pub l: f64,
    /// Alpha (0.0-1.0).
    pub a: f64,
}

impl Hsla {
    /// Create a new HSLA color.
    #[must_use]
    pub const fn new(h: f64, s: f64, l: f64, a: f64) -> Self {
        Self { h, s, l, a }
    }

    /// Create an opaque HSL color (alpha = 1.0).
    #[must_use]
    pub const fn hsl(h: f64, s: f64, l: f64) -> Self {
        Self::new(h, s, l, 1.0)
    }

    /// Convert to RGBA.
    #[must_use]
    pub fn to_rgba(self) -> Rgba {
        let h = self.h / 360.0;
        let s = self.s;
        let l = self.l;

        let (r, g, b) = if s == 0.0 {
            (l, l, l)
        } else {
            let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
            let p = 2.0 * l - q;

            (hue_to_rgb(p, q, h + 1.0 / 3.0), hue_to_rgb(p, q, h), hue_to_rgb(p, q, h - 1.0 / 3.0))
        };

        Rgba::new(r * 255.0, g * 255.0, b * 255.0, self.a)
    }
}

fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }

    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

impl From<Hsla> for Rgba {
    fn from(hsla: Hsla) -> Self {
        hsla.to_rgba()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rgba_constants() {
        assert_eq!(Rgba::BLACK, Rgba::rgb(0.0, 0.0, 0.0));
        assert_eq!(Rgba::WHITE, Rgba::rgb(255.0, 255.0, 255.0));
        assert_eq!(Rgba::TRANSPARENT.a, 0.0);
    }

    #[test]
    fn test_rgba_lerp() {
        let mid = Rgba::BLACK.lerp(Rgba::WHITE, 0.5);
        assert_relative_eq!(mid.r, 127.5);
        assert_relative_eq!(mid.g, 127.5);
        assert_relative_eq!(mid.b, 127.5);
    }

    #[test]
    fn test_lerp_boundaries_are_exact() {
        let a = Rgba::new(68.0, 1.0, 84.0, 1.0);
        let b = Rgba::new(253.0, 231.0, 37.0, 0.4);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, -0.5), a);
        assert_eq!(a.lerp(b, 1.5), b);
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(Rgba::parse("#ff0000").unwrap(), Rgba::RED);
        assert_eq!(Rgba::parse("#0F0").unwrap(), Rgba::GREEN);
        let c = Rgba::parse("#0000ff80").unwrap();
        assert_eq!(c.b, 255.0);
        assert_relative_eq!(c.a, 128.0 / 255.0);
    }

    #[test]
    fn test_parse_rgb_functions() {
        assert_eq!(Rgba::parse("rgb(68, 1, 84)").unwrap(), Rgba::rgb(68.0, 1.0, 84.0));
        assert_eq!(Rgba::parse("rgba(10, 20, 30, 0.5)").unwrap(), Rgba::new(10.0, 20.0, 30.0, 0.5));
        assert_eq!(Rgba::parse("RGB(100%, 0%, 0%)").unwrap(), Rgba::RED);
    }

    #[test]
    fn test_parse_hsl() {
        let red = Rgba::parse("hsl(0, 100%, 50%)").unwrap();
        assert_relative_eq!(red.r, 255.0, epsilon = 1e-9);
        assert_relative_eq!(red.g, 0.0, epsilon = 1e-9);
        let green = Rgba::parse("hsla(120deg, 100%, 50%, 0.3)").unwrap();
        assert_relative_eq!(green.g, 255.0, epsilon = 1e-9);
        assert_relative_eq!(green.a, 0.3);
    }

    #[test]
    fn test_parse_named() {
        assert_eq!(Rgba::parse(" Blue ").unwrap(), Rgba::BLUE);
    }

    #[test]
    fn test_parse_malformed_names_value() {
        for bad in ["#ggg", "rgb(1, 2)", "rgb(300, 0, 0)", "hsl(0, 50, 50)", "not-a-color", ""] {
            let err = Rgba::parse(bad).unwrap_err();
            assert!(matches!(err, Error::ColorResolution(_)), "{bad}");
            assert!(err.to_string().contains(bad.trim()));
        }
    }

    #[test]
    fn test_display_rgb_and_rgba() {
        assert_eq!(Rgba::rgb(68.0, 1.0, 84.0).to_string(), "rgb(68, 1, 84)");
        assert_eq!(Rgba::new(68.0, 1.5, 84.0, 0.5).to_string(), "rgba(68, 1.5, 84, 0.5)");
    }

    #[test]
    fn test_display_rounds_channels() {
        assert_eq!(Rgba::rgb(1.0 / 3.0, 0.0, 0.0).to_string(), "rgb(0.33333, 0, 0)");
    }

    #[test]
    fn test_hsla_to_rgba() {
        let gray = Hsla::hsl(0.0, 0.0, 0.5).to_rgba();
        assert_relative_eq!(gray.r, 127.5);
        assert_relative_eq!(gray.b, 127.5);

        let cyan = Hsla::hsl(180.0, 1.0, 0.5).to_rgba();
        assert_relative_eq!(cyan.r, 0.0, epsilon = 1e-9);
        assert_relative_eq!(cyan.g, 255.0, epsilon = 1e-9);
        assert_relative_eq!(cyan.b, 255.0, epsilon = 1e-9);
    }

    #[test]
    fn test_hsla_low_lightness() {
        let dark_red: Rgba = Hsla::hsl(0.0, 1.0, 0.25).into();
        assert_relative_eq!(dark_red.r, 127.5);
        assert_relative_eq!(dark_red.g, 0.0);
    }

    #[test]
    fn test_serialize_as_css_string() {
        let json = serde_json::to_string(&Rgba::rgb(1.0, 2.0, 3.0)).unwrap();
        assert_eq!(json, "\"rgb(1, 2, 3)\"");
    }
}
