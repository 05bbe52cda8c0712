//! Named colorscales and qualitative palettes.
//!
//! The registry is built on first use and never mutated afterwards. Names are
//! matched case-insensitively; a `_r` suffix selects the reversed scale.
//! Qualitative palettes resolve to evenly spaced scales.

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::scale::ColorScale;

type Rgb = (u8, u8, u8);

/// Name of the deprecated alias for the Plotly default color sequence.
pub const DEFAULT_ALIAS: &str = "default";

const REVERSED_SUFFIX: &str = "_r";

#[derive(Clone, Copy)]
enum Stops {
    Even(&'static [Rgb]),
    Positioned(&'static [(f64, Rgb)]),
}

const CONTINUOUS_SCALES: &[(&str, Stops)] = &[
    ("blackbody", Stops::Positioned(BLACKBODY)),
    ("bluered", Stops::Positioned(BLUERED)),
    ("blues", Stops::Even(BLUES)),
    ("cividis", Stops::Even(CIVIDIS)),
    ("earth", Stops::Positioned(EARTH)),
    ("electric", Stops::Positioned(ELECTRIC)),
    ("greens", Stops::Even(GREENS)),
    ("greys", Stops::Even(GREYS)),
    ("hot", Stops::Positioned(HOT)),
    ("inferno", Stops::Even(INFERNO)),
    ("jet", Stops::Positioned(JET)),
    ("magma", Stops::Even(MAGMA)),
    ("oranges", Stops::Even(ORANGES)),
    ("picnic", Stops::Positioned(PICNIC)),
    ("plasma", Stops::Even(PLASMA)),
    ("plotly3", Stops::Even(PLOTLY3)),
    ("portland", Stops::Positioned(PORTLAND)),
    ("purples", Stops::Even(PURPLES)),
    ("rainbow", Stops::Positioned(RAINBOW)),
    ("rdbu", Stops::Even(RDBU)),
    ("reds", Stops::Even(REDS)),
    ("spectral", Stops::Even(SPECTRAL)),
    ("turbo", Stops::Even(TURBO)),
    ("viridis", Stops::Even(VIRIDIS)),
    ("ylgnbu", Stops::Even(YLGNBU)),
    ("ylorrd", Stops::Even(YLORRD)),
];

const QUALITATIVE_PALETTES: &[(&str, &[Rgb])] =
    &[("d3", D3), ("g10", G10), ("plotly", PLOTLY), ("t10", T10)];

lazy_static! {
    static ref CONTINUOUS: HashMap<&'static str, ColorScale> = {
        let mut m = HashMap::new();
        for &(name, stops) in CONTINUOUS_SCALES {
            if let Some(scale) = build_scale(stops) {
                m.insert(name, scale);
            }
        }
        if let Ok(scale) = ColorScale::from_colors(&plotly_default_colors()) {
            m.insert(DEFAULT_ALIAS, scale);
        }
        m
    };

    static ref QUALITATIVE: HashMap<&'static str, Vec<Rgba>> = QUALITATIVE_PALETTES
        .iter()
        .map(|&(name, colors)| (name, colors.iter().copied().map(to_rgba).collect()))
        .collect();
}

fn to_rgba((r, g, b): Rgb) -> Rgba {
    Rgba::rgb(f64::from(r), f64::from(g), f64::from(b))
}

fn build_scale(stops: Stops) -> Option<ColorScale> {
    match stops {
        Stops::Even(colors) => {
            let colors: Vec<Rgba> = colors.iter().copied().map(to_rgba).collect();
            ColorScale::from_colors(&colors).ok()
        }
        Stops::Positioned(stops) => {
            ColorScale::new(stops.iter().map(|&(p, c)| (p, to_rgba(c))).collect()).ok()
        }
    }
}

/// Plotly's legacy default trace colors (the `"default"` colorscale).
#[must_use]
pub fn plotly_default_colors() -> Vec<Rgba> {
    DEFAULT_PLOTLY_COLORS.iter().copied().map(to_rgba).collect()
}

/// Resolve a colorscale by name.
///
/// Continuous scales are searched first, then qualitative palettes (spread
/// evenly). A trailing `_r` reverses the result.
///
/// # Errors
///
/// Returns [`Error::ColorResolution`] naming `name` when nothing matches.
pub fn get_colorscale(name: &str) -> Result<ColorScale> {
    let key = name.trim().to_ascii_lowercase();
    let (base, reverse) = match key.strip_suffix(REVERSED_SUFFIX) {
        Some(base) => (base, true),
        None => (key.as_str(), false),
    };

    let scale = if let Some(scale) = CONTINUOUS.get(base) {
        scale.clone()
    } else if let Some(colors) = QUALITATIVE.get(base) {
        ColorScale::from_colors(colors)?
    } else {
        return Err(Error::color(format!("unknown colorscale {name:?}")));
    };

    Ok(if reverse { scale.reversed() } else { scale })
}

/// Resolve a qualitative palette by name as a list of colors.
///
/// # Errors
///
/// Returns [`Error::ColorResolution`] naming `name` when nothing matches.
pub fn get_palette(name: &str) -> Result<Vec<Rgba>> {
    let key = name.trim().to_ascii_lowercase();
    QUALITATIVE
        .get(key.as_str())
        .cloned()
        .ok_or_else(|| Error::color(format!("unknown palette {name:?}")))
}

/// Every continuous colorscale name, its `_r` reverse, and `default`.
///
/// Sorted and deduplicated; each name resolves with [`get_colorscale`].
#[must_use]
pub fn list_all_colorscale_names() -> Vec<String> {
    let mut names: Vec<String> = CONTINUOUS_SCALES
        .iter()
        .flat_map(|&(name, _)| [name.to_string(), format!("{name}{REVERSED_SUFFIX}")])
        .collect();
    names.push(DEFAULT_ALIAS.to_string());
    names.sort();
    names.dedup();
    names
}

/// Names of the qualitative palettes, sorted.
#[must_use]
pub fn list_palette_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = QUALITATIVE_PALETTES.iter().map(|&(n, _)| n).collect();
    names.sort_unstable();
    names
}

const VIRIDIS: &[Rgb] = &[
    (68, 1, 84), (72, 40, 120), (62, 73, 137), (49, 104, 142), (38, 130, 142), (31, 158, 137),
    (53, 183, 121), (110, 206, 88), (181, 222, 43), (253, 231, 37),
];

const PLASMA: &[Rgb] = &[
    (13, 8, 135), (70, 3, 159), (114, 1, 168), (156, 23, 158), (189, 55, 134), (216, 87, 107),
    (237, 121, 83), (251, 159, 58), (253, 202, 38), (240, 249, 33),
];

const INFERNO: &[Rgb] = &[
    (0, 0, 4), (27, 12, 65), (74, 12, 107), (120, 28, 109), (165, 44, 96), (207, 68, 70),
    (237, 105, 37), (251, 155, 6), (247, 209, 61), (252, 255, 164),
];

const MAGMA: &[Rgb] = &[
    (0, 0, 4), (24, 15, 61), (68, 15, 118), (114, 31, 129), (158, 47, 127), (205, 64, 113),
    (241, 96, 93), (253, 150, 104), (254, 202, 141), (252, 253, 191),
];

const CIVIDIS: &[Rgb] = &[
    (0, 34, 78), (18, 53, 112), (59, 73, 108), (87, 93, 109), (112, 113, 115), (138, 134, 120),
    (165, 156, 116), (195, 179, 105), (225, 204, 85), (254, 232, 56),
];

const TURBO: &[Rgb] = &[
    (48, 18, 59), (65, 69, 171), (70, 117, 237), (57, 162, 252), (27, 207, 212), (36, 236, 166),
    (97, 252, 108), (164, 252, 59), (209, 232, 52), (243, 198, 58), (254, 155, 45), (243, 99, 21),
    (217, 56, 6), (177, 25, 1), (122, 4, 2),
];

const PLOTLY3: &[Rgb] = &[
    (5, 8, 184), (25, 16, 216), (60, 25, 240), (107, 28, 251), (152, 28, 253), (191, 28, 253),
    (221, 43, 253), (242, 70, 254), (252, 103, 253), (254, 165, 253), (254, 190, 254),
    (254, 195, 254),
];

const BLUES: &[Rgb] = &[
    (247, 251, 255), (222, 235, 247), (198, 219, 239), (158, 202, 225), (107, 174, 214),
    (66, 146, 198), (33, 113, 181), (8, 81, 156), (8, 48, 107),
];

const GREENS: &[Rgb] = &[
    (247, 252, 245), (229, 245, 224), (199, 233, 192), (161, 217, 155), (116, 196, 118),
    (65, 171, 93), (35, 139, 69), (0, 109, 44), (0, 68, 27),
];

const GREYS: &[Rgb] = &[
    (255, 255, 255), (240, 240, 240), (217, 217, 217), (189, 189, 189), (150, 150, 150),
    (115, 115, 115), (82, 82, 82), (37, 37, 37), (0, 0, 0),
];

const ORANGES: &[Rgb] = &[
    (255, 245, 235), (254, 230, 206), (253, 208, 162), (253, 174, 107), (253, 141, 60),
    (241, 105, 19), (217, 72, 1), (166, 54, 3), (127, 39, 4),
];

const PURPLES: &[Rgb] = &[
    (252, 251, 253), (239, 237, 245), (218, 218, 235), (188, 189, 220), (158, 154, 200),
    (128, 125, 186), (106, 81, 163), (84, 39, 143), (63, 0, 125),
];

const REDS: &[Rgb] = &[
    (255, 245, 240), (254, 224, 210), (252, 187, 161), (252, 146, 114), (251, 106, 74),
    (239, 59, 44), (203, 24, 29), (165, 15, 21), (103, 0, 13),
];

const YLORRD: &[Rgb] = &[
    (255, 255, 204), (255, 237, 160), (254, 217, 118), (254, 178, 76), (253, 141, 60),
    (252, 78, 42), (227, 26, 28), (189, 0, 38), (128, 0, 38),
];

const YLGNBU: &[Rgb] = &[
    (255, 255, 217), (237, 248, 177), (199, 233, 180), (127, 205, 187), (65, 182, 196),
    (29, 145, 192), (34, 94, 168), (37, 52, 148), (8, 29, 88),
];

const RDBU: &[Rgb] = &[
    (103, 0, 31), (178, 24, 43), (214, 96, 77), (244, 165, 130), (253, 219, 199), (247, 247, 247),
    (209, 229, 240), (146, 197, 222), (67, 147, 195), (33, 102, 172), (5, 48, 97),
];

const SPECTRAL: &[Rgb] = &[
    (158, 1, 66), (213, 62, 79), (244, 109, 67), (253, 174, 97), (254, 224, 139), (255, 255, 191),
    (230, 245, 152), (171, 221, 164), (102, 194, 165), (50, 136, 189), (94, 79, 162),
];

const HOT: &[(f64, Rgb)] = &[
    (0.0, (0, 0, 0)),
    (0.3, (230, 0, 0)),
    (0.6, (255, 210, 0)),
    (1.0, (255, 255, 255)),
];

const JET: &[(f64, Rgb)] = &[
    (0.0, (0, 0, 131)),
    (0.125, (0, 60, 170)),
    (0.375, (5, 255, 255)),
    (0.625, (255, 255, 0)),
    (0.875, (250, 0, 0)),
    (1.0, (128, 0, 0)),
];

const BLUERED: &[(f64, Rgb)] = &[
    (0.0, (0, 0, 255)),
    (1.0, (255, 0, 0)),
];

const ELECTRIC: &[(f64, Rgb)] = &[
    (0.0, (0, 0, 0)),
    (0.15, (30, 0, 100)),
    (0.4, (120, 0, 100)),
    (0.6, (160, 90, 0)),
    (0.8, (230, 200, 0)),
    (1.0, (255, 250, 220)),
];

const BLACKBODY: &[(f64, Rgb)] = &[
    (0.0, (0, 0, 0)),
    (0.2, (230, 0, 0)),
    (0.4, (230, 210, 0)),
    (0.7, (255, 255, 255)),
    (1.0, (160, 200, 255)),
];

const EARTH: &[(f64, Rgb)] = &[
    (0.0, (0, 0, 130)),
    (0.1, (0, 180, 180)),
    (0.2, (40, 210, 40)),
    (0.4, (230, 230, 50)),
    (0.6, (120, 70, 20)),
    (1.0, (255, 255, 255)),
];

const PICNIC: &[(f64, Rgb)] = &[
    (0.0, (0, 0, 255)),
    (0.1, (51, 153, 255)),
    (0.2, (102, 204, 255)),
    (0.3, (153, 204, 255)),
    (0.4, (204, 204, 255)),
    (0.5, (255, 255, 255)),
    (0.6, (255, 204, 255)),
    (0.7, (255, 153, 255)),
    (0.8, (255, 102, 204)),
    (0.9, (255, 102, 102)),
    (1.0, (255, 0, 0)),
];

const PORTLAND: &[(f64, Rgb)] = &[
    (0.0, (12, 51, 131)),
    (0.25, (10, 136, 186)),
    (0.5, (242, 211, 56)),
    (0.75, (242, 143, 56)),
    (1.0, (217, 30, 30)),
];

const RAINBOW: &[(f64, Rgb)] = &[
    (0.0, (150, 0, 90)),
    (0.125, (0, 0, 200)),
    (0.25, (0, 25, 255)),
    (0.375, (0, 152, 255)),
    (0.5, (44, 255, 150)),
    (0.625, (151, 255, 0)),
    (0.75, (255, 234, 0)),
    (0.875, (255, 111, 0)),
    (1.0, (255, 0, 0)),
];

const PLOTLY: &[Rgb] = &[
    (99, 110, 250), (239, 85, 59), (0, 204, 150), (171, 99, 250), (255, 161, 90), (25, 211, 243),
    (255, 102, 146), (182, 232, 128), (255, 151, 255), (254, 203, 82),
];

const D3: &[Rgb] = &[
    (31, 119, 180), (255, 127, 14), (44, 160, 44), (214, 39, 40), (148, 103, 189), (140, 86, 75),
    (227, 119, 194), (127, 127, 127), (188, 189, 34), (23, 190, 207),
];

const G10: &[Rgb] = &[
    (51, 102, 204), (220, 57, 18), (255, 153, 0), (16, 150, 24), (153, 0, 153), (0, 153, 198),
    (221, 68, 119), (102, 170, 0), (184, 46, 46), (49, 99, 149),
];

const T10: &[Rgb] = &[
    (76, 120, 168), (245, 133, 24), (228, 87, 86), (114, 183, 178), (84, 162, 75), (238, 202, 59),
    (178, 121, 162), (255, 157, 166), (157, 117, 93), (186, 176, 172),
];

const DEFAULT_PLOTLY_COLORS: &[Rgb] = &[
    (31, 119, 180), (255, 127, 14), (44, 160, 44), (214, 39, 40), (148, 103, 189), (140, 86, 75),
    (227, 119, 194), (127, 127, 127), (188, 189, 34), (23, 190, 207),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_table_entry_builds() {
        assert_eq!(CONTINUOUS.len(), CONTINUOUS_SCALES.len() + 1);
        assert_eq!(QUALITATIVE.len(), QUALITATIVE_PALETTES.len());
    }

    #[test]
    fn test_every_listed_name_resolves() {
        let names = list_all_colorscale_names();
        assert!(names.windows(2).all(|w| w[0] < w[1]));
        for name in &names {
            assert!(get_colorscale(name).is_ok(), "{name} should resolve");
        }
        assert!(names.iter().any(|n| n == "viridis_r"));
        assert!(names.iter().any(|n| n == DEFAULT_ALIAS));
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(
            get_colorscale("Viridis").expect("known"),
            get_colorscale("viridis").expect("known")
        );
        assert_eq!(get_colorscale(" YlOrRd ").expect("known").stops().len(), 9);
    }

    #[test]
    fn test_viridis_endpoints() {
        let viridis = get_colorscale("viridis").expect("known");
        assert_eq!(viridis.interpolate(0.0), Rgba::rgb(68.0, 1.0, 84.0));
        assert_eq!(viridis.interpolate(1.0), Rgba::rgb(253.0, 231.0, 37.0));
    }

    #[test]
    fn test_reversed_suffix() {
        let plasma = get_colorscale("plasma").expect("known");
        let plasma_r = get_colorscale("Plasma_r").expect("known");
        assert_eq!(plasma_r.interpolate(0.0), plasma.interpolate(1.0));
        assert_eq!(plasma_r.interpolate(1.0), plasma.interpolate(0.0));
    }

    #[test]
    fn test_positioned_scale_keeps_positions() {
        let hot = get_colorscale("hot").expect("known");
        let positions: Vec<f64> = hot.stops().iter().map(|&(p, _)| p).collect();
        assert_eq!(positions, vec![0.0, 0.3, 0.6, 1.0]);
    }

    #[test]
    fn test_default_alias_is_plotly_default_colors() {
        let scale = get_colorscale(DEFAULT_ALIAS).expect("known");
        assert_eq!(scale.colors(), plotly_default_colors());
        assert_eq!(scale.interpolate(0.0), Rgba::rgb(31.0, 119.0, 180.0));
    }

    #[test]
    fn test_qualitative_palette_as_scale() {
        let scale = get_colorscale("D3").expect("known");
        assert_eq!(scale.stops().len(), 10);
        assert_eq!(get_palette("d3").expect("known")[0], Rgba::rgb(31.0, 119.0, 180.0));
        assert_eq!(list_palette_names(), vec!["d3", "g10", "plotly", "t10"]);
    }

    #[test]
    fn test_unknown_name_errors() {
        let err = get_colorscale("not-a-real-scale").unwrap_err();
        assert!(matches!(err, Error::ColorResolution(_)));
        assert!(err.to_string().contains("not-a-real-scale"));
        assert!(get_palette("viridis").is_err());
    }
}
