//! # ridgeplot
//!
//! Ridgeline plots for comparing many distributions at once.
//!
//! Raw samples (or precomputed densities) go in; a backend-neutral
//! [`FigureSpec`] comes out, ready to be serialized as a Plotly figure. Each
//! row of the input becomes one horizontal band, shifted up by a fixed
//! fraction of the tallest density so neighbouring rows overlap.
//!
//! ## Quick Start
//!
//! ```rust
//! use ridgeplot::prelude::*;
//!
//! let figure = Ridgeplot::new()
//!     .samples(vec![vec![1.0, 2.0, 2.0, 3.0], vec![5.0, 5.0, 6.0, 7.0]])
//!     .colorscale("viridis")
//!     .colormode(ColorMode::RowIndex)
//!     .build()?;
//!
//! let json = figure.to_json_string()?;
//! assert!(json.contains("\"data\""));
//! # Ok::<(), ridgeplot::Error>(())
//! ```
//!
//! ## Pipeline
//!
//! 1. deprecated aliases are mapped onto their replacements
//! 2. configuration is validated
//! 3. ragged input is normalized to rows of traces ([`shape`], [`samples`])
//! 4. densities are estimated with a KDE ([`kde`]) or binned ([`hist`])
//! 5. trace colors are resolved ([`colormode`], [`palettes`])
//! 6. geometry and layout are assembled ([`geometry`], [`figure`])
//!
//! ## Feature Flags
//!
//! - `parallel`: estimate traces concurrently with rayon

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
// Allow unwrap() in tests only
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Core Modules
// ============================================================================

/// Color types and CSS color parsing.
pub mod color;

/// CSS named colors.
pub mod css_colors;

/// Linear and color scales.
pub mod scale;

/// Built-in colorscales and palettes.
pub mod palettes;

/// Visual themes.
pub mod theme;

// ============================================================================
// Data Modules
// ============================================================================

/// Ragged input values and shape inference.
pub mod shape;

/// Samples, densities and weights normalization.
pub mod samples;

/// Kernel density estimation.
pub mod kde;

/// Histogram binning.
pub mod hist;

// ============================================================================
// Figure Modules
// ============================================================================

/// Per-trace color resolution.
pub mod colormode;

/// Baselines and trace shapes.
pub mod geometry;

/// Figure specification and Plotly output.
pub mod figure;

/// Deprecated argument aliases.
pub mod deprecation;

/// The figure builder.
pub mod ridgeplot;

// ============================================================================
// Error Types
// ============================================================================

/// Error types for ridgeplot operations.
pub mod error;

pub use error::{Error, Result};
pub use figure::FigureSpec;
pub use crate::ridgeplot::{ridgeplot, Ridgeplot};

// ============================================================================
// Prelude
// ============================================================================

/// Commonly used types and traits for convenient imports.
///
/// ```rust
/// use ridgeplot::prelude::*;
/// ```
pub mod prelude {
    pub use crate::color::{Hsla, Rgba};
    pub use crate::colormode::{ColorMode, ColorSpec};
    pub use crate::deprecation::DeprecationNotice;
    pub use crate::error::{Error, Result};
    pub use crate::figure::{Fill, FigureSpec, ResolvedTrace, TraceGeometry, TraceKind};
    pub use crate::geometry::LineColor;
    pub use crate::hist::BinStrategy;
    pub use crate::kde::{Bandwidth, Kernel};
    pub use crate::palettes::{get_colorscale, list_all_colorscale_names};
    pub use crate::ridgeplot::{ridgeplot, Labels, Ridgeplot};
    pub use crate::samples::{DensityCurve, Norm, SampleWeights};
    pub use crate::scale::{ColorScale, LinearScale, Scale};
    pub use crate::shape::Value;
    pub use crate::theme::Theme;
    pub use batuta_common::display::WithDimensions;
}

// ============================================================================
// Re-exports
// ============================================================================

/// Re-export trueno for direct access to SIMD operations.
pub use trueno;
