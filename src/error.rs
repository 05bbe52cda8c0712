//! Error types for ridgeplot operations.

use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building a ridgeline figure.
///
/// Every variant aborts the whole figure construction; nothing is recovered
/// automatically.
#[derive(Error, Debug)]
pub enum Error {
    /// Ragged input with inconsistent element types, an unexpected nesting
    /// depth, empty rows/traces, or weights that do not mirror the samples.
    #[error("Shape error: {0}")]
    Shape(String),

    /// Out-of-range or mutually exclusive configuration.
    #[error("Invalid configuration: {0}")]
    Validation(String),

    /// Unknown palette name or malformed color string.
    #[error("Invalid color: {0}")]
    ColorResolution(String),

    /// Density estimation failed for a single trace.
    #[error("Density estimation failed for row {row}, trace {trace}: {reason}")]
    Computation {
        /// Row index of the offending trace.
        row: usize,
        /// Trace index within the row.
        trace: usize,
        /// What went wrong.
        reason: String,
    },

    /// Figure JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn shape(msg: impl Into<String>) -> Self {
        Error::Shape(msg.into())
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    pub(crate) fn color(msg: impl Into<String>) -> Self {
        Error::ColorResolution(msg.into())
    }

    /// Attach the location of the trace being processed.
    pub(crate) fn at(self, row: usize, trace: usize) -> Self {
        match self {
            Error::Computation { reason, .. } => Error::Computation { row, trace, reason },
            Error::Validation(msg) => Error::Validation(format!("row {row}, trace {trace}: {msg}")),
            Error::Shape(msg) => Error::Shape(format!("row {row}, trace {trace}: {msg}")),
            other => other,
        }
    }
}
