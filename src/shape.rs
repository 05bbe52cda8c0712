//! Ragged nested input and shape inference.
//!
//! [`Value`] is the user-facing form of samples, densities and weights: an
//! arbitrarily nested tree of numbers whose siblings may have different
//! lengths. [`infer_shape`] describes such a tree one level at a time.

use std::fmt;

use crate::error::{Error, Result};

/// A number or a sequence of values, nested to any depth.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A leaf.
    Number(f64),
    /// A (possibly empty) sequence.
    Seq(Vec<Value>),
}

impl Value {
    /// Whether this is a leaf number.
    #[must_use]
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    /// The number, if this is a leaf.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(x) => Some(*x),
            Value::Seq(_) => None,
        }
    }

    /// The children, if this is a sequence.
    #[must_use]
    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Number(_) => None,
            Value::Seq(items) => Some(items),
        }
    }

    /// Flatten a sequence of numbers.
    ///
    /// Returns `None` if any child is itself a sequence.
    #[must_use]
    pub fn to_numbers(&self) -> Option<Vec<f64>> {
        self.as_seq()?.iter().map(Value::as_number).collect()
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Number(x)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Seq(items.into_iter().map(Into::into).collect())
    }
}

impl From<&[f64]> for Value {
    fn from(items: &[f64]) -> Self {
        Value::Seq(items.iter().copied().map(Value::Number).collect())
    }
}

/// Extent of one nesting level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dim {
    /// Every element at this level has the same length.
    Fixed(usize),
    /// Per-element lengths, in order, when they differ.
    Ragged(Vec<usize>),
}

impl fmt::Display for Dim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dim::Fixed(n) => write!(f, "{n}"),
            Dim::Ragged(lengths) => write!(f, "{lengths:?}"),
        }
    }
}

/// One [`Dim`] per nesting level, outermost first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Shape(pub Vec<Dim>);

impl Shape {
    /// Number of nesting levels.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// The per-level extents.
    #[must_use]
    pub fn dims(&self) -> &[Dim] {
        &self.0
    }

    /// Whether every level is [`Dim::Fixed`].
    #[must_use]
    pub fn is_rectangular(&self) -> bool {
        self.0.iter().all(|d| matches!(d, Dim::Fixed(_)))
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, dim) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{dim}")?;
        }
        write!(f, ")")
    }
}

/// Infer the shape of a ragged value.
///
/// All elements at one level are visited before descending. A level whose
/// sequences are all empty contributes `Fixed(0)` and ends the traversal. A
/// scalar has the empty shape.
///
/// # Errors
///
/// Returns [`Error::Shape`] when numbers and sequences are siblings at the
/// same level.
pub fn infer_shape(value: &Value) -> Result<Shape> {
    let mut dims = Vec::new();
    let mut level: Vec<&Value> = vec![value];
    let mut depth = 0;

    loop {
        let numbers = level.iter().filter(|v| v.is_number()).count();
        if numbers == level.len() {
            break;
        }
        if numbers > 0 {
            return Err(Error::shape(format!(
                "inconsistent element types at depth {depth}: \
                 found both numbers and sequences"
            )));
        }

        let lengths: Vec<usize> =
            level.iter().map(|v| v.as_seq().map_or(0, <[Value]>::len)).collect();
        let first = lengths[0];
        dims.push(if lengths.iter().all(|&n| n == first) {
            Dim::Fixed(first)
        } else {
            Dim::Ragged(lengths)
        });

        let next: Vec<&Value> = level.iter().filter_map(|v| v.as_seq()).flatten().collect();
        if next.is_empty() {
            break;
        }
        level = next;
        depth += 1;
    }

    Ok(Shape(dims))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn rectangular_input_is_all_fixed(rows in 1usize..6, traces in 1usize..5, points in 1usize..8) {
            let value = Value::from(vec![vec![vec![0.5; points]; traces]; rows]);
            let shape = infer_shape(&value).expect("rectangular");
            prop_assert_eq!(shape.dims(), &[Dim::Fixed(rows), Dim::Fixed(traces), Dim::Fixed(points)]);
        }

        #[test]
        fn ragged_numeric_input_succeeds(
            rows in prop::collection::vec(prop::collection::vec(-10.0..10.0f64, 1..10), 1..6),
        ) {
            let shape = infer_shape(&Value::from(rows.clone())).expect("consistent types");
            prop_assert_eq!(shape.depth(), 2);
            let lengths: Vec<usize> = rows.iter().map(Vec::len).collect();
            let expected = if lengths.iter().all(|&n| n == lengths[0]) {
                Dim::Fixed(lengths[0])
            } else {
                Dim::Ragged(lengths)
            };
            prop_assert_eq!(&shape.dims()[1], &expected);
        }
    }
}
