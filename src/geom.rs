//! Points, 1-D spans, and axis-aligned boxes.
//!
//! These are the only geometric objects the crate knows about. Anything
//! richer (polygons, discs, ...) lives on the caller's side of the
//! [`Intersecter`](crate::Intersecter) interface.

use smallvec::SmallVec;

use crate::error::{Error, Result};
use crate::Bitmask;

/// A point in multi-dimensional space: one coordinate per axis.
///
/// Cloned by value throughout; the decomposer clones points before
/// recursing because children mutate them.
pub type Point = SmallVec<[Bitmask; 4]>;

/// A closed, inclusive range `[min, max]` in 1-dimensional space, e.g.
/// Hilbert value space. `min <= max` always.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    pub min: Bitmask,
    pub max: Bitmask,
}

/// An ordered sequence of spans.
pub type Spans = Vec<Span>;

/// Combine overlapping or adjacent spans into single entries.
///
/// The input must be non-empty; it is sorted in place and swept once. The
/// output is sorted by `min`, disjoint, and non-adjacent. A span starting
/// at 0 is treated as adjacent to whatever came before it, which sidesteps
/// the underflowing `min - 1` comparison.
pub fn join_spans(mut spans: Spans) -> Spans {
    spans.sort_unstable_by_key(|s| s.min);

    let mut out = Spans::with_capacity(spans.len());
    for s in spans {
        match out.last_mut() {
            Some(last) if s.min == 0 || s.min - 1 <= last.max => {
                if s.max > last.max {
                    last.max = s.max;
                }
            }
            _ => out.push(s),
        }
    }

    out
}

/// An axis-aligned box: exactly one inclusive [`Span`] per axis.
///
/// Boxes are the blessed region type. They also serve as the reference
/// [`Intersecter`](crate::Intersecter) implementation, so a box query is
/// just a decomposition over another box.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Box(Vec<Span>);

impl Box {
    /// Construct a box from its minimum and maximum corner points.
    ///
    /// # Panics
    ///
    /// Panics if `min` and `max` have different dimensions; that is a
    /// caller bug, not a recoverable condition.
    pub fn new(min: &[Bitmask], max: &[Bitmask]) -> Box {
        assert_eq!(
            min.len(),
            max.len(),
            "min and max have different dimensions"
        );

        Box(min
            .iter()
            .zip(max)
            .map(|(&lo, &hi)| Span { min: lo, max: hi })
            .collect())
    }

    /// Number of dimensions in the box.
    pub fn dimensions(&self) -> u32 {
        self.0.len() as u32
    }

    /// True if every point of `other` lies inside `self`.
    pub fn contains(&self, other: &Box) -> Result<bool> {
        if self.dimensions() != other.dimensions() {
            return Err(Error::DimensionMismatch);
        }

        for (a, b) in self.0.iter().zip(&other.0) {
            if b.min < a.min || b.max > a.max {
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// True if `self` and `other` share at least one point. Coordinates are
    /// integers and ranges inclusive, so touching along an edge counts;
    /// callers needing strict overlap supply their own predicate.
    pub fn intersects(&self, other: &Box) -> Result<bool> {
        if self.dimensions() != other.dimensions() {
            return Err(Error::DimensionMismatch);
        }

        for (a, b) in self.0.iter().zip(&other.0) {
            if a.max < b.min || b.max < a.min {
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Overwrite every axis minimum from `p`.
    ///
    /// # Panics
    ///
    /// Panics if `p` is not the same dimension as the box.
    pub fn set_min(&mut self, p: &[Bitmask]) {
        assert_eq!(
            p.len(),
            self.0.len(),
            "point is not the same dimension as the box"
        );
        for (span, &v) in self.0.iter_mut().zip(p) {
            span.min = v;
        }
    }

    /// Overwrite every axis maximum from `p`.
    ///
    /// # Panics
    ///
    /// Panics if `p` is not the same dimension as the box.
    pub fn set_max(&mut self, p: &[Bitmask]) {
        assert_eq!(
            p.len(),
            self.0.len(),
            "point is not the same dimension as the box"
        );
        for (span, &v) in self.0.iter_mut().zip(p) {
            span.max = v;
        }
    }
}

impl From<Vec<Span>> for Box {
    fn from(spans: Vec<Span>) -> Box {
        Box(spans)
    }
}

impl std::ops::Deref for Box {
    type Target = [Span];

    fn deref(&self) -> &[Span] {
        &self.0
    }
}

impl std::ops::DerefMut for Box {
    fn deref_mut(&mut self) -> &mut [Span] {
        &mut self.0
    }
}
