//! # SFC - Hilbert Space-Filling Curve
//!
//! A Rust library for the Hilbert space-filling curve in arbitrary dimension
//! and order, built for spatial indexes and storage engines that translate
//! multi-dimensional range queries into a small number of contiguous 1-D
//! scans over a sorted key space.
//!
//! ## Features
//!
//! - **Arbitrary dimension and order**: any `(dim, order)` with
//!   `dim * order <= 64`, so coordinates and curve values share one `u64`
//! - **Encode / Decode**: map integer coordinates to curve values and back
//! - **Box extrema**: the least and greatest curve value inside an
//!   axis-aligned box, without enumerating its points
//! - **Region decomposition**: break an arbitrary region (anything
//!   implementing [`Intersecter`]) into coalesced curve-value spans or
//!   hierarchical cells
//!
//! ## Quick Start
//!
//! ```rust
//! use sfc::prelude::*;
//!
//! # fn main() -> sfc::Result<()> {
//! // A 2-D curve with 3 bits per axis: an 8x8 grid, 64 curve positions.
//! let curve = Hilbert::new(2, 3)?;
//!
//! // The region of interest is an axis-aligned box; boxes double as the
//! // reference predicate. Hosts plug in their own `Intersecter` for
//! // polygons, discs, or anything else.
//! let region = Box::new(&[2, 1], &[4, 5]);
//!
//! // Decompose down to tier 1: every point of the region is covered by
//! // one of the returned spans.
//! let spans = curve.decompose_spans(0, 1, &region)?;
//! assert_eq!(
//!     spans,
//!     vec![
//!         Span { min: 4, max: 11 },
//!         Span { min: 28, max: 35 },
//!         Span { min: 52, max: 59 },
//!     ],
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## How It Works
//!
//! The curve codec follows the Butz/Lawder bit-manipulation construction:
//! coordinates are interleaved into a single word, Gray-coded per bit plane,
//! and walked top-down with a running rotation and reflection. The
//! decomposer walks the virtual 2^dim-ary tree of curve cells, pruning with
//! the predicate's `intersects`, emitting whole cells once `contains` holds
//! (or the tier budget is exhausted), and finally merging the emitted spans
//! into disjoint, non-adjacent form.
//!
//! Every hierarchical cell maps to exactly one contiguous run of curve
//! values, which is what makes the emitted spans contiguous and cheap to
//! scan in a sorted key space.

/// The unsigned word used for both coordinate values and Hilbert curve
/// values. Coordinates use the low `order` bits, curve values the low
/// `dim * order` bits.
pub type Bitmask = u64;

mod bbox;
mod bits;
mod decompose;
mod error;
mod geom;
mod hilbert;
mod parallel;
pub mod prelude;

pub use bbox::{bbox_lower_value, bbox_upper_value};
pub use decompose::{Cell, Intersecter};
pub use error::{Error, RegionError, Result};
pub use geom::{join_spans, Box, Point, Span, Spans};
pub use hilbert::{decode, encode, Hilbert};
