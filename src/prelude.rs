//! Prelude module for convenient imports
//!
//! Re-exports the most commonly used types from the crate:
//!
//! ```
//! use sfc::prelude::*;
//! ```

pub use crate::{
    bbox_lower_value, bbox_upper_value, decode, encode, join_spans, Bitmask, Box, Cell, Error,
    Hilbert, Intersecter, Point, Result, Span, Spans,
};
