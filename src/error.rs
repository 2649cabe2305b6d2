//! Error types used across the crate.

use thiserror::Error;

/// Boxed error type carried through the predicate interface.
pub type RegionError = std::boxed::Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors reported by curve construction, box queries, and decomposition.
#[derive(Debug, Error)]
pub enum Error {
    /// The two operands have a different number of dimensions.
    #[error("dimensions do not match")]
    DimensionMismatch,

    /// The `(dim, order)` pair cannot describe a curve: both must be at
    /// least 1 and their product must fit in 64 bits.
    #[error("invalid curve: dim {dim} * order {order} must be >= 1 and <= 64 bits")]
    InvalidCurve { dim: u32, order: u32 },

    /// The requested tier window is empty or reaches past the finest
    /// subdivision the curve supports (`max_tier` must stay below `order`).
    #[error("invalid tiers: {min_tier}..={max_tier} with order {order}")]
    InvalidTierRange {
        min_tier: u32,
        max_tier: u32,
        order: u32,
    },

    /// Region decomposition finished without any cell overlapping the
    /// region.
    #[error("no cells overlap region")]
    NoOverlappingCells,

    /// An error returned by a user-supplied [`Intersecter`], surfaced
    /// unchanged.
    ///
    /// [`Intersecter`]: crate::Intersecter
    #[error("{0}")]
    Region(RegionError),
}

impl Error {
    /// Wrap a predicate failure so it can be returned from an
    /// [`Intersecter`](crate::Intersecter) implementation.
    pub fn region(err: impl Into<RegionError>) -> Self {
        Error::Region(err.into())
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
