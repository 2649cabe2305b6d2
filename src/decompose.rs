//! Region decomposition: turning a spatial predicate into curve-value
//! spans or hierarchical cells.
//!
//! The decomposer walks the virtual 2^dim-ary subdivision of the curve's
//! domain. Tier `t` splits the domain into `2^((t+1)*dim)` equal boxes; a
//! cell is visited only if the region intersects it, emitted once the
//! region contains it (or `max_tier` is reached), and otherwise split into
//! its `2^dim` children.

use smallvec::smallvec;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::geom::{join_spans, Box, Point, Span, Spans};
use crate::hilbert::{encode, Hilbert};
use crate::Bitmask;

/// The predicate capability a region hands to the decomposer.
///
/// Implementations must be safe for concurrent read access from multiple
/// threads (hence the `Sync` bound) and must keep the two queries
/// consistent: `contains(b)` implies `intersects(b)`, and both agree on
/// dimension. Errors abort the decomposition and surface unchanged.
pub trait Intersecter: Sync {
    /// True if `bounds` is fully contained by the region.
    fn contains(&self, bounds: &Box) -> Result<bool>;

    /// True if the region overlaps `bounds` at one or more points. Returns
    /// false when `bounds` is adjacent to or outside of the region.
    fn intersects(&self, bounds: &Box) -> Result<bool>;
}

/// Boxes are the reference predicate.
impl Intersecter for Box {
    fn contains(&self, bounds: &Box) -> Result<bool> {
        Box::contains(self, bounds)
    }

    fn intersects(&self, bounds: &Box) -> Result<bool> {
        Box::intersects(self, bounds)
    }
}

/// A specific curve cell at a specific tier.
///
/// `value` is the `(tier + 1) * dim`-bit curve value of the subcell on the
/// curve of that tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub value: Bitmask,
    pub tier: u32,
}

/// Pull-style enumerator of the `2^dim` child cells at a tier.
///
/// Owns its point buffer. The first `advance` yields the seed unchanged;
/// each later call toggles the tier bit through a Gray-code-like walk,
/// carrying into the next axis when the bit was already set. On exhaustion
/// the low bits are cleared so the buffer is back in its seed state, and
/// the iterator stays exhausted.
pub(crate) struct CellIterator {
    cell: Point,
    tier_bit: Bitmask,
    first: bool,
    done: bool,
}

impl CellIterator {
    pub(crate) fn new(order: u32, tier: u32, cell: Point) -> CellIterator {
        CellIterator {
            cell,
            tier_bit: 1 << (order - tier - 1),
            first: true,
            done: false,
        }
    }

    /// Step to the next child cell; false once all children were yielded.
    pub(crate) fn advance(&mut self) -> bool {
        if self.done {
            return false;
        }
        if self.first {
            self.first = false;
            return true;
        }

        let mut dim = 0;
        while self.cell[dim] & self.tier_bit != 0 {
            // This axis rolls over; clear it and carry.
            self.cell[dim] ^= self.tier_bit;
            dim += 1;
            if dim == self.cell.len() {
                // Restore the buffer for the caller above us.
                let low = self.tier_bit - 1;
                for c in self.cell.iter_mut() {
                    *c &= !low;
                }
                self.done = true;
                return false;
            }
        }
        self.cell[dim] ^= self.tier_bit;

        true
    }

    pub(crate) fn current(&self) -> &[Bitmask] {
        &self.cell
    }
}

/// Per-walk state shared down the recursion: the tier window, the region,
/// and one reusable bounds buffer.
struct DecomposeCall<'a, I: ?Sized> {
    min_tier: u32,
    max_tier: u32,
    bounds: Box,
    region: &'a I,
}

/// What to do with a finished cell; the recursion body is shared between
/// the span and the cell form.
trait Emit {
    fn emit(&mut self, hc: &Hilbert, tier: u32, cell: &[Bitmask]);
}

struct SpanSink {
    spans: Spans,
}

impl Emit for SpanSink {
    fn emit(&mut self, hc: &Hilbert, tier: u32, cell: &[Bitmask]) {
        // A tier-t cell covers exactly one aligned run of curve values, so
        // the low corner's value just needs its sub-cell bits smeared.
        let value = encode(hc.order() as Bitmask, cell);
        let low_bits: Bitmask =
            (1 << ((hc.order() - tier - 1) as Bitmask * hc.dim() as Bitmask)) - 1;
        let span = Span {
            min: value & !low_bits,
            max: value | low_bits,
        };
        trace!(tier, min = span.min, max = span.max, "cell span");
        self.spans.push(span);
    }
}

struct CellSink {
    cells: Vec<Cell>,
}

impl Emit for CellSink {
    fn emit(&mut self, hc: &Hilbert, tier: u32, cell: &[Bitmask]) {
        // Drop the sub-cell bits and encode on the tier's own curve.
        let shift = hc.order() - tier - 1;
        let shifted: Point = cell.iter().map(|&c| c >> shift).collect();
        let value = encode((tier + 1) as Bitmask, &shifted);
        trace!(tier, value, "cell");
        self.cells.push(Cell { value, tier });
    }
}

impl Hilbert {
    /// Break a region up into a sorted, disjoint series of curve-value
    /// spans.
    ///
    /// `min_tier` is the coarsest tier allowed to emit; setting it high
    /// trades fewer, tighter spans for more predicate calls. `max_tier`
    /// bounds the recursion depth; cells still only partially covered
    /// there are emitted whole. Requires `min_tier <= max_tier < order`.
    ///
    /// A region overlapping nothing yields an empty vector, not an error.
    pub fn decompose_spans<I: Intersecter + ?Sized>(
        &self,
        min_tier: u32,
        max_tier: u32,
        region: &I,
    ) -> Result<Spans> {
        self.check_tiers(min_tier, max_tier)?;
        debug!(
            dim = self.dim(),
            order = self.order(),
            min_tier,
            max_tier,
            "decomposing region into spans"
        );

        let mut sink = SpanSink { spans: Spans::new() };
        self.walk_root(min_tier, max_tier, region, &mut sink)?;

        if sink.spans.is_empty() {
            return Ok(sink.spans);
        }
        let spans = join_spans(sink.spans);
        debug!(spans = spans.len(), "span decomposition complete");
        Ok(spans)
    }

    /// Break a region up into curve cells, in traversal order.
    ///
    /// Same walk as [`decompose_spans`](Hilbert::decompose_spans), but each
    /// emitted cell is reported as its own `(value, tier)` pair, without
    /// coalescing or deduplication. Completing without a single emission is
    /// reported as [`Error::NoOverlappingCells`].
    pub fn decompose_region<I: Intersecter + ?Sized>(
        &self,
        min_tier: u32,
        max_tier: u32,
        region: &I,
    ) -> Result<Vec<Cell>> {
        self.check_tiers(min_tier, max_tier)?;
        debug!(
            dim = self.dim(),
            order = self.order(),
            min_tier,
            max_tier,
            "decomposing region into cells"
        );

        let mut sink = CellSink { cells: Vec::new() };
        self.walk_root(min_tier, max_tier, region, &mut sink)?;

        if sink.cells.is_empty() {
            return Err(Error::NoOverlappingCells);
        }
        debug!(cells = sink.cells.len(), "cell decomposition complete");
        Ok(sink.cells)
    }

    fn check_tiers(&self, min_tier: u32, max_tier: u32) -> Result<()> {
        if min_tier > max_tier || max_tier >= self.order() {
            return Err(Error::InvalidTierRange {
                min_tier,
                max_tier,
                order: self.order(),
            });
        }
        Ok(())
    }

    fn walk_root<I: Intersecter + ?Sized, E: Emit>(
        &self,
        min_tier: u32,
        max_tier: u32,
        region: &I,
        sink: &mut E,
    ) -> Result<()> {
        let seed: Point = smallvec![0; self.dim() as usize];
        let mut dc = DecomposeCall {
            min_tier,
            max_tier,
            bounds: Box::new(&seed, &seed),
            region,
        };

        let mut it = CellIterator::new(self.order(), 0, seed);
        while it.advance() {
            self.walk(0, Point::from_slice(it.current()), &mut dc, sink)?;
        }
        Ok(())
    }

    fn walk<I: Intersecter + ?Sized, E: Emit>(
        &self,
        tier: u32,
        cell: Point,
        dc: &mut DecomposeCall<'_, I>,
        sink: &mut E,
    ) -> Result<()> {
        let tier_bit: Bitmask = 1 << (self.order() - tier - 1);
        let upper_bits = tier_bit - 1;

        // The cell's box: low corner as-is, high corner with the sub-cell
        // bits filled in.
        dc.bounds.set_min(&cell);
        dc.bounds.set_max(&cell);
        for span in dc.bounds.iter_mut() {
            span.max |= upper_bits;
        }

        if !dc.region.intersects(&dc.bounds)? {
            return Ok(());
        }

        if tier >= dc.min_tier {
            let contains = dc.region.contains(&dc.bounds)?;
            if contains || tier == dc.max_tier {
                sink.emit(self, tier, &cell);
                return Ok(());
            }
        }

        let mut it = CellIterator::new(self.order(), tier + 1, cell);
        while it.advance() {
            self.walk(tier + 1, Point::from_slice(it.current()), dc, sink)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect_cells(order: u32, tier: u32, mask: &[Bitmask]) -> Vec<Vec<Bitmask>> {
        let mut it = CellIterator::new(order, tier, Point::from_slice(mask));
        let mut out = Vec::new();
        while it.advance() {
            out.push(it.current().to_vec());
        }
        out
    }

    #[test]
    fn test_cell_iterator() {
        assert_eq!(
            collect_cells(3, 0, &[0, 0]),
            vec![vec![0, 0], vec![4, 0], vec![0, 4], vec![4, 4]]
        );
        assert_eq!(
            collect_cells(3, 1, &[4, 0, 4]),
            vec![
                vec![4, 0, 4],
                vec![6, 0, 4],
                vec![4, 2, 4],
                vec![6, 2, 4],
                vec![4, 0, 6],
                vec![6, 0, 6],
                vec![4, 2, 6],
                vec![6, 2, 6],
            ]
        );
    }

    #[test]
    fn test_cell_iterator_restores_and_latches() {
        let mut it = CellIterator::new(3, 1, Point::from_slice(&[4, 0, 4]));
        while it.advance() {}
        // The buffer is back in its seed state, and the iterator stays
        // exhausted.
        assert_eq!(it.current(), &[4, 0, 4]);
        assert!(!it.advance());
        assert!(!it.advance());
        assert_eq!(it.current(), &[4, 0, 4]);
    }

    #[test]
    fn test_decompose_spans() {
        struct TCase {
            dim: u32,
            order: u32,
            min_tier: u32,
            max_tier: u32,
            bounds: Box,
            expected: Spans,
        }

        let tcases = [
            TCase {
                dim: 2,
                order: 3,
                min_tier: 0,
                max_tier: 0,
                bounds: Box::new(&[2, 1], &[4, 5]),
                expected: vec![Span { min: 0, max: 63 }],
            },
            TCase {
                dim: 2,
                order: 3,
                min_tier: 0,
                max_tier: 1,
                bounds: Box::new(&[2, 1], &[4, 5]),
                expected: vec![
                    Span { min: 4, max: 11 },
                    Span { min: 28, max: 35 },
                    Span { min: 52, max: 59 },
                ],
            },
            TCase {
                dim: 2,
                order: 3,
                min_tier: 0,
                max_tier: 2,
                bounds: Box::new(&[2, 1], &[4, 5]),
                expected: vec![
                    Span { min: 6, max: 11 },
                    Span { min: 28, max: 32 },
                    Span { min: 35, max: 35 },
                    Span { min: 53, max: 54 },
                    Span { min: 57, max: 57 },
                ],
            },
        ];

        for tc in tcases {
            let uut = Hilbert::new(tc.dim, tc.order).unwrap();
            let result = uut
                .decompose_spans(tc.min_tier, tc.max_tier, &tc.bounds)
                .unwrap();
            assert_eq!(
                result, tc.expected,
                "tiers ({}, {})",
                tc.min_tier, tc.max_tier
            );
        }
    }

    #[test]
    fn test_decompose_region() {
        struct TCase {
            dim: u32,
            order: u32,
            min_tier: u32,
            max_tier: u32,
            bounds: Box,
            expected: Vec<Cell>,
        }

        let tcases = [
            TCase {
                dim: 2,
                order: 3,
                min_tier: 0,
                max_tier: 0,
                bounds: Box::new(&[2, 1], &[4, 5]),
                expected: vec![
                    Cell { value: 0, tier: 0 },
                    Cell { value: 3, tier: 0 },
                    Cell { value: 1, tier: 0 },
                    Cell { value: 2, tier: 0 },
                ],
            },
            TCase {
                dim: 2,
                order: 3,
                min_tier: 0,
                max_tier: 1,
                bounds: Box::new(&[3, 4], &[7, 7]),
                expected: vec![
                    Cell { value: 7, tier: 1 },
                    Cell { value: 6, tier: 1 },
                    Cell { value: 2, tier: 0 },
                ],
            },
            TCase {
                dim: 3,
                order: 3,
                min_tier: 0,
                max_tier: 2,
                bounds: Box::new(&[1, 2, 3], &[1, 2, 4]),
                expected: vec![
                    Cell {
                        value: 48,
                        tier: 2,
                    },
                    Cell {
                        value: 123,
                        tier: 2,
                    },
                ],
            },
            TCase {
                dim: 2,
                order: 32,
                min_tier: 0,
                max_tier: 31,
                bounds: Box::new(&[10_000, 200_000], &[10_000, 200_000]),
                expected: vec![Cell {
                    value: 21_714_213_632,
                    tier: 31,
                }],
            },
        ];

        for tc in tcases {
            let uut = Hilbert::new(tc.dim, tc.order).unwrap();
            let result = uut
                .decompose_region(tc.min_tier, tc.max_tier, &tc.bounds)
                .unwrap();
            // Traversal order is deterministic, so compare exactly.
            assert_eq!(
                result, tc.expected,
                "dim {} order {} tiers ({}, {})",
                tc.dim, tc.order, tc.min_tier, tc.max_tier
            );
        }
    }

    #[test]
    fn test_decompose_tier_validation() {
        let uut = Hilbert::new(2, 3).unwrap();
        let region = Box::new(&[0, 0], &[1, 1]);

        assert!(matches!(
            uut.decompose_spans(2, 1, &region),
            Err(Error::InvalidTierRange { .. })
        ));
        assert!(matches!(
            uut.decompose_spans(0, 3, &region),
            Err(Error::InvalidTierRange { .. })
        ));
        assert!(matches!(
            uut.decompose_region(0, 3, &region),
            Err(Error::InvalidTierRange { .. })
        ));
    }

    #[test]
    fn test_decompose_nothing_overlaps() {
        let uut = Hilbert::new(2, 3).unwrap();
        // Entirely outside the 8x8 domain.
        let region = Box::new(&[8, 8], &[9, 9]);

        // The cell form reports the sentinel; the span form reports an
        // empty set without error.
        assert!(matches!(
            uut.decompose_region(0, 2, &region),
            Err(Error::NoOverlappingCells)
        ));
        assert_eq!(uut.decompose_spans(0, 2, &region).unwrap(), vec![]);
    }

    #[test]
    fn test_decompose_propagates_predicate_errors() {
        struct Faulty;

        impl Intersecter for Faulty {
            fn contains(&self, _bounds: &Box) -> Result<bool> {
                Ok(false)
            }

            fn intersects(&self, _bounds: &Box) -> Result<bool> {
                Err(Error::region("predicate exploded"))
            }
        }

        let uut = Hilbert::new(2, 3).unwrap();
        let err = uut.decompose_spans(0, 2, &Faulty).unwrap_err();
        assert!(matches!(err, Error::Region(_)));
        assert_eq!(err.to_string(), "predicate exploded");

        assert!(matches!(
            uut.decompose_region(0, 2, &Faulty),
            Err(Error::Region(_))
        ));
    }

    #[test]
    fn test_decompose_min_tier_limits_coarseness() {
        let uut = Hilbert::new(2, 3).unwrap();
        // The whole domain; with min_tier 1 the answer must still be the
        // single full span, assembled from tier-1 cells.
        let region = Box::new(&[0, 0], &[7, 7]);
        assert_eq!(
            uut.decompose_spans(1, 2, &region).unwrap(),
            vec![Span { min: 0, max: 63 }]
        );
    }
}
