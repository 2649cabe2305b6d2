//! Multi-threaded span decomposition.
//!
//! Each child cell of the recursion becomes a task on a work-stealing
//! pool; workers funnel spans and the first error through a channel, and
//! the pool scope doubles as the completion handle. Worth it when the
//! predicate is expensive (polygon tests, remote lookups); for cheap
//! predicates the coordination overhead makes the serial walker faster.

use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam_channel::Sender;
use rayon::Scope;
use smallvec::smallvec;
use tracing::debug;

use crate::decompose::CellIterator;
use crate::error::{Error, Result};
use crate::geom::{join_spans, Box, Point, Span, Spans};
use crate::hilbert::{encode, Hilbert};
use crate::Bitmask;
use crate::Intersecter;

struct ParallelWalk<'a, I: ?Sized> {
    hc: &'a Hilbert,
    region: &'a I,
    min_tier: u32,
    max_tier: u32,
    failed: &'a AtomicBool,
    tx: &'a Sender<Result<Span>>,
}

impl<'a, I: Intersecter + ?Sized> ParallelWalk<'a, I> {
    fn walk<'s>(&'s self, tier: u32, cell: Point, scope: &Scope<'s>) {
        if self.failed.load(Ordering::Relaxed) {
            return;
        }

        let order = self.hc.order();
        let tier_bit: Bitmask = 1 << (order - tier - 1);
        let upper_bits = tier_bit - 1;

        let upper: Point = cell.iter().map(|&c| c | upper_bits).collect();
        let bounds = Box::new(&cell, &upper);

        let intersects = match self.region.intersects(&bounds) {
            Ok(v) => v,
            Err(e) => return self.fail(e),
        };
        if !intersects {
            return;
        }

        if tier >= self.min_tier {
            let contains = match self.region.contains(&bounds) {
                Ok(v) => v,
                Err(e) => return self.fail(e),
            };
            if contains || tier == self.max_tier {
                let value = encode(order as Bitmask, &cell);
                let low_bits: Bitmask =
                    (1 << ((order - tier - 1) as Bitmask * self.hc.dim() as Bitmask)) - 1;
                // A send only fails when the coordinator is gone, and then
                // the result no longer matters.
                let _ = self.tx.send(Ok(Span {
                    min: value & !low_bits,
                    max: value | low_bits,
                }));
                return;
            }
        }

        let mut it = CellIterator::new(order, tier + 1, cell);
        while it.advance() {
            let child = Point::from_slice(it.current());
            scope.spawn(move |s| self.walk(tier + 1, child, s));
        }
    }

    /// Record the first error; later workers see the flag and stop.
    fn fail(&self, err: Error) {
        if !self.failed.swap(true, Ordering::Relaxed) {
            let _ = self.tx.send(Err(err));
        }
    }
}

impl Hilbert {
    /// Multi-threaded [`decompose_spans`](Hilbert::decompose_spans).
    ///
    /// Dispatches the recursion onto a worker pool. The coalesced result
    /// set is identical to the single-threaded one; emission order is not.
    /// On a predicate error the walk is cancelled, pending results are
    /// discarded, and the first error is returned.
    pub fn decompose_spans_parallel<I: Intersecter + ?Sized>(
        &self,
        min_tier: u32,
        max_tier: u32,
        region: &I,
    ) -> Result<Spans> {
        // Same entry contract as the serial walker.
        if min_tier > max_tier || max_tier >= self.order() {
            return Err(Error::InvalidTierRange {
                min_tier,
                max_tier,
                order: self.order(),
            });
        }
        debug!(
            dim = self.dim(),
            order = self.order(),
            min_tier,
            max_tier,
            "decomposing region into spans on the worker pool"
        );

        let (tx, rx) = crossbeam_channel::unbounded();
        let failed = AtomicBool::new(false);
        let ctx = ParallelWalk {
            hc: self,
            region,
            min_tier,
            max_tier,
            failed: &failed,
            tx: &tx,
        };

        rayon::scope(|s| {
            let seed: Point = smallvec![0; self.dim() as usize];
            let mut it = CellIterator::new(self.order(), 0, seed);
            while it.advance() {
                let cell = Point::from_slice(it.current());
                let ctx = &ctx;
                s.spawn(move |s| ctx.walk(0, cell, s));
            }
        });
        drop(tx);

        let mut spans = Spans::new();
        for item in rx {
            spans.push(item?);
        }

        if spans.is_empty() {
            return Ok(spans);
        }
        let spans = join_spans(spans);
        debug!(spans = spans.len(), "parallel span decomposition complete");
        Ok(spans)
    }
}
