//! Least and greatest curve value attained inside an axis-aligned box.
//!
//! Runs in `O(order * dim)` by descending the curve one bit plane at a time
//! instead of enumerating the box. At each plane the two corners either
//! agree (nothing to decide) or differ along some axes; for each differing
//! axis the search commits to the half of the box that extends the extremum
//! and clamps the losing corner onto the boundary of that half. Both
//! corners converge to the winning point, which is then encoded once.

use crate::bits::{
    adjust_rotation, get_bits, ones, propagate_int_bits, rdbit, rotate_left, rotate_right,
};
use crate::error::{Error, Result};
use crate::hilbert::encode;
use crate::Bitmask;

/// The least Hilbert value of any point in the inclusive box
/// `[min, max]`.
///
/// Destructive: both bound arrays are overwritten with the winning
/// coordinates. Clone beforehand to retain the inputs.
pub fn bbox_lower_value(order: Bitmask, min: &mut [Bitmask], max: &mut [Bitmask]) -> Result<Bitmask> {
    // The kernel's sense of "minimum" alternates with the parity of the
    // plane count; this flag selects the lower vertex for supported orders.
    bbox_value(order, min, max, true, order < 8)
}

/// The greatest Hilbert value of any point in the inclusive box
/// `[min, max]`.
///
/// Destructive: both bound arrays are overwritten with the winning
/// coordinates. Clone beforehand to retain the inputs.
pub fn bbox_upper_value(order: Bitmask, min: &mut [Bitmask], max: &mut [Bitmask]) -> Result<Bitmask> {
    bbox_value(order, min, max, false, order >= 8)
}

fn bbox_value(
    order: Bitmask,
    min: &mut [Bitmask],
    max: &mut [Bitmask],
    lower: bool,
    find_min: bool,
) -> Result<Bitmask> {
    if min.len() != max.len() {
        return Err(Error::DimensionMismatch);
    }
    let dim = min.len() as u64;
    if dim < 1 || order < 1 || dim * order > 64 {
        return Err(Error::InvalidCurve {
            dim: dim as u32,
            order: order as u32,
        });
    }

    // A 1-D curve is the identity, so the extrema are the bounds.
    if dim == 1 {
        let winner = if lower { min[0] } else { max[0] };
        min[0] = winner;
        max[0] = winner;
        return Ok(winner);
    }

    // The kernel works in canonical axis order (element 0 = X); callers
    // pass highest axis first. Reverse, search, reverse back.
    min.reverse();
    max.reverse();
    hilbert_box_pt(order, find_min, min, max);
    min.reverse();
    max.reverse();

    Ok(encode(order, min))
}

/// Move the corners `c1` (per-axis minima) and `c2` (per-axis maxima) onto
/// the single point of the box that the curve visits first (`find_min` for
/// odd plane counts) or last.
///
/// Plane loop state mirrors the codec: `bits` is the reflection carried
/// down from the plane above, `rotation` the current axis rotation, and
/// `index` accumulates the Gray digits so their parity is available. The
/// corners are expected in canonical axis order.
pub(crate) fn hilbert_box_pt(
    n_bits: Bitmask,
    find_min: bool,
    c1: &mut [Bitmask],
    c2: &mut [Bitmask],
) {
    let n_dims = c1.len() as Bitmask;
    let flip: Bitmask = if find_min { 0 } else { 1 };

    let mut rotation: Bitmask = 0;
    let mut bits: Bitmask = 0;
    let mut index: Bitmask = 0;
    let mut fold1: Bitmask = 0;
    let mut fold2: Bitmask = 0;

    for y in (0..n_bits).rev() {
        let mut reflection = get_bits(c1, y);
        let diff = reflection ^ get_bits(c2, y);

        if diff != 0 {
            // The Gray digit the low corner would produce at this plane,
            // and the differing axes, both in the curve's rotated frame.
            let mut digit = rotate_right(bits ^ reflection, rotation, n_dims);
            let diff_rot = rotate_right(diff, rotation, n_dims);

            // Suffix-XOR turns the Gray digit into a traversal rank and
            // extracts the accumulated digit parity.
            let mut parity = index;
            let mut d = 1;
            while d < n_dims {
                parity ^= parity >> d;
                digit ^= digit >> d;
                d *= 2;
            }
            parity &= 1;

            // Whether larger curve positions correspond to set rank bits
            // alternates with the digit parity and the plane number.
            if (parity ^ y ^ flip) & 1 != 0 {
                digit ^= ones(n_dims);
            }

            // Walk the differing axes top-down; an axis switches sides
            // exactly where the rank bit changes against the axis above.
            let mut delta: Bitmask = 0;
            let mut prev: Bitmask = 0;
            for p in (0..n_dims as usize).rev() {
                if rdbit(diff_rot, p) != 0 {
                    let bp = rdbit(digit, p);
                    delta |= (bp ^ prev) << p;
                    prev = bp;
                }
            }

            let delta = rotate_left(delta, rotation, n_dims) & diff;
            reflection ^= delta;

            // Clamp the losing corner of every differing axis onto the
            // chosen half. A set delta bit means the low corner moves up;
            // clear means the high corner moves down.
            for d in 0..n_dims as usize {
                if rdbit(diff, d) != 0 {
                    if rdbit(delta, d) != 0 {
                        propagate_int_bits(d, c1, y, rdbit(fold1, d));
                        fold1 |= 1 << d;
                    } else {
                        propagate_int_bits(d, c2, y, rdbit(fold2, d));
                        fold2 |= 1 << d;
                    }
                }
            }
        }

        // Advance through the now-unique digit at this plane.
        bits ^= reflection;
        bits = rotate_right(bits, rotation, n_dims);
        index ^= bits;
        let next = reflection ^ (1 << rotation);
        rotation = adjust_rotation(rotation, n_dims, bits);
        bits = next;
    }
}
