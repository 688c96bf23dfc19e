/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Linear-index to coordinate conversion for row-major layouts.
//!
//! [`unravel_index`] inverts the row-major contiguous offset function.
//! It is defined for C order only; there is deliberately no
//! column-major entry point, so requesting one is impossible rather
//! than a runtime fault. For arbitrary (including padded) layouts use
//! [`crate::AffineMapInverse::coord_of`], which is slower but total.
//!
//! Division is slow on both CPU and GPU, especially at 64 bits, so the
//! implementation first narrows the arithmetic to 32 bits when the
//! index and extents permit, then replaces the division with a mask
//! and shift
//! whenever a dimension size is a power of two. Neither choice changes
//! the result for any valid input.

use crate::extents::Extents;

// One unraveling pass at a fixed integer width. Walks dimensions from
// most-minor to most-major, excluding dimension 0, which takes
// whatever remains.
macro_rules! unravel_at_width {
    ($ty:ty, $idx:expr, $extents:expr) => {{
        let mut idx = $idx as $ty;
        let rank = $extents.rank();
        let mut coord = vec![0usize; rank];
        for dim in (1..rank).rev() {
            let s = $extents.extent(dim) as $ty;
            if s & (s - 1) != 0 {
                let t = idx / s;
                coord[dim] = (idx - t * s) as usize;
                idx = t;
            } else {
                // Power of two: mask and shift.
                coord[dim] = (idx & (s - 1)) as usize;
                idx >>= (s - 1).count_ones();
            }
        }
        if rank > 0 {
            coord[0] = idx as usize;
        }
        coord
    }};
}

/// Turns a linear row-major index into a coordinate, like numpy's
/// `unravel_index`.
///
/// `idx` must lie in `[0, extents.size())`; violating this is an
/// unchecked precondition with unspecified results, consistent with
/// the view abstraction's no-bounds-check policy.
///
/// ```
/// use ndview::make_extents;
/// use ndview::unravel_index;
///
/// // ((1 * 3 + 1) * 4 + 1) = 17
/// assert_eq!(unravel_index(17, &make_extents([2, 3, 4])), vec![1, 1, 1]);
/// ```
pub fn unravel_index(idx: usize, extents: &Extents) -> Vec<usize> {
    if idx > u32::MAX as usize || extents.size() > u32::MAX as usize {
        unravel_at_width!(u64, idx, extents)
    } else {
        unravel_at_width!(u32, idx, extents)
    }
}
