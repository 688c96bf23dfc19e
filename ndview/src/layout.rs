/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Layout mappings from coordinates to linear buffer offsets.
//!
//! A [`Mapping`] is a deterministic, side-effect-free function of the
//! extents (and, for padded layouts, an alignment in elements) it was
//! built from: per-dimension strides, the storage footprint the layout
//! spans, and an exhaustiveness predicate. Two mappings built from
//! equal inputs compare equal.
//!
//! Padded layouts model hardware pitched storage: the minor-most
//! dimension's allocated width is rounded up to the alignment
//! boundary, and only that dimension — outer dimensions accumulate by
//! their raw extents regardless of rank. Downstream consumers depend
//! on this exact behavior, so it is preserved rather than generalized.

use std::fmt;
use std::mem;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::extents::Extents;

/// Byte alignment used by [`crate::View::aligned`] when none is given
/// explicitly. Matches the 128-byte transaction size common to GPU
/// memory systems.
pub const DEFAULT_BYTE_ALIGNMENT: usize = 128;

/// Errors reported by layout construction and shape utilities.
///
/// These are the only recoverable faults in this crate; everything
/// else (out-of-range dimension indices, out-of-range linear indices,
/// misaligned pointers) is an unchecked precondition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// A coordinate's rank does not match the mapping's rank.
    #[error("invalid dims: expected {expected}, got {got}")]
    InvalidDims { expected: usize, got: usize },

    /// A non-exhaustive view was passed where a gap-free layout is
    /// required.
    #[error("input must be exhaustive")]
    NonExhaustive,

    /// Reshape target extents do not cover the same number of
    /// elements as the source.
    #[error("cannot reshape view with size mismatch: expected {expected}, got {got}")]
    SizeMismatch { expected: usize, got: usize },

    /// The byte alignment is neither a multiple nor a divisor of the
    /// element size.
    #[error("alignment of {bytes} bytes is incompatible with element size {element_size}")]
    IncompatibleAlignment { bytes: usize, element_size: usize },
}

/// Memory layout order used to compute strides.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Order {
    /// Row-major layout (C-style): last index varies fastest.
    RowMajor,

    /// Column-major layout (Fortran-style): first index varies
    /// fastest.
    ColumnMajor,
}

/// Converts a byte alignment into an alignment in elements of `T`:
/// `max(1, byte_alignment / size_of::<T>())`.
///
/// The byte alignment must be a multiple or a divisor of the element
/// size, so that rounding a width up to the element alignment also
/// satisfies the byte alignment.
pub fn padding_elements<T>(byte_alignment: usize) -> Result<usize, LayoutError> {
    let element_size = mem::size_of::<T>();
    if element_size == 0
        || byte_alignment == 0
        || (byte_alignment % element_size != 0 && element_size % byte_alignment != 0)
    {
        return Err(LayoutError::IncompatibleAlignment {
            bytes: byte_alignment,
            element_size,
        });
    }
    Ok((byte_alignment / element_size).max(1))
}

fn round_up(value: usize, alignment: usize) -> usize {
    value.div_ceil(alignment) * alignment
}

/// A layout mapping: per-dimension strides plus the storage footprint
/// derived from a set of extents.
///
/// The forward map is `offset(coord) = Σᵢ strideᵢ × coordᵢ`; the
/// inverse is [`crate::AffineMapInverse::coord_of`] (any layout) or
/// [`crate::unravel_index`] (row-major contiguous fast path).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Mapping {
    extents: Extents,
    strides: Vec<usize>,
    footprint: usize,
    order: Order,
}

impl Mapping {
    /// Builds a contiguous (gap-free) mapping for `extents` in the
    /// given order. Row-major: `stride[rank-1] = 1`, `stride[d] =
    /// stride[d+1] * extent(d+1)`; column-major is the mirror.
    pub fn contiguous(extents: Extents, order: Order) -> Self {
        // Contiguous is exactly the padded layout at alignment 1.
        Self::padded(extents, order, 1)
    }

    /// Builds a mapping whose minor-most dimension's allocated width
    /// is rounded up to `align_elements`. Outer dimensions are packed
    /// by their raw extents. `align_elements` is expressed in
    /// elements; see [`padding_elements`] to derive it from a byte
    /// alignment.
    pub fn padded(extents: Extents, order: Order, align_elements: usize) -> Self {
        debug_assert!(align_elements >= 1, "alignment must be at least one element");
        let rank = extents.rank();
        let mut strides = vec![0usize; rank];
        let mut stride = 1usize;
        match order {
            Order::RowMajor => {
                for d in (1..rank).rev() {
                    strides[d] = stride;
                    if stride == 1 {
                        stride *= align_elements.max(round_up(extents.extent(d), align_elements));
                    } else {
                        stride *= extents.extent(d);
                    }
                }
                if rank > 0 {
                    strides[0] = stride;
                }
            }
            Order::ColumnMajor => {
                for d in 0..rank.saturating_sub(1) {
                    strides[d] = stride;
                    if stride == 1 {
                        stride *= align_elements.max(round_up(extents.extent(d), align_elements));
                    } else {
                        stride *= extents.extent(d);
                    }
                }
                if rank > 0 {
                    strides[rank - 1] = stride;
                }
            }
        }
        let footprint = match (rank, order) {
            (0, _) => 1,
            (_, Order::RowMajor) => strides[0] * extents.extent(0),
            (_, Order::ColumnMajor) => strides[rank - 1] * extents.extent(rank - 1),
        };
        Self {
            extents,
            strides,
            footprint,
            order,
        }
    }

    /// The extents this mapping was built from.
    pub fn extents(&self) -> &Extents {
        &self.extents
    }

    /// The number of dimensions.
    pub fn rank(&self) -> usize {
        self.extents.rank()
    }

    /// The storage order the strides follow.
    pub fn order(&self) -> Order {
        self.order
    }

    /// Per-dimension strides, in elements.
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// The stride of dimension `dim`, in elements.
    pub fn stride(&self, dim: usize) -> usize {
        self.strides[dim]
    }

    /// The number of storage slots the layout spans. May exceed the
    /// logical element count when the layout is padded.
    pub fn footprint(&self) -> usize {
        self.footprint
    }

    /// Whether every offset in `[0, footprint)` is addressed by
    /// exactly one coordinate. Contiguous mappings are always
    /// exhaustive; padded mappings are exhaustive only when the padded
    /// width equals the raw extent.
    pub fn is_exhaustive(&self) -> bool {
        self.footprint == self.extents.size()
    }
}

impl fmt::Display for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Mapping {{ [sz={:?} st={:?} fp={}] }}",
            self.extents.as_slice(),
            self.strides,
            self.footprint,
        )
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::extents::make_extents;

    #[test]
    fn test_contiguous_row_major_strides() {
        let m = Mapping::contiguous(make_extents([2, 3, 4]), Order::RowMajor);
        assert_eq!(m.strides(), &[12, 4, 1]);
        assert_eq!(m.footprint(), 24);
        assert!(m.is_exhaustive());
    }

    #[test]
    fn test_contiguous_column_major_strides() {
        let m = Mapping::contiguous(make_extents([2, 3, 4]), Order::ColumnMajor);
        assert_eq!(m.strides(), &[1, 2, 6]);
        assert_eq!(m.footprint(), 24);
        assert!(m.is_exhaustive());
    }

    #[test]
    fn test_contiguous_rank_one() {
        let m = Mapping::contiguous(make_extents([7]), Order::RowMajor);
        assert_eq!(m.strides(), &[1]);
        assert_eq!(m.footprint(), 7);
    }

    #[test]
    fn test_contiguous_rank_zero() {
        let m = Mapping::contiguous(Extents::new(vec![]), Order::RowMajor);
        assert_eq!(m.strides(), &[] as &[usize]);
        assert_eq!(m.footprint(), 1);
        assert!(m.is_exhaustive());
    }

    // Reference configuration: 4-byte elements aligned to 128 bytes
    // give a 32-element pitch. A 7×6 matrix pads each row to 32
    // slots: 224 slots for 42 elements.
    #[test]
    fn test_padded_row_major_reference_example() {
        let align = padding_elements::<f32>(128).unwrap();
        assert_eq!(align, 32);

        let m = Mapping::padded(make_extents([7, 6]), Order::RowMajor, align);
        assert_eq!(m.strides(), &[32, 1]);
        assert_eq!(m.footprint(), 224);
        assert!(!m.is_exhaustive());
    }

    #[test]
    fn test_padded_column_major_mirrors_row_major() {
        // Column-major pads dimension 0 (the minor-most): 7 rounds up
        // to 32, and dimension 1 packs on top of it.
        let m = Mapping::padded(make_extents([7, 6]), Order::ColumnMajor, 32);
        assert_eq!(m.strides(), &[1, 32]);
        assert_eq!(m.footprint(), 192);
        assert!(!m.is_exhaustive());
    }

    #[test]
    fn test_padded_is_exhaustive_when_width_matches() {
        // Minor extent already a multiple of the alignment: no gap.
        let m = Mapping::padded(make_extents([7, 64]), Order::RowMajor, 32);
        assert_eq!(m.strides(), &[64, 1]);
        assert_eq!(m.footprint(), 7 * 64);
        assert!(m.is_exhaustive());
    }

    #[test]
    fn test_padded_minor_extent_below_alignment() {
        // Widths below the alignment round up to a full pitch.
        let m = Mapping::padded(make_extents([4, 3, 1]), Order::RowMajor, 32);
        assert_eq!(m.strides(), &[96, 32, 1]);
        assert_eq!(m.footprint(), 384);
        assert!(!m.is_exhaustive());
    }

    #[test]
    fn test_padded_pads_only_minor_most_dimension() {
        // Middle dimensions are packed exactly even when they are not
        // multiples of the alignment.
        let m = Mapping::padded(make_extents([5, 7, 6]), Order::RowMajor, 32);
        assert_eq!(m.strides(), &[224, 32, 1]);
        assert_eq!(m.footprint(), 5 * 224);
    }

    #[test]
    fn test_padded_rank_one_receives_no_padding() {
        let m = Mapping::padded(make_extents([7]), Order::RowMajor, 32);
        assert_eq!(m.strides(), &[1]);
        assert_eq!(m.footprint(), 7);
        assert!(m.is_exhaustive());
    }

    #[test]
    fn test_padded_alignment_one_is_contiguous() {
        let e = make_extents([3, 5, 2]);
        assert_eq!(
            Mapping::padded(e.clone(), Order::RowMajor, 1),
            Mapping::contiguous(e, Order::RowMajor)
        );
    }

    #[test]
    fn test_equal_inputs_give_equal_mappings() {
        let a = Mapping::padded(make_extents([7, 6]), Order::RowMajor, 32);
        let b = Mapping::padded(make_extents([7, 6]), Order::RowMajor, 32);
        assert_eq!(a, b);
        assert_ne!(a, Mapping::contiguous(make_extents([7, 6]), Order::RowMajor));
    }

    #[test]
    fn test_padding_elements_conversions() {
        // 128 bytes over 8-byte elements: 16-element pitch.
        assert_eq!(padding_elements::<f64>(128).unwrap(), 16);
        // Element wider than the alignment (divisor case): pitch
        // clamps to one element.
        assert_eq!(padding_elements::<[u8; 256]>(128).unwrap(), 1);
        // Neither a multiple nor a divisor.
        assert_eq!(
            padding_elements::<f32>(6),
            Err(LayoutError::IncompatibleAlignment {
                bytes: 6,
                element_size: 4
            })
        );
        assert_eq!(
            padding_elements::<f32>(0),
            Err(LayoutError::IncompatibleAlignment {
                bytes: 0,
                element_size: 4
            })
        );
    }

    proptest! {
        // stride(rank-1) = 1 and stride(d) = stride(d+1) * extent(d+1)
        // for every valid shape.
        #[test]
        fn test_row_major_stride_law(dims in proptest::collection::vec(1usize..8, 1..5)) {
            let m = Mapping::contiguous(Extents::new(dims.clone()), Order::RowMajor);
            let rank = dims.len();
            prop_assert_eq!(m.stride(rank - 1), 1);
            for d in 0..rank - 1 {
                prop_assert_eq!(m.stride(d), m.stride(d + 1) * dims[d + 1]);
            }
            prop_assert_eq!(m.footprint(), dims.iter().product::<usize>());
        }

        // Column-major mirror of the stride law.
        #[test]
        fn test_column_major_stride_law(dims in proptest::collection::vec(1usize..8, 1..5)) {
            let m = Mapping::contiguous(Extents::new(dims.clone()), Order::ColumnMajor);
            let rank = dims.len();
            prop_assert_eq!(m.stride(0), 1);
            for d in 1..rank {
                prop_assert_eq!(m.stride(d), m.stride(d - 1) * dims[d - 1]);
            }
        }

        // Padded row-major: the minor dimension's allocated width is
        // max(A, round_up(extent, A)); outer strides accumulate by raw
        // extents.
        #[test]
        fn test_padded_row_major_pitch_law(
            dims in proptest::collection::vec(1usize..40, 2..5),
            align in prop_oneof![Just(2usize), Just(8), Just(32)],
        ) {
            let m = Mapping::padded(Extents::new(dims.clone()), Order::RowMajor, align);
            let rank = dims.len();
            let minor = dims[rank - 1];
            let pitch = align.max(minor.div_ceil(align) * align);
            prop_assert_eq!(m.stride(rank - 1), 1);
            prop_assert_eq!(m.stride(rank - 2), pitch);
            for d in 0..rank - 2 {
                prop_assert_eq!(m.stride(d), m.stride(d + 1) * dims[d + 1]);
            }
            prop_assert_eq!(m.footprint(), m.stride(0) * dims[0]);
            prop_assert_eq!(m.is_exhaustive(), pitch == minor);
        }
    }
}
