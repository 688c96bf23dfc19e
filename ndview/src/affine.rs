/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

use crate::extents::Extents;
use crate::layout::LayoutError;
use crate::layout::Mapping;
use crate::view::View;

mod sealed {
    // Private trait — only types in this crate can implement it
    pub trait Sealed {}
}

/// A trait for affine maps from integer coordinates to linear memory
/// offsets.
///
/// This abstraction captures multidimensional layouts that can be
/// interpreted as an affine transformation: `f(x) = dot(strides, x)`.
///
/// Implementors of this trait define how multidimensional indices map
/// to linear locations in memory.
pub trait AffineMap: sealed::Sealed {
    /// The number of dimensions in the domain of the map.
    fn rank(&self) -> usize;

    /// The shape of the domain (number of elements per dimension).
    fn extents(&self) -> &Extents;

    /// Maps a multidimensional coordinate to a linear memory offset.
    fn offset_of(&self, coord: &[usize]) -> Result<usize, LayoutError>;
}

/// A trait for affine maps that support inverse lookup from linear
/// offsets back to multidimensional coordinates.
///
/// This captures the inverse of the layout transformation defined by
/// [`AffineMap::offset_of`]. It is total over any stride set this
/// crate constructs, including padded layouts: offsets that fall in a
/// padding gap yield `None`. For row-major contiguous layouts,
/// [`crate::unravel_index`] is the faster specialization.
pub trait AffineMapInverse: sealed::Sealed {
    /// Computes the multidimensional coordinate for a given linear
    /// offset, or returns `None` if the offset is out of bounds or
    /// falls in a padding gap.
    fn coord_of(&self, offset: usize) -> Option<Vec<usize>>;
}

impl sealed::Sealed for Mapping {}

impl AffineMap for Mapping {
    fn rank(&self) -> usize {
        self.extents().rank()
    }

    fn extents(&self) -> &Extents {
        self.extents()
    }

    fn offset_of(&self, coord: &[usize]) -> Result<usize, LayoutError> {
        if coord.len() != self.rank() {
            return Err(LayoutError::InvalidDims {
                expected: self.rank(),
                got: coord.len(),
            });
        }

        // Dot product ∑ᵢ (strideᵢ × coordᵢ)
        Ok(self
            .strides()
            .iter()
            .zip(coord)
            .map(|(s, i)| s * i)
            .sum::<usize>())
    }
}

impl AffineMapInverse for Mapping {
    fn coord_of(&self, offset: usize) -> Option<Vec<usize>> {
        let mut pos = offset;
        let mut result = vec![0; self.rank()];

        let mut dims: Vec<_> = self
            .strides()
            .iter()
            .zip(self.extents().as_slice().iter().enumerate())
            .collect();

        dims.sort_by_key(|&(stride, _)| *stride);

        // Invert: offset = ∑ᵢ (strideᵢ × coordᵢ)
        // Solve for coordᵢ by peeling off largest strides first:
        //   coordᵢ = ⌊pos / strideᵢ⌋
        //   pos   -= coordᵢ × strideᵢ
        // If any coordᵢ ≥ sizeᵢ or pos ≠ 0 at the end, the offset is
        // invalid (out of range, or inside a padding gap).
        for &(stride, (i, &size)) in dims.iter().rev() {
            let index = if size > 1 { pos / stride } else { 0 };
            if index >= size {
                return None;
            }
            result[i] = index;
            pos -= index * stride;
        }

        (pos == 0).then_some(result)
    }
}

impl<T> sealed::Sealed for View<T> {}

impl<T> AffineMap for View<T> {
    fn rank(&self) -> usize {
        self.mapping().rank()
    }

    fn extents(&self) -> &Extents {
        self.mapping().extents()
    }

    fn offset_of(&self, coord: &[usize]) -> Result<usize, LayoutError> {
        self.mapping().offset_of(coord)
    }
}

impl<T> AffineMapInverse for View<T> {
    fn coord_of(&self, offset: usize) -> Option<Vec<usize>> {
        self.mapping().coord_of(offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extents::make_extents;
    use crate::layout::Order;

    #[test]
    fn test_offset_of_row_major() {
        let m = Mapping::contiguous(make_extents([2, 3, 4]), Order::RowMajor);
        assert_eq!(m.offset_of(&[0, 0, 0]).unwrap(), 0);
        assert_eq!(m.offset_of(&[1, 1, 1]).unwrap(), 17);
        assert_eq!(m.offset_of(&[1, 2, 3]).unwrap(), 23);
    }

    #[test]
    fn test_offset_of_rank_mismatch() {
        let m = Mapping::contiguous(make_extents([2, 3]), Order::RowMajor);
        assert_eq!(
            m.offset_of(&[1, 1, 1]),
            Err(LayoutError::InvalidDims {
                expected: 2,
                got: 3
            })
        );
    }

    #[test]
    fn test_coord_of_roundtrip_contiguous() {
        let m = Mapping::contiguous(make_extents([2, 3, 4]), Order::RowMajor);
        for coord in m.extents().iter_coords() {
            let offset = m.offset_of(&coord).unwrap();
            assert_eq!(m.coord_of(offset), Some(coord));
        }
    }

    #[test]
    fn test_coord_of_padding_gap_is_none() {
        // 7×6 padded to a 32-element pitch: offsets 6..32 of each row
        // are gap slots.
        let m = Mapping::padded(make_extents([7, 6]), Order::RowMajor, 32);
        assert_eq!(m.coord_of(5), Some(vec![0, 5]));
        assert_eq!(m.coord_of(6), None);
        assert_eq!(m.coord_of(31), None);
        assert_eq!(m.coord_of(32), Some(vec![1, 0]));
        assert_eq!(m.coord_of(223), None);
        assert_eq!(m.coord_of(224), None);
    }

    #[test]
    fn test_coord_of_roundtrip_padded() {
        let m = Mapping::padded(make_extents([3, 5]), Order::ColumnMajor, 8);
        for coord in m.extents().iter_coords() {
            let offset = m.offset_of(&coord).unwrap();
            assert_eq!(m.coord_of(offset), Some(coord));
        }
    }
}
