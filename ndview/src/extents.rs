/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Shape descriptors for multidimensional views.
//!
//! An [`Extents`] value is an ordered sequence of dimension sizes; its
//! rank is the number of dimensions. Extents are immutable after
//! construction and are pure data: layout decisions (strides, padding,
//! footprint) live in [`crate::layout::Mapping`].

use itertools::Itertools;
use serde::Deserialize;
use serde::Serialize;

/// An ordered sequence of dimension sizes describing the shape of a
/// view. Rank is fixed at construction.
///
/// Dimension indices passed to [`Extents::extent`] must be in
/// `0..rank()`; validity is a caller precondition and is not checked
/// beyond the slice indexing itself. The product of all sizes must fit
/// in `usize`; overflow is likewise a caller precondition.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Extents {
    dims: Vec<usize>,
}

impl Extents {
    /// Creates extents from a sequence of dimension sizes.
    pub fn new(dims: Vec<usize>) -> Self {
        Self { dims }
    }

    /// The number of dimensions.
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// The size of dimension `dim`.
    pub fn extent(&self, dim: usize) -> usize {
        self.dims[dim]
    }

    /// All dimension sizes, major to minor.
    pub fn as_slice(&self) -> &[usize] {
        &self.dims
    }

    /// The total number of logical elements: the product of all
    /// dimension sizes. Rank-0 extents describe a single element.
    pub fn size(&self) -> usize {
        self.dims.iter().product()
    }

    /// Iterates over every coordinate in the extents in row-major
    /// order (last index varies fastest).
    pub fn iter_coords(&self) -> Box<dyn Iterator<Item = Vec<usize>> + '_> {
        if self.dims.is_empty() {
            // The rank-0 space has exactly one point: the empty
            // coordinate.
            Box::new(std::iter::once(Vec::new()))
        } else {
            Box::new(self.dims.iter().map(|&e| 0..e).multi_cartesian_product())
        }
    }
}

impl From<Vec<usize>> for Extents {
    fn from(dims: Vec<usize>) -> Self {
        Self::new(dims)
    }
}

impl<const N: usize> From<[usize; N]> for Extents {
    fn from(dims: [usize; N]) -> Self {
        Self::new(dims.to_vec())
    }
}

impl From<&[usize]> for Extents {
    fn from(dims: &[usize]) -> Self {
        Self::new(dims.to_vec())
    }
}

mod sealed {
    pub trait Sealed {}
}

/// An integral dimension size accepted by [`make_extents`].
///
/// Implemented for the built-in integer types only, so passing a
/// floating-point (or otherwise non-integral) size fails to compile.
/// Signed values must be non-negative.
pub trait IndexValue: sealed::Sealed + Copy {
    /// Converts the value into a dimension size.
    fn into_extent(self) -> usize;
}

macro_rules! impl_index_value_unsigned {
    ($($t:ty),*) => {
        $(
            impl sealed::Sealed for $t {}
            impl IndexValue for $t {
                fn into_extent(self) -> usize {
                    self as usize
                }
            }
        )*
    };
}

macro_rules! impl_index_value_signed {
    ($($t:ty),*) => {
        $(
            impl sealed::Sealed for $t {}
            impl IndexValue for $t {
                fn into_extent(self) -> usize {
                    debug_assert!(self >= 0, "extent must be non-negative, got {}", self);
                    self as usize
                }
            }
        )*
    };
}

impl_index_value_unsigned!(u8, u16, u32, u64, usize);
impl_index_value_signed!(i8, i16, i32, i64, isize);

/// Builds an [`Extents`] value from integral dimension sizes.
///
/// ```
/// use ndview::make_extents;
///
/// let e = make_extents([7, 6]);
/// assert_eq!(e.rank(), 2);
/// assert_eq!(e.size(), 42);
/// ```
///
/// Non-integral arguments are rejected at compile time:
///
/// ```compile_fail
/// let e = ndview::make_extents([7.0f32, 6.0]);
/// ```
pub fn make_extents<I: IndexValue, const N: usize>(dims: [I; N]) -> Extents {
    Extents::new(dims.iter().map(|&d| d.into_extent()).collect())
}

/// Shorthand for [`make_extents`]:
/// `extents![2, 3, 4]` describes a 2×3×4 shape.
#[macro_export]
macro_rules! extents {
    ($($dim:expr),* $(,)?) => {
        $crate::make_extents([$($dim),*])
    };
}
