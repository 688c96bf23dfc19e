/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Non-owning, typed, multidimensional array views over raw buffers.
//!
//! This crate is the shape and layout substrate for numerical code
//! running against host or accelerator memory. It describes how a
//! linear buffer of elements maps to an N-dimensional coordinate
//! space, without allocating, freeing, copying, or synchronizing
//! anything: every type here is immutable value data, every operation
//! a pure O(rank) function.
//!
//! The pieces, leaves first:
//!
//! - [`Extents`] — the shape: an ordered sequence of dimension sizes.
//! - [`Mapping`] — a layout: per-dimension strides, storage footprint,
//!   and an exhaustiveness predicate, derived from extents. Contiguous
//!   row/column-major and alignment-padded (pitched) variants.
//! - [`Accessor`] — host/device accessibility flags, stated by the
//!   caller and propagated verbatim through derived views.
//! - [`View`] — `(data handle, mapping, accessor)`: how to interpret a
//!   caller-owned buffer. Views never own the buffer and never
//!   dereference the handle.
//! - Shape utilities — [`flatten`], [`reshape`], [`unravel_index`],
//!   gated on the [`NdView`] conformance trait.
//!
//! ```
//! use std::ptr::NonNull;
//!
//! use ndview::flatten;
//! use ndview::make_extents;
//! use ndview::View;
//!
//! let mut buf = vec![0.0f32; 42];
//! let ptr = NonNull::new(buf.as_mut_ptr()).unwrap();
//!
//! let v = View::new(ptr, make_extents([7, 6]));
//! let flat = flatten(&v).unwrap();
//! assert_eq!(flat.extents().as_slice(), &[42]);
//! ```

pub mod affine;
pub mod extents;
pub mod layout;
pub mod reshape;
pub mod unravel;
pub mod view;

pub use affine::AffineMap;
pub use affine::AffineMapInverse;
pub use extents::Extents;
pub use extents::IndexValue;
pub use extents::make_extents;
pub use layout::DEFAULT_BYTE_ALIGNMENT;
pub use layout::LayoutError;
pub use layout::Mapping;
pub use layout::Order;
pub use layout::padding_elements;
pub use reshape::flatten;
pub use reshape::reshape;
pub use unravel::unravel_index;
pub use view::Accessor;
pub use view::NdView;
pub use view::View;
