/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Non-owning typed views over caller-owned buffers.
//!
//! A [`View`] combines a data handle, a layout [`Mapping`] (which
//! carries the extents), and an [`Accessor`] capability tag into a
//! single value describing how to interpret a linear buffer as an
//! N-dimensional array. Views never own, allocate, copy, or
//! dereference the memory behind the handle; keeping the buffer alive
//! for as long as any view refers to it is the caller's
//! responsibility.

use std::fmt;
use std::ptr::NonNull;

use serde::Deserialize;
use serde::Serialize;

use crate::extents::Extents;
use crate::layout::LayoutError;
use crate::layout::Mapping;
use crate::layout::Order;
use crate::layout::padding_elements;

/// Where a view's underlying buffer may legally be dereferenced.
///
/// The two flags are independent and orthogonal to layout. They are
/// never inferred: callers state them at view construction, and every
/// derived-view operation copies them verbatim.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Accessor {
    /// The buffer is dereferenceable from host code.
    pub host: bool,

    /// The buffer is dereferenceable from device code.
    pub device: bool,
}

impl Accessor {
    /// Host-only memory.
    pub const HOST: Self = Self {
        host: true,
        device: false,
    };

    /// Device-only memory.
    pub const DEVICE: Self = Self {
        host: false,
        device: true,
    };

    /// Memory mapped into both address spaces.
    pub const HOST_DEVICE: Self = Self {
        host: true,
        device: true,
    };
}

impl Default for Accessor {
    /// Accelerator-resident data is the common case.
    fn default() -> Self {
        Self::DEVICE
    }
}

/// The structural shape of a view: element type, extents, layout
/// mapping, and accessor capability.
///
/// The shape utilities ([`crate::flatten`], [`crate::reshape`]) are
/// generic over this trait, so only types that declare conformance can
/// be passed to them — a non-view argument is rejected at compile
/// time, never at run time.
pub trait NdView {
    /// The element type the buffer holds.
    type Element;

    /// The buffer handle. Never dereferenced by this crate.
    fn data_handle(&self) -> NonNull<Self::Element>;

    /// The layout mapping, which also carries the extents.
    fn mapping(&self) -> &Mapping;

    /// The accessor capability tag.
    fn accessor(&self) -> Accessor;

    /// The view's extents.
    fn extents(&self) -> &Extents {
        self.mapping().extents()
    }

    /// The total number of logical elements.
    fn size(&self) -> usize {
        self.extents().size()
    }
}

/// A non-owning `(handle, mapping, accessor)` view over a caller-owned
/// buffer.
///
/// Views are value types: cheap to clone and structurally comparable
/// by handle, mapping, and accessor. The view's lifetime is
/// independent of the buffer's; it must not outlive it, and that is
/// the caller's responsibility.
pub struct View<T> {
    ptr: NonNull<T>,
    mapping: Mapping,
    accessor: Accessor,
}

// A view is shape metadata plus an address. It never dereferences its
// handle, so it moves between threads under the same rules as the
// element type itself.
unsafe impl<T: Send> Send for View<T> {}
unsafe impl<T: Sync> Sync for View<T> {}

impl<T> View<T> {
    /// Builds a contiguous row-major view with the default
    /// (device-only) accessor.
    pub fn new(ptr: NonNull<T>, extents: Extents) -> Self {
        Self::contiguous(ptr, extents, Order::RowMajor, Accessor::default())
    }

    /// Builds a contiguous view in the given order with an explicit
    /// accessor tag.
    pub fn contiguous(ptr: NonNull<T>, extents: Extents, order: Order, accessor: Accessor) -> Self {
        Self::from_parts(ptr, Mapping::contiguous(extents, order), accessor)
    }

    /// Builds a padded-layout view for the given storage order, with
    /// the minor-most dimension's allocated width rounded up to
    /// `byte_alignment` (see [`crate::DEFAULT_BYTE_ALIGNMENT`]).
    ///
    /// `byte_alignment` must be a multiple or a divisor of the element
    /// size. `ptr` must already be aligned to `byte_alignment`; a
    /// misaligned pointer is an unchecked precondition violation,
    /// asserted in debug builds only.
    pub fn aligned(
        ptr: NonNull<T>,
        extents: Extents,
        order: Order,
        byte_alignment: usize,
    ) -> Result<Self, LayoutError> {
        let align_elements = padding_elements::<T>(byte_alignment)?;
        debug_assert!(
            ptr.as_ptr() as usize % byte_alignment == 0,
            "pointer {:p} is not aligned to {} bytes",
            ptr.as_ptr(),
            byte_alignment
        );
        Ok(Self::from_parts(
            ptr,
            Mapping::padded(extents, order, align_elements),
            Accessor::default(),
        ))
    }

    /// Assembles a view from an existing mapping and accessor tag.
    pub fn from_parts(ptr: NonNull<T>, mapping: Mapping, accessor: Accessor) -> Self {
        Self {
            ptr,
            mapping,
            accessor,
        }
    }

    /// Replaces the accessor tag, e.g. for buffers mapped into both
    /// address spaces.
    pub fn with_accessor(self, accessor: Accessor) -> Self {
        Self { accessor, ..self }
    }

    /// The buffer handle.
    pub fn data_handle(&self) -> NonNull<T> {
        self.ptr
    }

    /// The view's extents.
    pub fn extents(&self) -> &Extents {
        self.mapping.extents()
    }

    /// The layout mapping.
    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    /// The accessor capability tag.
    pub fn accessor(&self) -> Accessor {
        self.accessor
    }

    /// The number of dimensions.
    pub fn rank(&self) -> usize {
        self.mapping.rank()
    }

    /// The size of dimension `dim`.
    pub fn extent(&self, dim: usize) -> usize {
        self.extents().extent(dim)
    }

    /// The total number of logical elements.
    pub fn size(&self) -> usize {
        self.extents().size()
    }

    /// Whether the view's layout addresses every storage slot in its
    /// footprint exactly once.
    pub fn is_exhaustive(&self) -> bool {
        self.mapping.is_exhaustive()
    }
}

impl<T> NdView for View<T> {
    type Element = T;

    fn data_handle(&self) -> NonNull<T> {
        self.ptr
    }

    fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    fn accessor(&self) -> Accessor {
        self.accessor
    }
}

impl<T> Clone for View<T> {
    fn clone(&self) -> Self {
        Self {
            ptr: self.ptr,
            mapping: self.mapping.clone(),
            accessor: self.accessor,
        }
    }
}

impl<T> PartialEq for View<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr == other.ptr && self.mapping == other.mapping && self.accessor == other.accessor
    }
}

impl<T> Eq for View<T> {}

impl<T> fmt::Debug for View<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("ptr", &self.ptr)
            .field("mapping", &self.mapping)
            .field("accessor", &self.accessor)
            .finish()
    }
}

impl<T> fmt::Display for View<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "View {{ [ptr={:p} sz={:?} st={:?} host={} device={}] }}",
            self.ptr.as_ptr(),
            self.extents().as_slice(),
            self.mapping.strides(),
            self.accessor.host,
            self.accessor.device,
        )
    }
}
