/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Dimensional reshaping of views.
//!
//! This module defines utilities for deriving new views from existing
//! ones without copying element data: [`flatten`] collapses a view to
//! one dimension, [`reshape`] reinterprets it under new extents of the
//! same total size. Both share the source view's data handle and
//! accessor tag and build a fresh contiguous mapping — strides are
//! never inherited.
//!
//! Both require an exhaustive (gap-free) source: deriving a dense view
//! over padded storage would silently address gap slots, so a
//! non-exhaustive source is reported as [`LayoutError::NonExhaustive`]
//! instead.

use tracing::debug;

use crate::extents::Extents;
use crate::layout::LayoutError;
use crate::layout::Mapping;
use crate::view::NdView;
use crate::view::View;

/// Flattens a view into a 1-dimensional view over the same data
/// handle, with a single extent equal to the total element count.
///
/// The source must be exhaustive. The result carries the source's
/// accessor tag unchanged and is always exhaustive.
pub fn flatten<V: NdView>(view: &V) -> Result<View<V::Element>, LayoutError> {
    if !view.mapping().is_exhaustive() {
        debug!(mapping = %view.mapping(), "flatten rejected non-exhaustive input");
        return Err(LayoutError::NonExhaustive);
    }

    let ext = Extents::from([view.size()]);
    Ok(View::from_parts(
        view.data_handle(),
        Mapping::contiguous(ext, view.mapping().order()),
        view.accessor(),
    ))
}

/// Reinterprets a view under `new_extents`, which must cover exactly
/// the same number of elements as the source.
///
/// The source must be exhaustive. The result shares the data handle
/// and accessor tag and gets a freshly built contiguous mapping for
/// `new_extents` in the source's storage order.
pub fn reshape<V: NdView>(
    view: &V,
    new_extents: Extents,
) -> Result<View<V::Element>, LayoutError> {
    if !view.mapping().is_exhaustive() {
        debug!(mapping = %view.mapping(), "reshape rejected non-exhaustive input");
        return Err(LayoutError::NonExhaustive);
    }

    let expected = view.size();
    let got = new_extents.size();
    if got != expected {
        debug!(expected, got, "reshape rejected size mismatch");
        return Err(LayoutError::SizeMismatch { expected, got });
    }

    Ok(View::from_parts(
        view.data_handle(),
        Mapping::contiguous(new_extents, view.mapping().order()),
        view.accessor(),
    ))
}
