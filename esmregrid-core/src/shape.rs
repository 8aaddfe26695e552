//! Conversion between natural N-D array layouts and the flattened form used by weight tensors
//!
//! Data handed to a regridder has the shape `[...extra, ...footprint]`, where the trailing
//! `footprint` axes are the horizontal cells of a grid or mesh and the leading `extra` axes
//! (time, height, ensemble members, ...) are carried through untouched.
//! [`flatten`] collapses this into a `[extra_size, footprint_size]` matrix in row-major order,
//! which matches the row-major offsets used by
//! [`SparseWeightTensor`](crate::weights::SparseWeightTensor), and [`unflatten`] undoes it.
//!
//! Two index conventions are in play:
//!
//! - Row-major ([`ravel_index`]/[`unravel_index`]): the last axis varies fastest.
//!   This is how ndarray lays out standard arrays and how weights are stored internally.
//! - Engine order ([`ravel_engine_index`]/[`unravel_engine_index`]): the first axis varies
//!   fastest. Weight-generation engines build their fields on the reversed shape, so a flat
//!   cell index coming out of the engine is a column-major offset into the natural shape.
//!   This convention is fixed and must not change, otherwise coefficients are attached to the
//!   wrong cells.
//!
//! ```rust
//! use esmregrid_core::shape::{ravel_engine_index, unravel_engine_index};
//!
//! // Grid with 2 latitudes and 3 longitudes
//! let shape = [2, 3];
//! assert_eq!(unravel_engine_index(1, &shape), vec![1, 0]);
//! assert_eq!(unravel_engine_index(2, &shape), vec![0, 1]);
//! assert_eq!(ravel_engine_index(&[1, 2], &shape), 5);
//! ```

use crate::errors::{RegridError, RegridResult};
use ndarray::{Array2, ArrayD, ArrayViewD, IxDyn};

/// Number of cells described by a shape
///
/// The empty shape describes a single cell.
pub fn shape_size(shape: &[usize]) -> usize {
    shape.iter().product()
}

/// Split a full array shape into its leading extra axes
///
/// Fails with [`RegridError::Shape`] unless the trailing axes of `shape` are exactly
/// `footprint_shape`.
pub fn split_shape(shape: &[usize], footprint_shape: &[usize]) -> RegridResult<Vec<usize>> {
    let rank = footprint_shape.len();
    if shape.len() < rank || &shape[shape.len() - rank..] != footprint_shape {
        return Err(RegridError::shape(footprint_shape, shape));
    }
    Ok(shape[..shape.len() - rank].to_vec())
}

/// Collapse an array into `[extra_size, footprint_size]`
///
/// Returns the flattened matrix together with the extra shape needed by [`unflatten`].
pub fn flatten<T: Clone>(
    array: ArrayViewD<'_, T>,
    footprint_shape: &[usize],
) -> RegridResult<(Array2<T>, Vec<usize>)> {
    let extra_shape = split_shape(array.shape(), footprint_shape)?;
    let rows = shape_size(&extra_shape);
    let cols = shape_size(footprint_shape);

    let flat = array
        .as_standard_layout()
        .into_owned()
        .into_shape((rows, cols))
        .map_err(|_| RegridError::shape(&[rows, cols], array.shape()))?;
    Ok((flat, extra_shape))
}

/// Expand a `[extra_size, footprint_size]` matrix back into `[...extra, ...footprint]`
pub fn unflatten<T: Clone>(
    flat: Array2<T>,
    extra_shape: &[usize],
    footprint_shape: &[usize],
) -> RegridResult<ArrayD<T>> {
    let expected = [shape_size(extra_shape), shape_size(footprint_shape)];
    if flat.shape() != expected {
        return Err(RegridError::shape(&expected, flat.shape()));
    }

    let full_shape: Vec<usize> = extra_shape
        .iter()
        .chain(footprint_shape.iter())
        .copied()
        .collect();
    let flat = if flat.is_standard_layout() {
        flat
    } else {
        flat.as_standard_layout().into_owned()
    };
    flat.into_shape(IxDyn(&full_shape))
        .map_err(|_| RegridError::shape(&full_shape, &expected))
}

/// Row-major offset of a multi-index
pub fn ravel_index(index: &[usize], shape: &[usize]) -> usize {
    debug_assert_eq!(index.len(), shape.len());
    index
        .iter()
        .zip(shape.iter())
        .fold(0, |offset, (i, n)| offset * n + i)
}

/// Multi-index of a row-major offset
pub fn unravel_index(mut offset: usize, shape: &[usize]) -> Vec<usize> {
    let mut index = vec![0; shape.len()];
    for (slot, n) in index.iter_mut().zip(shape.iter()).rev() {
        *slot = offset % n;
        offset /= n;
    }
    index
}

/// Multi-index of a 0-based engine offset (first axis varies fastest)
///
/// Equivalent to unravelling against the reversed shape and reversing the result.
pub fn unravel_engine_index(mut offset: usize, shape: &[usize]) -> Vec<usize> {
    let mut index = vec![0; shape.len()];
    for (slot, n) in index.iter_mut().zip(shape.iter()) {
        *slot = offset % n;
        offset /= n;
    }
    index
}

/// 0-based engine offset of a multi-index, inverse of [`unravel_engine_index`]
pub fn ravel_engine_index(index: &[usize], shape: &[usize]) -> usize {
    debug_assert_eq!(index.len(), shape.len());
    index
        .iter()
        .zip(shape.iter())
        .rev()
        .fold(0, |offset, (i, n)| offset * n + i)
}

/// Move `axes` (in the given order) to the end of the array
///
/// The remaining axes keep their relative order. `axes[i]` becomes trailing axis `i`.
pub fn move_axes_to_end<T>(array: ArrayD<T>, axes: &[usize]) -> RegridResult<ArrayD<T>> {
    let rank = array.ndim();
    check_axes(axes, rank)?;

    let mut order: Vec<usize> = (0..rank).filter(|a| !axes.contains(a)).collect();
    order.extend_from_slice(axes);
    Ok(array.permuted_axes(IxDyn(&order)))
}

/// Move the trailing `positions.len()` axes of `array` to `positions`
///
/// Trailing axis `i` ends up at `positions[i]`; the leading axes fill the remaining slots
/// in order.
pub fn place_trailing_axes<T>(array: ArrayD<T>, positions: &[usize]) -> RegridResult<ArrayD<T>> {
    let rank = array.ndim();
    check_axes(positions, rank)?;
    let leading = rank - positions.len();

    let mut order: Vec<Option<usize>> = vec![None; rank];
    for (i, &position) in positions.iter().enumerate() {
        order[position] = Some(leading + i);
    }
    let mut remaining = 0..leading;
    let order: Vec<usize> = order
        .into_iter()
        .map(|slot| slot.unwrap_or_else(|| remaining.next().unwrap_or_default()))
        .collect();
    Ok(array.permuted_axes(IxDyn(&order)))
}

fn check_axes(axes: &[usize], rank: usize) -> RegridResult<()> {
    if axes.len() > rank {
        return Err(RegridError::InvalidAxes(format!(
            "{} axes requested from an array of rank {}",
            axes.len(),
            rank
        )));
    }
    for (i, axis) in axes.iter().enumerate() {
        if *axis >= rank {
            return Err(RegridError::InvalidAxes(format!(
                "axis {} is out of bounds for an array of rank {}",
                axis, rank
            )));
        }
        if axes[..i].contains(axis) {
            return Err(RegridError::InvalidAxes(format!("axis {} is repeated", axis)));
        }
    }
    Ok(())
}
