//! Horizontal discretizations that data can be regridded between
//!
//! This module provides the [`Discretization`] trait and descriptors for the two kinds of
//! horizontal structure a regridder connects:
//!
//! - [`GridInfo`]: A rectilinear latitude/longitude grid with natural shape `(n_lat, n_lon)`
//! - [`MeshInfo`]: The faces of an unstructured mesh with natural shape `(n_faces,)`
//!
//! The descriptors only carry what the weight machinery needs: the natural shape of the
//! horizontal footprint and the base of the flat cell indices a weight generator reports.
//! Building the geometry itself is left to the weight-generation engine.
//!
//! # Examples
//!
//! ```rust
//! use esmregrid_core::discretization::{Discretization, GridInfo, MeshInfo};
//!
//! let grid = GridInfo::new(3, 2).unwrap();
//! assert_eq!(grid.shape(), vec![3, 2]);
//! assert_eq!(grid.size(), 6);
//! assert_eq!(grid.name(), "Grid");
//!
//! let mesh = MeshInfo::new(10, 0).unwrap();
//! assert_eq!(mesh.shape(), vec![10]);
//! ```

use crate::errors::{RegridError, RegridResult};
use serde::{Deserialize, Serialize};

/// Trait for the horizontal structure on either side of a regridder
///
/// Unlike most of the numeric code this trait is object safe, so regridders can be built
/// from `&dyn Discretization` without knowing whether they connect grids or meshes.
pub trait Discretization: std::fmt::Debug + Send + Sync {
    /// Name of the discretization kind
    ///
    /// Used for error messages and debugging
    fn name(&self) -> &'static str;

    /// Natural per-axis cell counts of the horizontal footprint
    ///
    /// Data on this discretization has these as its trailing axes.
    fn shape(&self) -> Vec<usize>;

    /// Number of horizontal cells
    fn size(&self) -> usize {
        self.shape().iter().product()
    }

    /// Base of the flat cell indices a weight generator reports for this discretization
    ///
    /// [`Regridder::from_generator`](crate::regridder::Regridder::from_generator) reads
    /// coefficient indices relative to it.
    fn index_offset(&self) -> usize;
}

/// Rectilinear latitude/longitude grid
///
/// Cells are laid out as `(latitude, longitude)`, so data on a grid with `n_lat` latitudes
/// and `n_lon` longitudes has trailing axes `[n_lat, n_lon]`.
///
/// # Examples
///
/// ```rust
/// use esmregrid_core::discretization::{Discretization, GridInfo};
///
/// let grid = GridInfo::new(2, 3).unwrap();
/// assert_eq!(grid.index_offset(), 1);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GridInfo {
    n_lat: usize,
    n_lon: usize,
}

impl GridInfo {
    /// Create a grid descriptor
    ///
    /// Fails with [`RegridError::Shape`] if either axis is empty.
    pub fn new(n_lat: usize, n_lon: usize) -> RegridResult<Self> {
        check_extents(&[n_lat, n_lon])?;
        Ok(Self { n_lat, n_lon })
    }
}

impl Discretization for GridInfo {
    fn name(&self) -> &'static str {
        "Grid"
    }

    fn shape(&self) -> Vec<usize> {
        vec![self.n_lat, self.n_lon]
    }

    fn index_offset(&self) -> usize {
        1
    }
}

/// Faces of an unstructured mesh
///
/// Data on a mesh has a single trailing axis of length `n_faces`.
/// Faces are numbered from `start_index` (0 or 1), in the weights as in the connectivity.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MeshInfo {
    n_faces: usize,
    start_index: usize,
}

impl MeshInfo {
    pub fn new(n_faces: usize, start_index: usize) -> RegridResult<Self> {
        check_extents(&[n_faces])?;
        Ok(Self {
            n_faces,
            start_index,
        })
    }
}

impl Discretization for MeshInfo {
    fn name(&self) -> &'static str {
        "Mesh"
    }

    fn shape(&self) -> Vec<usize> {
        vec![self.n_faces]
    }

    fn index_offset(&self) -> usize {
        self.start_index
    }
}

/// Check that every extent of a footprint shape is positive
pub(crate) fn check_extents(shape: &[usize]) -> RegridResult<()> {
    if shape.is_empty() || shape.contains(&0) {
        let expected: Vec<usize> = shape.iter().map(|n| (*n).max(1)).collect();
        return Err(RegridError::shape(&expected, shape));
    }
    Ok(())
}
