//! Application of precomputed conservative weights to N-dimensional masked data
//!
//! A [`Regridder`] binds a [`SparseWeightTensor`] to a source and target shape.
//! Data passed to [`Regridder::regrid`] must end in the source shape; any leading axes are
//! carried through unchanged, so a `[time, level, lat, lon]` field is regridded slice by
//! slice in a single call.
//!
//! # Examples
//!
//! ```rust
//! use esmregrid_core::engine::NormType;
//! use esmregrid_core::masked::MaskedArray;
//! use esmregrid_core::regridder::Regridder;
//! use esmregrid_core::weights::Coefficient;
//! use ndarray::array;
//!
//! // Two source cells, each covering half of one target cell
//! let regridder = Regridder::new(
//!     &[2],
//!     &[1],
//!     &[Coefficient::new(1, 1, 0.5), Coefficient::new(1, 2, 0.5)],
//! )
//! .unwrap();
//!
//! let data = MaskedArray::from_data(array![[1.0, 3.0], [2.0, 2.0]].into_dyn());
//! let result = regridder.regrid(&data, NormType::FracArea, 1.0).unwrap();
//! assert_eq!(result.shape(), &[2, 1]);
//! assert_eq!(result.data()[[0, 0]], 2.0);
//! ```

use crate::discretization::{check_extents, Discretization};
use crate::engine::{apply_weights, NormType};
use crate::errors::RegridResult;
use crate::masked::MaskedArray;
use crate::shape::{flatten, split_shape, unflatten};
use crate::weights::{Coefficient, SparseWeightTensor, WeightGenerator};
use log::{debug, warn};
use std::sync::Arc;

/// Regridder between one source shape and one target shape
///
/// Regridders are immutable and can be shared between threads; every call to
/// [`regrid`](Self::regrid) allocates its own output.
///
/// The missing data tolerance is not range checked here. Callers that accept `mdtol` from
/// users should go through [`AreaWeighted`](crate::scheme::AreaWeighted), which validates it.
#[derive(Clone, Debug, PartialEq)]
pub struct Regridder {
    source_shape: Vec<usize>,
    target_shape: Vec<usize>,
    weights: Arc<SparseWeightTensor>,
}

impl Regridder {
    /// Create a regridder from 1-based engine coefficients
    pub fn new(
        source_shape: &[usize],
        target_shape: &[usize],
        coefficients: &[Coefficient],
    ) -> RegridResult<Self> {
        let weights =
            SparseWeightTensor::from_coefficients(target_shape, source_shape, coefficients)?;
        Ok(Self::from_tensor(source_shape, target_shape, weights))
    }

    fn from_tensor(
        source_shape: &[usize],
        target_shape: &[usize],
        weights: SparseWeightTensor,
    ) -> Self {
        Self {
            source_shape: source_shape.to_vec(),
            target_shape: target_shape.to_vec(),
            weights: Arc::new(weights),
        }
    }

    /// Create a regridder from weights computed elsewhere
    ///
    /// The weights must have exactly the shape `target_shape ++ source_shape`.
    pub fn with_precomputed_weights(
        source_shape: &[usize],
        target_shape: &[usize],
        weights: Arc<SparseWeightTensor>,
    ) -> RegridResult<Self> {
        check_extents(source_shape)?;
        check_extents(target_shape)?;
        weights.validate_shape(target_shape, source_shape)?;
        Ok(Self {
            source_shape: source_shape.to_vec(),
            target_shape: target_shape.to_vec(),
            weights,
        })
    }

    /// Create a regridder by asking a weight generator for the coefficients between two
    /// discretizations
    ///
    /// Coefficient indices are read relative to each discretization's
    /// [`index_offset`](Discretization::index_offset).
    pub fn from_generator(
        source: &dyn Discretization,
        target: &dyn Discretization,
        generator: &dyn WeightGenerator,
    ) -> RegridResult<Self> {
        let coefficients = generator.generate(source, target)?;
        debug!(
            "Generated {} coefficients from {} {:?} to {} {:?}",
            coefficients.len(),
            source.name(),
            source.shape(),
            target.name(),
            target.shape()
        );
        let (source_shape, target_shape) = (source.shape(), target.shape());
        let weights = SparseWeightTensor::from_coefficients_with_base(
            &target_shape,
            &source_shape,
            &coefficients,
            target.index_offset(),
            source.index_offset(),
        )?;
        Ok(Self::from_tensor(&source_shape, &target_shape, weights))
    }

    pub fn source_shape(&self) -> &[usize] {
        &self.source_shape
    }

    pub fn target_shape(&self) -> &[usize] {
        &self.target_shape
    }

    /// Shared handle to the weights, for reuse in another regridder
    pub fn weights(&self) -> &Arc<SparseWeightTensor> {
        &self.weights
    }

    /// Regrid masked data whose trailing axes are the source shape
    ///
    /// Returns data whose trailing axes are the target shape, with the same leading axes.
    ///
    /// # Errors
    ///
    /// [`RegridError::Shape`](crate::errors::RegridError::Shape) if the trailing axes of
    /// `data` are not the source shape.
    pub fn regrid(
        &self,
        data: &MaskedArray,
        norm_type: NormType,
        mdtol: f64,
    ) -> RegridResult<MaskedArray> {
        let extra_shape = split_shape(data.shape(), &self.source_shape)?;
        let (flat_data, _) = flatten(data.filled(0.0).view(), &self.source_shape)?;
        let (flat_valid, _) = flatten(data.valid().view(), &self.source_shape)?;

        debug!(
            "Regridding {} slices of {:?} onto {:?} ({}, mdtol={})",
            flat_data.nrows(),
            self.source_shape,
            self.target_shape,
            norm_type,
            mdtol
        );

        let regridded = apply_weights(
            &self.weights,
            flat_data.view(),
            flat_valid.view(),
            norm_type,
            mdtol,
        )?;

        let result = MaskedArray::new(
            unflatten(regridded.data, &extra_shape, &self.target_shape)?,
            unflatten(regridded.mask, &extra_shape, &self.target_shape)?,
        )?;
        if result.is_fully_masked() && !data.is_fully_masked() {
            warn!(
                "Every target cell of {:?} is masked with mdtol={}",
                result.shape(),
                mdtol
            );
        }
        Ok(result)
    }

    /// Regrid with the normalisation given by name
    ///
    /// The name is matched case insensitively. Shape errors take precedence over an
    /// unsupported name; neither leaves any trace on the regridder.
    pub fn regrid_str(
        &self,
        data: &MaskedArray,
        norm_type: &str,
        mdtol: f64,
    ) -> RegridResult<MaskedArray> {
        split_shape(data.shape(), &self.source_shape)?;
        let norm_type: NormType = norm_type.parse()?;
        self.regrid(data, norm_type, mdtol)
    }
}
