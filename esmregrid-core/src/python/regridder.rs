//! Python wrappers for [`Regridder`] and [`AreaWeighted`]
//!
//! Data crosses the boundary as numpy arrays: a float array plus an optional boolean mask of
//! the same shape on the way in, and a `(data, mask)` tuple on the way out.
//!
//! Example:
//!     regridder = Regridder([2, 3], [3, 2], [(1, 1, 0.5), ...])
//!     data, mask = regridder.regrid(values, mask=missing, mdtol=0.5)

use crate::engine::NormType;
use crate::masked::MaskedArray;
use crate::regridder::Regridder;
use crate::scheme::AreaWeighted;
use crate::weights::Coefficient;
use numpy::{IntoPyArray, PyArrayDyn, PyReadonlyArrayDyn};
use pyo3::prelude::*;

type PyMasked<'py> = (Bound<'py, PyArrayDyn<f64>>, Bound<'py, PyArrayDyn<bool>>);

fn to_masked(
    data: PyReadonlyArrayDyn<'_, f64>,
    mask: Option<PyReadonlyArrayDyn<'_, bool>>,
) -> PyResult<MaskedArray> {
    let data = data.as_array().to_owned();
    match mask {
        Some(mask) => Ok(MaskedArray::new(data, mask.as_array().to_owned())?),
        None => Ok(MaskedArray::from_data(data)),
    }
}

fn to_numpy(py: Python<'_>, masked: MaskedArray) -> PyMasked<'_> {
    let (data, mask) = masked.into_parts();
    (data.into_pyarray_bound(py), mask.into_pyarray_bound(py))
}

/// Python wrapper for Regridder
///
/// Coefficients are `(target, source, weight)` tuples with 1-based engine indices.
#[pyclass(name = "Regridder", module = "esmregrid._lib.core")]
#[derive(Debug, Clone)]
pub struct PyRegridder(pub Regridder);

#[pymethods]
impl PyRegridder {
    #[new]
    fn new(
        source_shape: Vec<usize>,
        target_shape: Vec<usize>,
        coefficients: Vec<(usize, usize, f64)>,
    ) -> PyResult<Self> {
        let coefficients: Vec<Coefficient> = coefficients
            .into_iter()
            .map(|(target, source, weight)| Coefficient::new(target, source, weight))
            .collect();
        Ok(Self(Regridder::new(&source_shape, &target_shape, &coefficients)?))
    }

    #[getter]
    fn source_shape(&self) -> Vec<usize> {
        self.0.source_shape().to_vec()
    }

    #[getter]
    fn target_shape(&self) -> Vec<usize> {
        self.0.target_shape().to_vec()
    }

    /// Number of stored weights
    #[getter]
    fn nnz(&self) -> usize {
        self.0.weights().nnz()
    }

    /// Regrid data whose trailing axes are the source shape
    #[pyo3(signature = (data, mask=None, norm_type="fracarea", mdtol=1.0))]
    fn regrid<'py>(
        &self,
        py: Python<'py>,
        data: PyReadonlyArrayDyn<'py, f64>,
        mask: Option<PyReadonlyArrayDyn<'py, bool>>,
        norm_type: &str,
        mdtol: f64,
    ) -> PyResult<PyMasked<'py>> {
        let masked = to_masked(data, mask)?;
        let regridder = &self.0;
        let result = py.allow_threads(|| regridder.regrid_str(&masked, norm_type, mdtol))?;
        Ok(to_numpy(py, result))
    }

    fn __repr__(&self) -> String {
        format!(
            "Regridder(source_shape={:?}, target_shape={:?}, nnz={})",
            self.0.source_shape(),
            self.0.target_shape(),
            self.0.weights().nnz()
        )
    }
}

/// Python wrapper for the AreaWeighted scheme
///
/// Example:
///     scheme = AreaWeighted(mdtol=0.5, norm_type="dstarea")
///     data, mask = scheme.regrid(regridder, values)
#[pyclass(name = "AreaWeighted", module = "esmregrid._lib.core")]
#[derive(Debug, Clone)]
pub struct PyAreaWeighted(pub AreaWeighted);

#[pymethods]
impl PyAreaWeighted {
    #[new]
    #[pyo3(signature = (mdtol=0.0, norm_type="fracarea"))]
    fn new(mdtol: f64, norm_type: &str) -> PyResult<Self> {
        let norm_type: NormType = norm_type.parse()?;
        Ok(Self(AreaWeighted::new(mdtol)?.with_norm_type(norm_type)))
    }

    #[getter]
    fn mdtol(&self) -> f64 {
        self.0.mdtol()
    }

    #[getter]
    fn norm_type(&self) -> String {
        self.0.norm_type().to_string()
    }

    /// Regrid data with this scheme's tolerance and normalisation
    #[pyo3(signature = (regridder, data, mask=None))]
    fn regrid<'py>(
        &self,
        py: Python<'py>,
        regridder: PyRef<'py, PyRegridder>,
        data: PyReadonlyArrayDyn<'py, f64>,
        mask: Option<PyReadonlyArrayDyn<'py, bool>>,
    ) -> PyResult<PyMasked<'py>> {
        let masked = to_masked(data, mask)?;
        let bound = self.0.bind(regridder.0.clone());
        let result = py.allow_threads(|| bound.regrid(&masked))?;
        Ok(to_numpy(py, result))
    }

    fn __repr__(&self) -> String {
        self.0.to_string()
    }
}
