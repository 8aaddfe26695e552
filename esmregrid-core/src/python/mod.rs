//! Python bindings for regridders and schemes

use crate::errors::RegridError;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

mod regridder;

pub use regridder::{PyAreaWeighted, PyRegridder};

impl From<RegridError> for PyErr {
    fn from(err: RegridError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

#[pymodule]
#[pyo3(name = "core")]
pub fn core_module(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyRegridder>()?;
    m.add_class::<PyAreaWeighted>()?;
    Ok(())
}
