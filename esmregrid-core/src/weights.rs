//! Sparse regridding weights
//!
//! A [`SparseWeightTensor`] holds the overlap weight between every target cell and every
//! source cell. Logically it has the shape `target_shape ++ source_shape`; only the nonzero
//! weights are stored, one compressed row per target cell.
//!
//! Tensors are built once, either from the 1-based flat [`Coefficient`]s produced by a
//! weight-generation engine or from precomputed multi-index [`WeightEntry`]s, and are then
//! shared read-only by any number of [`Regridder`](crate::regridder::Regridder)s.
//!
//! ```rust
//! use esmregrid_core::weights::{Coefficient, SparseWeightTensor};
//!
//! // Engine indices are 1-based, and entries for the same cell pair accumulate
//! let weights = SparseWeightTensor::from_coefficients(
//!     &[1, 1],
//!     &[1, 1],
//!     &[Coefficient::new(1, 1, 0.5), Coefficient::new(1, 1, 0.5)],
//! )
//! .unwrap();
//! assert_eq!(weights.nnz(), 1);
//! assert_eq!(weights.get(&[0, 0], &[0, 0]), 1.0);
//! ```

use crate::discretization::{check_extents, Discretization};
use crate::errors::{RegridError, RegridResult};
use crate::shape::{ravel_index, shape_size, unravel_engine_index, unravel_index};
use log::{debug, warn};
use ndarray::{Array2, ArrayD, ArrayView2, IxDyn};
use serde::{Deserialize, Serialize};

/// Tolerance on a target cell's total weight before it is reported as over-covered
const WEIGHT_BUDGET_TOLERANCE: f64 = 1e-6;

/// A single weight as reported by a weight-generation engine
///
/// `target` and `source` are 1-based flat cell indices in the engine's cell order,
/// where the first axis of the natural shape varies fastest.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coefficient {
    pub target: usize,
    pub source: usize,
    pub weight: f64,
}

impl Coefficient {
    pub fn new(target: usize, source: usize, weight: f64) -> Self {
        Self {
            target,
            source,
            weight,
        }
    }
}

/// A single weight addressed by per-axis cell indices
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
    pub target: Vec<usize>,
    pub source: Vec<usize>,
    pub weight: f64,
}

impl WeightEntry {
    pub fn new(target: Vec<usize>, source: Vec<usize>, weight: f64) -> Self {
        Self {
            target,
            source,
            weight,
        }
    }
}

/// Immutable sparse tensor of shape `target_shape ++ source_shape`
///
/// Rows are target cells and columns are source cells, both addressed by their row-major
/// offset into the natural shape. Duplicate cell pairs are summed on construction.
///
/// Deserialisation re-checks the compressed structure, so a tensor read from disk upholds
/// the same invariants as one built from coefficients.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSparseWeightTensor")]
pub struct SparseWeightTensor {
    target_shape: Vec<usize>,
    source_shape: Vec<usize>,
    /// Start of each target row in `indices`/`values`, length `target_size + 1`
    indptr: Vec<usize>,
    /// Source offsets, sorted within each row
    indices: Vec<usize>,
    values: Vec<f64>,
}

/// Serialised layout of a [`SparseWeightTensor`], validated before use
#[derive(Deserialize)]
struct RawSparseWeightTensor {
    target_shape: Vec<usize>,
    source_shape: Vec<usize>,
    indptr: Vec<usize>,
    indices: Vec<usize>,
    values: Vec<f64>,
}

impl TryFrom<RawSparseWeightTensor> for SparseWeightTensor {
    type Error = RegridError;

    fn try_from(raw: RawSparseWeightTensor) -> Result<Self, Self::Error> {
        let tensor = Self {
            target_shape: raw.target_shape,
            source_shape: raw.source_shape,
            indptr: raw.indptr,
            indices: raw.indices,
            values: raw.values,
        };
        tensor.check_structure()?;
        Ok(tensor)
    }
}

impl SparseWeightTensor {
    /// Build a tensor from the flat coefficients of a weight-generation engine
    ///
    /// Each 1-based index is converted to a multi-index by unravelling it against the
    /// reversed natural shape, which is the cell order used by the engine.
    ///
    /// # Errors
    ///
    /// * [`RegridError::Shape`] if either shape has an empty axis
    /// * [`RegridError::InvalidIndex`] if an index is 0 or beyond the number of cells
    /// * [`RegridError::InvalidWeight`] if a weight is negative or not finite
    pub fn from_coefficients(
        target_shape: &[usize],
        source_shape: &[usize],
        coefficients: &[Coefficient],
    ) -> RegridResult<Self> {
        Self::from_coefficients_with_base(target_shape, source_shape, coefficients, 1, 1)
    }

    /// Build a tensor from flat coefficients whose indices start at the given bases
    ///
    /// [`from_coefficients`](Self::from_coefficients) is the 1-based special case.
    pub fn from_coefficients_with_base(
        target_shape: &[usize],
        source_shape: &[usize],
        coefficients: &[Coefficient],
        target_base: usize,
        source_base: usize,
    ) -> RegridResult<Self> {
        check_extents(target_shape)?;
        check_extents(source_shape)?;

        let triplets = coefficients
            .iter()
            .map(|c| {
                let target = engine_to_offset(c.target, target_base, target_shape)?;
                let source = engine_to_offset(c.source, source_base, source_shape)?;
                Ok((target, source, c.weight))
            })
            .collect::<RegridResult<Vec<_>>>()?;

        Self::assemble(target_shape, source_shape, triplets)
    }

    /// Build a tensor from precomputed per-axis entries
    pub fn from_entries<I>(
        target_shape: &[usize],
        source_shape: &[usize],
        entries: I,
    ) -> RegridResult<Self>
    where
        I: IntoIterator<Item = WeightEntry>,
    {
        check_extents(target_shape)?;
        check_extents(source_shape)?;

        let triplets = entries
            .into_iter()
            .map(|entry| {
                let target = multi_index_to_offset(&entry.target, target_shape)?;
                let source = multi_index_to_offset(&entry.source, source_shape)?;
                Ok((target, source, entry.weight))
            })
            .collect::<RegridResult<Vec<_>>>()?;

        Self::assemble(target_shape, source_shape, triplets)
    }

    fn assemble(
        target_shape: &[usize],
        source_shape: &[usize],
        mut triplets: Vec<(usize, usize, f64)>,
    ) -> RegridResult<Self> {
        if let Some(&(_, _, w)) = triplets.iter().find(|(_, _, w)| !is_valid_weight(*w)) {
            return Err(RegridError::InvalidWeight(w));
        }

        let n_input = triplets.len();
        triplets.sort_by_key(|&(t, s, _)| (t, s));

        let target_size = shape_size(target_shape);
        let mut indptr = vec![0; target_size + 1];
        let mut indices: Vec<usize> = Vec::with_capacity(n_input);
        let mut values: Vec<f64> = Vec::with_capacity(n_input);
        let mut last: Option<(usize, usize)> = None;

        for (t, s, w) in triplets {
            if last == Some((t, s)) {
                if let Some(v) = values.last_mut() {
                    *v += w;
                }
                continue;
            }
            indices.push(s);
            values.push(w);
            indptr[t + 1] += 1;
            last = Some((t, s));
        }
        for t in 0..target_size {
            indptr[t + 1] += indptr[t];
        }

        debug!(
            "Assembled weights {:?} <- {:?}: {} coefficients, {} stored, {} duplicates merged",
            target_shape,
            source_shape,
            n_input,
            values.len(),
            n_input - values.len()
        );

        let tensor = Self {
            target_shape: target_shape.to_vec(),
            source_shape: source_shape.to_vec(),
            indptr,
            indices,
            values,
        };

        let over_covered = tensor
            .row_sums()
            .filter(|sum| *sum > 1.0 + WEIGHT_BUDGET_TOLERANCE)
            .count();
        if over_covered > 0 {
            warn!(
                "{} target cells have a total weight above 1, results will not be area means",
                over_covered
            );
        }

        Ok(tensor)
    }

    /// Full logical shape, `target_shape ++ source_shape`
    pub fn shape(&self) -> Vec<usize> {
        self.target_shape
            .iter()
            .chain(self.source_shape.iter())
            .copied()
            .collect()
    }

    pub fn target_shape(&self) -> &[usize] {
        &self.target_shape
    }

    pub fn source_shape(&self) -> &[usize] {
        &self.source_shape
    }

    pub fn target_size(&self) -> usize {
        self.indptr.len() - 1
    }

    pub fn source_size(&self) -> usize {
        shape_size(&self.source_shape)
    }

    /// Number of stored weights
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Check that the tensor connects the given target and source shapes
    ///
    /// Both the declared shape and the compressed storage behind it are checked.
    pub fn validate_shape(
        &self,
        target_shape: &[usize],
        source_shape: &[usize],
    ) -> RegridResult<()> {
        let expected: Vec<usize> = target_shape
            .iter()
            .chain(source_shape.iter())
            .copied()
            .collect();
        let actual = self.shape();
        if expected != actual {
            return Err(RegridError::Shape { expected, actual });
        }
        self.check_structure()
    }

    /// Check the compressed rows against the declared shapes
    fn check_structure(&self) -> RegridResult<()> {
        check_extents(&self.target_shape)?;
        check_extents(&self.source_shape)?;

        let target_size = shape_size(&self.target_shape);
        let source_size = shape_size(&self.source_shape);
        if self.indptr.len() != target_size + 1 {
            return Err(RegridError::MalformedWeights(format!(
                "{} row pointers for {} target cells",
                self.indptr.len(),
                target_size
            )));
        }
        if self.indices.len() != self.values.len() {
            return Err(RegridError::MalformedWeights(format!(
                "{} source indices for {} values",
                self.indices.len(),
                self.values.len()
            )));
        }
        if self.indptr[0] != 0 || self.indptr[target_size] != self.values.len() {
            return Err(RegridError::MalformedWeights(format!(
                "row pointers span {}..{}, expected 0..{}",
                self.indptr[0],
                self.indptr[target_size],
                self.values.len()
            )));
        }

        for bounds in self.indptr.windows(2) {
            if bounds[0] > bounds[1] {
                return Err(RegridError::MalformedWeights(
                    "row pointers are not sorted".to_string(),
                ));
            }
            let row = &self.indices[bounds[0]..bounds[1]];
            if let Some(&index) = row.iter().find(|s| **s >= source_size) {
                return Err(RegridError::InvalidIndex {
                    index,
                    size: source_size,
                });
            }
            if row.windows(2).any(|pair| pair[0] >= pair[1]) {
                return Err(RegridError::MalformedWeights(
                    "source indices within a row are not strictly increasing".to_string(),
                ));
            }
        }

        if let Some(&w) = self.values.iter().find(|w| !is_valid_weight(**w)) {
            return Err(RegridError::InvalidWeight(w));
        }
        Ok(())
    }

    /// Weight between a target cell and a source cell, zero if not stored
    ///
    /// # Panics
    ///
    /// Panics if either index does not fit the tensor's shape
    pub fn get(&self, target: &[usize], source: &[usize]) -> f64 {
        assert_eq!(target.len(), self.target_shape.len(), "Target index rank mismatch");
        assert_eq!(source.len(), self.source_shape.len(), "Source index rank mismatch");
        let t = ravel_index(target, &self.target_shape);
        let s = ravel_index(source, &self.source_shape);

        let (start, end) = (self.indptr[t], self.indptr[t + 1]);
        match self.indices[start..end].binary_search(&s) {
            Ok(position) => self.values[start + position],
            Err(_) => 0.0,
        }
    }

    /// Iterate over the stored weights as per-axis entries, in row-major target order
    pub fn entries(&self) -> impl Iterator<Item = WeightEntry> + '_ {
        (0..self.target_size()).flat_map(move |t| {
            let target = unravel_index(t, &self.target_shape);
            let (start, end) = (self.indptr[t], self.indptr[t + 1]);
            (start..end).map(move |k| {
                WeightEntry::new(
                    target.clone(),
                    unravel_index(self.indices[k], &self.source_shape),
                    self.values[k],
                )
            })
        })
    }

    /// Total weight received by each target cell, shaped like the target
    pub fn target_weight_sums(&self) -> ArrayD<f64> {
        ArrayD::from_shape_vec(IxDyn(&self.target_shape), self.row_sums().collect())
            .unwrap_or_else(|_| ArrayD::zeros(IxDyn(&self.target_shape)))
    }

    fn row_sums(&self) -> impl Iterator<Item = f64> + '_ {
        self.indptr
            .windows(2)
            .map(move |bounds| self.values[bounds[0]..bounds[1]].iter().sum::<f64>())
    }

    /// Dense copy of the tensor, shaped `target_shape ++ source_shape`
    pub fn to_dense(&self) -> ArrayD<f64> {
        let mut dense = Array2::zeros((self.target_size(), self.source_size()));
        for t in 0..self.target_size() {
            for k in self.indptr[t]..self.indptr[t + 1] {
                dense[[t, self.indices[k]]] += self.values[k];
            }
        }
        let shape = self.shape();
        dense
            .into_shape(IxDyn(&shape))
            .unwrap_or_else(|_| ArrayD::zeros(IxDyn(&shape)))
    }

    /// Contract flattened data `[extra_size, source_size]` over the source axes
    ///
    /// Returns `[extra_size, target_size]`, the flattened form of a tensor dot product
    /// between the data's trailing source axes and the tensor's source axes.
    pub fn contract(&self, data: ArrayView2<'_, f64>) -> RegridResult<Array2<f64>> {
        let source_size = self.source_size();
        if data.ncols() != source_size {
            return Err(RegridError::shape(&[data.nrows(), source_size], data.shape()));
        }

        let mut result = Array2::zeros((data.nrows(), self.target_size()));
        for (row, mut out) in data.outer_iter().zip(result.outer_iter_mut()) {
            for (t, slot) in out.iter_mut().enumerate() {
                let (start, end) = (self.indptr[t], self.indptr[t + 1]);
                *slot = self.indices[start..end]
                    .iter()
                    .zip(&self.values[start..end])
                    .map(|(&s, &w)| w * row[s])
                    .sum();
            }
        }
        Ok(result)
    }
}

fn is_valid_weight(weight: f64) -> bool {
    weight.is_finite() && weight >= 0.0
}

fn engine_to_offset(index: usize, base: usize, shape: &[usize]) -> RegridResult<usize> {
    let size = shape_size(shape);
    if index < base || index - base >= size {
        return Err(RegridError::InvalidIndex { index, size });
    }
    Ok(ravel_index(&unravel_engine_index(index - base, shape), shape))
}

fn multi_index_to_offset(index: &[usize], shape: &[usize]) -> RegridResult<usize> {
    if index.len() != shape.len() {
        return Err(RegridError::shape(shape, index));
    }
    if let Some((i, n)) = index.iter().zip(shape.iter()).find(|(i, n)| *i >= *n) {
        return Err(RegridError::InvalidIndex {
            index: *i,
            size: *n,
        });
    }
    Ok(ravel_index(index, shape))
}

/// Source of regridding coefficients
///
/// Implemented at the boundary with a geometry engine, which computes the overlap
/// between the cells of two discretizations and reports them as 1-based [`Coefficient`]s.
pub trait WeightGenerator {
    fn generate(
        &self,
        source: &dyn Discretization,
        target: &dyn Discretization,
    ) -> RegridResult<Vec<Coefficient>>;
}

/// A fixed list of coefficients computed ahead of time for one pair of shapes
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoefficientTable {
    source_shape: Vec<usize>,
    target_shape: Vec<usize>,
    coefficients: Vec<Coefficient>,
}

impl CoefficientTable {
    pub fn new(
        source_shape: Vec<usize>,
        target_shape: Vec<usize>,
        coefficients: Vec<Coefficient>,
    ) -> Self {
        Self {
            source_shape,
            target_shape,
            coefficients,
        }
    }

    pub fn coefficients(&self) -> &[Coefficient] {
        &self.coefficients
    }
}

impl WeightGenerator for CoefficientTable {
    fn generate(
        &self,
        source: &dyn Discretization,
        target: &dyn Discretization,
    ) -> RegridResult<Vec<Coefficient>> {
        if source.shape() != self.source_shape {
            return Err(RegridError::shape(&self.source_shape, &source.shape()));
        }
        if target.shape() != self.target_shape {
            return Err(RegridError::shape(&self.target_shape, &target.shape()));
        }
        Ok(self.coefficients.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discretization::{GridInfo, MeshInfo};
    use ndarray::array;

    #[test]
    fn duplicates_accumulate() {
        let weights = SparseWeightTensor::from_coefficients(
            &[1, 1],
            &[1, 1],
            &[Coefficient::new(1, 1, 0.5), Coefficient::new(1, 1, 0.5)],
        )
        .unwrap();
        assert_eq!(weights.nnz(), 1);
        assert_eq!(weights.shape(), vec![1, 1, 1, 1]);
        assert_eq!(weights.get(&[0, 0], &[0, 0]), 1.0);
    }

    #[test]
    fn coefficients_use_engine_order() {
        // Source grid (2, 3): engine index 2 is (1, 0), index 3 is (0, 1)
        let weights = SparseWeightTensor::from_coefficients(
            &[3],
            &[2, 3],
            &[Coefficient::new(1, 2, 0.25), Coefficient::new(3, 3, 0.75)],
        )
        .unwrap();
        assert_eq!(weights.get(&[0], &[1, 0]), 0.25);
        assert_eq!(weights.get(&[2], &[0, 1]), 0.75);
        assert_eq!(weights.get(&[0], &[0, 1]), 0.0);
    }

    #[test]
    fn invalid_indices_rejected() {
        let zero =
            SparseWeightTensor::from_coefficients(&[2], &[2], &[Coefficient::new(0, 1, 1.0)]);
        assert_eq!(zero, Err(RegridError::InvalidIndex { index: 0, size: 2 }));

        let beyond =
            SparseWeightTensor::from_coefficients(&[2], &[2], &[Coefficient::new(1, 3, 1.0)]);
        assert_eq!(beyond, Err(RegridError::InvalidIndex { index: 3, size: 2 }));

        let entry = SparseWeightTensor::from_entries(
            &[2],
            &[2, 2],
            vec![WeightEntry::new(vec![0], vec![0, 2], 1.0)],
        );
        assert_eq!(entry, Err(RegridError::InvalidIndex { index: 2, size: 2 }));
    }

    #[test]
    fn invalid_weights_rejected() {
        let negative =
            SparseWeightTensor::from_coefficients(&[1], &[1], &[Coefficient::new(1, 1, -0.1)]);
        assert_eq!(negative, Err(RegridError::InvalidWeight(-0.1)));

        let nan =
            SparseWeightTensor::from_coefficients(&[1], &[1], &[Coefficient::new(1, 1, f64::NAN)]);
        assert!(matches!(nan, Err(RegridError::InvalidWeight(_))));
    }

    #[test]
    fn validate_shape_names_both_shapes() {
        let weights = SparseWeightTensor::from_entries(&[3, 2], &[2, 3], vec![]).unwrap();
        assert!(weights.validate_shape(&[3, 2], &[2, 3]).is_ok());
        assert_eq!(
            weights.validate_shape(&[2, 3], &[3, 2]),
            Err(RegridError::Shape {
                expected: vec![2, 3, 3, 2],
                actual: vec![3, 2, 2, 3]
            })
        );
    }

    #[test]
    fn contract_matches_dense_product() {
        let weights = SparseWeightTensor::from_entries(
            &[2],
            &[3],
            vec![
                WeightEntry::new(vec![0], vec![0], 0.5),
                WeightEntry::new(vec![0], vec![1], 0.5),
                WeightEntry::new(vec![1], vec![2], 1.0),
            ],
        )
        .unwrap();
        let data = array![[2.0, 4.0, 8.0], [1.0, 1.0, 1.0]];
        let result = weights.contract(data.view()).unwrap();
        assert_eq!(result, array![[3.0, 8.0], [1.0, 1.0]]);

        assert_eq!(
            weights.to_dense(),
            array![[0.5, 0.5, 0.0], [0.0, 0.0, 1.0]].into_dyn()
        );
        assert_eq!(weights.target_weight_sums(), array![1.0, 1.0].into_dyn());
        assert!(weights.contract(array![[1.0, 2.0]].view()).is_err());
    }

    #[test]
    fn entries_roundtrip() {
        let entries = vec![
            WeightEntry::new(vec![1, 0], vec![0], 0.3),
            WeightEntry::new(vec![0, 1], vec![1], 0.7),
        ];
        let weights = SparseWeightTensor::from_entries(&[2, 2], &[2], entries).unwrap();
        let listed: Vec<WeightEntry> = weights.entries().collect();
        assert_eq!(
            listed,
            vec![
                WeightEntry::new(vec![0, 1], vec![1], 0.7),
                WeightEntry::new(vec![1, 0], vec![0], 0.3),
            ]
        );
    }

    #[test]
    fn empty_rows_are_allowed() {
        let weights = SparseWeightTensor::from_entries(&[3], &[1], vec![]).unwrap();
        assert_eq!(weights.nnz(), 0);
        assert_eq!(weights.target_size(), 3);
        assert_eq!(weights.target_weight_sums(), array![0.0, 0.0, 0.0].into_dyn());
    }

    #[test]
    fn coefficient_table_checks_shapes() {
        let table = CoefficientTable::new(vec![2, 2], vec![3], vec![Coefficient::new(1, 1, 1.0)]);
        let grid = GridInfo::new(2, 2).unwrap();
        let mesh = MeshInfo::new(3, 0).unwrap();

        assert_eq!(table.generate(&grid, &mesh).unwrap().len(), 1);
        assert!(matches!(
            table.generate(&mesh, &grid),
            Err(RegridError::Shape { .. })
        ));
    }

    #[test]
    fn zero_based_coefficients() {
        let weights = SparseWeightTensor::from_coefficients_with_base(
            &[2],
            &[2, 2],
            &[Coefficient::new(0, 1, 0.5), Coefficient::new(1, 3, 1.0)],
            0,
            0,
        )
        .unwrap();
        assert_eq!(weights.get(&[0], &[1, 0]), 0.5);
        assert_eq!(weights.get(&[1], &[1, 1]), 1.0);

        let beyond = SparseWeightTensor::from_coefficients_with_base(
            &[2],
            &[2],
            &[Coefficient::new(2, 0, 1.0)],
            0,
            0,
        );
        assert_eq!(beyond, Err(RegridError::InvalidIndex { index: 2, size: 2 }));
    }

    #[test]
    fn malformed_serialised_tensors_rejected() {
        // Out of range source index and a negative weight
        let out_of_range = concat!(
            r#"{"target_shape":[2],"source_shape":[2],"#,
            r#""indptr":[0,1,1],"indices":[7],"values":[-3.0]}"#
        );
        let err = serde_json::from_str::<SparseWeightTensor>(out_of_range).unwrap_err();
        assert!(err.to_string().contains("Coefficient index 7"), "{}", err);

        let negative = concat!(
            r#"{"target_shape":[2],"source_shape":[2],"#,
            r#""indptr":[0,1,1],"indices":[1],"values":[-3.0]}"#
        );
        let err = serde_json::from_str::<SparseWeightTensor>(negative).unwrap_err();
        assert!(err.to_string().contains("nonnegative"), "{}", err);

        let short_indptr = concat!(
            r#"{"target_shape":[2],"source_shape":[2],"#,
            r#""indptr":[0,1],"indices":[0],"values":[1.0]}"#
        );
        assert!(serde_json::from_str::<SparseWeightTensor>(short_indptr).is_err());

        let unsorted = concat!(
            r#"{"target_shape":[1],"source_shape":[3],"#,
            r#""indptr":[0,2],"indices":[2,0],"values":[0.5,0.5]}"#
        );
        assert!(serde_json::from_str::<SparseWeightTensor>(unsorted).is_err());

        let dangling = concat!(
            r#"{"target_shape":[2],"source_shape":[2],"#,
            r#""indptr":[0,1,3],"indices":[0],"values":[1.0]}"#
        );
        assert!(serde_json::from_str::<SparseWeightTensor>(dangling).is_err());
    }

    #[test]
    fn serde_roundtrip() {
        let weights = SparseWeightTensor::from_coefficients(
            &[2],
            &[2],
            &[Coefficient::new(1, 2, 0.5), Coefficient::new(2, 1, 1.0)],
        )
        .unwrap();
        let serialised = serde_json::to_string(&weights).unwrap();
        let deserialised: SparseWeightTensor = serde_json::from_str(&serialised).unwrap();
        assert_eq!(weights, deserialised);
    }
}
