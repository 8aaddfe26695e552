//! End-to-end regridding scenarios.
//!
//! These tests use the weights between a (2, 3) source grid and a (3, 2) target grid as
//! produced by a conservative weight-generation engine, and check:
//! - values and masks for masked and unmasked data
//! - both normalisations
//! - monotonicity of masking in the missing data tolerance

use approx::assert_abs_diff_eq;
use esmregrid_core::engine::NormType;
use esmregrid_core::errors::RegridError;
use esmregrid_core::masked::MaskedArray;
use esmregrid_core::regridder::Regridder;
use esmregrid_core::shape::ravel_engine_index;
use esmregrid_core::weights::{Coefficient, SparseWeightTensor, WeightEntry};
use ndarray::{array, stack, ArrayD, Axis};
use std::sync::Arc;

const SOURCE_SHAPE: [usize; 2] = [2, 3];
const TARGET_SHAPE: [usize; 2] = [3, 2];

/// (source, target, weight) for every overlapping pair of cells
fn overlaps() -> Vec<([usize; 2], [usize; 2], f64)> {
    vec![
        ([0, 0], [0, 0], 0.6674194025656819),
        ([0, 0], [1, 0], 0.33363933739884066),
        ([0, 1], [0, 0], 0.3325805974343169),
        ([0, 1], [0, 1], 0.3351257294386341),
        ([0, 1], [1, 0], 0.1663606626011589),
        ([0, 1], [1, 1], 0.16742273275056854),
        ([0, 2], [0, 1], 0.6648742705613656),
        ([0, 2], [1, 1], 0.33250863479149745),
        ([1, 0], [1, 0], 0.333639337398841),
        ([1, 0], [2, 0], 0.6674194025656823),
        ([1, 1], [1, 0], 0.1663606626011591),
        ([1, 1], [1, 1], 0.16742273275056876),
        ([1, 1], [2, 0], 0.3325805974343174),
        ([1, 1], [2, 1], 0.3351257294386344),
        ([1, 2], [1, 1], 0.33250863479149767),
        ([1, 2], [2, 1], 0.6648742705613663),
    ]
}

fn expected_weights() -> SparseWeightTensor {
    let entries = overlaps()
        .into_iter()
        .map(|(source, target, weight)| WeightEntry::new(target.to_vec(), source.to_vec(), weight));
    SparseWeightTensor::from_entries(&TARGET_SHAPE, &SOURCE_SHAPE, entries).unwrap()
}

/// The same overlaps with each target cell's weights rescaled to sum to 1
///
/// The engine's weights fall slightly short of 1 for some target cells.
fn unit_weights() -> SparseWeightTensor {
    let sums = expected_weights().target_weight_sums();
    let entries = expected_weights()
        .entries()
        .map(|entry| {
            let sum = sums[entry.target.as_slice()];
            WeightEntry::new(entry.target, entry.source, entry.weight / sum)
        })
        .collect::<Vec<_>>();
    SparseWeightTensor::from_entries(&TARGET_SHAPE, &SOURCE_SHAPE, entries).unwrap()
}

fn regridder() -> Regridder {
    Regridder::with_precomputed_weights(&SOURCE_SHAPE, &TARGET_SHAPE, Arc::new(expected_weights()))
        .unwrap()
}

fn unit_regridder() -> Regridder {
    Regridder::with_precomputed_weights(&SOURCE_SHAPE, &TARGET_SHAPE, Arc::new(unit_weights()))
        .unwrap()
}

fn source_values() -> ArrayD<f64> {
    array![[1.0, 1.0, 1.0], [1.0, 0.0, 0.0]].into_dyn()
}

fn source_masked() -> MaskedArray {
    MaskedArray::new(
        source_values(),
        array![[true, false, false], [false, false, false]].into_dyn(),
    )
    .unwrap()
}

fn assert_data_eq(actual: &MaskedArray, expected: &ArrayD<f64>) {
    assert_eq!(actual.shape(), expected.shape());
    for (a, e) in actual.data().iter().zip(expected.iter()) {
        assert_abs_diff_eq!(*a, *e, epsilon = 1e-12);
    }
}

#[test]
fn weights_from_engine_coefficients() {
    // The engine numbers cells with the first axis varying fastest, starting at 1
    let coefficients: Vec<Coefficient> = overlaps()
        .into_iter()
        .map(|(source, target, weight)| {
            Coefficient::new(
                ravel_engine_index(&target, &TARGET_SHAPE) + 1,
                ravel_engine_index(&source, &SOURCE_SHAPE) + 1,
                weight,
            )
        })
        .collect();

    let regridder = Regridder::new(&SOURCE_SHAPE, &TARGET_SHAPE, &coefficients).unwrap();
    assert_eq!(regridder.weights().as_ref(), &expected_weights());
    assert_eq!(regridder.weights().shape(), vec![3, 2, 2, 3]);
    assert_eq!(regridder.weights().nnz(), 16);
}

#[test]
fn regrid_unmasked() {
    let result = regridder()
        .regrid(&MaskedArray::from_data(source_values()), NormType::FracArea, 1.0)
        .unwrap();
    let expected = array![
        [1.0, 1.0],
        [0.8336393373988409, 0.4999999999999997],
        [0.6674194025656824, 0.0]
    ]
    .into_dyn();
    assert_data_eq(&result, &expected);
    assert_eq!(result.count_masked(), 0);
}

#[test]
fn regrid_with_masked_point() {
    let result = regridder()
        .regrid_str(&source_masked(), "fracarea", 1.0)
        .unwrap();
    let expected = array![
        [0.9999999999999999, 1.0],
        [0.7503444126612077, 0.4999999999999997],
        [0.6674194025656824, 0.0]
    ]
    .into_dyn();
    assert_data_eq(&result, &expected);
    assert_eq!(result.count_masked(), 0);
}

#[test]
fn regrid_with_half_mdtol() {
    let result = regridder()
        .regrid(&source_masked(), NormType::FracArea, 0.5)
        .unwrap();

    // Only the first target cell has less than half of its area covered by valid data
    assert_eq!(
        result.mask(),
        array![[true, false], [false, false], [false, false]].into_dyn()
    );
    assert_abs_diff_eq!(result.data()[[1, 0]], 0.7503444126612077, epsilon = 1e-12);
    assert_abs_diff_eq!(result.data()[[2, 0]], 0.6674194025656824, epsilon = 1e-12);
}

#[test]
fn regrid_dstarea() {
    let result = regridder()
        .regrid_str(&source_masked(), "dstarea", 1.0)
        .unwrap();
    let expected = array![
        [0.3325805974343169, 0.9999999999999998],
        [0.4999999999999999, 0.499931367542066],
        [0.6674194025656823, 0.0]
    ]
    .into_dyn();
    assert_data_eq(&result, &expected);
    assert_eq!(result.count_masked(), 0);
}

#[test]
fn regrid_fully_masked() {
    let regridder = regridder();
    let data = MaskedArray::fully_masked(source_values());

    for mdtol in [0.0, 0.5, 0.99, 1.0] {
        let result = regridder.regrid(&data, NormType::FracArea, mdtol).unwrap();
        assert!(result.is_fully_masked(), "mdtol={}", mdtol);
        assert!(result.data().iter().all(|v| *v == 0.0));
    }
}

#[test]
fn engine_weights_fall_short_of_one() {
    let sums = expected_weights().target_weight_sums();
    assert!(sums[[1, 1]] < 1.0 - 1e-8);
    assert_abs_diff_eq!(sums[[1, 1]], 0.999863, epsilon = 1e-6);

    // So a strict tolerance masks that cell even without missing data
    let result = regridder()
        .regrid(&MaskedArray::from_data(source_values()), NormType::FracArea, 0.0)
        .unwrap();
    assert_eq!(
        result.mask(),
        array![[false, false], [false, true], [false, false]].into_dyn()
    );
}

#[test]
fn full_coverage_never_masks() {
    let regridder = unit_regridder();
    for sum in unit_weights().target_weight_sums().iter() {
        assert_abs_diff_eq!(*sum, 1.0, epsilon = 1e-12);
    }
    let data = MaskedArray::from_data(source_values());

    for mdtol in [0.0, 1e-9, 0.25, 0.5, 1.0] {
        for norm_type in [NormType::FracArea, NormType::DstArea] {
            let result = regridder.regrid(&data, norm_type, mdtol).unwrap();
            assert_eq!(result.count_masked(), 0, "mdtol={} {}", mdtol, norm_type);
        }
    }
}

#[test]
fn normalisations_agree_without_mask() {
    let regridder = unit_regridder();
    let data = MaskedArray::from_data(array![[2.0, -1.0, 4.0], [0.5, 3.0, 7.0]].into_dyn());

    let fracarea = regridder.regrid(&data, NormType::FracArea, 0.0).unwrap();
    let dstarea = regridder.regrid(&data, NormType::DstArea, 0.0).unwrap();
    for (a, b) in fracarea.data().iter().zip(dstarea.data().iter()) {
        assert_abs_diff_eq!(*a, *b, epsilon = 1e-12);
    }
}

#[test]
fn masking_is_monotonic_in_mdtol() {
    let regridder = regridder();
    let data = MaskedArray::new(
        source_values(),
        array![[true, false, true], [false, true, false]].into_dyn(),
    )
    .unwrap();

    let tolerances = [0.0, 0.1, 0.3, 0.5, 0.6, 0.7, 0.9, 1.0];
    let masks: Vec<ArrayD<bool>> = tolerances
        .iter()
        .map(|mdtol| {
            regridder
                .regrid(&data, NormType::FracArea, *mdtol)
                .unwrap()
                .mask()
                .to_owned()
        })
        .collect();

    for pair in masks.windows(2) {
        // Anything masked at the larger tolerance is masked at the smaller one
        for (stricter, looser) in pair[0].iter().zip(pair[1].iter()) {
            assert!(*stricter || !*looser);
        }
    }
    assert!(masks[0].iter().any(|m| *m));
    assert!(masks.last().unwrap().iter().all(|m| !*m));
}

#[test]
fn extra_axes_regrid_independently() {
    let regridder = regridder();
    let masks = [
        array![[true, false, false], [false, false, false]],
        array![[false, false, false], [false, false, false]],
        array![[false, true, true], [true, true, false]],
    ];
    let values = stack(
        Axis(0),
        &[
            source_values().view(),
            (source_values() * 2.0).view(),
            (source_values() + 1.0).view(),
        ],
    )
    .unwrap();
    let mask = stack(Axis(0), &[masks[0].view(), masks[1].view(), masks[2].view()])
        .unwrap()
        .into_dyn();
    let batch = MaskedArray::new(values.clone(), mask.clone()).unwrap();

    let result = regridder.regrid(&batch, NormType::FracArea, 0.5).unwrap();
    assert_eq!(result.shape(), &[3, 3, 2]);

    for i in 0..3 {
        let slice = MaskedArray::new(
            values.index_axis(Axis(0), i).to_owned(),
            mask.index_axis(Axis(0), i).to_owned(),
        )
        .unwrap();
        let single = regridder.regrid(&slice, NormType::FracArea, 0.5).unwrap();
        assert_eq!(result.mask().index_axis(Axis(0), i), single.mask());
        for (a, b) in result
            .data()
            .index_axis(Axis(0), i)
            .iter()
            .zip(single.data().iter())
        {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-12);
        }
    }
}

#[test]
fn invalid_norm_type_leaves_regridder_usable() {
    let regridder = regridder();
    let err = regridder
        .regrid_str(&source_masked(), "INVALID", 1.0)
        .unwrap_err();
    assert_eq!(
        err,
        RegridError::UnsupportedNormalization("INVALID".to_string())
    );
    assert_eq!(
        err.to_string(),
        "Normalisation type \"INVALID\" is not supported"
    );

    let result = regridder.regrid_str(&source_masked(), "FRACAREA", 1.0).unwrap();
    assert_eq!(result.count_masked(), 0);
}

#[test]
fn mismatched_precomputed_weights() {
    let err = Regridder::with_precomputed_weights(
        &TARGET_SHAPE,
        &SOURCE_SHAPE,
        Arc::new(expected_weights()),
    )
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Expected shape [2, 3, 3, 2], got shape [3, 2, 2, 3] instead"
    );
}
