//! Mask propagation and area normalisation
//!
//! Applying conservative weights to masked data is done with two contractions against the
//! same [`SparseWeightTensor`]:
//!
//! 1. the data, with masked entries filled by zero, gives the raw weighted sum of each
//!    target cell;
//! 2. the validity of the data (1 where unmasked, 0 where masked) gives the weight of each
//!    target cell that is actually covered by valid source cells.
//!
//! A target cell is kept when its covered weight is strictly above `1 - mdtol`, with `mdtol`
//! raised to at least [`MDTOL_EPSILON`] so that rounding in fully covered cells never masks
//! them. The raw sums are then normalised according to a [`NormType`].
//!
//! With `mdtol = 1` only target cells with no valid coverage at all are masked, with
//! `mdtol = 0` every target cell that is not entirely covered by valid data is masked.

use crate::errors::{RegridError, RegridResult};
use crate::shape::flatten;
use crate::weights::SparseWeightTensor;
use ndarray::{Array2, ArrayD, ArrayView2, ArrayViewD, IxDyn, Zip};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lower bound applied to `mdtol` to absorb rounding in the weight sums
pub const MDTOL_EPSILON: f64 = 1e-8;

/// How regridded values are normalised
///
/// Parsing from a string is case insensitive, so `"fracarea"` and `"FRACAREA"` are the same.
///
/// ```rust
/// use esmregrid_core::engine::NormType;
///
/// let norm: NormType = "DstArea".parse().unwrap();
/// assert_eq!(norm, NormType::DstArea);
/// assert_eq!(norm.to_string(), "dstarea");
/// assert!("INVALID".parse::<NormType>().is_err());
/// ```
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormType {
    /// Divide by the weight actually covered by valid source data
    ///
    /// Partially covered target cells hold the area mean over their valid part.
    #[default]
    FracArea,
    /// Leave the weighted sums as they are
    ///
    /// Values are area integrals over the full destination cell, appropriate when the
    /// weights already carry the destination-area normalisation.
    DstArea,
}

impl FromStr for NormType {
    type Err = RegridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fracarea" => Ok(NormType::FracArea),
            "dstarea" => Ok(NormType::DstArea),
            _ => Err(RegridError::UnsupportedNormalization(s.to_string())),
        }
    }
}

impl fmt::Display for NormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormType::FracArea => write!(f, "fracarea"),
            NormType::DstArea => write!(f, "dstarea"),
        }
    }
}

/// Whether a target cell with the given valid weight survives `mdtol`
pub fn is_covered(weight_sum: f64, mdtol: f64) -> bool {
    weight_sum > 1.0 - mdtol.max(MDTOL_EPSILON)
}

/// Regridded values and mask in flattened `[extra_size, target_size]` form
#[derive(Clone, Debug, PartialEq)]
pub struct FlatRegridded {
    pub data: Array2<f64>,
    pub mask: Array2<bool>,
}

/// Apply weights to flattened `[extra_size, source_size]` arrays
///
/// `filled` is the data with missing entries replaced by zero and `valid` holds 1.0 where
/// the data is usable and 0.0 where it is missing, as produced by
/// [`MaskedArray::filled`](crate::masked::MaskedArray::filled) and
/// [`MaskedArray::valid`](crate::masked::MaskedArray::valid).
///
/// Returns the normalised values and the propagated target mask. Values under the target
/// mask are deterministic (zero where no valid source cell contributes) but carry no meaning.
pub fn apply_weights(
    weights: &SparseWeightTensor,
    filled: ArrayView2<'_, f64>,
    valid: ArrayView2<'_, f64>,
    norm_type: NormType,
    mdtol: f64,
) -> RegridResult<FlatRegridded> {
    if filled.shape() != valid.shape() {
        return Err(RegridError::shape(filled.shape(), valid.shape()));
    }

    let weight_sums = weights.contract(valid)?;
    let mut result = weights.contract(filled)?;

    let target_mask = weight_sums.mapv(|weight_sum| !is_covered(weight_sum, mdtol));

    match norm_type {
        NormType::FracArea => {
            Zip::from(&mut result)
                .and(&weight_sums)
                .for_each(|value, &weight_sum| {
                    if weight_sum != 0.0 {
                        *value /= weight_sum;
                    }
                });
        }
        NormType::DstArea => {}
    }

    Ok(FlatRegridded {
        data: result,
        mask: target_mask,
    })
}

/// Collapse an N-D mask onto its horizontal footprint
///
/// The mask must be identical for every combination of the leading axes, otherwise
/// [`RegridError::NonConstantMask`] is returned. A mask with no leading entries at all
/// collapses to an unmasked footprint.
pub fn footprint_mask(
    mask: ArrayViewD<'_, bool>,
    footprint_shape: &[usize],
) -> RegridResult<ArrayD<bool>> {
    let (flat, _) = flatten(mask, footprint_shape)?;

    let footprint: Vec<bool> = match flat.outer_iter().next() {
        Some(first) => {
            if flat.outer_iter().any(|row| row != first) {
                return Err(RegridError::NonConstantMask);
            }
            first.to_vec()
        }
        None => vec![false; flat.ncols()],
    };

    ArrayD::from_shape_vec(IxDyn(footprint_shape), footprint)
        .map_err(|_| RegridError::shape(footprint_shape, flat.shape()))
}
