//! Masked arrays passed into and out of a regridder

use crate::errors::{RegridError, RegridResult};
use ndarray::{ArrayD, ArrayViewD};
use serde::{Deserialize, Serialize};

/// Numeric payload with a boolean mask of the same shape
///
/// A `true` mask entry marks the value as missing. Payload values under the mask are
/// not meaningful and should not be relied upon.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMaskedArray")]
pub struct MaskedArray {
    data: ArrayD<f64>,
    mask: ArrayD<bool>,
}

#[derive(Deserialize)]
struct RawMaskedArray {
    data: ArrayD<f64>,
    mask: ArrayD<bool>,
}

impl TryFrom<RawMaskedArray> for MaskedArray {
    type Error = RegridError;

    fn try_from(raw: RawMaskedArray) -> Result<Self, Self::Error> {
        Self::new(raw.data, raw.mask)
    }
}

impl MaskedArray {
    /// Pair data with a mask
    ///
    /// Fails with [`RegridError::Shape`] if the shapes differ.
    pub fn new(data: ArrayD<f64>, mask: ArrayD<bool>) -> RegridResult<Self> {
        if data.shape() != mask.shape() {
            return Err(RegridError::shape(data.shape(), mask.shape()));
        }
        Ok(Self { data, mask })
    }

    /// Wrap data with nothing masked
    pub fn from_data(data: ArrayD<f64>) -> Self {
        let mask = ArrayD::from_elem(data.raw_dim(), false);
        Self { data, mask }
    }

    /// Wrap data with everything masked
    pub fn fully_masked(data: ArrayD<f64>) -> Self {
        let mask = ArrayD::from_elem(data.raw_dim(), true);
        Self { data, mask }
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn data(&self) -> ArrayViewD<'_, f64> {
        self.data.view()
    }

    pub fn mask(&self) -> ArrayViewD<'_, bool> {
        self.mask.view()
    }

    pub fn into_parts(self) -> (ArrayD<f64>, ArrayD<bool>) {
        (self.data, self.mask)
    }

    /// Copy of the data with masked entries replaced by `fill`
    pub fn filled(&self, fill: f64) -> ArrayD<f64> {
        let mut filled = self.data.clone();
        filled.zip_mut_with(&self.mask, |value, &masked| {
            if masked {
                *value = fill;
            }
        });
        filled
    }

    /// Mask complement as weights: 1.0 where the value is usable, 0.0 where missing
    pub fn valid(&self) -> ArrayD<f64> {
        self.mask.mapv(|masked| if masked { 0.0 } else { 1.0 })
    }

    pub fn count_masked(&self) -> usize {
        self.mask.iter().filter(|masked| **masked).count()
    }

    pub fn is_fully_masked(&self) -> bool {
        self.mask.iter().all(|masked| *masked)
    }

    /// Mask a further set of entries, broadcasting `extra_mask` over the leading axes
    pub fn mask_with(&self, extra_mask: ArrayViewD<'_, bool>) -> RegridResult<Self> {
        let broadcast = extra_mask
            .broadcast(self.mask.raw_dim())
            .ok_or_else(|| RegridError::shape(self.shape(), extra_mask.shape()))?;
        let mut mask = self.mask.clone();
        mask.zip_mut_with(&broadcast, |masked, &extra| *masked |= extra);
        Ok(Self {
            data: self.data.clone(),
            mask,
        })
    }
}
