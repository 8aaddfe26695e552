//! Area-weighted regridding scheme
//!
//! [`AreaWeighted`] is the user-facing entry point: it holds the missing data tolerance and
//! normalisation chosen by the user, validates them once, and produces
//! [`AreaWeightedRegridder`]s for pairs of discretizations.
//! The regridders add two things on top of a bare [`Regridder`]:
//!
//! - optional fixed source and target masks, applied to every field
//! - regridding along arbitrary axes of a field rather than only the trailing ones
//!
//! Schemes can be configured from TOML:
//!
//! ```rust
//! use esmregrid_core::engine::NormType;
//! use esmregrid_core::scheme::{AreaWeighted, SchemeConfig};
//!
//! let config = SchemeConfig::from_toml_str(
//!     r#"
//!     mdtol = 0.5
//!     norm_type = "DSTAREA"
//!     "#,
//! )
//! .unwrap();
//! let scheme = AreaWeighted::from_config(&config).unwrap();
//! assert_eq!(scheme.mdtol(), 0.5);
//! assert_eq!(scheme.norm_type(), NormType::DstArea);
//! assert_eq!(scheme.to_string(), "AreaWeighted(mdtol=0.5)");
//! ```

use crate::discretization::Discretization;
use crate::engine::{footprint_mask, NormType};
use crate::errors::{RegridError, RegridResult};
use crate::masked::MaskedArray;
use crate::regridder::Regridder;
use crate::shape::{move_axes_to_end, place_trailing_axes, split_shape};
use crate::weights::WeightGenerator;
use ndarray::ArrayD;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Check that a missing data tolerance lies in `[0, 1]`
pub fn validate_mdtol(mdtol: f64) -> RegridResult<f64> {
    if (0.0..=1.0).contains(&mdtol) {
        Ok(mdtol)
    } else {
        Err(RegridError::MdtolOutOfRange(mdtol))
    }
}

fn default_norm_type() -> String {
    NormType::default().to_string()
}

/// Serialised form of an [`AreaWeighted`] scheme
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SchemeConfig {
    /// Missing data tolerance, 0 when omitted
    #[serde(default)]
    pub mdtol: f64,
    /// Name of the normalisation, matched case insensitively
    #[serde(default = "default_norm_type")]
    pub norm_type: String,
    /// Whether regridders take their source mask from sample data
    #[serde(default)]
    pub use_src_mask: bool,
    /// Whether regridders take their target mask from sample data
    #[serde(default)]
    pub use_tgt_mask: bool,
}

impl Default for SchemeConfig {
    fn default() -> Self {
        Self {
            mdtol: 0.0,
            norm_type: default_norm_type(),
            use_src_mask: false,
            use_tgt_mask: false,
        }
    }
}

impl SchemeConfig {
    pub fn from_toml_str(content: &str) -> RegridResult<Self> {
        toml::from_str(content).map_err(|e| RegridError::Config(e.to_string()))
    }
}

/// Conservative area-weighted regridding scheme
///
/// The tolerance is validated on construction, so every regridder made from a scheme
/// has a tolerance in `[0, 1]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AreaWeighted {
    mdtol: f64,
    norm_type: NormType,
    use_src_mask: bool,
    use_tgt_mask: bool,
}

impl Default for AreaWeighted {
    fn default() -> Self {
        Self {
            mdtol: 0.0,
            norm_type: NormType::FracArea,
            use_src_mask: false,
            use_tgt_mask: false,
        }
    }
}

impl fmt::Display for AreaWeighted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AreaWeighted(mdtol={})", self.mdtol)
    }
}

impl AreaWeighted {
    /// Create a scheme with the given missing data tolerance
    ///
    /// # Errors
    ///
    /// [`RegridError::MdtolOutOfRange`] unless `0 <= mdtol <= 1`
    pub fn new(mdtol: f64) -> RegridResult<Self> {
        Ok(Self {
            mdtol: validate_mdtol(mdtol)?,
            ..Self::default()
        })
    }

    pub fn from_config(config: &SchemeConfig) -> RegridResult<Self> {
        Ok(Self::new(config.mdtol)?
            .with_norm_type(config.norm_type.parse()?)
            .with_src_mask(config.use_src_mask)
            .with_tgt_mask(config.use_tgt_mask))
    }

    pub fn with_norm_type(mut self, norm_type: NormType) -> Self {
        self.norm_type = norm_type;
        self
    }

    /// Take the source mask from sample data in [`regridder_masked_by`](Self::regridder_masked_by)
    pub fn with_src_mask(mut self, use_src_mask: bool) -> Self {
        self.use_src_mask = use_src_mask;
        self
    }

    /// Take the target mask from sample data in [`regridder_masked_by`](Self::regridder_masked_by)
    pub fn with_tgt_mask(mut self, use_tgt_mask: bool) -> Self {
        self.use_tgt_mask = use_tgt_mask;
        self
    }

    pub fn mdtol(&self) -> f64 {
        self.mdtol
    }

    pub fn norm_type(&self) -> NormType {
        self.norm_type
    }

    pub fn uses_src_mask(&self) -> bool {
        self.use_src_mask
    }

    pub fn uses_tgt_mask(&self) -> bool {
        self.use_tgt_mask
    }

    /// Create a regridder between two discretizations
    pub fn regridder(
        &self,
        source: &dyn Discretization,
        target: &dyn Discretization,
        generator: &dyn WeightGenerator,
    ) -> RegridResult<AreaWeightedRegridder> {
        let regridder = Regridder::from_generator(source, target, generator)?;
        Ok(self.bind(regridder))
    }

    /// Create a regridder whose fixed masks are taken from sample fields
    ///
    /// `source_sample` lives on `source` and `target_sample` on `target`. Each sample's mask
    /// must be constant across its leading axes. A sample is only read when the matching
    /// [`with_src_mask`](Self::with_src_mask) or [`with_tgt_mask`](Self::with_tgt_mask)
    /// option is set; with neither this is the same as [`regridder`](Self::regridder).
    pub fn regridder_masked_by(
        &self,
        source_sample: Option<&MaskedArray>,
        target_sample: Option<&MaskedArray>,
        source: &dyn Discretization,
        target: &dyn Discretization,
        generator: &dyn WeightGenerator,
    ) -> RegridResult<AreaWeightedRegridder> {
        let mut regridder = self.regridder(source, target, generator)?;
        if let (true, Some(sample)) = (self.use_src_mask, source_sample) {
            let mask = footprint_mask(sample.mask(), &source.shape())?;
            regridder = regridder.with_src_mask(mask)?;
        }
        if let (true, Some(sample)) = (self.use_tgt_mask, target_sample) {
            let mask = footprint_mask(sample.mask(), &target.shape())?;
            regridder = regridder.with_tgt_mask(mask)?;
        }
        Ok(regridder)
    }

    /// Use this scheme's settings with an existing regridder
    pub fn bind(&self, regridder: Regridder) -> AreaWeightedRegridder {
        AreaWeightedRegridder {
            regridder,
            mdtol: self.mdtol,
            norm_type: self.norm_type,
            src_mask: None,
            tgt_mask: None,
        }
    }
}

/// Regridder with a validated tolerance, a normalisation and optional fixed masks
#[derive(Clone, Debug, PartialEq)]
pub struct AreaWeightedRegridder {
    regridder: Regridder,
    mdtol: f64,
    norm_type: NormType,
    src_mask: Option<ArrayD<bool>>,
    tgt_mask: Option<ArrayD<bool>>,
}

impl AreaWeightedRegridder {
    pub fn new(regridder: Regridder, mdtol: f64, norm_type: NormType) -> RegridResult<Self> {
        Ok(Self {
            regridder,
            mdtol: validate_mdtol(mdtol)?,
            norm_type,
            src_mask: None,
            tgt_mask: None,
        })
    }

    /// Mask these source cells in every field, in addition to the field's own mask
    ///
    /// `mask` must have exactly the source shape.
    pub fn with_src_mask(mut self, mask: ArrayD<bool>) -> RegridResult<Self> {
        if mask.shape() != self.regridder.source_shape() {
            return Err(RegridError::shape(
                self.regridder.source_shape(),
                mask.shape(),
            ));
        }
        self.src_mask = Some(mask);
        Ok(self)
    }

    /// Mask these target cells in every result, whatever their coverage
    ///
    /// `mask` must have exactly the target shape.
    pub fn with_tgt_mask(mut self, mask: ArrayD<bool>) -> RegridResult<Self> {
        if mask.shape() != self.regridder.target_shape() {
            return Err(RegridError::shape(
                self.regridder.target_shape(),
                mask.shape(),
            ));
        }
        self.tgt_mask = Some(mask);
        Ok(self)
    }

    pub fn regridder(&self) -> &Regridder {
        &self.regridder
    }

    pub fn mdtol(&self) -> f64 {
        self.mdtol
    }

    pub fn norm_type(&self) -> NormType {
        self.norm_type
    }

    pub fn src_mask(&self) -> Option<&ArrayD<bool>> {
        self.src_mask.as_ref()
    }

    pub fn tgt_mask(&self) -> Option<&ArrayD<bool>> {
        self.tgt_mask.as_ref()
    }

    /// Regrid a field whose trailing axes are the source shape
    pub fn regrid(&self, data: &MaskedArray) -> RegridResult<MaskedArray> {
        split_shape(data.shape(), self.regridder.source_shape())?;
        let result = match &self.src_mask {
            Some(mask) => {
                let masked = data.mask_with(mask.view())?;
                self.regridder.regrid(&masked, self.norm_type, self.mdtol)?
            }
            None => self.regridder.regrid(data, self.norm_type, self.mdtol)?,
        };
        match &self.tgt_mask {
            Some(mask) => result.mask_with(mask.view()),
            None => Ok(result),
        }
    }

    /// Regrid a field whose horizontal axes are at `dims`
    ///
    /// `dims[i]` is the axis of `data` holding source axis `i`, e.g. `[lat_axis, lon_axis]`
    /// for a grid. When source and target have the same rank the target axes take the
    /// places of the source axes. Otherwise the target axes are placed together, starting at
    /// the first horizontal axis, so a `[lat, time, lon]` grid field becomes a
    /// `[face, time]` mesh field.
    pub fn regrid_along_dims(
        &self,
        data: &MaskedArray,
        dims: &[usize],
    ) -> RegridResult<MaskedArray> {
        let source_rank = self.regridder.source_shape().len();
        if dims.len() != source_rank {
            return Err(RegridError::InvalidAxes(format!(
                "expected {} horizontal axes, got {}",
                source_rank,
                dims.len()
            )));
        }

        let (values, mask) = data.clone().into_parts();
        let moved = MaskedArray::new(
            move_axes_to_end(values, dims)?,
            move_axes_to_end(mask, dims)?,
        )?;
        let result = self.regrid(&moved)?;

        let target_rank = self.regridder.target_shape().len();
        let positions: Vec<usize> = if target_rank == source_rank {
            dims.to_vec()
        } else {
            let start = dims.iter().copied().min().unwrap_or_default();
            (start..start + target_rank).collect()
        };

        let (values, mask) = result.into_parts();
        MaskedArray::new(
            place_trailing_axes(values, &positions)?,
            place_trailing_axes(mask, &positions)?,
        )
    }
}
