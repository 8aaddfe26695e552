//! Conservative regridding weights applied to masked N-dimensional data
//!
//! The crate takes sparse overlap weights between the cells of a source and a target
//! discretization and applies them to data arrays, propagating masks according to a missing
//! data tolerance and normalising by either the covered or the destination area.
//!
//! - [`shape`]: conversion between natural array layouts and flattened cell offsets
//! - [`weights`]: the immutable sparse weight tensor
//! - [`engine`]: mask propagation and normalisation
//! - [`regridder`]: applies weights to data with arbitrary leading axes
//! - [`scheme`]: validated user-facing regridding scheme

pub mod discretization;
pub mod engine;
pub mod errors;
pub mod masked;
#[cfg(feature = "python")]
pub mod python;
pub mod regridder;
pub mod scheme;
pub mod shape;
pub mod weights;
