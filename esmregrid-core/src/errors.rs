use thiserror::Error;

/// Error type for invalid regridding operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegridError {
    #[error("Expected shape {expected:?}, got shape {actual:?} instead")]
    Shape {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
    #[error("Normalisation type \"{0}\" is not supported")]
    UnsupportedNormalization(String),
    #[error("Value for mdtol must be in range 0 - 1, got {0}")]
    MdtolOutOfRange(f64),
    #[error("Coefficient index {index} is outside a discretization with {size} cells")]
    InvalidIndex { index: usize, size: usize },
    #[error("Weights must be finite and nonnegative, got {0}")]
    InvalidWeight(f64),
    #[error("Malformed weight tensor: {0}")]
    MalformedWeights(String),
    #[error(
        "The mask is not constant over non-horizontal dimensions. \
         Consider passing in an explicit mask instead."
    )]
    NonConstantMask,
    #[error("Invalid horizontal axes: {0}")]
    InvalidAxes(String),
    #[error("Invalid scheme configuration: {0}")]
    Config(String),
}

impl RegridError {
    pub(crate) fn shape(expected: &[usize], actual: &[usize]) -> Self {
        RegridError::Shape {
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }
}

/// Convenience type for `Result<T, RegridError>`.
pub type RegridResult<T> = Result<T, RegridError>;
