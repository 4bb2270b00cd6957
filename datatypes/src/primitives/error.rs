use snafu::Snafu;

use crate::error::Error;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
#[snafu(context(suffix(false)))] // disables default `Snafu` suffix
pub enum PrimitivesError {
    #[snafu(display("Batches support at most 2 dimensions, found {}", dimensions))]
    TooManyDimensions { dimensions: usize },

    #[snafu(display(
        "Score rows must all have the same length ({} ≠ {})",
        expected,
        found
    ))]
    RaggedScoreRows { expected: usize, found: usize },
}

impl From<PrimitivesError> for Error {
    fn from(error: PrimitivesError) -> Self {
        Error::Primitives { source: error }
    }
}
