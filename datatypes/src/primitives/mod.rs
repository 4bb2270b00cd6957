mod error;
mod labels_or_scores;

pub use error::PrimitivesError;
pub use labels_or_scores::{BatchRole, LabelsOrScores};
