use ndarray::{Array2, ArrayD, Ix1, Ix2};
use serde::{Deserialize, Serialize};
use snafu::ensure;
use std::convert::TryFrom;
use strum::{Display, IntoStaticStr};

use super::error::{self, PrimitivesError};

/// One side of a minibatch observation: either plain class labels or
/// per-sample score/logit rows from which labels are derived via arg-max.
///
/// The variant is chosen by inspecting the dimensionality of the input,
/// one dimension for labels, two for scores. Anything higher is rejected.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LabelsOrScores {
    Labels(Vec<i64>),
    Scores(Array2<f64>),
}

impl LabelsOrScores {
    pub fn labels<L: Into<Vec<i64>>>(labels: L) -> Self {
        Self::Labels(labels.into())
    }

    pub fn scores(scores: Array2<f64>) -> Self {
        Self::Scores(scores)
    }

    /// Builds the score variant from per-sample rows, rejecting ragged input.
    pub fn scores_from_rows(rows: Vec<Vec<f64>>) -> Result<Self, PrimitivesError> {
        let ncols = rows.first().map_or(0, Vec::len);

        for row in &rows {
            ensure!(
                row.len() == ncols,
                error::RaggedScoreRows {
                    expected: ncols,
                    found: row.len(),
                }
            );
        }

        let nrows = rows.len();
        let data = rows.into_iter().flatten().collect();
        let scores = Array2::from_shape_vec((nrows, ncols), data)
            .expect("dimensions are consistent after the ragged-rows check");

        Ok(Self::Scores(scores))
    }

    /// The number of samples this batch describes.
    pub fn num_samples(&self) -> usize {
        match self {
            Self::Labels(labels) => labels.len(),
            Self::Scores(scores) => scores.nrows(),
        }
    }
}

impl TryFrom<ArrayD<f64>> for LabelsOrScores {
    type Error = PrimitivesError;

    fn try_from(array: ArrayD<f64>) -> Result<Self, Self::Error> {
        match array.ndim() {
            1 => {
                let labels = array
                    .into_dimensionality::<Ix1>()
                    .expect("ndim was checked")
                    .iter()
                    .map(|&label| label as i64)
                    .collect();
                Ok(Self::Labels(labels))
            }
            2 => {
                let scores = array
                    .into_dimensionality::<Ix2>()
                    .expect("ndim was checked");
                Ok(Self::Scores(scores))
            }
            dimensions => error::TooManyDimensions { dimensions }.fail(),
        }
    }
}

/// Names the side of an observation an input belongs to, so errors can cite
/// the offending batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "camelCase")]
pub enum BatchRole {
    Truth,
    Prediction,
}
