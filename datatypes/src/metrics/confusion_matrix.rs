use ndarray::{Array2, Axis, s};
use serde::{Deserialize, Serialize};
use snafu::{Snafu, ensure};
use std::str::FromStr;

use crate::error::Error;
use crate::primitives::{BatchRole, LabelsOrScores};
use crate::util::Result;

/// Enum for any errors encountered while accumulating a confusion matrix.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
#[snafu(context(suffix(false)))] // disables default `Snafu` suffix
pub enum MetricsError {
    #[snafu(display(
        "Size mismatch for truth and prediction batches ({} ≠ {})",
        truth_samples,
        predicted_samples
    ))]
    SampleCountMismatch {
        truth_samples: usize,
        predicted_samples: usize,
    },

    #[snafu(display("The {} batch contains score rows without any class column", role))]
    EmptyScoreRow { role: BatchRole },

    #[snafu(display(
        "Label values in the {} batch must be non-negative, found {}",
        role,
        label
    ))]
    NegativeLabel { role: BatchRole, label: i64 },

    #[snafu(display(
        "Encountered {} label {} not smaller than the fixed class count {}",
        role,
        label,
        num_classes
    ))]
    LabelExceedsClassCount {
        role: BatchRole,
        label: i64,
        num_classes: usize,
    },

    #[snafu(display(
        "Invalid normalization parameter \"{}\". Can be \"true\", \"pred\" or \"all\"",
        mode
    ))]
    InvalidNormalization { mode: String },
}

impl From<MetricsError> for Error {
    fn from(error: MetricsError) -> Self {
        Error::Metrics { source: error }
    }
}

/// How to scale a confusion matrix after accumulation.
///
/// The wire literals are the established `"true"`/`"pred"`/`"all"` spellings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Normalization {
    /// Divide each row by its row sum.
    #[serde(rename = "true")]
    Truth,
    /// Divide each column by its column sum.
    #[serde(rename = "pred")]
    Prediction,
    /// Divide every cell by the grand total.
    #[serde(rename = "all")]
    Total,
}

impl FromStr for Normalization {
    type Err = MetricsError;

    fn from_str(mode: &str) -> Result<Self, Self::Err> {
        match mode {
            "true" => Ok(Self::Truth),
            "pred" => Ok(Self::Prediction),
            "all" => Ok(Self::Total),
            _ => InvalidNormalization { mode }.fail(),
        }
    }
}

/// A running confusion matrix over (true label, predicted label) pairs.
///
/// The matrix is always square. Its dimension is either the fixed
/// `num_classes` or the largest label observed so far plus one; in the
/// latter case the matrix grows on demand by zero-padding new rows and
/// columns. Score/logit inputs are resolved to labels via per-sample
/// arg-max before counting.
///
/// `update` validates before it mutates, so a failed call leaves the
/// counts untouched.
#[derive(Clone, Debug, Default)]
pub struct ConfusionMatrix {
    table: Option<Array2<u64>>,
    num_classes: Option<usize>,
    normalize: Option<Normalization>,
}

impl ConfusionMatrix {
    pub fn new(num_classes: Option<usize>, normalize: Option<Normalization>) -> Self {
        Self {
            table: None,
            num_classes,
            normalize,
        }
    }

    /// Counts one minibatch of (truth, prediction) pairs.
    pub fn update(&mut self, truth: &LabelsOrScores, predicted: &LabelsOrScores) -> Result<()> {
        ensure!(
            truth.num_samples() == predicted.num_samples(),
            SampleCountMismatch {
                truth_samples: truth.num_samples(),
                predicted_samples: predicted.num_samples(),
            }
        );

        // The prediction side is validated first, so its error is the one
        // reported when both sides are invalid.
        let mut required_classes = self.num_classes.unwrap_or(0);
        let predicted_labels =
            self.resolve_batch(predicted, BatchRole::Prediction, &mut required_classes)?;
        let true_labels = self.resolve_batch(truth, BatchRole::Truth, &mut required_classes)?;

        if required_classes == 0 {
            return Ok(()); // zero samples and no score width
        }

        let table = self.table_for_update(required_classes);
        for (&true_label, &predicted_label) in true_labels.iter().zip(&predicted_labels) {
            table[[true_label, predicted_label]] += 1;
        }

        Ok(())
    }

    /// Retrieves the matrix, normalized if so configured.
    ///
    /// Calling this method does not change the internal state. Before the
    /// first update it returns `num_classes × num_classes` zeros when a
    /// class count is configured and an empty `0 × 0` matrix otherwise.
    pub fn result(&self) -> Array2<f64> {
        let Some(table) = &self.table else {
            let num_classes = self.num_classes.unwrap_or(0);
            return Array2::zeros((num_classes, num_classes));
        };

        let counts = table.mapv(|count| count as f64);

        match self.normalize {
            None => counts,
            Some(normalization) => Self::normalized(&counts, normalization),
        }
    }

    /// Discards the counts. The configured `num_classes` and normalization
    /// persist.
    pub fn reset(&mut self) {
        self.table = None;
    }

    pub fn num_classes(&self) -> Option<usize> {
        self.num_classes
    }

    pub fn normalize(&self) -> Option<Normalization> {
        self.normalize
    }

    /// Resolves one side of a batch to plain label indices and raises
    /// `required_classes` to the class count this side demands.
    fn resolve_batch(
        &self,
        batch: &LabelsOrScores,
        role: BatchRole,
        required_classes: &mut usize,
    ) -> Result<Vec<usize>, MetricsError> {
        match batch {
            LabelsOrScores::Scores(scores) => {
                // With a fixed class count only the first `num_classes`
                // score columns participate.
                let width = match self.num_classes {
                    Some(num_classes) => scores.ncols().min(num_classes),
                    None => scores.ncols(),
                };

                ensure!(
                    width > 0 || scores.nrows() == 0,
                    EmptyScoreRow { role }
                );

                if self.num_classes.is_none() {
                    *required_classes = (*required_classes).max(width);
                }

                let truncated = scores.slice(s![.., ..width]);

                Ok(truncated.rows().into_iter().map(arg_max).collect())
            }
            LabelsOrScores::Labels(labels) => {
                for &label in labels {
                    ensure!(label >= 0, NegativeLabel { role, label });

                    if let Some(num_classes) = self.num_classes {
                        ensure!(
                            (label as usize) < num_classes,
                            LabelExceedsClassCount {
                                role,
                                label,
                                num_classes,
                            }
                        );
                    } else {
                        *required_classes = (*required_classes).max(label as usize + 1);
                    }
                }

                Ok(labels.iter().map(|&label| label as usize).collect())
            }
        }
    }

    /// Returns the table sized to at least `required_classes`, allocating it
    /// on first use and growing it by zero-padding otherwise. Old counts keep
    /// their coordinates.
    fn table_for_update(&mut self, required_classes: usize) -> &mut Array2<u64> {
        let table = self
            .table
            .get_or_insert_with(|| Array2::zeros((required_classes, required_classes)));

        let current = table.nrows();
        if required_classes > current {
            let mut grown = Array2::zeros((required_classes, required_classes));
            grown.slice_mut(s![..current, ..current]).assign(table);
            *table = grown;
        }

        table
    }

    fn normalized(counts: &Array2<f64>, normalization: Normalization) -> Array2<f64> {
        let scaled = match normalization {
            Normalization::Truth => {
                let row_sums = counts.sum_axis(Axis(1)).insert_axis(Axis(1));
                counts / &row_sums
            }
            Normalization::Prediction => {
                let column_sums = counts.sum_axis(Axis(0));
                counts / &column_sums
            }
            Normalization::Total => counts / counts.sum(),
        };

        // Empty rows/columns divide zero by zero.
        scaled.mapv(|cell| if cell.is_nan() { 0. } else { cell })
    }
}

/// Position of the maximum score. Ties resolve to the first maximum.
fn arg_max(scores: ndarray::ArrayView1<f64>) -> usize {
    let mut best = 0;
    for (index, &score) in scores.iter().enumerate().skip(1) {
        if score > scores[best] {
            best = index;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test::score_rows;
    use float_cmp::approx_eq;
    use ndarray::array;

    fn labels(values: &[i64]) -> LabelsOrScores {
        LabelsOrScores::labels(values.to_vec())
    }

    #[test]
    fn accumulates_plain_labels() {
        let mut cm = ConfusionMatrix::new(None, None);

        cm.update(&labels(&[0, 1, 1]), &labels(&[0, 1, 0])).unwrap();

        assert_eq!(cm.result(), array![[1., 0.], [1., 1.]]);
    }

    #[test]
    fn cell_sum_equals_sample_count() {
        let mut cm = ConfusionMatrix::new(None, None);

        cm.update(&labels(&[0, 1, 1]), &labels(&[0, 1, 0])).unwrap();
        cm.update(&labels(&[2, 0]), &labels(&[2, 2])).unwrap();

        assert_eq!(cm.result().sum(), 5.);
    }

    #[test]
    fn result_is_an_idempotent_read() {
        let mut cm = ConfusionMatrix::new(None, None);

        cm.update(&labels(&[0, 1]), &labels(&[1, 1])).unwrap();

        assert_eq!(cm.result(), cm.result());
    }

    #[test]
    fn empty_result_without_class_count_is_zero_by_zero() {
        let cm = ConfusionMatrix::new(None, None);

        assert_eq!(cm.result().dim(), (0, 0));
    }

    #[test]
    fn empty_result_with_class_count_is_zero_filled() {
        let cm = ConfusionMatrix::new(Some(3), None);

        assert_eq!(cm.result(), Array2::<f64>::zeros((3, 3)));
    }

    #[test]
    fn grows_by_zero_padding_and_keeps_counts() {
        let mut cm = ConfusionMatrix::new(None, None);

        cm.update(&labels(&[0, 1]), &labels(&[0, 1])).unwrap();
        cm.update(&labels(&[3]), &labels(&[0])).unwrap();

        assert_eq!(
            cm.result(),
            array![
                [1., 0., 0., 0.],
                [0., 1., 0., 0.],
                [0., 0., 0., 0.],
                [1., 0., 0., 0.]
            ]
        );
    }

    #[test]
    fn arg_max_resolves_score_input() {
        let mut cm = ConfusionMatrix::new(None, None);

        cm.update(
            &labels(&[1]),
            &LabelsOrScores::scores(score_rows(&[&[0.1, 0.9]])),
        )
        .unwrap();

        assert_eq!(cm.result(), array![[0., 0.], [0., 1.]]);
    }

    #[test]
    fn score_width_is_a_lower_bound_for_the_dimension() {
        let mut cm = ConfusionMatrix::new(None, None);

        cm.update(
            &labels(&[0]),
            &LabelsOrScores::scores(score_rows(&[&[0.9, 0.05, 0.03, 0.02]])),
        )
        .unwrap();

        assert_eq!(cm.result().dim(), (4, 4));
        assert_eq!(cm.result()[[0, 0]], 1.);
    }

    #[test]
    fn fixed_class_count_truncates_score_columns() {
        let mut cm = ConfusionMatrix::new(Some(2), None);

        // the largest score sits in a truncated column
        cm.update(
            &labels(&[1]),
            &LabelsOrScores::scores(score_rows(&[&[0.1, 0.2, 0.7]])),
        )
        .unwrap();

        assert_eq!(cm.result(), array![[0., 0.], [0., 1.]]);
    }

    #[test]
    fn label_at_or_above_fixed_class_count_fails() {
        let mut cm = ConfusionMatrix::new(Some(3), None);

        let result = cm.update(&labels(&[0, 5]), &labels(&[0, 1]));

        assert!(matches!(
            result,
            Err(Error::Metrics {
                source: MetricsError::LabelExceedsClassCount {
                    role: BatchRole::Truth,
                    label: 5,
                    num_classes: 3,
                },
            })
        ));
    }

    #[test]
    fn negative_label_cites_the_offending_batch() {
        let mut cm = ConfusionMatrix::new(None, None);

        let result = cm.update(&labels(&[0, 1]), &labels(&[0, -1]));

        assert!(matches!(
            result,
            Err(Error::Metrics {
                source: MetricsError::NegativeLabel {
                    role: BatchRole::Prediction,
                    label: -1,
                },
            })
        ));
    }

    #[test]
    fn prediction_batch_is_validated_first() {
        let mut cm = ConfusionMatrix::new(None, None);

        let result = cm.update(&labels(&[-2]), &labels(&[-1]));

        assert!(matches!(
            result,
            Err(Error::Metrics {
                source: MetricsError::NegativeLabel {
                    role: BatchRole::Prediction,
                    label: -1,
                },
            })
        ));
    }

    #[test]
    fn mismatched_sample_counts_fail() {
        let mut cm = ConfusionMatrix::new(None, None);

        let result = cm.update(&labels(&[0, 1]), &labels(&[0]));

        assert!(matches!(
            result,
            Err(Error::Metrics {
                source: MetricsError::SampleCountMismatch {
                    truth_samples: 2,
                    predicted_samples: 1,
                },
            })
        ));
    }

    #[test]
    fn failed_update_leaves_counts_untouched() {
        let mut cm = ConfusionMatrix::new(None, None);

        cm.update(&labels(&[0, 1]), &labels(&[0, 1])).unwrap();
        cm.update(&labels(&[0, -3]), &labels(&[0, 0])).unwrap_err();

        assert_eq!(cm.result(), array![[1., 0.], [0., 1.]]);
    }

    #[test]
    fn empty_update_is_a_no_op() {
        let mut cm = ConfusionMatrix::new(None, None);

        cm.update(&labels(&[]), &labels(&[])).unwrap();

        assert_eq!(cm.result().dim(), (0, 0));
    }

    #[test]
    fn score_batch_without_columns_fails() {
        let mut cm = ConfusionMatrix::new(None, None);

        let result = cm.update(
            &labels(&[0]),
            &LabelsOrScores::scores(Array2::zeros((1, 0))),
        );

        assert!(matches!(
            result,
            Err(Error::Metrics {
                source: MetricsError::EmptyScoreRow {
                    role: BatchRole::Prediction,
                },
            })
        ));
    }

    #[test]
    fn reset_reproduces_the_original_matrix() {
        let mut cm = ConfusionMatrix::new(None, Some(Normalization::Truth));

        cm.update(&labels(&[0, 1, 1]), &labels(&[0, 1, 0])).unwrap();
        let before = cm.result();

        cm.reset();
        assert_eq!(cm.result().dim(), (0, 0));

        cm.update(&labels(&[0, 1, 1]), &labels(&[0, 1, 0])).unwrap();
        assert_eq!(cm.result(), before);
    }

    #[test]
    fn row_normalization_sums_rows_to_one() {
        let mut cm = ConfusionMatrix::new(Some(3), Some(Normalization::Truth));

        cm.update(&labels(&[0, 0, 1, 1]), &labels(&[0, 1, 1, 1]))
            .unwrap();

        let normalized = cm.result();
        for row in normalized.rows() {
            let sum = row.sum();
            assert!(approx_eq!(f64, sum, 1.) || approx_eq!(f64, sum, 0.));
        }
        // the empty row is all zero, not NaN
        assert_eq!(normalized.row(2).sum(), 0.);
        assert!(approx_eq!(f64, normalized[[0, 0]], 0.5));
    }

    #[test]
    fn column_normalization_sums_columns_to_one() {
        let mut cm = ConfusionMatrix::new(Some(2), Some(Normalization::Prediction));

        cm.update(&labels(&[0, 1, 1]), &labels(&[0, 0, 1])).unwrap();

        let normalized = cm.result();
        assert!(approx_eq!(f64, normalized.column(0).sum(), 1.));
        assert!(approx_eq!(f64, normalized.column(1).sum(), 1.));
        assert!(approx_eq!(f64, normalized[[1, 0]], 0.5));
    }

    #[test]
    fn total_normalization_sums_to_one() {
        let mut cm = ConfusionMatrix::new(None, Some(Normalization::Total));

        cm.update(&labels(&[0, 1, 1, 1]), &labels(&[0, 1, 0, 1]))
            .unwrap();

        let normalized = cm.result();
        assert!(approx_eq!(f64, normalized.sum(), 1.));
        assert!(approx_eq!(f64, normalized[[1, 1]], 0.5));
    }

    #[test]
    fn normalization_does_not_change_the_counts() {
        let mut cm = ConfusionMatrix::new(None, Some(Normalization::Total));

        cm.update(&labels(&[0, 1]), &labels(&[0, 1])).unwrap();
        let _ = cm.result();
        cm.update(&labels(&[0]), &labels(&[0])).unwrap();

        let normalized = cm.result();
        assert!(approx_eq!(f64, normalized[[0, 0]], 2. / 3.));
    }

    #[test]
    fn normalization_parses_the_wire_literals() {
        assert_eq!("true".parse::<Normalization>().unwrap(), Normalization::Truth);
        assert_eq!(
            "pred".parse::<Normalization>().unwrap(),
            Normalization::Prediction
        );
        assert_eq!("all".parse::<Normalization>().unwrap(), Normalization::Total);

        assert!(matches!(
            "rows".parse::<Normalization>(),
            Err(MetricsError::InvalidNormalization { mode }) if mode == "rows"
        ));
    }
}
