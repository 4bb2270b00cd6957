use super::{Plot, PlotData, PlotMetaData};
use crate::error;
use crate::util::Result;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use snafu::ensure;

/// A heatmap of a (possibly normalized) confusion matrix.
///
/// Rows are true classes, columns are predicted classes. Class names are
/// optional; without them the class index is used as the tick label.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfusionMatrixPlot {
    matrix: Array2<f64>,
    class_names: Option<Vec<String>>,
}

impl ConfusionMatrixPlot {
    pub fn new(matrix: Array2<f64>) -> Self {
        Self {
            matrix,
            class_names: None,
        }
    }

    pub fn with_class_names(matrix: Array2<f64>, class_names: Vec<String>) -> Result<Self> {
        ensure!(
            class_names.len() == matrix.nrows(),
            error::Plot {
                details: "Number of class names must match the matrix dimension"
            }
        );

        Ok(Self {
            matrix,
            class_names: Some(class_names),
        })
    }

    fn class_label(&self, index: usize) -> String {
        match &self.class_names {
            Some(names) => names[index].clone(),
            None => index.to_string(),
        }
    }
}

impl Plot for ConfusionMatrixPlot {
    fn to_vega_embeddable(&self, allow_interactions: bool) -> Result<PlotData> {
        let mut values = Vec::with_capacity(self.matrix.len());
        for ((true_class, predicted_class), &count) in self.matrix.indexed_iter() {
            values.push(serde_json::json!({
                "trueClass": self.class_label(true_class),
                "predictedClass": self.class_label(predicted_class),
                "count": count,
            }));
        }

        let mut vega_spec = serde_json::json!({
            "$schema": "https://vega.github.io/schema/vega-lite/v5.json",
            "data": {
                "values": values,
            },
            "mark": "rect",
            "encoding": {
                "x": {
                    "field": "predictedClass",
                    "type": "ordinal",
                    "axis": {
                        "title": "Predicted Class",
                    },
                },
                "y": {
                    "field": "trueClass",
                    "type": "ordinal",
                    "axis": {
                        "title": "True Class",
                    },
                },
                "color": {
                    "field": "count",
                    "type": "quantitative",
                },
            },
        });

        let metadata = if allow_interactions {
            let selection_name = "brush".to_string();

            vega_spec["params"] = serde_json::json!([{
                "name": selection_name,
                "select": "interval",
            }]);

            PlotMetaData::Selection { selection_name }
        } else {
            PlotMetaData::None
        };

        Ok(PlotData {
            vega_string: vega_spec.to_string(),
            metadata,
        })
    }
}
