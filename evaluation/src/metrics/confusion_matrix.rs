use crate::engine::{
    AlternativeValues, MetricPayload, MetricRepresentation, MetricResult, MetricValue,
    PluginMetric, StrategyContext, metric_name,
};
use crate::util::Result;
use continuum_datatypes::metrics::{ConfusionMatrix, Normalization};
use continuum_datatypes::operations::image::default_matrix_image_creator;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const STREAM_CONFUSION_MATRIX_METRIC_NAME: &str = "ConfusionMatrix_Stream";

/// Renders a result matrix to PNG bytes.
pub type ImageCreator =
    Box<dyn Fn(&Array2<f64>) -> continuum_datatypes::util::Result<Vec<u8>> + Send>;

/// The parameter spec for `StreamConfusionMatrix`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamConfusionMatrixParams {
    /// Fixed class count. When unset, the matrix dimension follows the
    /// labels and score widths observed during the evaluation pass.
    #[serde(default)]
    pub num_classes: Option<usize>,
    /// Post-hoc scaling of the emitted matrix.
    #[serde(default)]
    pub normalize: Option<Normalization>,
    /// Whether to log a rendered image next to the numeric matrix.
    #[serde(default = "default_save_image")]
    pub save_image: bool,
    /// Pixel edge length of the rendered PNG.
    #[serde(default = "default_image_size")]
    pub image_size: u32,
}

fn default_save_image() -> bool {
    true
}

fn default_image_size() -> u32 {
    512
}

impl Default for StreamConfusionMatrixParams {
    fn default() -> Self {
        Self {
            num_classes: None,
            normalize: None,
            save_image: default_save_image(),
            image_size: default_image_size(),
        }
    }
}

/// A plugin metric that accumulates a confusion matrix over all evaluation
/// minibatches of one pass and logs it at the end of the pass.
///
/// Confusion matrix computation can be slow for a large number of classes.
/// Set `save_image: false` if the image rendering dominates the runtime.
pub struct StreamConfusionMatrix {
    matrix: ConfusionMatrix,
    save_image: bool,
    image_creator: ImageCreator,
}

impl StreamConfusionMatrix {
    pub fn new(params: StreamConfusionMatrixParams) -> Self {
        let image_creator = Box::new(default_matrix_image_creator(params.image_size));
        Self::with_image_creator(params, image_creator)
    }

    /// Creates the metric with a custom matrix→PNG renderer.
    pub fn with_image_creator(
        params: StreamConfusionMatrixParams,
        image_creator: ImageCreator,
    ) -> Self {
        Self {
            matrix: ConfusionMatrix::new(params.num_classes, params.normalize),
            save_image: params.save_image,
            image_creator,
        }
    }

    fn package_result(&self, strategy: &dyn StrategyContext) -> Result<Vec<MetricValue>> {
        let result = self.matrix.result();
        let name = metric_name(self.name(), strategy);
        let step = strategy.global_counter();

        debug!(
            metric = %name,
            step,
            dimension = result.nrows(),
            "packaging confusion matrix"
        );

        let payload = if self.save_image {
            let image = (self.image_creator)(&result)?;

            MetricPayload::Alternatives(AlternativeValues::new(vec![
                MetricRepresentation::Image(image),
                MetricRepresentation::Matrix(result),
            ]))
        } else {
            MetricPayload::Single(MetricRepresentation::Matrix(result))
        };

        Ok(vec![MetricValue {
            name,
            payload,
            step,
        }])
    }
}

impl PluginMetric for StreamConfusionMatrix {
    fn name(&self) -> &'static str {
        STREAM_CONFUSION_MATRIX_METRIC_NAME
    }

    fn before_eval(&mut self, _strategy: &dyn StrategyContext) -> Result<MetricResult> {
        self.matrix.reset();
        Ok(None)
    }

    fn after_eval_iteration(&mut self, strategy: &dyn StrategyContext) -> Result<MetricResult> {
        self.matrix
            .update(strategy.minibatch_truth(), strategy.minibatch_predictions())?;
        Ok(None)
    }

    fn after_eval(&mut self, strategy: &dyn StrategyContext) -> Result<MetricResult> {
        self.package_result(strategy).map(Some)
    }
}
