use continuum_datatypes::primitives::LabelsOrScores;
use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

/// The phase the training loop is currently in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Train,
    Eval,
}

/// The contract an external training-loop controller fulfills towards
/// plugin metrics.
///
/// During evaluation-iteration hooks the controller exposes the current
/// minibatch; at any time it exposes the current phase, the name of the data
/// stream being evaluated and a monotonically increasing global step counter.
pub trait StrategyContext {
    fn minibatch_truth(&self) -> &LabelsOrScores;

    fn minibatch_predictions(&self) -> &LabelsOrScores;

    fn phase(&self) -> Phase;

    fn stream_name(&self) -> &str;

    fn global_counter(&self) -> u64;
}

/// Assembles the canonical metric name `{metric}/{phase}_phase/{stream}_stream`.
pub fn metric_name(metric: &str, strategy: &dyn StrategyContext) -> String {
    let phase: &'static str = strategy.phase().into();

    format!("{}/{}_phase/{}_stream", metric, phase, strategy.stream_name())
}
