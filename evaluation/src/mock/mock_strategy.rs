use crate::engine::{MetricValue, Phase, PluginMetric, StrategyContext};
use crate::util::Result;
use continuum_datatypes::primitives::LabelsOrScores;

/// A stand-in for the external training-loop controller.
///
/// It is configured with a stream name and a fixed sequence of evaluation
/// minibatches and drives the plugin lifecycle the way the real controller
/// would: `before_eval`, then the iteration hooks once per minibatch, then
/// `after_eval`. The global counter advances by one per iteration and is
/// never reset, so steps keep increasing across evaluation passes.
pub struct MockStrategy {
    stream_name: String,
    minibatches: Vec<(LabelsOrScores, LabelsOrScores)>,
    current_minibatch: usize,
    global_counter: u64,
}

impl MockStrategy {
    pub fn new<S: Into<String>>(
        stream_name: S,
        minibatches: Vec<(LabelsOrScores, LabelsOrScores)>,
    ) -> Self {
        Self {
            stream_name: stream_name.into(),
            minibatches,
            current_minibatch: 0,
            global_counter: 0,
        }
    }

    /// Runs one evaluation pass over all configured minibatches and collects
    /// everything the metrics emit.
    pub fn run_eval(&mut self, metrics: &mut [Box<dyn PluginMetric>]) -> Result<Vec<MetricValue>> {
        let mut collected = Vec::new();

        for metric in &mut *metrics {
            if let Some(values) = metric.before_eval(self)? {
                collected.extend(values);
            }
        }

        for index in 0..self.minibatches.len() {
            self.current_minibatch = index;

            for metric in &mut *metrics {
                if let Some(values) = metric.before_eval_iteration(self)? {
                    collected.extend(values);
                }
            }
            for metric in &mut *metrics {
                if let Some(values) = metric.after_eval_iteration(self)? {
                    collected.extend(values);
                }
            }

            self.global_counter += 1;
        }

        for metric in metrics {
            if let Some(values) = metric.after_eval(self)? {
                collected.extend(values);
            }
        }

        Ok(collected)
    }
}

impl StrategyContext for MockStrategy {
    fn minibatch_truth(&self) -> &LabelsOrScores {
        &self.minibatches[self.current_minibatch].0
    }

    fn minibatch_predictions(&self) -> &LabelsOrScores {
        &self.minibatches[self.current_minibatch].1
    }

    fn phase(&self) -> Phase {
        Phase::Eval
    }

    fn stream_name(&self) -> &str {
        &self.stream_name
    }

    fn global_counter(&self) -> u64 {
        self.global_counter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{MetricResult, metric_name};

    #[derive(Default)]
    struct HookRecorder {
        events: Vec<String>,
    }

    impl PluginMetric for HookRecorder {
        fn name(&self) -> &'static str {
            "HookRecorder"
        }

        fn before_eval(&mut self, _strategy: &dyn StrategyContext) -> Result<MetricResult> {
            self.events.push("before_eval".to_string());
            Ok(None)
        }

        fn after_eval_iteration(
            &mut self,
            strategy: &dyn StrategyContext,
        ) -> Result<MetricResult> {
            self.events.push(format!(
                "iteration {} samples at step {}",
                strategy.minibatch_truth().num_samples(),
                strategy.global_counter()
            ));
            Ok(None)
        }

        fn after_eval(&mut self, strategy: &dyn StrategyContext) -> Result<MetricResult> {
            self.events.push("after_eval".to_string());

            Ok(Some(vec![MetricValue {
                name: metric_name(self.name(), strategy),
                payload: crate::engine::MetricPayload::Single(
                    crate::engine::MetricRepresentation::Scalar(0.),
                ),
                step: strategy.global_counter(),
            }]))
        }
    }

    #[test]
    fn drives_hooks_in_lifecycle_order() {
        let mut strategy = MockStrategy::new(
            "test",
            vec![
                (
                    LabelsOrScores::labels(vec![0]),
                    LabelsOrScores::labels(vec![0]),
                ),
                (
                    LabelsOrScores::labels(vec![0, 1]),
                    LabelsOrScores::labels(vec![0, 1]),
                ),
            ],
        );

        let mut metrics = vec![HookRecorder::default().boxed()];
        let values = strategy.run_eval(&mut metrics).unwrap();

        assert_eq!(values.len(), 1);
        assert_eq!(values[0].name, "HookRecorder/eval_phase/test_stream");
        assert_eq!(values[0].step, 2);
    }

    #[test]
    fn the_counter_advances_per_iteration() {
        let minibatch = (
            LabelsOrScores::labels(vec![0]),
            LabelsOrScores::labels(vec![0]),
        );
        let mut strategy = MockStrategy::new("test", vec![minibatch.clone(), minibatch]);

        let mut metrics = vec![HookRecorder::default().boxed()];
        strategy.run_eval(&mut metrics).unwrap();
        let values = strategy.run_eval(&mut metrics).unwrap();

        assert_eq!(values[0].step, 4);
    }

    #[test]
    fn an_empty_pass_still_packages_results() {
        let mut strategy = MockStrategy::new("empty", Vec::new());

        let mut metrics = vec![HookRecorder::default().boxed()];
        let values = strategy.run_eval(&mut metrics).unwrap();

        assert_eq!(values[0].name, "HookRecorder/eval_phase/empty_stream");
        assert_eq!(values[0].step, 0);
    }
}
