use super::metric_results::MetricValue;
use super::strategy::StrategyContext;
use crate::util::Result;

/// Values emitted by a lifecycle hook, if any.
pub type MetricResult = Option<Vec<MetricValue>>;

/// A metric plugged into the training-loop lifecycle.
///
/// The external controller drives the hooks sequentially: `before_eval` once
/// at the start of an evaluation pass, the iteration hooks once per
/// minibatch and `after_eval` once at the end. Every hook defaults to a
/// no-op so a metric only implements the events it cares about.
pub trait PluginMetric {
    /// The name this metric emits values under.
    fn name(&self) -> &'static str;

    fn before_eval(&mut self, _strategy: &dyn StrategyContext) -> Result<MetricResult> {
        Ok(None)
    }

    fn before_eval_iteration(&mut self, _strategy: &dyn StrategyContext) -> Result<MetricResult> {
        Ok(None)
    }

    fn after_eval_iteration(&mut self, _strategy: &dyn StrategyContext) -> Result<MetricResult> {
        Ok(None)
    }

    fn after_eval(&mut self, _strategy: &dyn StrategyContext) -> Result<MetricResult> {
        Ok(None)
    }

    fn boxed(self) -> Box<dyn PluginMetric>
    where
        Self: Sized + 'static,
    {
        Box::new(self)
    }
}
