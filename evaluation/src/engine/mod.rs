pub mod metric_results;
mod plugin_metric;
mod strategy;

pub use metric_results::{
    AlternativeValues, MetricPayload, MetricRepresentation, MetricValue, RepresentationKind,
};
pub use plugin_metric::{MetricResult, PluginMetric};
pub use strategy::{Phase, StrategyContext, metric_name};
