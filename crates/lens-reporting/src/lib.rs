pub mod calculator;
pub mod sink;

pub use calculator::ResponseMetricsCalculator;
pub use sink::{JsonlSink, LogSink, MetricSink};
