mod flow_metrics;
pub use flow_metrics::*;

#[cfg(test)]
mod flow_metrics_tests;
