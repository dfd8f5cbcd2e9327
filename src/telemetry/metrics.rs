//! Prometheus metrics

use std::time::Duration;

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Risk reports computed
    Calculations,
    /// Requests rejected for missing or invalid fields
    ValidationFailures,
    /// Scenarios evaluated in comparisons
    Scenarios,
    /// Trade records written to the journal
    TradesRecorded,
}

impl CounterMetric {
    pub fn name(&self) -> &'static str {
        match self {
            CounterMetric::Calculations => "traderisk_calculations_total",
            CounterMetric::ValidationFailures => "traderisk_validation_failures_total",
            CounterMetric::Scenarios => "traderisk_scenarios_total",
            CounterMetric::TradesRecorded => "traderisk_trades_recorded_total",
        }
    }
}

/// Latency metric types
#[derive(Debug, Clone, Copy)]
pub enum LatencyMetric {
    /// Single risk report request
    Calculation,
    /// Whole scenario comparison request
    Comparison,
}

impl LatencyMetric {
    pub fn name(&self) -> &'static str {
        match self {
            LatencyMetric::Calculation => "traderisk_calculation_latency_ms",
            LatencyMetric::Comparison => "traderisk_comparison_latency_ms",
        }
    }
}

/// Increment a counter
pub fn increment(metric: CounterMetric, by: u64) {
    metrics::counter!(metric.name()).increment(by);
}

/// Record a latency measurement
pub fn record_latency(metric: LatencyMetric, duration: Duration) {
    let value_ms = duration.as_secs_f64() * 1000.0;
    metrics::histogram!(metric.name()).record(value_ms);
    tracing::trace!(metric = metric.name(), value_ms, "Recording latency");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names_are_prefixed() {
        for metric in [
            CounterMetric::Calculations,
            CounterMetric::ValidationFailures,
            CounterMetric::Scenarios,
            CounterMetric::TradesRecorded,
        ] {
            assert!(metric.name().starts_with("traderisk_"));
            assert!(metric.name().ends_with("_total"));
        }
        assert!(LatencyMetric::Calculation.name().ends_with("_ms"));
        assert!(LatencyMetric::Comparison.name().ends_with("_ms"));
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        increment(CounterMetric::Calculations, 1);
        record_latency(LatencyMetric::Calculation, Duration::from_millis(3));
    }
}
