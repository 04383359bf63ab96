//! Campaign usage metrics.
//!
//! Metrics are fire-and-forget: a campaign reports counters to an
//! injected [`MetricsSink`] and never inspects the result. The default
//! sink discards everything, so tests and metric-averse deployments pay
//! nothing; real exporters implement the trait and are passed in via
//! [`Campaign::with_metrics`](crate::Campaign::with_metrics).

/// Well-known metric labels reported by a campaign.
pub mod labels {
    /// Incremented once per accepted measurement batch.
    pub const COUNT_ADD_RESULTS: &str = "count-add-results";
    /// Incremented once per computed (non-cached) recommendation.
    pub const COUNT_RECOMMEND: &str = "count-recommend";
    /// The batch size of each computed recommendation.
    pub const BATCH_SIZE: &str = "batch-size";
    /// Incremented when a recommendation is computed without any
    /// measurements available.
    pub const NAKED_INITIAL_RECOMMENDATION: &str = "naked-initial-recommendation";
}

/// Sink for campaign usage counters.
///
/// Implementations must tolerate being called from hot paths; recording
/// must not fail and must not block meaningfully.
pub trait MetricsSink: Send + Sync {
    /// Records a single labeled value.
    fn record_value(&self, label: &str, value: f64);
}

/// A sink that discards all recorded values (the default).
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopMetricsSink;

impl MetricsSink for NoopMetricsSink {
    fn record_value(&self, _label: &str, _value: f64) {}
}
