//! Prometheus metrics for the forger.
//!
//! All metrics are recorded through the [`Metrics`] struct.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Aggregated metrics for a forger run.
///
/// Descriptions are registered with the global registry on creation. Without
/// an installed recorder every call is a no-op.
#[derive(Debug, Clone)]
pub struct Metrics {
    _private: (),
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self::register_descriptions();
        Self { _private: () }
    }

    fn register_descriptions() {
        // Scanner
        describe_counter!(
            "forger_candidates_scanned_total",
            "Withdrawal events whose storage proofs were inspected"
        );
        describe_counter!(
            "forger_candidates_rejected_total",
            "Candidates rejected by proof shape, by reason"
        );

        // Search
        describe_counter!(
            "forger_search_attempts_total",
            "Forged withdrawal candidates hashed"
        );
        describe_histogram!(
            "forger_search_duration_seconds",
            "Wall time of the preimage search in seconds"
        );

        // Runs
        describe_counter!("forger_runs_total", "Forger runs by outcome");
    }

    pub fn record_scanned(&self, count: usize) {
        counter!("forger_candidates_scanned_total").increment(count as u64);
    }

    pub fn record_rejection(&self, reason: &'static str) {
        counter!("forger_candidates_rejected_total", "reason" => reason).increment(1);
    }

    pub fn record_search(&self, attempts: u64, duration: Duration) {
        counter!("forger_search_attempts_total").increment(attempts);
        histogram!("forger_search_duration_seconds").record(duration.as_secs_f64());
    }

    /// Record the end of a run. `outcome` is `"success"` or a failure stage.
    pub fn record_run(&self, outcome: &'static str) {
        counter!("forger_runs_total", "outcome" => outcome).increment(1);
    }
}

/// Install a Prometheus recorder without an HTTP listener.
///
/// The returned handle renders the text exposition format on demand.
pub fn install_prometheus_recorder() -> eyre::Result<PrometheusHandle> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| eyre::eyre!("Failed to install Prometheus recorder: {}", e))
}
