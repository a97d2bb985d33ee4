//! Prometheus metrics exposition
//!
//! - `pool_assignments_total` (counter): label `outcome`
//!   (assigned / no_capacity / error)
//! - `pool_admin_actions_total` (counter): label `action`
//!   (unassign / block / unblock)
//! - `pool_accounts` (gauge): label `state`
//!   (assigned / assignable / disabled), plus `pool_accounts_total`

use account_pool::PoolSummary;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder and return a handle for rendering
/// metrics.
///
/// The handle's `render()` method produces the Prometheus text exposition
/// format suitable for serving on a `/metrics` endpoint.
pub fn install_recorder() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder")
}

/// Record the outcome of a get-and-assign request.
pub fn record_assignment(outcome: &str) {
    metrics::counter!("pool_assignments_total", "outcome" => outcome.to_string()).increment(1);
}

/// Record an admin pool mutation.
pub fn record_admin_action(action: &str) {
    metrics::counter!("pool_admin_actions_total", "action" => action.to_string()).increment(1);
}

/// Publish current pool counts.
pub fn set_pool_gauges(summary: &PoolSummary) {
    metrics::gauge!("pool_accounts_total").set(summary.total as f64);
    metrics::gauge!("pool_accounts", "state" => "assigned").set(summary.assigned as f64);
    metrics::gauge!("pool_accounts", "state" => "assignable").set(summary.assignable as f64);
    metrics::gauge!("pool_accounts", "state" => "disabled").set(summary.disabled as f64);
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_exporter_prometheus::PrometheusRecorder;

    #[test]
    fn record_functions_do_not_panic_without_recorder() {
        // When no recorder is installed, metrics calls are no-ops.
        record_assignment("assigned");
        record_admin_action("block");
        set_pool_gauges(&PoolSummary::default());
    }

    /// Create an isolated recorder/handle pair for unit tests. Only one
    /// global recorder can exist per process, and install_recorder()
    /// panics on a second call.
    fn isolated_recorder() -> (PrometheusRecorder, PrometheusHandle) {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        (recorder, handle)
    }

    #[test]
    fn gauges_render_with_state_labels() {
        let (recorder, handle) = isolated_recorder();
        metrics::with_local_recorder(&recorder, || {
            set_pool_gauges(&PoolSummary {
                total: 4,
                assigned: 1,
                assignable: 2,
                disabled: 1,
            });
            record_assignment("assigned");
        });

        let rendered = handle.render();
        assert!(rendered.contains("pool_accounts_total 4"), "got: {rendered}");
        assert!(
            rendered.contains(r#"pool_accounts{state="assignable"} 2"#),
            "got: {rendered}"
        );
        assert!(
            rendered.contains(r#"pool_assignments_total{outcome="assigned"} 1"#),
            "got: {rendered}"
        );
    }
}
