//! Prometheus metrics for the orchestrator operator

use once_cell::sync::Lazy;
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;

/// Labels for per-component convergence outcomes
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ConvergenceLabels {
    pub component: String,
    pub outcome: String,
}

/// Counter of completed convergence passes
pub static PASSES: Lazy<Counter> = Lazy::new(Counter::default);

/// Counter of failed convergence passes
pub static PASS_FAILURES: Lazy<Counter> = Lazy::new(Counter::default);

/// Counter of mutating convergence outcomes per component
pub static CONVERGENCE_OUTCOMES: Lazy<Family<ConvergenceLabels, Counter>> =
    Lazy::new(Family::default);

/// Record a create or update issued while converging a component
pub fn record_outcome(component: &str, outcome: &str) {
    let labels = ConvergenceLabels {
        component: component.to_string(),
        outcome: outcome.to_string(),
    };
    CONVERGENCE_OUTCOMES.get_or_create(&labels).inc();
}
