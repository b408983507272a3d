//! Standard label set attached to every object this operator creates
//!
//! Ownership/discovery metadata only; convergence decisions never read labels.

use std::collections::BTreeMap;

/// Get the standard labels for operator-created objects
pub fn standard_labels() -> BTreeMap<String, String> {
    let mut labels = BTreeMap::new();
    labels.insert(
        "app.kubernetes.io/part-of".to_string(),
        "orchestrator".to_string(),
    );
    labels.insert(
        "app.kubernetes.io/managed-by".to_string(),
        "orchestrator-operator".to_string(),
    );
    labels
}
