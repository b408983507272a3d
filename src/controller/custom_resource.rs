//! Generic convergence for managed custom resources
//!
//! Uniform for every managed kind: fetch by fixed identity, create the
//! canonical object when absent, and when present update only on structural
//! inequality. Equal specifications never trigger a write, which is what
//! makes a steady-state pass issue zero mutating calls.

use tracing::{debug, info};

use crate::error::Result;
use crate::managed::ManagedResourceKind;
use crate::stores::ResourceStore;

pub use super::subscription::Convergence;

/// Converge one singleton custom resource to its desired specification
pub async fn converge_custom_resource<K: ManagedResourceKind>(
    store: &dyn ResourceStore<K>,
    namespace: &str,
    name: &str,
    desired: K::DesiredSpec,
) -> Result<Convergence> {
    let kind = <K as kube::Resource>::kind(&());
    let Some(mut observed) = store.get(namespace, name).await? else {
        info!("{} {}/{} absent, creating", kind, namespace, name);
        let canonical = K::canonical(name, namespace, desired);
        store.create(&canonical).await?;
        return Ok(Convergence::Created);
    };

    if K::specs_equal(observed.spec(), &desired) {
        debug!("{} {}/{} already converged", kind, namespace, name);
        return Ok(Convergence::Unchanged);
    }

    info!("{} {}/{} drifted from desired spec, updating", kind, namespace, name);
    observed.set_spec(desired);
    store.update(&observed).await?;
    Ok(Convergence::Updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::tests::mocks::MockResourceStore;
    use crate::managed::{SonataFlowClusterPlatform, cluster_platform_spec};

    #[tokio::test]
    async fn absent_resource_is_created_exactly_once() {
        let store = MockResourceStore::<SonataFlowClusterPlatform>::default();
        let outcome = converge_custom_resource(
            &store,
            "sonataflow-infra",
            "cluster-platform",
            cluster_platform_spec(),
        )
        .await
        .unwrap();
        assert_eq!(outcome, Convergence::Created);
        assert_eq!(store.creates(), 1);
        assert_eq!(store.updates(), 0);

        // Second pass with unchanged desired state: zero mutating calls
        let outcome = converge_custom_resource(
            &store,
            "sonataflow-infra",
            "cluster-platform",
            cluster_platform_spec(),
        )
        .await
        .unwrap();
        assert_eq!(outcome, Convergence::Unchanged);
        assert_eq!(store.creates(), 1);
        assert_eq!(store.updates(), 0);
    }

    #[tokio::test]
    async fn drifted_spec_is_updated_in_place() {
        let store = MockResourceStore::<SonataFlowClusterPlatform>::default();
        let mut drifted = cluster_platform_spec();
        drifted.platform_ref.name = "stale-platform".to_string();
        store.seed("sonataflow-infra", "cluster-platform", drifted);

        let outcome = converge_custom_resource(
            &store,
            "sonataflow-infra",
            "cluster-platform",
            cluster_platform_spec(),
        )
        .await
        .unwrap();
        assert_eq!(outcome, Convergence::Updated);
        assert_eq!(store.creates(), 0);
        assert_eq!(store.updates(), 1);

        let observed = store.observed("sonataflow-infra", "cluster-platform").unwrap();
        assert_eq!(observed.spec.platform_ref.name, "cluster-platform");
    }

    #[tokio::test]
    async fn creation_failure_propagates() {
        let store = MockResourceStore::<SonataFlowClusterPlatform>::default();
        store.fail_next_create();
        assert!(
            converge_custom_resource(
                &store,
                "sonataflow-infra",
                "cluster-platform",
                cluster_platform_spec(),
            )
            .await
            .is_err()
        );
    }
}
