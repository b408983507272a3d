//! Subscription convergence: install intent for one operator
//!
//! Absent subscriptions are installed (with their operator-group
//! prerequisite); present ones are updated in place only when the observed
//! specification differs structurally from the desired one. The equality
//! check is what makes repeated passes free of write amplification.

use tracing::{debug, info};

use crate::components::SubscriptionDescriptor;
use crate::error::Result;
use crate::olm::{desired_subscription_spec, subscription_specs_equal};
use crate::stores::SubscriptionStore;

/// What the convergence step did, for logging and metrics
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Convergence {
    Unchanged,
    Created,
    Updated,
}

/// Converge one component's subscription to its desired specification
pub async fn converge_subscription(
    store: &dyn SubscriptionStore,
    descriptor: &SubscriptionDescriptor,
) -> Result<Convergence> {
    let desired = desired_subscription_spec(descriptor);

    let Some(observed) = store.get(descriptor).await? else {
        info!(
            "Subscription {} absent in {}, installing operator",
            descriptor.name, descriptor.namespace
        );
        store.install(descriptor).await?;
        return Ok(Convergence::Created);
    };

    if subscription_specs_equal(&observed.spec, &desired) {
        debug!("Subscription {} already converged", descriptor.name);
        return Ok(Convergence::Unchanged);
    }

    info!(
        "Subscription {} drifted (observed channel {}, desired {}), updating spec",
        descriptor.name, observed.spec.channel, desired.channel
    );
    store.update_spec(observed, desired).await?;
    Ok(Convergence::Updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::COMPONENTS;
    use crate::controller::tests::mocks::MockSubscriptionStore;

    fn descriptor() -> &'static SubscriptionDescriptor {
        &COMPONENTS[0].subscription
    }

    #[tokio::test]
    async fn absent_subscription_is_installed() {
        let store = MockSubscriptionStore::default();
        let outcome = converge_subscription(&store, descriptor()).await.unwrap();
        assert_eq!(outcome, Convergence::Created);
        assert_eq!(store.installs(), 1);
        assert_eq!(store.updates(), 0);
    }

    #[tokio::test]
    async fn converged_subscription_is_untouched() {
        let store = MockSubscriptionStore::default();
        store.seed(descriptor(), desired_subscription_spec(descriptor()));
        let outcome = converge_subscription(&store, descriptor()).await.unwrap();
        assert_eq!(outcome, Convergence::Unchanged);
        assert_eq!(store.installs(), 0);
        assert_eq!(store.updates(), 0);
    }

    #[tokio::test]
    async fn drifted_channel_triggers_spec_update_only() {
        let store = MockSubscriptionStore::default();
        let mut drifted = desired_subscription_spec(descriptor());
        drifted.channel = "alpha".to_string();
        store.seed(descriptor(), drifted);

        let outcome = converge_subscription(&store, descriptor()).await.unwrap();
        assert_eq!(outcome, Convergence::Updated);
        assert_eq!(store.installs(), 0);
        assert_eq!(store.updates(), 1);
        let observed = store.observed(descriptor()).unwrap();
        assert_eq!(observed.spec.channel, "stable");
    }

    #[tokio::test]
    async fn rejected_update_propagates() {
        let store = MockSubscriptionStore::default();
        let mut drifted = desired_subscription_spec(descriptor());
        drifted.channel = "alpha".to_string();
        store.seed(descriptor(), drifted);
        store.fail_next_update_with_conflict();

        let err = converge_subscription(&store, descriptor()).await.unwrap_err();
        assert!(err.is_retriable());
    }
}
