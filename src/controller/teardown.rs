//! Reverse-order teardown of the managed components
//!
//! Components are torn down in reverse registry order. For each component
//! the owned namespaces go first (cascading deletion of the custom resources
//! scoped to them), then the subscription together with its install record.
//! A failure halts the remaining steps for that component; the other
//! components are still attempted, and the first failure is what the caller
//! sees. CRDs are intentionally left behind: consumers outside this
//! operator's control may depend on them.

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::components::{COMPONENTS, ComponentDefinition};
use crate::error::Result;
use crate::stores::Stores;

use super::reconciler::guarded;

/// Tear down everything the managed components own.
///
/// Safe to invoke repeatedly: deleting already-absent namespaces or
/// subscriptions is a no-op. The caller's cancellation signal aborts
/// in-flight deletions, same as during convergence.
pub async fn teardown(stores: &Stores, cancel: &CancellationToken) -> Result<()> {
    let mut first_failure = None;

    for component in COMPONENTS.iter().rev() {
        info!("Tearing down component {}", component.name);
        if let Err(e) = teardown_component(stores, component, cancel).await {
            error!(
                "Teardown of component {} halted: {}",
                component.name, e
            );
            first_failure.get_or_insert(e);
        }
    }

    match first_failure {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

async fn teardown_component(
    stores: &Stores,
    component: &ComponentDefinition,
    cancel: &CancellationToken,
) -> Result<()> {
    // Namespace deletion cascades onto the custom resources inside, so the
    // install record is never removed while resources it governs remain.
    for namespace in component.owned_namespaces {
        guarded(cancel, stores.namespaces.delete(namespace)).await?;
    }

    guarded(
        cancel,
        stores
            .subscriptions
            .delete_with_install_record(&component.subscription),
    )
    .await
}
