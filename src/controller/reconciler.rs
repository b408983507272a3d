//! Convergence pass and controller loop for the Orchestrator CRD
//!
//! The pass walks the component registry in dependency order: namespace,
//! subscription, then each gated custom resource. All state is re-derived
//! from the stores on every pass; nothing is remembered between invocations,
//! which is what makes the machine recoverable after a crash. The kube
//! controller runtime below is only the level-triggered scheduler around it.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use kube::{
    api::{Api, Patch, PatchParams},
    client::Client,
    runtime::{
        controller::{Action, Controller},
        finalizer::{Event as FinalizerEvent, finalizer},
        watcher::Config,
    },
    ResourceExt,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::components::{COMPONENTS, ComponentDefinition, ManagedKind};
use crate::crd::{Condition, Orchestrator, OrchestratorSpec};
use crate::error::{Error, Result};
use crate::managed::{self, KnativeEventingSpec, KnativeServingSpec};
use crate::stores::Stores;

use super::custom_resource::{Convergence, converge_custom_resource};
use super::gate::{GateStatus, crd_readiness};
use super::metrics;
use super::namespace::ensure_namespace;
use super::subscription::converge_subscription;
use super::teardown::teardown;

/// Finalizer guarding teardown of the managed components
pub const ORCHESTRATOR_FINALIZER: &str = "orchestrator.parodos.dev/platform-cleanup";

/// Shared state for the controller
pub struct ControllerState {
    pub client: Client,
    pub stores: Stores,
    /// Cancellation signal handed into every pass; aborts in-flight store calls
    pub shutdown: CancellationToken,
}

/// Result of one convergence pass
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassOutcome {
    /// Every component is at its desired state
    Converged,
    /// At least one custom resource is deferred behind a readiness gate
    Deferred,
}

/// Race a store operation against the caller's cancellation signal
pub(super) async fn guarded<T>(
    cancel: &CancellationToken,
    operation: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Canceled),
        result = operation => result,
    }
}

/// Run one full convergence pass over all managed components.
///
/// Desired state is recomputed from the Orchestrator spec and every observed
/// object is fetched fresh; no decision is made from cached state.
pub async fn run_pass(
    stores: &Stores,
    orchestrator: &OrchestratorSpec,
    cancel: &CancellationToken,
) -> Result<PassOutcome> {
    // Fatal configuration problems surface before any store mutation
    orchestrator.validate().map_err(Error::ValidationError)?;

    let mut outcome = PassOutcome::Converged;
    for component in &COMPONENTS {
        if converge_component(stores, component, orchestrator, cancel).await?
            == PassOutcome::Deferred
        {
            outcome = PassOutcome::Deferred;
        }
    }

    metrics::PASSES.inc();
    Ok(outcome)
}

async fn converge_component(
    stores: &Stores,
    component: &ComponentDefinition,
    orchestrator: &OrchestratorSpec,
    cancel: &CancellationToken,
) -> Result<PassOutcome> {
    debug!("Converging component {}", component.name);

    guarded(
        cancel,
        ensure_namespace(&*stores.namespaces, component.subscription.namespace),
    )
    .await?;

    let subscription_outcome = guarded(
        cancel,
        converge_subscription(&*stores.subscriptions, &component.subscription),
    )
    .await?;
    record(component, "subscription", subscription_outcome);

    // Resources are ordered by their requires-ready edges: once one defers,
    // everything after it in the list defers with it.
    let mut deferred = false;
    for resource in component.resources {
        if deferred {
            debug!(
                "Deferring {} {}/{}: earlier resource not ready",
                resource.kind.as_str(),
                resource.namespace,
                resource.name
            );
            continue;
        }

        let gate = guarded(
            cancel,
            crd_readiness(
                &*stores.schemas,
                resource.crd_gate,
                component.subscription.namespace,
            ),
        )
        .await?;
        if gate == GateStatus::NotReady {
            info!(
                "CRD {} not ready, deferring {} {}/{}",
                resource.crd_gate,
                resource.kind.as_str(),
                resource.namespace,
                resource.name
            );
            deferred = true;
            continue;
        }

        guarded(cancel, ensure_namespace(&*stores.namespaces, resource.namespace)).await?;

        let outcome = match resource.kind {
            ManagedKind::KnativeEventing => {
                guarded(
                    cancel,
                    converge_custom_resource(
                        &*stores.eventing,
                        resource.namespace,
                        resource.name,
                        KnativeEventingSpec::default(),
                    ),
                )
                .await?
            }
            ManagedKind::KnativeServing => {
                guarded(
                    cancel,
                    converge_custom_resource(
                        &*stores.serving,
                        resource.namespace,
                        resource.name,
                        KnativeServingSpec::default(),
                    ),
                )
                .await?
            }
            ManagedKind::SonataFlowClusterPlatform => {
                guarded(
                    cancel,
                    converge_custom_resource(
                        &*stores.cluster_platforms,
                        resource.namespace,
                        resource.name,
                        managed::cluster_platform_spec(),
                    ),
                )
                .await?
            }
            ManagedKind::SonataFlowPlatform => {
                guarded(
                    cancel,
                    converge_custom_resource(
                        &*stores.platforms,
                        resource.namespace,
                        resource.name,
                        managed::platform_spec(orchestrator),
                    ),
                )
                .await?
            }
        };
        record(component, resource.kind.as_str(), outcome);
    }

    Ok(if deferred {
        PassOutcome::Deferred
    } else {
        PassOutcome::Converged
    })
}

fn record(component: &ComponentDefinition, what: &str, outcome: Convergence) {
    match outcome {
        Convergence::Created => {
            metrics::record_outcome(component.name, "created");
            info!("Created {} for component {}", what, component.name);
        }
        Convergence::Updated => {
            metrics::record_outcome(component.name, "updated");
            info!("Updated {} for component {}", what, component.name);
        }
        Convergence::Unchanged => {}
    }
}

// ============================================================================
// Controller loop (level-triggered scheduler around the pass)
// ============================================================================

/// Main entry point to start the controller
pub async fn run_controller(state: Arc<ControllerState>) -> Result<()> {
    let orchestrators: Api<Orchestrator> = Api::all(state.client.clone());

    info!("Starting Orchestrator controller");

    // Verify the parent CRD exists before watching it
    if let Err(e) = orchestrators.list(&Default::default()).await {
        error!(
            "Orchestrator CRD not found. Please install the CRD first: {:?}",
            e
        );
        return Err(Error::ValidationError(
            "Orchestrator CRD not installed".to_string(),
        ));
    }

    Controller::new(orchestrators, Config::default())
        .shutdown_on_signal()
        .run(reconcile, error_policy, state)
        .for_each(|res| async move {
            match res {
                Ok(obj) => debug!("Reconciled: {:?}", obj),
                Err(e) => error!("Reconcile error: {:?}", e),
            }
        })
        .await;

    Ok(())
}

/// The main reconciliation function, re-invoked on every relevant change
/// and on the periodic fallback interval
#[instrument(skip(obj, ctx), fields(name = %obj.name_any(), namespace = obj.namespace()))]
async fn reconcile(obj: Arc<Orchestrator>, ctx: Arc<ControllerState>) -> Result<Action> {
    let namespace = obj.namespace().unwrap_or_else(|| "default".to_string());
    let api: Api<Orchestrator> = Api::namespaced(ctx.client.clone(), &namespace);

    finalizer(&api, ORCHESTRATOR_FINALIZER, obj, |event| async {
        match event {
            FinalizerEvent::Apply(orchestrator) => apply_orchestrator(&ctx, &orchestrator).await,
            FinalizerEvent::Cleanup(orchestrator) => cleanup_orchestrator(&ctx, &orchestrator).await,
        }
    })
    .await
    .map_err(Error::from)
}

/// Converge the platform stack towards the Orchestrator's desired state
async fn apply_orchestrator(ctx: &ControllerState, orchestrator: &Orchestrator) -> Result<Action> {
    info!("Converging platform for Orchestrator {}", orchestrator.name_any());

    match run_pass(&ctx.stores, &orchestrator.spec, &ctx.shutdown).await {
        Ok(PassOutcome::Converged) => {
            update_status(
                ctx,
                orchestrator,
                "Ready",
                "All managed components converged",
                Condition::ready(true, "Converged", "Platform components match desired state"),
            )
            .await?;
            Ok(Action::requeue(Duration::from_secs(300)))
        }
        Ok(PassOutcome::Deferred) => {
            update_status(
                ctx,
                orchestrator,
                "Converging",
                "Waiting for operator schemas to be established",
                Condition::ready(false, "WaitingForSchema", "One or more CRDs not yet ready"),
            )
            .await?;
            Ok(Action::requeue(Duration::from_secs(15)))
        }
        Err(e) => {
            metrics::PASS_FAILURES.inc();
            // Best effort: the pass error is what must surface, not a status
            // write failure on top of it
            if let Err(status_err) = update_status(
                ctx,
                orchestrator,
                "Degraded",
                &e.status_message(),
                Condition::ready(false, "PassFailed", &e.status_message()),
            )
            .await
            {
                warn!("Failed to record degraded status: {}", status_err);
            }
            Err(e)
        }
    }
}

/// Tear down the managed components when the Orchestrator is deleted
async fn cleanup_orchestrator(ctx: &ControllerState, orchestrator: &Orchestrator) -> Result<Action> {
    info!(
        "Tearing down platform for Orchestrator {}",
        orchestrator.name_any()
    );
    teardown(&ctx.stores, &ctx.shutdown).await?;
    Ok(Action::await_change())
}

/// Update the status subresource of an Orchestrator
async fn update_status(
    ctx: &ControllerState,
    orchestrator: &Orchestrator,
    phase: &str,
    message: &str,
    condition: Condition,
) -> Result<()> {
    let namespace = orchestrator.namespace().unwrap_or_else(|| "default".to_string());
    let api: Api<Orchestrator> = Api::namespaced(ctx.client.clone(), &namespace);

    let patch = serde_json::json!({
        "status": {
            "phase": phase,
            "message": message,
            "observedGeneration": orchestrator.metadata.generation,
            "conditions": [condition],
        }
    });
    api.patch_status(
        &orchestrator.name_any(),
        &PatchParams::apply("orchestrator-operator"),
        &Patch::Merge(&patch),
    )
    .await
    .map_err(Error::KubeError)?;

    Ok(())
}

/// Error policy determines how to handle reconciliation errors
fn error_policy(obj: Arc<Orchestrator>, error: &Error, _ctx: Arc<ControllerState>) -> Action {
    error!("Reconciliation error for {}: {:?}", obj.name_any(), error);

    // Conflicts and transient store errors re-run the whole pass promptly;
    // anything else waits for the fallback interval
    let retry_duration = if error.is_retriable() {
        Duration::from_secs(15)
    } else {
        Duration::from_secs(60)
    };

    Action::requeue(retry_duration)
}
