//! Controller module for Orchestrator platform convergence
//!
//! This module contains the convergence pass, the per-step convergence
//! logic, teardown, and the controller loop around them.

mod custom_resource;
mod gate;
pub mod metrics;
mod namespace;
mod reconciler;
mod subscription;
mod teardown;

pub use custom_resource::{Convergence, converge_custom_resource};
pub use gate::{GateStatus, crd_readiness};
pub use namespace::ensure_namespace;
pub use reconciler::{
    ControllerState, ORCHESTRATOR_FINALIZER, PassOutcome, run_controller, run_pass,
};
pub use subscription::converge_subscription;
pub use teardown::teardown;
