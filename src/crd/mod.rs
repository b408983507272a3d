//! Custom Resource Definitions for the orchestrator operator
//!
//! This module defines the parent Orchestrator CRD whose spec feeds every
//! desired-state builder.

mod orchestrator;
#[cfg(test)]
mod tests;
mod types;

pub use orchestrator::{Orchestrator, OrchestratorSpec, OrchestratorStatus};
pub use types::*;
