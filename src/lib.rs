//! Orchestrator platform operator
//!
//! A Kubernetes operator that converges a serverless workflow platform from a
//! single `Orchestrator` custom resource: it installs the required operators
//! through OLM subscriptions, waits for their CRDs to be established, keeps
//! the platform custom resources at their desired state, and tears everything
//! down in reverse dependency order when the `Orchestrator` is deleted.
//!
//! The convergence logic in [`controller`] is pure over the store traits in
//! [`stores`]; the component registry in [`components`] is the single source
//! of truth for what is managed and in which order.

pub mod components;
pub mod controller;
pub mod crd;
pub mod error;
pub mod labels;
pub mod managed;
pub mod olm;
pub mod stores;

pub use crd::Orchestrator;
pub use error::{Error, Result};
