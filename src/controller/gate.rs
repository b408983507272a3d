//! CRD readiness gate
//!
//! A managed custom resource must never be created before its CRD is
//! observed to exist. "Not yet there" is not an error: the pass defers the
//! resource and relies on the external trigger to re-run it later.

use tracing::debug;

use crate::error::Result;
use crate::stores::SchemaStore;

/// Three-way gate outcome; genuine retrieval failures propagate as `Err`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateStatus {
    /// The schema exists and is established; downstream creation may proceed
    Ready,
    /// The schema is absent or not yet established; defer, try next pass
    NotReady,
}

/// Check whether the named CRD gating a subscription's resources is ready
pub async fn crd_readiness(
    store: &dyn SchemaStore,
    schema_name: &str,
    scope_namespace: &str,
) -> Result<GateStatus> {
    if store.exists(schema_name, scope_namespace).await? {
        Ok(GateStatus::Ready)
    } else {
        debug!(
            "CRD {} not ready in scope {}, deferring",
            schema_name, scope_namespace
        );
        Ok(GateStatus::NotReady)
    }
}
