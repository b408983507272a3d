//! Orchestrator Custom Resource Definition
//!
//! The Orchestrator CRD is the single parent configuration object. Every
//! desired specification the operator converges (subscriptions and the
//! managed custom resources) is derived from it on every pass.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::types::{Condition, PlatformConfig, PostgresConfig};

/// The Orchestrator CRD declares the desired orchestrator platform stack.
///
/// # Example
///
/// ```yaml
/// apiVersion: orchestrator.parodos.dev/v1alpha1
/// kind: Orchestrator
/// metadata:
///   name: orchestrator
/// spec:
///   postgres:
///     serviceName: sonataflow-psql
///     serviceNamespace: sonataflow-infra
///     databaseName: sonataflow
///     authSecret:
///       secretName: sonataflow-psql-secret
///       userKey: postgres-username
///       passwordKey: postgres-password
///   platform:
///     resources:
///       requests:
///         cpu: "250m"
///         memory: "64Mi"
///       limits:
///         cpu: "500m"
///         memory: "1Gi"
/// ```
#[derive(CustomResource, Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "orchestrator.parodos.dev",
    version = "v1alpha1",
    kind = "Orchestrator",
    namespaced,
    status = "OrchestratorStatus",
    shortname = "orch",
    printcolumn = r#"{"name":"Phase","type":"string","jsonPath":".status.phase"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct OrchestratorSpec {
    /// PostgreSQL connection settings consumed by the workflow platform's
    /// data-index and job services
    pub postgres: PostgresConfig,

    /// Workflow platform tuning (build resource requirements)
    #[serde(default)]
    pub platform: PlatformConfig,
}

impl OrchestratorSpec {
    /// Validate the spec before any store mutation is attempted.
    ///
    /// Malformed resource quantities are a fatal configuration error: they
    /// would otherwise be rejected by the API server on every pass with no
    /// way to self-heal.
    pub fn validate(&self) -> Result<(), String> {
        self.platform.resources.validate()?;

        if self.postgres.auth_secret.secret_name.is_empty() {
            return Err("postgres.authSecret.secretName must not be empty".to_string());
        }
        if self.postgres.service_name.is_empty() {
            return Err("postgres.serviceName must not be empty".to_string());
        }
        Ok(())
    }
}

/// Status subresource for the Orchestrator CR
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrchestratorStatus {
    /// Current phase: Converging, Ready, Degraded
    #[serde(default)]
    pub phase: String,

    /// Human-readable detail for the current phase
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Generation most recently acted upon
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,

    /// Per-aspect conditions
    #[serde(default)]
    pub conditions: Vec<Condition>,
}
