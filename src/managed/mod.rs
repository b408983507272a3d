//! Managed custom-resource kinds and their desired-state builders
//!
//! One typed model per kind the operator keeps converged: the two Knative
//! steady-state resources and the two SonataFlow platform resources. Desired
//! specifications are rebuilt from the Orchestrator spec on every pass by the
//! pure builder functions here; nothing is cached between passes.
//!
//! Each kind implements [`ManagedResourceKind`], the small capability surface
//! the generic convergence logic needs: construct the canonical object, read
//! and replace the spec, and compare two specs structurally. Comparators are
//! explicit per kind so that representation noise (an absent map vs an empty
//! one) can never masquerade as drift.

use std::collections::BTreeMap;

use kube::CustomResource;
use kube::api::ObjectMeta;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

use crate::crd::OrchestratorSpec;
use crate::labels::standard_labels;

/// Capability surface of one managed kind, used by the generic convergence
pub trait ManagedResourceKind:
    kube::Resource<DynamicType = (), Scope = k8s_openapi::NamespaceResourceScope>
    + Clone
    + std::fmt::Debug
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
    type DesiredSpec: Clone + std::fmt::Debug + Send + Sync;

    /// Build the canonical object: fixed identity, standard labels, desired spec
    fn canonical(name: &str, namespace: &str, spec: Self::DesiredSpec) -> Self;

    /// The observed specification
    fn spec(&self) -> &Self::DesiredSpec;

    /// Replace the specification, preserving identity and version token
    fn set_spec(&mut self, spec: Self::DesiredSpec);

    /// Structural equality between observed and desired specification
    fn specs_equal(observed: &Self::DesiredSpec, desired: &Self::DesiredSpec) -> bool;
}

fn canonical_meta(name: &str, namespace: &str) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        namespace: Some(namespace.to_string()),
        labels: Some(standard_labels()),
        ..Default::default()
    }
}

// ============================================================================
// Knative
// ============================================================================

/// Steady-state Knative eventing configuration; operator defaults throughout
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "operator.knative.dev",
    version = "v1beta1",
    kind = "KnativeEventing",
    namespaced
)]
pub struct KnativeEventingSpec {}

/// Steady-state Knative serving configuration; operator defaults throughout
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "operator.knative.dev",
    version = "v1beta1",
    kind = "KnativeServing",
    namespaced
)]
pub struct KnativeServingSpec {}

impl ManagedResourceKind for KnativeEventing {
    type DesiredSpec = KnativeEventingSpec;

    fn canonical(name: &str, namespace: &str, spec: Self::DesiredSpec) -> Self {
        let mut cr = KnativeEventing::new(name, spec);
        cr.metadata = canonical_meta(name, namespace);
        cr
    }

    fn spec(&self) -> &Self::DesiredSpec {
        &self.spec
    }

    fn set_spec(&mut self, spec: Self::DesiredSpec) {
        self.spec = spec;
    }

    fn specs_equal(observed: &Self::DesiredSpec, desired: &Self::DesiredSpec) -> bool {
        observed == desired
    }
}

impl ManagedResourceKind for KnativeServing {
    type DesiredSpec = KnativeServingSpec;

    fn canonical(name: &str, namespace: &str, spec: Self::DesiredSpec) -> Self {
        let mut cr = KnativeServing::new(name, spec);
        cr.metadata = canonical_meta(name, namespace);
        cr
    }

    fn spec(&self) -> &Self::DesiredSpec {
        &self.spec
    }

    fn set_spec(&mut self, spec: Self::DesiredSpec) {
        self.spec = spec;
    }

    fn specs_equal(observed: &Self::DesiredSpec, desired: &Self::DesiredSpec) -> bool {
        observed == desired
    }
}

// ============================================================================
// SonataFlow
// ============================================================================

/// Cluster-scoped pointer to the active workflow platform
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "sonataflow.org",
    version = "v1alpha08",
    kind = "SonataFlowClusterPlatform",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct SonataFlowClusterPlatformSpec {
    /// The platform instance this cluster platform delegates to
    pub platform_ref: PlatformRef,
}

/// Reference to a SonataFlowPlatform instance
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlatformRef {
    pub name: String,
    pub namespace: String,
}

/// Workflow platform configuration: build resources and persistent services
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "sonataflow.org",
    version = "v1alpha08",
    kind = "SonataFlowPlatform",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct SonataFlowPlatformSpec {
    /// Workflow build tuning
    #[serde(default)]
    pub build: BuildPlatformSpec,
    /// Data-index and job services
    #[serde(skip_serializing_if = "Option::is_none")]
    pub services: Option<ServicesPlatformSpec>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BuildPlatformSpec {
    #[serde(default)]
    pub template: BuildTemplate,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BuildTemplate {
    #[serde(default)]
    pub resources: ResourceDemands,
}

/// Wire-format resource requirements (quantity strings keyed by resource name)
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDemands {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limits: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requests: Option<BTreeMap<String, String>>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServicesPlatformSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_index: Option<PlatformServiceSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_service: Option<PlatformServiceSpec>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlatformServiceSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistence: Option<PersistenceOptions>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PersistenceOptions {
    #[serde(rename = "postgresql", skip_serializing_if = "Option::is_none")]
    pub postgresql: Option<PostgresPersistence>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PostgresPersistence {
    pub secret_ref: PostgresSecretRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_ref: Option<PostgresServiceRef>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PostgresSecretRef {
    pub name: String,
    pub user_key: String,
    pub password_key: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PostgresServiceRef {
    pub name: String,
    pub namespace: String,
    pub database_name: String,
}

impl ManagedResourceKind for SonataFlowClusterPlatform {
    type DesiredSpec = SonataFlowClusterPlatformSpec;

    fn canonical(name: &str, namespace: &str, spec: Self::DesiredSpec) -> Self {
        let mut cr = SonataFlowClusterPlatform::new(name, spec);
        cr.metadata = canonical_meta(name, namespace);
        cr
    }

    fn spec(&self) -> &Self::DesiredSpec {
        &self.spec
    }

    fn set_spec(&mut self, spec: Self::DesiredSpec) {
        self.spec = spec;
    }

    fn specs_equal(observed: &Self::DesiredSpec, desired: &Self::DesiredSpec) -> bool {
        observed == desired
    }
}

impl ManagedResourceKind for SonataFlowPlatform {
    type DesiredSpec = SonataFlowPlatformSpec;

    fn canonical(name: &str, namespace: &str, spec: Self::DesiredSpec) -> Self {
        let mut cr = SonataFlowPlatform::new(name, spec);
        cr.metadata = canonical_meta(name, namespace);
        cr
    }

    fn spec(&self) -> &Self::DesiredSpec {
        &self.spec
    }

    fn set_spec(&mut self, spec: Self::DesiredSpec) {
        self.spec = spec;
    }

    fn specs_equal(observed: &Self::DesiredSpec, desired: &Self::DesiredSpec) -> bool {
        platform_specs_equal(observed, desired)
    }
}

/// Structural equality for platform specifications, v1.
///
/// Absent and empty resource maps are the same thing on the wire; comparing
/// them as different would make every pass issue a no-op update forever.
pub fn platform_specs_equal(
    observed: &SonataFlowPlatformSpec,
    desired: &SonataFlowPlatformSpec,
) -> bool {
    fn maps_equal(
        a: &Option<BTreeMap<String, String>>,
        b: &Option<BTreeMap<String, String>>,
    ) -> bool {
        match (a, b) {
            (None, None) => true,
            (Some(m), None) | (None, Some(m)) => m.is_empty(),
            (Some(x), Some(y)) => x == y,
        }
    }

    let o = &observed.build.template.resources;
    let d = &desired.build.template.resources;
    maps_equal(&o.limits, &d.limits)
        && maps_equal(&o.requests, &d.requests)
        && observed.services == desired.services
}

// ============================================================================
// Desired-state builders (pure functions of the Orchestrator spec)
// ============================================================================

/// Desired cluster platform spec: a pointer at the singleton platform
pub fn cluster_platform_spec() -> SonataFlowClusterPlatformSpec {
    SonataFlowClusterPlatformSpec {
        platform_ref: PlatformRef {
            name: "cluster-platform".to_string(),
            namespace: "sonataflow-infra".to_string(),
        },
    }
}

/// Desired platform spec: build resources from the Orchestrator's platform
/// config, data-index and job services enabled with PostgreSQL persistence
pub fn platform_spec(orchestrator: &OrchestratorSpec) -> SonataFlowPlatformSpec {
    let resources = &orchestrator.platform.resources;

    let mut limits = BTreeMap::new();
    limits.insert("cpu".to_string(), resources.limits.cpu.clone());
    limits.insert("memory".to_string(), resources.limits.memory.clone());

    let mut requests = BTreeMap::new();
    requests.insert("cpu".to_string(), resources.requests.cpu.clone());
    requests.insert("memory".to_string(), resources.requests.memory.clone());

    let service = PlatformServiceSpec {
        enabled: Some(true),
        persistence: Some(postgres_persistence(orchestrator)),
    };

    SonataFlowPlatformSpec {
        build: BuildPlatformSpec {
            template: BuildTemplate {
                resources: ResourceDemands {
                    limits: Some(limits),
                    requests: Some(requests),
                },
            },
        },
        services: Some(ServicesPlatformSpec {
            data_index: Some(service.clone()),
            job_service: Some(service),
        }),
    }
}

fn postgres_persistence(orchestrator: &OrchestratorSpec) -> PersistenceOptions {
    let postgres = &orchestrator.postgres;
    PersistenceOptions {
        postgresql: Some(PostgresPersistence {
            secret_ref: PostgresSecretRef {
                name: postgres.auth_secret.secret_name.clone(),
                user_key: postgres.auth_secret.user_key.clone(),
                password_key: postgres.auth_secret.password_key.clone(),
            },
            service_ref: Some(PostgresServiceRef {
                name: postgres.service_name.clone(),
                namespace: postgres.service_namespace.clone(),
                database_name: postgres.database_name.clone(),
            }),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::{AuthSecretRef, PlatformConfig, PostgresConfig};

    fn orchestrator_spec() -> OrchestratorSpec {
        OrchestratorSpec {
            postgres: PostgresConfig {
                service_name: "sonataflow-psql".to_string(),
                service_namespace: "sonataflow-infra".to_string(),
                database_name: "sonataflow".to_string(),
                auth_secret: AuthSecretRef {
                    secret_name: "sonataflow-psql-secret".to_string(),
                    user_key: "postgres-username".to_string(),
                    password_key: "postgres-password".to_string(),
                },
            },
            platform: PlatformConfig::default(),
        }
    }

    #[test]
    fn platform_spec_wires_persistence_into_both_services() {
        let spec = platform_spec(&orchestrator_spec());
        let services = spec.services.unwrap();
        for service in [services.data_index.unwrap(), services.job_service.unwrap()] {
            assert_eq!(service.enabled, Some(true));
            let pg = service.persistence.unwrap().postgresql.unwrap();
            assert_eq!(pg.secret_ref.name, "sonataflow-psql-secret");
            assert_eq!(pg.service_ref.unwrap().database_name, "sonataflow");
        }
    }

    #[test]
    fn platform_spec_carries_resource_demands() {
        let spec = platform_spec(&orchestrator_spec());
        let resources = spec.build.template.resources;
        assert_eq!(
            resources.requests.unwrap().get("cpu").map(String::as_str),
            Some("250m")
        );
        assert_eq!(
            resources.limits.unwrap().get("memory").map(String::as_str),
            Some("1Gi")
        );
    }

    #[test]
    fn builders_are_deterministic() {
        let orchestrator = orchestrator_spec();
        assert!(platform_specs_equal(
            &platform_spec(&orchestrator),
            &platform_spec(&orchestrator)
        ));
        assert_eq!(cluster_platform_spec(), cluster_platform_spec());
    }

    #[test]
    fn absent_and_empty_resource_maps_are_equal() {
        let mut observed = platform_spec(&orchestrator_spec());
        let desired = observed.clone();
        observed.build.template.resources.limits = None;
        let mut desired_empty = desired.clone();
        desired_empty.build.template.resources.limits = Some(BTreeMap::new());
        assert!(platform_specs_equal(&observed, &desired_empty));
        assert!(!platform_specs_equal(&observed, &desired));
    }
}
