//! Static registry of the managed platform components
//!
//! Each operator this system installs, together with the custom resources it
//! is responsible for keeping converged, is described once here as an
//! immutable `ComponentDefinition`. The table is ordered: convergence walks
//! it front to back, teardown back to front. Within a component the resource
//! list is ordered too, encoding requires-ready edges (the workflow platform
//! resource must not be created before the cluster platform resource exists).

/// Catalog source every subscription draws from
pub const CATALOG_SOURCE: &str = "redhat-operators";
/// Namespace of the catalog source
pub const CATALOG_SOURCE_NAMESPACE: &str = "openshift-marketplace";

/// Install intent for one operator
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubscriptionDescriptor {
    /// Subscription and package name
    pub name: &'static str,
    /// Namespace the operator is installed into
    pub namespace: &'static str,
    /// Update channel
    pub channel: &'static str,
    /// Pinned starting ClusterServiceVersion, if any
    pub starting_csv: Option<&'static str>,
    /// OperatorGroup created alongside the subscription
    pub operator_group: &'static str,
}

/// The managed custom-resource kinds, one singleton instance each
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ManagedKind {
    KnativeEventing,
    KnativeServing,
    SonataFlowClusterPlatform,
    SonataFlowPlatform,
}

impl ManagedKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ManagedKind::KnativeEventing => "KnativeEventing",
            ManagedKind::KnativeServing => "KnativeServing",
            ManagedKind::SonataFlowClusterPlatform => "SonataFlowClusterPlatform",
            ManagedKind::SonataFlowPlatform => "SonataFlowPlatform",
        }
    }
}

/// One singleton custom resource with its fixed identity and readiness gate
#[derive(Clone, Copy, Debug)]
pub struct ManagedResource {
    pub kind: ManagedKind,
    /// Fixed, well-known instance name
    pub name: &'static str,
    /// Fixed target namespace
    pub namespace: &'static str,
    /// CRD that must exist before this resource may be created
    pub crd_gate: &'static str,
}

/// One externally-installed operator plus its converged custom resources
#[derive(Clone, Copy, Debug)]
pub struct ComponentDefinition {
    pub name: &'static str,
    pub subscription: SubscriptionDescriptor,
    /// Converged in order; a deferred entry defers everything after it
    pub resources: &'static [ManagedResource],
    /// Namespaces deleted (cascading) on teardown. CRDs are never removed:
    /// consumers outside this operator's control may depend on them.
    pub owned_namespaces: &'static [&'static str],
}

/// All managed components, in dependency order
pub const COMPONENTS: [ComponentDefinition; 2] = [
    ComponentDefinition {
        name: "serverless",
        subscription: SubscriptionDescriptor {
            name: "serverless-operator",
            namespace: "openshift-serverless",
            channel: "stable",
            starting_csv: None,
            operator_group: "serverless-operator-group",
        },
        resources: &[
            ManagedResource {
                kind: ManagedKind::KnativeEventing,
                name: "knative-eventing",
                namespace: "knative-eventing",
                crd_gate: "knativeeventings.operator.knative.dev",
            },
            ManagedResource {
                kind: ManagedKind::KnativeServing,
                name: "knative-serving",
                namespace: "knative-serving",
                crd_gate: "knativeservings.operator.knative.dev",
            },
        ],
        owned_namespaces: &["knative-eventing", "knative-serving"],
    },
    ComponentDefinition {
        name: "serverless-logic",
        subscription: SubscriptionDescriptor {
            name: "logic-operator-rhel8",
            namespace: "openshift-serverless-logic",
            channel: "alpha",
            starting_csv: Some("logic-operator-rhel8.v1.34.0"),
            operator_group: "openshift-serverless-logic-group",
        },
        resources: &[
            ManagedResource {
                kind: ManagedKind::SonataFlowClusterPlatform,
                name: "cluster-platform",
                namespace: "sonataflow-infra",
                crd_gate: "sonataflowclusterplatforms.sonataflow.org",
            },
            ManagedResource {
                kind: ManagedKind::SonataFlowPlatform,
                name: "sonataflow-platform",
                namespace: "sonataflow-infra",
                crd_gate: "sonataflowplatforms.sonataflow.org",
            },
        ],
        owned_namespaces: &["sonataflow-infra"],
    },
];
