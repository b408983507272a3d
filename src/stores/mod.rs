//! Collaborator contracts for the external resource store
//!
//! Convergence logic never talks to the Kubernetes API directly; it goes
//! through these narrow traits. The production implementations in
//! [`kube_stores`] are thin adapters over `kube::Api`; tests substitute
//! counting in-memory fakes. Absence is reported as data (`false` / `None`),
//! never as an error.

use std::sync::Arc;

use async_trait::async_trait;

use crate::components::SubscriptionDescriptor;
use crate::error::Result;
use crate::managed::{
    KnativeEventing, KnativeServing, ManagedResourceKind, SonataFlowClusterPlatform,
    SonataFlowPlatform,
};
use crate::olm::Subscription;

mod kube_stores;

pub use kube_stores::{
    KubeNamespaceStore, KubeResourceStore, KubeSchemaStore, KubeSubscriptionStore,
};

/// Namespace existence and lifecycle primitives
#[async_trait]
pub trait NamespaceStore: Send + Sync {
    /// Whether the namespace exists
    async fn exists(&self, name: &str) -> Result<bool>;
    /// Create the namespace; failure propagates to the caller
    async fn create(&self, name: &str) -> Result<()>;
    /// Delete the namespace, cascading everything scoped to it.
    /// Deleting an absent namespace is a no-op.
    async fn delete(&self, name: &str) -> Result<()>;
}

/// Operator install-intent primitives
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Fetch the observed subscription, or `None` if absent
    async fn get(&self, descriptor: &SubscriptionDescriptor) -> Result<Option<Subscription>>;
    /// Declare install intent: operator-group prerequisite plus subscription
    async fn install(&self, descriptor: &SubscriptionDescriptor) -> Result<()>;
    /// Replace the observed subscription's spec in place, preserving its
    /// version token. A concurrent modification surfaces as a conflict.
    async fn update_spec(
        &self,
        observed: Subscription,
        desired: crate::olm::SubscriptionSpec,
    ) -> Result<()>;
    /// Delete the subscription and its install record (CSV).
    /// Both deletions are no-ops on absence.
    async fn delete_with_install_record(&self, descriptor: &SubscriptionDescriptor) -> Result<()>;
}

/// Schema-definition (CRD) existence checks
#[async_trait]
pub trait SchemaStore: Send + Sync {
    /// Whether the named CRD exists and is established. The scope namespace
    /// is diagnostic only; CRDs themselves are cluster-scoped.
    async fn exists(&self, schema_name: &str, scope_namespace: &str) -> Result<bool>;
}

/// Typed access to one managed custom-resource kind
#[async_trait]
pub trait ResourceStore<K: ManagedResourceKind>: Send + Sync {
    /// Fetch by fixed identity, or `None` if absent
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<K>>;
    /// Create the canonical object; failure propagates to the caller
    async fn create(&self, object: &K) -> Result<()>;
    /// Replace the observed object. A concurrent modification surfaces
    /// as a conflict.
    async fn update(&self, object: &K) -> Result<()>;
}

/// The full set of store handles a convergence pass operates on
#[derive(Clone)]
pub struct Stores {
    pub namespaces: Arc<dyn NamespaceStore>,
    pub subscriptions: Arc<dyn SubscriptionStore>,
    pub schemas: Arc<dyn SchemaStore>,
    pub eventing: Arc<dyn ResourceStore<KnativeEventing>>,
    pub serving: Arc<dyn ResourceStore<KnativeServing>>,
    pub cluster_platforms: Arc<dyn ResourceStore<SonataFlowClusterPlatform>>,
    pub platforms: Arc<dyn ResourceStore<SonataFlowPlatform>>,
}

impl Stores {
    /// Production wiring: every store backed by the one kube client
    pub fn kube(client: kube::Client) -> Self {
        Self {
            namespaces: Arc::new(KubeNamespaceStore::new(client.clone())),
            subscriptions: Arc::new(KubeSubscriptionStore::new(client.clone())),
            schemas: Arc::new(KubeSchemaStore::new(client.clone())),
            eventing: Arc::new(KubeResourceStore::new(client.clone())),
            serving: Arc::new(KubeResourceStore::new(client.clone())),
            cluster_platforms: Arc::new(KubeResourceStore::new(client.clone())),
            platforms: Arc::new(KubeResourceStore::new(client)),
        }
    }
}
