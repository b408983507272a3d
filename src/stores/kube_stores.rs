//! Kubernetes-backed store implementations
//!
//! Thin adapters from the store traits onto `kube::Api`. Error mapping is
//! uniform: HTTP 404 on reads becomes `found = false`, HTTP 409 on writes
//! becomes [`Error::Conflict`], everything else propagates as a transient
//! Kubernetes error.

use std::marker::PhantomData;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Namespace;
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::api::{Api, DeleteParams, ObjectMeta, PostParams};
use kube::{Client, Resource, ResourceExt};
use tracing::{debug, info, warn};

use crate::components::SubscriptionDescriptor;
use crate::error::{Error, Result};
use crate::labels::standard_labels;
use crate::managed::ManagedResourceKind;
use crate::olm::{
    ClusterServiceVersion, OperatorGroup, Subscription, SubscriptionSpec, operator_group_object,
    subscription_object,
};

use super::{NamespaceStore, ResourceStore, SchemaStore, SubscriptionStore};

fn write_error(e: kube::Error, kind: &str, name: &str, namespace: &str) -> Error {
    match e {
        kube::Error::Api(ae) if ae.code == 409 => Error::Conflict {
            kind: kind.to_string(),
            name: name.to_string(),
            namespace: namespace.to_string(),
        },
        other => Error::KubeError(other),
    }
}

// ============================================================================
// Namespaces
// ============================================================================

/// Namespace store backed by the cluster
pub struct KubeNamespaceStore {
    client: Client,
}

impl KubeNamespaceStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api(&self) -> Api<Namespace> {
        Api::all(self.client.clone())
    }
}

#[async_trait]
impl NamespaceStore for KubeNamespaceStore {
    async fn exists(&self, name: &str) -> Result<bool> {
        match self.api().get(name).await {
            Ok(_) => Ok(true),
            Err(kube::Error::Api(e)) if e.code == 404 => Ok(false),
            Err(e) => Err(Error::KubeError(e)),
        }
    }

    async fn create(&self, name: &str) -> Result<()> {
        let namespace = Namespace {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                labels: Some(standard_labels()),
                ..Default::default()
            },
            ..Default::default()
        };
        self.api()
            .create(&PostParams::default(), &namespace)
            .await
            .map_err(|e| write_error(e, "Namespace", name, ""))?;
        info!("Created namespace {}", name);
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<()> {
        match self.api().delete(name, &DeleteParams::default()).await {
            Ok(_) => info!("Deleted namespace {}", name),
            Err(kube::Error::Api(e)) if e.code == 404 => {
                debug!("Namespace {} not found, already deleted", name);
            }
            Err(e) => return Err(Error::KubeError(e)),
        }
        Ok(())
    }
}

// ============================================================================
// Subscriptions
// ============================================================================

/// Subscription store backed by the cluster's OLM APIs
pub struct KubeSubscriptionStore {
    client: Client,
}

impl KubeSubscriptionStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn subscriptions(&self, namespace: &str) -> Api<Subscription> {
        Api::namespaced(self.client.clone(), namespace)
    }

    async fn ensure_operator_group(&self, descriptor: &SubscriptionDescriptor) -> Result<()> {
        let api: Api<OperatorGroup> = Api::namespaced(self.client.clone(), descriptor.namespace);
        match api.get(descriptor.operator_group).await {
            Ok(_) => Ok(()),
            Err(kube::Error::Api(e)) if e.code == 404 => {
                let group = operator_group_object(descriptor);
                api.create(&PostParams::default(), &group).await.map_err(|e| {
                    write_error(e, "OperatorGroup", descriptor.operator_group, descriptor.namespace)
                })?;
                info!(
                    "Created operator group {} in {}",
                    descriptor.operator_group, descriptor.namespace
                );
                Ok(())
            }
            Err(e) => Err(Error::KubeError(e)),
        }
    }
}

#[async_trait]
impl SubscriptionStore for KubeSubscriptionStore {
    async fn get(&self, descriptor: &SubscriptionDescriptor) -> Result<Option<Subscription>> {
        match self.subscriptions(descriptor.namespace).get(descriptor.name).await {
            Ok(observed) => Ok(Some(observed)),
            Err(kube::Error::Api(e)) if e.code == 404 => Ok(None),
            Err(e) => Err(Error::KubeError(e)),
        }
    }

    async fn install(&self, descriptor: &SubscriptionDescriptor) -> Result<()> {
        self.ensure_operator_group(descriptor).await?;

        let subscription = subscription_object(descriptor);
        self.subscriptions(descriptor.namespace)
            .create(&PostParams::default(), &subscription)
            .await
            .map_err(|e| write_error(e, "Subscription", descriptor.name, descriptor.namespace))?;
        info!(
            "Installed operator via subscription {} in {}",
            descriptor.name, descriptor.namespace
        );
        Ok(())
    }

    async fn update_spec(&self, observed: Subscription, desired: SubscriptionSpec) -> Result<()> {
        let name = observed.name_any();
        let namespace = observed.namespace().unwrap_or_default();

        // Replace only the spec; metadata (and with it the resourceVersion
        // used for optimistic concurrency) rides along untouched.
        let mut updated = observed;
        updated.spec = desired;

        self.subscriptions(&namespace)
            .replace(&name, &PostParams::default(), &updated)
            .await
            .map_err(|e| write_error(e, "Subscription", &name, &namespace))?;
        info!("Updated subscription spec for {} in {}", name, namespace);
        Ok(())
    }

    async fn delete_with_install_record(&self, descriptor: &SubscriptionDescriptor) -> Result<()> {
        let Some(observed) = self.get(descriptor).await? else {
            debug!(
                "Subscription {} not found in {}, already deleted",
                descriptor.name, descriptor.namespace
            );
            return Ok(());
        };

        // The install record outlives the subscription; remove it first so a
        // failure here still leaves the subscription visible for the retry.
        let installed_csv = observed
            .status
            .as_ref()
            .and_then(|s| s.installed_csv.clone());
        if let Some(csv_name) = installed_csv {
            let csvs: Api<ClusterServiceVersion> =
                Api::namespaced(self.client.clone(), descriptor.namespace);
            match csvs.delete(&csv_name, &DeleteParams::default()).await {
                Ok(_) => info!("Deleted install record {}", csv_name),
                Err(kube::Error::Api(e)) if e.code == 404 => {
                    debug!("Install record {} not found, already deleted", csv_name);
                }
                Err(e) => return Err(Error::KubeError(e)),
            }
        } else {
            warn!(
                "Subscription {} has no recorded install, skipping CSV deletion",
                descriptor.name
            );
        }

        match self
            .subscriptions(descriptor.namespace)
            .delete(descriptor.name, &DeleteParams::default())
            .await
        {
            Ok(_) => info!("Deleted subscription {}", descriptor.name),
            Err(kube::Error::Api(e)) if e.code == 404 => {
                debug!("Subscription {} not found, already deleted", descriptor.name);
            }
            Err(e) => return Err(Error::KubeError(e)),
        }
        Ok(())
    }
}

// ============================================================================
// Schema definitions (CRDs)
// ============================================================================

/// CRD existence checks backed by the apiextensions API
pub struct KubeSchemaStore {
    client: Client,
}

impl KubeSchemaStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SchemaStore for KubeSchemaStore {
    async fn exists(&self, schema_name: &str, scope_namespace: &str) -> Result<bool> {
        let api: Api<CustomResourceDefinition> = Api::all(self.client.clone());
        let crd = match api.get(schema_name).await {
            Ok(crd) => crd,
            Err(kube::Error::Api(e)) if e.code == 404 => {
                debug!(
                    "CRD {} (for {}) not found yet",
                    schema_name, scope_namespace
                );
                return Ok(false);
            }
            Err(e) => return Err(Error::KubeError(e)),
        };

        // Present but not yet established counts as absent: instances would
        // still be rejected by the API server.
        let established = crd
            .status
            .as_ref()
            .and_then(|s| s.conditions.as_ref())
            .is_some_and(|conditions| {
                conditions
                    .iter()
                    .any(|c| c.type_ == "Established" && c.status == "True")
            });
        Ok(established)
    }
}

// ============================================================================
// Managed custom resources
// ============================================================================

/// Typed store for one managed custom-resource kind
pub struct KubeResourceStore<K> {
    client: Client,
    _kind: PhantomData<K>,
}

impl<K> KubeResourceStore<K> {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            _kind: PhantomData,
        }
    }
}

#[async_trait]
impl<K: ManagedResourceKind> ResourceStore<K> for KubeResourceStore<K> {
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<K>> {
        let api: Api<K> = Api::namespaced(self.client.clone(), namespace);
        match api.get(name).await {
            Ok(observed) => Ok(Some(observed)),
            Err(kube::Error::Api(e)) if e.code == 404 => Ok(None),
            Err(e) => Err(Error::KubeError(e)),
        }
    }

    async fn create(&self, object: &K) -> Result<()> {
        let name = object.name_any();
        let namespace = object.namespace().unwrap_or_default();
        let api: Api<K> = Api::namespaced(self.client.clone(), &namespace);
        api.create(&PostParams::default(), object)
            .await
            .map_err(|e| write_error(e, K::kind(&()).as_ref(), &name, &namespace))?;
        Ok(())
    }

    async fn update(&self, object: &K) -> Result<()> {
        let name = object.name_any();
        let namespace = object.namespace().unwrap_or_default();
        let api: Api<K> = Api::namespaced(self.client.clone(), &namespace);
        api.replace(&name, &PostParams::default(), object)
            .await
            .map_err(|e| write_error(e, K::kind(&()).as_ref(), &name, &namespace))?;
        Ok(())
    }
}
