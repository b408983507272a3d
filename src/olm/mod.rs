//! Operator Lifecycle Manager API types
//!
//! Typed models of the OLM objects this operator declares install intent
//! with: `Subscription`, its `OperatorGroup` prerequisite, and the
//! `ClusterServiceVersion` install record referenced during teardown.
//! Only the fields this operator reads or writes are modelled.

use std::collections::BTreeMap;

use kube::CustomResource;
use kube::api::ObjectMeta;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::components::{CATALOG_SOURCE, CATALOG_SOURCE_NAMESPACE, SubscriptionDescriptor};
use crate::labels::standard_labels;

/// Declared intent to have a named operator installed
#[derive(CustomResource, Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "operators.coreos.com",
    version = "v1alpha1",
    kind = "Subscription",
    namespaced,
    status = "SubscriptionStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionSpec {
    /// Update channel within the package
    pub channel: String,
    /// Package name
    pub name: String,
    /// Catalog source providing the package
    pub source: String,
    /// Namespace of the catalog source
    pub source_namespace: String,
    /// Pinned version to start from; unset means head of channel
    #[serde(rename = "startingCSV", skip_serializing_if = "Option::is_none")]
    pub starting_csv: Option<String>,
    /// "Automatic" or "Manual"; OLM defaults to Automatic when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_plan_approval: Option<String>,
}

/// Observed subscription state; only the install record reference is used
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionStatus {
    /// Name of the ClusterServiceVersion produced by a completed install
    #[serde(rename = "installedCSV", skip_serializing_if = "Option::is_none")]
    pub installed_csv: Option<String>,
    /// CSV currently being installed or upgraded to
    #[serde(rename = "currentCSV", skip_serializing_if = "Option::is_none")]
    pub current_csv: Option<String>,
}

/// OperatorGroup prerequisite for a namespaced operator install
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "operators.coreos.com",
    version = "v1",
    kind = "OperatorGroup",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct OperatorGroupSpec {
    /// Namespaces the member operators watch; empty means all namespaces
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_namespaces: Option<Vec<String>>,
}

/// Install record (bundle descriptor). Deleted during teardown; the full
/// spec is opaque to this operator.
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "operators.coreos.com",
    version = "v1alpha1",
    kind = "ClusterServiceVersion",
    namespaced
)]
pub struct ClusterServiceVersionSpec {
    #[serde(flatten)]
    pub inner: BTreeMap<String, serde_json::Value>,
}

/// Canonical desired specification for a component's subscription
pub fn desired_subscription_spec(descriptor: &SubscriptionDescriptor) -> SubscriptionSpec {
    SubscriptionSpec {
        channel: descriptor.channel.to_string(),
        name: descriptor.name.to_string(),
        source: CATALOG_SOURCE.to_string(),
        source_namespace: CATALOG_SOURCE_NAMESPACE.to_string(),
        starting_csv: descriptor.starting_csv.map(str::to_string),
        install_plan_approval: Some("Automatic".to_string()),
    }
}

/// Canonical subscription object created on install
pub fn subscription_object(descriptor: &SubscriptionDescriptor) -> Subscription {
    let mut subscription = Subscription::new(descriptor.name, desired_subscription_spec(descriptor));
    subscription.metadata = ObjectMeta {
        name: Some(descriptor.name.to_string()),
        namespace: Some(descriptor.namespace.to_string()),
        labels: Some(standard_labels()),
        ..Default::default()
    };
    subscription
}

/// Canonical operator group created alongside a fresh subscription
pub fn operator_group_object(descriptor: &SubscriptionDescriptor) -> OperatorGroup {
    let mut group = OperatorGroup::new(descriptor.operator_group, OperatorGroupSpec::default());
    group.metadata = ObjectMeta {
        name: Some(descriptor.operator_group.to_string()),
        namespace: Some(descriptor.namespace.to_string()),
        labels: Some(standard_labels()),
        ..Default::default()
    };
    group
}

/// Structural equality for subscription specifications, v1.
///
/// Representation differences that do not change meaning must not trigger
/// updates: an unset starting CSV equals an empty one, and an unset approval
/// mode equals OLM's "Automatic" default.
pub fn subscription_specs_equal(observed: &SubscriptionSpec, desired: &SubscriptionSpec) -> bool {
    fn non_empty(v: &Option<String>) -> Option<&str> {
        v.as_deref().filter(|s| !s.is_empty())
    }
    fn approval(v: &Option<String>) -> &str {
        v.as_deref().unwrap_or("Automatic")
    }

    observed.channel == desired.channel
        && observed.name == desired.name
        && observed.source == desired.source
        && observed.source_namespace == desired.source_namespace
        && non_empty(&observed.starting_csv) == non_empty(&desired.starting_csv)
        && approval(&observed.install_plan_approval) == approval(&desired.install_plan_approval)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::COMPONENTS;

    fn descriptor() -> &'static SubscriptionDescriptor {
        &COMPONENTS[1].subscription
    }

    #[test]
    fn desired_spec_pins_starting_csv_when_declared() {
        let spec = desired_subscription_spec(descriptor());
        assert_eq!(spec.channel, "alpha");
        assert_eq!(
            spec.starting_csv.as_deref(),
            Some("logic-operator-rhel8.v1.34.0")
        );
        assert_eq!(spec.source, "redhat-operators");
    }

    #[test]
    fn comparator_ignores_unset_vs_empty_starting_csv() {
        let desired = desired_subscription_spec(&COMPONENTS[0].subscription);
        let mut observed = desired.clone();
        observed.starting_csv = Some(String::new());
        assert!(subscription_specs_equal(&observed, &desired));
    }

    #[test]
    fn comparator_ignores_defaulted_approval() {
        let desired = desired_subscription_spec(descriptor());
        let mut observed = desired.clone();
        observed.install_plan_approval = None;
        assert!(subscription_specs_equal(&observed, &desired));
    }

    #[test]
    fn comparator_detects_channel_drift() {
        let desired = desired_subscription_spec(descriptor());
        let mut observed = desired.clone();
        observed.channel = "stable".to_string();
        assert!(!subscription_specs_equal(&observed, &desired));
    }

    #[test]
    fn subscription_object_carries_identity_and_labels() {
        let sub = subscription_object(descriptor());
        assert_eq!(sub.metadata.name.as_deref(), Some("logic-operator-rhel8"));
        assert_eq!(
            sub.metadata.namespace.as_deref(),
            Some("openshift-serverless-logic")
        );
        assert!(sub.metadata.labels.is_some());
    }
}
