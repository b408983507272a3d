//! Shared types for the Orchestrator specification
//!
//! These types are used across the CRD definition and the convergence logic.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// PostgreSQL connection settings for the workflow platform services
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PostgresConfig {
    /// Name of the PostgreSQL Service
    pub service_name: String,
    /// Namespace of the PostgreSQL Service
    pub service_namespace: String,
    /// Database name used by the platform services
    pub database_name: String,
    /// Secret holding the database credentials
    pub auth_secret: AuthSecretRef,
}

/// Reference to the keys of an existing credentials Secret
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthSecretRef {
    /// Name of the Secret
    pub secret_name: String,
    /// Key within the Secret holding the username
    pub user_key: String,
    /// Key within the Secret holding the password
    pub password_key: String,
}

/// Workflow platform tuning
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlatformConfig {
    /// Resource requirements applied to the platform's build template
    #[serde(default)]
    pub resources: ResourceRequirements,
}

/// Kubernetes-style resource requirements
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRequirements {
    /// Minimum resources requested
    pub requests: ResourceSpec,
    /// Maximum resources allowed
    pub limits: ResourceSpec,
}

impl Default for ResourceRequirements {
    fn default() -> Self {
        Self {
            requests: ResourceSpec {
                cpu: "250m".to_string(),
                memory: "64Mi".to_string(),
            },
            limits: ResourceSpec {
                cpu: "500m".to_string(),
                memory: "1Gi".to_string(),
            },
        }
    }
}

impl ResourceRequirements {
    /// Reject malformed quantity strings before they reach the API server
    pub fn validate(&self) -> Result<(), String> {
        for (field, value) in [
            ("requests.cpu", &self.requests.cpu),
            ("requests.memory", &self.requests.memory),
            ("limits.cpu", &self.limits.cpu),
            ("limits.memory", &self.limits.memory),
        ] {
            validate_quantity(value).map_err(|e| format!("platform.resources.{}: {}", field, e))?;
        }
        Ok(())
    }
}

/// Resource specification for CPU and memory
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct ResourceSpec {
    /// CPU cores (e.g., "250m", "2")
    pub cpu: String,
    /// Memory (e.g., "64Mi", "1Gi")
    pub memory: String,
}

/// Check that a string is a well-formed Kubernetes resource quantity:
/// a non-negative decimal number with an optional SI or binary suffix.
pub fn validate_quantity(value: &str) -> Result<(), String> {
    // Binary suffixes before their one-letter SI prefixes so "Gi" wins over "G"
    const SUFFIXES: [&str; 11] = ["Ki", "Mi", "Gi", "Ti", "Pi", "m", "k", "M", "G", "T", "P"];

    if value.is_empty() {
        return Err("quantity must not be empty".to_string());
    }

    let number = SUFFIXES
        .iter()
        .find(|s| value.len() > s.len() && value.ends_with(*s))
        .map_or(value, |s| &value[..value.len() - s.len()]);

    // f64 parsing accepts "inf"/"NaN"; neither is a quantity
    if number.is_empty()
        || number.starts_with('-')
        || number.starts_with('+')
        || !number.parse::<f64>().is_ok_and(f64::is_finite)
    {
        return Err(format!("'{}' is not a valid resource quantity", value));
    }
    Ok(())
}

/// A single status condition, mirroring the Kubernetes condition convention
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Condition type (e.g. "Ready")
    #[serde(rename = "type")]
    pub type_: String,
    /// "True", "False", or "Unknown"
    pub status: String,
    /// RFC 3339 timestamp of the last transition
    pub last_transition_time: String,
    /// Machine-readable reason
    pub reason: String,
    /// Human-readable detail
    pub message: String,
}

impl Condition {
    /// Build a Ready condition
    pub fn ready(is_ready: bool, reason: &str, message: &str) -> Self {
        Self {
            type_: "Ready".to_string(),
            status: if is_ready { "True" } else { "False" }.to_string(),
            last_transition_time: chrono::Utc::now().to_rfc3339(),
            reason: reason.to_string(),
            message: message.to_string(),
        }
    }
}
