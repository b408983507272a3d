//! Central error types for the orchestrator operator
//!
//! Uses `thiserror` for ergonomic, type-safe error handling with
//! automatic `Display` and `Error` trait implementations.
//!
//! "Not found" is deliberately absent from this enum: stores report absence
//! as data (`false` / `None`) because absence is an expected control-flow
//! signal that drives the creation path, never a failure.

use thiserror::Error;

/// Central error type for the orchestrator operator
#[derive(Error, Debug)]
pub enum Error {
    /// Kubernetes API error from kube-rs (transient: network, store unavailability)
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    /// Optimistic-concurrency conflict on update (HTTP 409).
    /// The whole convergence pass must be re-run; never patch-and-retry in place.
    #[error("conflicting concurrent update of {kind}/{name} in namespace {namespace}")]
    Conflict {
        kind: String,
        name: String,
        namespace: String,
    },

    /// Finalizer-related error during cleanup
    #[error("Finalizer error: {0}")]
    FinalizerError(String),

    /// Malformed desired specification (e.g. an unparseable resource quantity).
    /// Fatal: surfaced immediately, not retried blindly.
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// The caller's cancellation signal fired while a store call was in flight
    #[error("convergence pass canceled")]
    Canceled,
}

/// Result type alias for operator operations
pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Check if this error type should trigger a retry of the whole pass
    pub fn is_retriable(&self) -> bool {
        matches!(self, Error::KubeError(_) | Error::Conflict { .. })
    }

    /// Convert to a human-readable message for status updates
    pub fn status_message(&self) -> String {
        match self {
            Error::KubeError(e) => format!("Kubernetes error: {}", e),
            Error::Conflict { kind, name, .. } => {
                format!("Concurrent update of {}/{}, pass will be retried", kind, name)
            }
            Error::ValidationError(msg) => format!("Validation failed: {}", msg),
            _ => self.to_string(),
        }
    }
}

// Implement From for kube::runtime::finalizer::Error to enable ? operator
impl From<kube::runtime::finalizer::Error<Error>> for Error {
    fn from(e: kube::runtime::finalizer::Error<Error>) -> Self {
        Error::FinalizerError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_is_retriable() {
        let err = Error::Conflict {
            kind: "Subscription".to_string(),
            name: "serverless-operator".to_string(),
            namespace: "openshift-serverless".to_string(),
        };
        assert!(err.is_retriable());
        assert!(err.to_string().contains("serverless-operator"));
    }

    #[test]
    fn validation_and_cancellation_are_not_retriable() {
        assert!(!Error::ValidationError("bad quantity".to_string()).is_retriable());
        assert!(!Error::Canceled.is_retriable());
    }
}
