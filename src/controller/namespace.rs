//! Idempotent namespace existence guarantee

use tracing::info;

use crate::error::Result;
use crate::stores::NamespaceStore;

/// Ensure the namespace exists, creating it if absent.
///
/// At most one creation call is issued per missing namespace per pass;
/// creation failure propagates to the caller rather than being swallowed.
pub async fn ensure_namespace(store: &dyn NamespaceStore, name: &str) -> Result<()> {
    if store.exists(name).await? {
        return Ok(());
    }
    info!("Namespace {} not found, creating", name);
    store.create(name).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::tests::mocks::MockNamespaceStore;

    #[tokio::test]
    async fn creates_missing_namespace_once() {
        let store = MockNamespaceStore::default();
        ensure_namespace(&store, "openshift-serverless").await.unwrap();
        assert_eq!(store.creates(), 1);
        assert!(store.contains("openshift-serverless"));
    }

    #[tokio::test]
    async fn existing_namespace_is_a_no_op() {
        let store = MockNamespaceStore::with_namespaces(&["openshift-serverless"]);
        ensure_namespace(&store, "openshift-serverless").await.unwrap();
        assert_eq!(store.creates(), 0);
    }

    #[tokio::test]
    async fn retrieval_failure_propagates_without_create() {
        let store = MockNamespaceStore::default();
        store.fail_next_exists();
        assert!(ensure_namespace(&store, "openshift-serverless").await.is_err());
        assert_eq!(store.creates(), 0);
    }
}
