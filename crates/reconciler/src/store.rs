//! Object store abstraction.
//!
//! The reconciler only ever reads and writes through [`ObjectStore`]. A
//! missing object is `Ok(None)`; every `Err` is a store failure the caller
//! surfaces as retryable.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Service;
use tokio::sync::RwLock;
use wildfly_core::Wildfly;

use crate::error::{Error, Result};
use crate::types::{ObjectKey, ResourceKind};

/// Typed get/create/update by namespaced name.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Get a `Wildfly`.
    async fn get_wildfly(&self, key: &ObjectKey) -> Result<Option<Wildfly>>;

    /// Get a deployment.
    async fn get_deployment(&self, key: &ObjectKey) -> Result<Option<Deployment>>;

    /// Create a deployment. Fails with [`Error::AlreadyExists`] on a name clash.
    async fn create_deployment(&self, deployment: &Deployment) -> Result<()>;

    /// Replace a deployment. Fails with [`Error::Conflict`] if it changed or vanished.
    async fn update_deployment(&self, deployment: &Deployment) -> Result<()>;

    /// Get a service.
    async fn get_service(&self, key: &ObjectKey) -> Result<Option<Service>>;

    /// Create a service. Fails with [`Error::AlreadyExists`] on a name clash.
    async fn create_service(&self, service: &Service) -> Result<()>;
}

/// Key of an object from its metadata. Missing fields map to empty strings,
/// which never match a real key.
pub(crate) fn key_of(meta: &k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta) -> ObjectKey {
    ObjectKey::new(
        meta.namespace.clone().unwrap_or_default(),
        meta.name.clone().unwrap_or_default(),
    )
}

/// Counts of mutating calls, for assertions on pass behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MutationCounts {
    pub deployments_created: u64,
    pub deployments_updated: u64,
    pub services_created: u64,
}

/// In-memory object store.
///
/// Assigns a UID and resource version on write and rejects stale updates the
/// way the API server does. Failures can be injected per operation.
#[derive(Default)]
pub struct InMemoryStore {
    wildflies: RwLock<BTreeMap<ObjectKey, Wildfly>>,
    deployments: RwLock<BTreeMap<ObjectKey, Deployment>>,
    services: RwLock<BTreeMap<ObjectKey, Service>>,
    failures: RwLock<HashSet<(StoreOp, ResourceKind)>>,
    mutations: RwLock<MutationCounts>,
    next_version: AtomicU64,
}

/// Store operation, used to target injected failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Get,
    Create,
    Update,
}

impl InMemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn next_version(&self) -> String {
        self.next_version
            .fetch_add(1, Ordering::Relaxed)
            .wrapping_add(1)
            .to_string()
    }

    /// Insert or replace a `Wildfly`, assigning a UID if it has none.
    pub async fn put_wildfly(&self, mut wildfly: Wildfly) {
        let key = ObjectKey::from(&wildfly);
        if wildfly.metadata.uid.is_none() {
            wildfly.metadata.uid = Some(format!("uid-{}-{}", key.namespace, key.name));
        }
        wildfly.metadata.namespace = Some(key.namespace.clone());
        wildfly.metadata.resource_version = Some(self.next_version());
        self.wildflies.write().await.insert(key, wildfly);
    }

    /// Remove a `Wildfly`. Owned objects stay until a garbage collector removes them.
    pub async fn delete_wildfly(&self, key: &ObjectKey) {
        self.wildflies.write().await.remove(key);
    }

    /// Insert or replace a deployment behind the reconciler's back.
    pub async fn put_deployment(&self, mut deployment: Deployment) {
        deployment.metadata.resource_version = Some(self.next_version());
        let key = key_of(&deployment.metadata);
        self.deployments.write().await.insert(key, deployment);
    }

    /// Make every `op` on `kind` fail until [`InMemoryStore::clear_failures`].
    pub async fn fail_on(&self, op: StoreOp, kind: ResourceKind) {
        self.failures.write().await.insert((op, kind));
    }

    /// Remove all injected failures.
    pub async fn clear_failures(&self) {
        self.failures.write().await.clear();
    }

    /// Mutating calls performed so far.
    pub async fn mutations(&self) -> MutationCounts {
        *self.mutations.read().await
    }

    /// Snapshot of a stored deployment.
    pub async fn deployment(&self, key: &ObjectKey) -> Option<Deployment> {
        self.deployments.read().await.get(key).cloned()
    }

    /// Snapshot of a stored service.
    pub async fn service(&self, key: &ObjectKey) -> Option<Service> {
        self.services.read().await.get(key).cloned()
    }

    async fn count(&self, counter: fn(&mut MutationCounts) -> &mut u64) {
        let mut mutations = self.mutations.write().await;
        let slot = counter(&mut mutations);
        *slot = slot.saturating_add(1);
    }

    async fn check(&self, op: StoreOp, kind: ResourceKind, key: &ObjectKey) -> Result<()> {
        if !self.failures.read().await.contains(&(op, kind)) {
            return Ok(());
        }
        let reason = "injected failure";
        Err(match op {
            StoreOp::Get => Error::get_failed(kind, key, reason),
            StoreOp::Create => Error::create_failed(kind, key, reason),
            StoreOp::Update => Error::update_failed(kind, key, reason),
        })
    }
}

#[async_trait]
impl ObjectStore for InMemoryStore {
    async fn get_wildfly(&self, key: &ObjectKey) -> Result<Option<Wildfly>> {
        self.check(StoreOp::Get, ResourceKind::Wildfly, key).await?;
        Ok(self.wildflies.read().await.get(key).cloned())
    }

    async fn get_deployment(&self, key: &ObjectKey) -> Result<Option<Deployment>> {
        self.check(StoreOp::Get, ResourceKind::Deployment, key).await?;
        Ok(self.deployments.read().await.get(key).cloned())
    }

    async fn create_deployment(&self, deployment: &Deployment) -> Result<()> {
        let key = key_of(&deployment.metadata);
        self.check(StoreOp::Create, ResourceKind::Deployment, &key)
            .await?;

        let mut deployments = self.deployments.write().await;
        if deployments.contains_key(&key) {
            return Err(Error::already_exists(ResourceKind::Deployment, &key));
        }
        let mut stored = deployment.clone();
        stored.metadata.uid = Some(format!("uid-deployment-{key}"));
        stored.metadata.resource_version = Some(self.next_version());
        deployments.insert(key, stored);
        self.count(|m| &mut m.deployments_created).await;
        Ok(())
    }

    async fn update_deployment(&self, deployment: &Deployment) -> Result<()> {
        let key = key_of(&deployment.metadata);
        self.check(StoreOp::Update, ResourceKind::Deployment, &key)
            .await?;

        let mut deployments = self.deployments.write().await;
        let current_version = deployments
            .get(&key)
            .map(|d| d.metadata.resource_version.clone());
        match current_version {
            Some(version) if version == deployment.metadata.resource_version => {
                let mut stored = deployment.clone();
                stored.metadata.resource_version = Some(self.next_version());
                deployments.insert(key, stored);
                self.count(|m| &mut m.deployments_updated).await;
                Ok(())
            }
            _ => Err(Error::conflict(ResourceKind::Deployment, &key)),
        }
    }

    async fn get_service(&self, key: &ObjectKey) -> Result<Option<Service>> {
        self.check(StoreOp::Get, ResourceKind::Service, key).await?;
        Ok(self.services.read().await.get(key).cloned())
    }

    async fn create_service(&self, service: &Service) -> Result<()> {
        let key = key_of(&service.metadata);
        self.check(StoreOp::Create, ResourceKind::Service, &key)
            .await?;

        let mut services = self.services.write().await;
        if services.contains_key(&key) {
            return Err(Error::already_exists(ResourceKind::Service, &key));
        }
        let mut stored = service.clone();
        stored.metadata.uid = Some(format!("uid-service-{key}"));
        stored.metadata.resource_version = Some(self.next_version());
        services.insert(key, stored);
        self.count(|m| &mut m.services_created).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use wildfly_core::WildflySpec;

    use super::*;

    fn deployment(namespace: &str, name: &str) -> Deployment {
        Deployment {
            metadata: ObjectMeta {
                namespace: Some(namespace.to_string()),
                name: Some(name.to_string()),
                ..ObjectMeta::default()
            },
            ..Deployment::default()
        }
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let store = InMemoryStore::new();
        let key = ObjectKey::new("apps", "web");

        assert!(matches!(store.get_wildfly(&key).await, Ok(None)));
        assert!(matches!(store.get_deployment(&key).await, Ok(None)));
        assert!(matches!(store.get_service(&key).await, Ok(None)));
    }

    #[tokio::test]
    async fn test_put_wildfly_assigns_uid() {
        let store = InMemoryStore::new();
        let mut wildfly = Wildfly::new("web", WildflySpec::default());
        wildfly.metadata.namespace = Some("apps".to_string());
        store.put_wildfly(wildfly).await;

        let stored = store
            .get_wildfly(&ObjectKey::new("apps", "web"))
            .await
            .ok()
            .flatten();
        assert!(stored.and_then(|w| w.metadata.uid).is_some());
    }

    #[tokio::test]
    async fn test_duplicate_create_is_rejected() {
        let store = InMemoryStore::new();
        let first = store.create_deployment(&deployment("apps", "web")).await;
        let second = store.create_deployment(&deployment("apps", "web")).await;

        assert!(first.is_ok());
        assert!(matches!(second, Err(Error::AlreadyExists { .. })));
        assert_eq!(store.mutations().await.deployments_created, 1);
    }

    #[tokio::test]
    async fn test_stale_update_conflicts() {
        let store = InMemoryStore::new();
        let key = ObjectKey::new("apps", "web");
        let created = store.create_deployment(&deployment("apps", "web")).await;
        assert!(created.is_ok());

        let read = store.get_deployment(&key).await.ok().flatten();
        assert!(read.is_some());
        let read = read.unwrap_or_default();
        assert!(store.update_deployment(&read).await.is_ok());
        assert!(matches!(
            store.update_deployment(&read).await,
            Err(Error::Conflict { .. })
        ));
        assert_eq!(store.mutations().await.deployments_updated, 1);
    }

    #[tokio::test]
    async fn test_update_missing_conflicts() {
        let store = InMemoryStore::new();
        let result = store.update_deployment(&deployment("apps", "web")).await;
        assert!(matches!(result, Err(Error::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let store = InMemoryStore::new();
        let key = ObjectKey::new("apps", "web");
        store.fail_on(StoreOp::Get, ResourceKind::Service).await;

        assert!(matches!(
            store.get_service(&key).await,
            Err(Error::GetFailed { .. })
        ));
        assert!(store.get_deployment(&key).await.is_ok());

        store.clear_failures().await;
        assert!(store.get_service(&key).await.is_ok());
    }
}
