//! [`ObjectStore`] backed by the Kubernetes API server.

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Service;
use kube::api::{Api, PostParams};
use kube::Client;
use wildfly_core::Wildfly;

use crate::error::{Error, Result};
use crate::store::{ObjectStore, key_of};
use crate::types::{ObjectKey, ResourceKind};

const STATUS_CONFLICT: u16 = 409;

/// Object store talking to the API server through a shared [`Client`].
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
}

impl KubeStore {
    /// Create a store using `client`.
    pub const fn new(client: Client) -> Self {
        Self { client }
    }

    fn api<K>(&self, namespace: &str) -> Api<K>
    where
        K: kube::Resource<Scope = k8s_openapi::NamespaceResourceScope>,
        <K as kube::Resource>::DynamicType: Default,
    {
        Api::namespaced(self.client.clone(), namespace)
    }
}

fn is_conflict(err: &kube::Error) -> bool {
    matches!(err, kube::Error::Api(response) if response.code == STATUS_CONFLICT)
}

fn create_error(kind: ResourceKind, key: &ObjectKey, err: &kube::Error) -> Error {
    if is_conflict(err) {
        Error::already_exists(kind, key)
    } else {
        Error::create_failed(kind, key, err.to_string())
    }
}

fn update_error(kind: ResourceKind, key: &ObjectKey, err: &kube::Error) -> Error {
    if is_conflict(err) {
        Error::conflict(kind, key)
    } else {
        Error::update_failed(kind, key, err.to_string())
    }
}

#[async_trait]
impl ObjectStore for KubeStore {
    async fn get_wildfly(&self, key: &ObjectKey) -> Result<Option<Wildfly>> {
        self.api::<Wildfly>(&key.namespace)
            .get_opt(&key.name)
            .await
            .map_err(|e| Error::get_failed(ResourceKind::Wildfly, key, e.to_string()))
    }

    async fn get_deployment(&self, key: &ObjectKey) -> Result<Option<Deployment>> {
        self.api::<Deployment>(&key.namespace)
            .get_opt(&key.name)
            .await
            .map_err(|e| Error::get_failed(ResourceKind::Deployment, key, e.to_string()))
    }

    async fn create_deployment(&self, deployment: &Deployment) -> Result<()> {
        let key = key_of(&deployment.metadata);
        self.api::<Deployment>(&key.namespace)
            .create(&PostParams::default(), deployment)
            .await
            .map(|_| ())
            .map_err(|e| create_error(ResourceKind::Deployment, &key, &e))
    }

    async fn update_deployment(&self, deployment: &Deployment) -> Result<()> {
        let key = key_of(&deployment.metadata);
        self.api::<Deployment>(&key.namespace)
            .replace(&key.name, &PostParams::default(), deployment)
            .await
            .map(|_| ())
            .map_err(|e| update_error(ResourceKind::Deployment, &key, &e))
    }

    async fn get_service(&self, key: &ObjectKey) -> Result<Option<Service>> {
        self.api::<Service>(&key.namespace)
            .get_opt(&key.name)
            .await
            .map_err(|e| Error::get_failed(ResourceKind::Service, key, e.to_string()))
    }

    async fn create_service(&self, service: &Service) -> Result<()> {
        let key = key_of(&service.metadata);
        self.api::<Service>(&key.namespace)
            .create(&PostParams::default(), service)
            .await
            .map(|_| ())
            .map_err(|e| create_error(ResourceKind::Service, &key, &e))
    }
}

#[cfg(test)]
mod tests {
    use kube::error::ErrorResponse;

    use super::*;

    fn api_error(code: u16) -> kube::Error {
        kube::Error::Api(ErrorResponse {
            status: "Failure".to_string(),
            message: "boom".to_string(),
            reason: String::new(),
            code,
        })
    }

    #[test]
    fn test_conflict_on_create_is_already_exists() {
        let key = ObjectKey::new("apps", "web");
        let err = create_error(ResourceKind::Service, &key, &api_error(409));
        assert_eq!(err, Error::already_exists(ResourceKind::Service, &key));
    }

    #[test]
    fn test_conflict_on_update_is_conflict() {
        let key = ObjectKey::new("apps", "web");
        let err = update_error(ResourceKind::Deployment, &key, &api_error(409));
        assert_eq!(err, Error::conflict(ResourceKind::Deployment, &key));
    }

    #[test]
    fn test_other_api_errors_keep_reason() {
        let key = ObjectKey::new("apps", "web");
        let err = update_error(ResourceKind::Deployment, &key, &api_error(500));
        assert!(matches!(err, Error::UpdateFailed { ref reason, .. } if reason.contains("boom")));
    }
}
