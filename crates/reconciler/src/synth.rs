//! Resource synthesizers.
//!
//! Pure builders for the deployment and service derived from a
//! [`ResolvedConfig`]. Identical inputs yield identical objects, which keeps
//! repeated passes idempotent.

use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{
    Container, ContainerPort, PodSpec, PodTemplateSpec, Service, ServicePort, ServiceSpec,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta, OwnerReference};
use kube::Resource;
use tracing::debug;
use wildfly_core::{OperatorDefaults, Wildfly};

use crate::error::{Error, Result};
use crate::types::{ObjectKey, ResolvedConfig};

const SERVICE_TYPE_NODE_PORT: &str = "NodePort";

/// Build the controller owner reference pointing at `owner`.
///
/// # Errors
///
/// Returns [`Error::MissingOwnerUid`] if the owner has not been persisted yet.
pub fn owner_reference(owner: &Wildfly) -> Result<OwnerReference> {
    owner
        .controller_owner_ref(&())
        .ok_or_else(|| Error::MissingOwnerUid {
            key: ObjectKey::from(owner),
        })
}

fn object_meta(key: &ObjectKey, owner: &OwnerReference, config: &ResolvedConfig) -> ObjectMeta {
    ObjectMeta {
        name: Some(key.name.clone()),
        namespace: Some(key.namespace.clone()),
        labels: Some(config.labels.clone()),
        owner_references: Some(vec![owner.clone()]),
        ..ObjectMeta::default()
    }
}

/// Build the deployment running the server container.
pub fn synthesize_workload(
    key: &ObjectKey,
    owner: &OwnerReference,
    config: &ResolvedConfig,
    defaults: &OperatorDefaults,
) -> Deployment {
    let container = Container {
        name: defaults.container_name.clone(),
        image: Some(config.image.clone()),
        command: Some(config.command.clone()),
        ports: Some(
            config
                .container_ports
                .iter()
                .map(|p| ContainerPort {
                    container_port: p.port,
                    protocol: Some(p.protocol.as_str().to_string()),
                    ..ContainerPort::default()
                })
                .collect(),
        ),
        ..Container::default()
    };

    Deployment {
        metadata: object_meta(key, owner, config),
        spec: Some(DeploymentSpec {
            replicas: Some(config.replicas),
            selector: LabelSelector {
                match_labels: Some(config.labels.clone()),
                ..LabelSelector::default()
            },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(config.labels.clone()),
                    ..ObjectMeta::default()
                }),
                spec: Some(PodSpec {
                    containers: vec![container],
                    ..PodSpec::default()
                }),
            },
            ..DeploymentSpec::default()
        }),
        ..Deployment::default()
    }
}

/// Build the service selecting the server pods.
pub fn synthesize_service(key: &ObjectKey, owner: &OwnerReference, config: &ResolvedConfig) -> Service {
    let service_type = if config.expose_externally {
        debug!(%key, "Assigning a NodePort to the service for external access");
        Some(SERVICE_TYPE_NODE_PORT.to_string())
    } else {
        None
    };

    Service {
        metadata: object_meta(key, owner, config),
        spec: Some(ServiceSpec {
            selector: Some(config.labels.clone()),
            ports: Some(
                config
                    .service_ports
                    .iter()
                    .map(|p| ServicePort {
                        name: p.name.clone(),
                        port: p.port,
                        protocol: Some(p.protocol.as_str().to_string()),
                        ..ServicePort::default()
                    })
                    .collect(),
            ),
            type_: service_type,
            ..ServiceSpec::default()
        }),
        ..Service::default()
    }
}

/// Replica count of a live deployment.
pub fn workload_replicas(deployment: &Deployment) -> Option<i32> {
    deployment.spec.as_ref().and_then(|spec| spec.replicas)
}
