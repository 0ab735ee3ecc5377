//! Core types for the reconciler.

use std::collections::BTreeMap;
use std::fmt;

use kube::ResourceExt;
use serde::{Deserialize, Serialize};
use wildfly_core::{Protocol, Wildfly};

/// Namespaced name identifying a `Wildfly` and the resources derived from it.
///
/// The deployment and the service share the owner's namespace and name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectKey {
    pub namespace: String,
    pub name: String,
}

impl ObjectKey {
    /// Create a new key.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl From<&Wildfly> for ObjectKey {
    fn from(wildfly: &Wildfly) -> Self {
        Self::new(
            wildfly.namespace().unwrap_or_else(|| "default".to_string()),
            wildfly.name_any(),
        )
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Kinds of objects the reconciler reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Wildfly,
    Deployment,
    Service,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Wildfly => "wildfly",
            Self::Deployment => "deployment",
            Self::Service => "service",
        };
        f.write_str(name)
    }
}

/// A port exposed by the server container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerPortBinding {
    pub port: i32,
    pub protocol: Protocol,
}

/// A port exposed by the service.
///
/// `name` is only set for ports the user declared explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicePortBinding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub port: i32,
    pub protocol: Protocol,
}

/// Fully defaulted desired configuration for one `Wildfly`.
///
/// Recomputed from scratch on every pass and never partially applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedConfig {
    /// Desired deployment replicas, never negative.
    pub replicas: i32,
    /// `<image>:<tag>`.
    pub image: String,
    /// Container command.
    pub command: Vec<String>,
    pub container_ports: Vec<ContainerPortBinding>,
    pub service_ports: Vec<ServicePortBinding>,
    /// Pod labels and service selector. Always contains the app label.
    pub labels: BTreeMap<String, String>,
    /// Publish the service as NodePort.
    pub expose_externally: bool,
}

/// The single mutation performed by a reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReconcileAction {
    /// Create the deployment.
    CreateWorkload { key: ObjectKey, replicas: i32 },
    /// Bring the deployment's replica count back to the desired value.
    ScaleWorkload {
        key: ObjectKey,
        from: Option<i32>,
        to: i32,
    },
    /// Create the service.
    CreateService { key: ObjectKey, node_port: bool },
}

impl ReconcileAction {
    /// Get the key this action targets.
    pub const fn key(&self) -> &ObjectKey {
        match self {
            Self::CreateWorkload { key, .. }
            | Self::ScaleWorkload { key, .. }
            | Self::CreateService { key, .. } => key,
        }
    }

    /// Get the kind of resource this action mutates.
    pub const fn kind(&self) -> ResourceKind {
        match self {
            Self::CreateWorkload { .. } | Self::ScaleWorkload { .. } => ResourceKind::Deployment,
            Self::CreateService { .. } => ResourceKind::Service,
        }
    }

    /// Get a description of the action.
    pub fn description(&self) -> String {
        match self {
            Self::CreateWorkload { key, replicas } => {
                format!("create deployment {key} with {replicas} replicas")
            }
            Self::ScaleWorkload { key, from, to } => match from {
                Some(from) => format!("scale deployment {key} from {from} to {to}"),
                None => format!("scale deployment {key} to {to}"),
            },
            Self::CreateService { key, node_port } => {
                let kind = if *node_port { "NodePort" } else { "ClusterIP" };
                format!("create {kind} service {key}")
            }
        }
    }
}

/// Result of one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReconcileOutcome {
    /// The `Wildfly` no longer exists. Owned objects are garbage collected.
    OwnerGone,
    /// Every managed resource matches the desired state.
    Converged,
    /// A mutation was performed; run another pass to verify and continue.
    Requeue(ReconcileAction),
}

impl ReconcileOutcome {
    /// Whether the scheduler should run another pass for the same key.
    pub const fn requeue(&self) -> bool {
        matches!(self, Self::Requeue(_))
    }

    /// The mutation performed by this pass, if any.
    pub const fn action(&self) -> Option<&ReconcileAction> {
        match self {
            Self::Requeue(action) => Some(action),
            Self::OwnerGone | Self::Converged => None,
        }
    }
}
