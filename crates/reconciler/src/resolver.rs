//! Desired-state resolution.
//!
//! Every rule is independent and total: malformed or missing input is
//! defaulted, never rejected.

use std::collections::BTreeMap;

use wildfly_core::{OperatorDefaults, WildflySpec};

use crate::ports::map_ports;
use crate::types::ResolvedConfig;

/// Resolve the desired configuration of the `Wildfly` named `name`.
pub fn resolve(name: &str, spec: &WildflySpec, defaults: &OperatorDefaults) -> ResolvedConfig {
    let ports = map_ports(spec.ports.as_deref(), &defaults.ports);

    ResolvedConfig {
        replicas: resolve_replicas(spec.size, defaults),
        image: format!(
            "{}:{}",
            non_empty(spec.image.as_deref()).unwrap_or(&defaults.image),
            non_empty(spec.version.as_deref()).unwrap_or(&defaults.tag),
        ),
        command: spec
            .cmd
            .clone()
            .unwrap_or_else(|| defaults.command.clone()),
        container_ports: ports.container_ports,
        service_ports: ports.service_ports,
        labels: labels(name, defaults),
        expose_externally: spec.node_port,
    }
}

/// Negative sizes become 1. Zero is a valid scale-to-zero request.
pub const fn resolve_replicas(size: Option<i32>, defaults: &OperatorDefaults) -> i32 {
    match size {
        None => defaults.replicas,
        Some(size) if size < 0 => 1,
        Some(size) => size,
    }
}

/// Labels selecting the pods of the `Wildfly` named `name`.
pub fn labels(name: &str, defaults: &OperatorDefaults) -> BTreeMap<String, String> {
    BTreeMap::from([(defaults.app_label.clone(), name.to_string())])
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
