//! Port/protocol mapping.
//!
//! Turns the declared `(port, protocol hint)` list into container and service
//! port bindings. Hints are matched as case-insensitive substrings, `tcp`
//! before `udp`; anything else, including a missing hint, binds TCP.

use itertools::Itertools;
use tracing::debug;
use wildfly_core::{PortDefault, Protocol, WildflyPortProto};

use crate::types::{ContainerPortBinding, ServicePortBinding};

/// Container and service bindings derived from one port list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortMapping {
    pub container_ports: Vec<ContainerPortBinding>,
    pub service_ports: Vec<ServicePortBinding>,
}

impl PortMapping {
    /// Express the container bindings as declared ports with canonical hints.
    pub fn as_hints(&self) -> Vec<WildflyPortProto> {
        self.container_ports
            .iter()
            .map(|binding| WildflyPortProto::new(binding.port, binding.protocol.as_str()))
            .collect_vec()
    }
}

/// Resolve a protocol hint.
pub fn protocol_from_hint(hint: Option<&str>) -> Protocol {
    let normalized = hint.map(str::to_ascii_lowercase).unwrap_or_default();
    if normalized.contains("tcp") {
        Protocol::Tcp
    } else if normalized.contains("udp") {
        Protocol::Udp
    } else {
        debug!(hint = ?hint, "No matching protocol found, using TCP as default");
        Protocol::Tcp
    }
}

/// Map declared ports to bindings, falling back to `defaults` when none are declared.
///
/// Declared ports keep their order and get a `port-<n>` service port name.
/// Default ports stay unnamed.
pub fn map_ports(declared: Option<&[WildflyPortProto]>, defaults: &[PortDefault]) -> PortMapping {
    match declared.filter(|ports| !ports.is_empty()) {
        Some(ports) => {
            let bindings = ports
                .iter()
                .map(|p| (p.port, protocol_from_hint(p.protocol.as_deref())))
                .collect_vec();
            let mapping = PortMapping {
                container_ports: bindings
                    .iter()
                    .map(|&(port, protocol)| ContainerPortBinding { port, protocol })
                    .collect_vec(),
                service_ports: bindings
                    .iter()
                    .map(|&(port, protocol)| ServicePortBinding {
                        name: Some(format!("port-{port}")),
                        port,
                        protocol,
                    })
                    .collect_vec(),
            };
            debug!(ports = ?mapping.container_ports, "Completed loading ports");
            mapping
        }
        None => PortMapping {
            container_ports: defaults
                .iter()
                .map(|d| ContainerPortBinding {
                    port: d.port,
                    protocol: d.protocol,
                })
                .collect_vec(),
            service_ports: defaults
                .iter()
                .map(|d| ServicePortBinding {
                    name: None,
                    port: d.port,
                    protocol: d.protocol,
                })
                .collect_vec(),
        },
    }
}
