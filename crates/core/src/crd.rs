//! `Wildfly` custom resource: the declarative desired state watched by the operator.

use kube::{CustomResource, CustomResourceExt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Desired state of a WildFly application server deployment.
///
/// Every field is optional on the wire. Missing values are filled in by the
/// reconciler from the operator defaults, never written back to the object.
#[derive(CustomResource, Serialize, Deserialize, Debug, Clone, Default, JsonSchema, PartialEq, Eq)]
#[kube(
    group = "wildfly.example.com",
    version = "v1alpha1",
    kind = "Wildfly",
    plural = "wildflies",
    shortname = "wf",
    namespaced,
    status = "WildflyStatus",
    printcolumn = r#"{"name":"Size","type":"integer","jsonPath":".spec.size"}"#,
    printcolumn = r#"{"name":"Version","type":"string","jsonPath":".spec.version"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct WildflySpec {
    /// Number of server replicas. Negative values are treated as 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<i32>,

    /// Container image without tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Image tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Container command. An explicit empty list is kept as-is; only an
    /// absent field falls back to the default start script.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cmd: Option<Vec<String>>,

    /// Exposed ports with protocol hints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ports: Option<Vec<WildflyPortProto>>,

    /// Expose the service on every node (NodePort).
    #[serde(default)]
    pub node_port: bool,
}

/// A declared port and its free-form protocol hint (e.g. "TCP", "udp").
#[derive(Serialize, Deserialize, Debug, Clone, Default, JsonSchema, PartialEq, Eq)]
pub struct WildflyPortProto {
    pub port: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
}

impl WildflyPortProto {
    /// Create a port with a protocol hint.
    pub fn new(port: i32, protocol: impl Into<String>) -> Self {
        Self {
            port,
            protocol: Some(protocol.into()),
        }
    }
}

/// Observed state. Reserved for future reporting; the reconciler does not write it.
#[derive(Serialize, Deserialize, Debug, Clone, Default, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WildflyStatus {}

impl WildflySpec {
    /// Parse a spec from YAML (JSON documents are accepted too).
    ///
    /// # Errors
    ///
    /// Returns [`Error::YamlParseFailed`] if the document does not describe a spec.
    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|e| Error::yaml_parse_failed(e.to_string()))
    }
}

/// Render the `Wildfly` CustomResourceDefinition as YAML.
///
/// # Errors
///
/// Returns [`Error::CrdRenderFailed`] if serialization fails.
pub fn crd_yaml() -> Result<String> {
    serde_yaml::to_string(&Wildfly::crd()).map_err(|e| Error::CrdRenderFailed {
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use serde_json::json;

    use super::*;

    #[test]
    fn test_spec_uses_stable_field_names() {
        let spec = WildflySpec {
            size: Some(2),
            image: Some("quay.io/wildfly/wildfly".into()),
            version: Some("31.0.0.Final".into()),
            cmd: Some(vec!["/bin/run.sh".into()]),
            ports: Some(vec![WildflyPortProto::new(80, "UDP")]),
            node_port: true,
        };

        let value = serde_json::to_value(&spec).unwrap();
        assert_eq!(
            value,
            json!({
                "size": 2,
                "image": "quay.io/wildfly/wildfly",
                "version": "31.0.0.Final",
                "cmd": ["/bin/run.sh"],
                "ports": [{"port": 80, "protocol": "UDP"}],
                "nodePort": true,
            })
        );
    }

    #[test]
    fn test_absent_cmd_differs_from_empty_cmd() {
        let absent = WildflySpec::from_yaml("size: 1\n").unwrap();
        let empty = WildflySpec::from_yaml("size: 1\ncmd: []\n").unwrap();

        assert_eq!(absent.cmd, None);
        assert_eq!(empty.cmd, Some(Vec::new()));
    }

    #[test]
    fn test_port_without_protocol_parses() {
        let spec = WildflySpec::from_yaml(r#"{"ports": [{"port": 9990}]}"#).unwrap();
        assert_eq!(
            spec.ports,
            Some(vec![WildflyPortProto {
                port: 9990,
                protocol: None
            }])
        );
        assert!(!spec.node_port);
    }

    #[test]
    fn test_invalid_spec_is_rejected() {
        let result = WildflySpec::from_yaml("size: many");
        assert!(matches!(result, Err(Error::YamlParseFailed { .. })));
    }

    #[test]
    fn test_crd_yaml_names_group_and_kind() {
        let yaml = crd_yaml().unwrap();
        assert!(yaml.contains("wildflies.wildfly.example.com"));
        assert!(yaml.contains("kind: Wildfly"));
        assert!(yaml.contains("v1alpha1"));
    }
}
