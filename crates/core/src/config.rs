//! Operator configuration.
//!
//! Loaded once at startup (TOML file, then environment overrides) and shared
//! read-only afterwards. [`OperatorDefaults`] is the single source of truth
//! for every value the reconciler fills in when a `Wildfly` spec omits it.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::protocol::Protocol;

/// Environment variable overriding the watched namespace.
pub const ENV_NAMESPACE: &str = "WILDFLY_OPERATOR_NAMESPACE";
/// Environment variable overriding the requeue delay after a mutating pass.
pub const ENV_REQUEUE_SECS: &str = "WILDFLY_OPERATOR_REQUEUE_SECS";
/// Environment variable overriding the retry delay after a failed pass.
pub const ENV_RETRY_SECS: &str = "WILDFLY_OPERATOR_RETRY_SECS";
/// Environment variable overriding the default image.
pub const ENV_DEFAULT_IMAGE: &str = "WILDFLY_OPERATOR_DEFAULT_IMAGE";

/// Top-level operator configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OperatorConfig {
    /// Values applied to omitted spec fields.
    pub defaults: OperatorDefaults,
    /// Controller runtime settings.
    pub controller: ControllerConfig,
}

/// Defaults applied while resolving a `Wildfly` spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OperatorDefaults {
    /// Image used when the spec has none.
    pub image: String,
    /// Tag used when the spec has no version.
    pub tag: String,
    /// Command used when the spec has no `cmd`.
    pub command: Vec<String>,
    /// Replica count used when the spec has no `size`.
    pub replicas: i32,
    /// Ports used when the spec declares none.
    pub ports: Vec<PortDefault>,
    /// Name of the single server container.
    pub container_name: String,
    /// Label key selecting the pods of one `Wildfly`.
    pub app_label: String,
}

/// A default port binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PortDefault {
    pub port: i32,
    #[serde(default)]
    pub protocol: Protocol,
}

impl Default for OperatorDefaults {
    fn default() -> Self {
        Self {
            image: "docker.io/jboss/wildfly".to_string(),
            tag: "latest".to_string(),
            command: vec![
                "/opt/jboss/wildfly/bin/standalone.sh".to_string(),
                "-b".to_string(),
                "0.0.0.0".to_string(),
            ],
            replicas: 1,
            ports: vec![
                PortDefault {
                    port: 8080,
                    protocol: Protocol::Tcp,
                },
                PortDefault {
                    port: 8443,
                    protocol: Protocol::Tcp,
                },
            ],
            container_name: "wildfly".to_string(),
            app_label: "app".to_string(),
        }
    }
}

/// Controller runtime settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControllerConfig {
    /// Namespace to watch. `None` watches all namespaces.
    pub namespace: Option<String>,
    /// Seconds before re-running a pass that performed a mutation.
    pub requeue_secs: u64,
    /// Seconds before retrying a pass that failed.
    pub retry_secs: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            namespace: None,
            requeue_secs: 1,
            retry_secs: 5,
        }
    }
}

impl ControllerConfig {
    /// Delay before the follow-up pass after a mutation.
    pub const fn requeue_delay(&self) -> Duration {
        Duration::from_secs(self.requeue_secs)
    }

    /// Delay before retrying after an error.
    pub const fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_secs)
    }
}

impl OperatorConfig {
    /// Parse a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TomlParseFailed`] on malformed TOML or unknown keys.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::toml_parse_failed(e.to_string()))
    }

    /// Load the configuration: optional TOML file, then process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, an override is
    /// malformed, or the result fails validation.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let base = match path {
            Some(path) => {
                debug!(path = %path.display(), "Loading operator config");
                let text = std::fs::read_to_string(path)
                    .map_err(|e| Error::file_read_failed(path, e.to_string()))?;
                Self::from_toml(&text)?
            }
            None => Self::default(),
        };

        let config = base.with_env(|var| std::env::var(var).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides using `lookup` to read variables.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEnv`] if a numeric override does not parse.
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(namespace) = lookup(ENV_NAMESPACE).filter(|ns| !ns.is_empty()) {
            self.controller.namespace = Some(namespace);
        }
        if let Some(value) = lookup(ENV_REQUEUE_SECS) {
            self.controller.requeue_secs = parse_secs(ENV_REQUEUE_SECS, &value)?;
        }
        if let Some(value) = lookup(ENV_RETRY_SECS) {
            self.controller.retry_secs = parse_secs(ENV_RETRY_SECS, &value)?;
        }
        if let Some(image) = lookup(ENV_DEFAULT_IMAGE).filter(|image| !image.is_empty()) {
            self.defaults.image = image;
        }
        Ok(self)
    }

    /// Check invariants the reconciler relies on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let defaults = &self.defaults;
        if defaults.image.is_empty() {
            return Err(Error::invalid_config("defaults.image", "must not be empty"));
        }
        if defaults.tag.is_empty() {
            return Err(Error::invalid_config("defaults.tag", "must not be empty"));
        }
        if defaults.container_name.is_empty() {
            return Err(Error::invalid_config(
                "defaults.container_name",
                "must not be empty",
            ));
        }
        if defaults.app_label.is_empty() {
            return Err(Error::invalid_config("defaults.app_label", "must not be empty"));
        }
        if defaults.replicas < 1 {
            return Err(Error::invalid_config("defaults.replicas", "must be at least 1"));
        }
        if defaults.ports.is_empty() {
            return Err(Error::invalid_config(
                "defaults.ports",
                "at least one port is required",
            ));
        }
        Ok(())
    }
}

fn parse_secs(var: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::invalid_env(var, value))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::panic)]

    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = OperatorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.defaults.image, "docker.io/jboss/wildfly");
        assert_eq!(config.defaults.tag, "latest");
        assert_eq!(config.defaults.ports.len(), 2);
        assert_eq!(config.controller.namespace, None);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = OperatorConfig::from_toml(
            r#"
            [defaults]
            image = "quay.io/wildfly/wildfly"

            [controller]
            retry_secs = 30
            "#,
        )
        .unwrap();

        assert_eq!(config.defaults.image, "quay.io/wildfly/wildfly");
        assert_eq!(config.defaults.tag, "latest");
        assert_eq!(config.controller.retry_delay(), Duration::from_secs(30));
        assert_eq!(config.controller.requeue_delay(), Duration::from_secs(1));
    }

    #[test]
    fn test_toml_ports_default_to_tcp() {
        let config = OperatorConfig::from_toml(
            r#"
            [[defaults.ports]]
            port = 9990

            [[defaults.ports]]
            port = 5353
            protocol = "UDP"
            "#,
        )
        .unwrap();

        assert_eq!(
            config.defaults.ports,
            vec![
                PortDefault {
                    port: 9990,
                    protocol: Protocol::Tcp
                },
                PortDefault {
                    port: 5353,
                    protocol: Protocol::Udp
                },
            ]
        );
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let result = OperatorConfig::from_toml("[defaults]\nimgae = \"typo\"\n");
        assert!(matches!(result, Err(Error::TomlParseFailed { .. })));
    }

    #[test]
    fn test_env_overrides() {
        let config = OperatorConfig::default()
            .with_env(env(&[
                (ENV_NAMESPACE, "apps"),
                (ENV_REQUEUE_SECS, "2"),
                (ENV_RETRY_SECS, " 10 "),
                (ENV_DEFAULT_IMAGE, "registry.local/wildfly"),
            ]))
            .unwrap();

        assert_eq!(config.controller.namespace.as_deref(), Some("apps"));
        assert_eq!(config.controller.requeue_secs, 2);
        assert_eq!(config.controller.retry_secs, 10);
        assert_eq!(config.defaults.image, "registry.local/wildfly");
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let config = OperatorConfig::default()
            .with_env(env(&[(ENV_NAMESPACE, ""), (ENV_DEFAULT_IMAGE, "")]))
            .unwrap();
        assert_eq!(config, OperatorConfig::default());
    }

    #[test]
    fn test_malformed_env_value_is_rejected() {
        let result = OperatorConfig::default().with_env(env(&[(ENV_RETRY_SECS, "soon")]));
        assert!(matches!(result, Err(Error::InvalidEnv { .. })));
    }

    #[test]
    fn test_validate_rejects_empty_image() {
        let mut config = OperatorConfig::default();
        config.defaults.image = String::new();
        match config.validate() {
            Err(Error::InvalidConfig { field, .. }) => assert_eq!(field, "defaults.image"),
            other => panic!("expected InvalidConfig, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_missing_default_ports() {
        let mut config = OperatorConfig::default();
        config.defaults.ports.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[defaults]\ntag = \"31.0.0.Final\"").unwrap();

        let config = OperatorConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.defaults.tag, "31.0.0.Final");
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = OperatorConfig::load(Some(Path::new("/nonexistent/operator.toml")));
        assert!(matches!(result, Err(Error::FileReadFailed { .. })));
    }
}
