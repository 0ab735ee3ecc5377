//! CLI command handlers.
//!
//! - Zero unwraps, zero panics
//! - Result<T, Error> for all operations

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use kube::Client;
use serde::Serialize;
use tracing::info;

use wildfly_core::{OperatorConfig, OperatorDefaults, Wildfly, WildflySpec, crd_yaml};
use wildfly_reconciler::{
    ObjectKey, ResolvedConfig, owner_reference, resolve, synthesize_service, synthesize_workload,
};

use crate::cli::Commands;

/// Placeholder UID for owner references in offline previews.
const PREVIEW_UID: &str = "00000000-0000-0000-0000-000000000000";

/// Execute a CLI command.
///
/// This is the main command dispatcher that routes to the appropriate handler.
///
/// # Errors
///
/// Returns an error if the selected command fails.
pub async fn execute_command(command: Commands) -> Result<()> {
    match command {
        Commands::Run { config, namespace } => cmd_run(config, namespace).await,
        Commands::Crd => cmd_crd(),
        Commands::Resolve {
            file,
            name,
            namespace,
            config,
        } => cmd_resolve(&file, &name, &namespace, config.as_deref()),
    }
}

async fn cmd_run(config_path: Option<PathBuf>, namespace: Option<String>) -> Result<()> {
    let mut config = OperatorConfig::load(config_path.as_deref())
        .context("Failed to load operator configuration")?;
    if let Some(namespace) = namespace {
        config.controller.namespace = Some(namespace);
    }

    let client = Client::try_default()
        .await
        .context("Failed to create the Kubernetes client")?;
    info!("Kubernetes client initialized");

    wildfly_reconciler::controller::run(client, config).await;
    Ok(())
}

fn cmd_crd() -> Result<()> {
    let yaml = crd_yaml().context("Failed to render CRD")?;
    print!("{yaml}");
    Ok(())
}

fn cmd_resolve(file: &Path, name: &str, namespace: &str, config: Option<&Path>) -> Result<()> {
    print!("{}", preview_file(file, name, namespace, config)?);
    Ok(())
}

/// Load a spec file and optional operator config, then render the preview.
///
/// # Errors
///
/// Returns an error if either file cannot be read or parsed.
pub fn preview_file(
    file: &Path,
    name: &str,
    namespace: &str,
    config: Option<&Path>,
) -> Result<String> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read spec file '{}'", file.display()))?;
    let spec = WildflySpec::from_yaml(&text).context("Failed to parse Wildfly spec")?;
    let config = OperatorConfig::load(config).context("Failed to load operator configuration")?;

    render_preview(name, namespace, spec, &config.defaults)
}

#[derive(Serialize)]
struct Resolved<'a> {
    resolved: &'a ResolvedConfig,
}

/// Render the resolved configuration, deployment and service as a YAML stream.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_preview(
    name: &str,
    namespace: &str,
    spec: WildflySpec,
    defaults: &OperatorDefaults,
) -> Result<String> {
    let mut owner = Wildfly::new(name, spec);
    owner.metadata.namespace = Some(namespace.to_string());
    owner.metadata.uid = Some(PREVIEW_UID.to_string());

    let key = ObjectKey::from(&owner);
    let config = resolve(name, &owner.spec, defaults);
    let owner_ref = owner_reference(&owner)?;
    let deployment = synthesize_workload(&key, &owner_ref, &config, defaults);
    let service = synthesize_service(&key, &owner_ref, &config);

    let documents = [
        serde_yaml::to_string(&Resolved { resolved: &config })?,
        serde_yaml::to_string(&deployment)?,
        serde_yaml::to_string(&service)?,
    ];
    Ok(documents
        .iter()
        .map(|doc| format!("---\n{doc}"))
        .collect::<String>())
}
