//! CLI parsing and offline preview tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use clap::Parser;

use wildfly_core::{OperatorDefaults, WildflySpec};
use wildfly_operator::cli::{Cli, Commands, LogFormat};
use wildfly_operator::commands::{execute_command, preview_file, render_preview};

/// Test helper: Unwrap a Result or panic with context
fn unwrap_result<T, E: std::fmt::Display>(result: std::result::Result<T, E>, context: &str) -> T {
    match result {
        Ok(value) => value,
        Err(e) => panic!("{}: {}", context, e),
    }
}

#[test]
fn run_accepts_namespace_and_json_logs() {
    let cli = unwrap_result(
        Cli::try_parse_from([
            "wildfly-operator",
            "--log-format",
            "json",
            "run",
            "--namespace",
            "apps",
        ]),
        "parse run",
    );

    assert_eq!(cli.log_format, LogFormat::Json);
    assert!(matches!(
        cli.command,
        Commands::Run { namespace: Some(ref ns), .. } if ns == "apps"
    ));
}

#[test]
fn resolve_defaults_name_and_namespace() {
    let cli = unwrap_result(
        Cli::try_parse_from(["wildfly-operator", "resolve", "--file", "spec.yaml"]),
        "parse resolve",
    );

    match cli.command {
        Commands::Resolve {
            name, namespace, ..
        } => {
            assert_eq!(name, "wildfly");
            assert_eq!(namespace, "default");
        }
        other => panic!("expected resolve, got {other:?}"),
    }
}

#[test]
fn resolve_requires_file() {
    assert!(Cli::try_parse_from(["wildfly-operator", "resolve"]).is_err());
}

#[test]
fn preview_contains_resolved_deployment_and_service() {
    let spec = unwrap_result(
        WildflySpec::from_yaml("size: -2\nports:\n  - port: 80\n    protocol: udp\nnodePort: true\n"),
        "parse spec",
    );

    let preview = unwrap_result(
        render_preview("web", "apps", spec, &OperatorDefaults::default()),
        "render preview",
    );

    assert_eq!(preview.matches("---\n").count(), 3);
    assert!(preview.contains("replicas: 1"));
    assert!(preview.contains("image: docker.io/jboss/wildfly:latest"));
    assert!(preview.contains("kind: Deployment"));
    assert!(preview.contains("kind: Service"));
    assert!(preview.contains("type: NodePort"));
    assert!(preview.contains("name: port-80"));
    assert!(preview.contains("protocol: UDP"));
    assert!(preview.contains("kind: Wildfly"));
}

#[test]
fn preview_file_applies_config_defaults() {
    // GIVEN: A spec file without image and an operator config overriding the defaults
    let dir = unwrap_result(tempfile::tempdir(), "create temp dir");
    let spec_path = dir.path().join("wildfly.yaml");
    let config_path = dir.path().join("operator.toml");
    unwrap_result(std::fs::write(&spec_path, "size: 2\n"), "write spec");
    unwrap_result(
        std::fs::write(
            &config_path,
            "[defaults]\nimage = \"quay.io/wildfly/wildfly\"\ntag = \"31.0.0.Final\"\n",
        ),
        "write config",
    );

    // WHEN: The preview is rendered from both files
    let preview = unwrap_result(
        preview_file(&spec_path, "web", "apps", Some(&config_path)),
        "preview file",
    );

    // THEN: The configured image and the declared size are used
    assert!(preview.contains("image: quay.io/wildfly/wildfly:31.0.0.Final"));
    assert!(preview.contains("replicas: 2"));
    assert!(preview.contains("namespace: apps"));
}

#[test]
fn preview_file_reports_missing_spec() {
    let dir = unwrap_result(tempfile::tempdir(), "create temp dir");
    let missing = dir.path().join("absent.yaml");

    let result = preview_file(&missing, "web", "apps", None);

    let message = match result {
        Ok(_) => panic!("expected missing spec file to fail"),
        Err(e) => format!("{e:#}"),
    };
    assert!(message.contains("Failed to read spec file"));
}

#[tokio::test]
async fn crd_command_succeeds_offline() {
    let result = execute_command(Commands::Crd).await;

    assert!(result.is_ok());
}
