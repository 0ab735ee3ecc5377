//! # wildfly-operator
//!
//! Entry point for the WildFly operator.
//!
//! ## Commands
//!
//! - `run` - watch `Wildfly` resources and reconcile their deployments and services
//! - `crd` - print the CustomResourceDefinition for installation
//! - `resolve` - preview the generated resources for a spec file, offline
//!
//! ## Shutdown
//!
//! The controller stops on SIGTERM/SIGINT after in-flight passes complete.

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]
#![deny(clippy::expect_used)]

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use wildfly_operator::cli::{Cli, LogFormat};
use wildfly_operator::commands::execute_command;

/// Main entry point.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.log_format);

    info!(version = env!("CARGO_PKG_VERSION"), "WildFly operator starting");
    execute_command(cli.command).await
}

/// Initialize tracing subscriber with environment filter.
fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}
