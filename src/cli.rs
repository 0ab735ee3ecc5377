//! CLI command definitions using clap.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// WildFly operator
#[derive(Parser, Debug)]
#[command(name = "wildfly-operator")]
#[command(version)]
#[command(about = "Keeps WildFly deployments and services converged with Wildfly resources")]
pub struct Cli {
    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Log output format.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the controller against the current cluster
    Run {
        /// Operator configuration file (TOML)
        #[arg(short, long, env = "WILDFLY_OPERATOR_CONFIG")]
        config: Option<PathBuf>,

        /// Only watch this namespace
        #[arg(short, long)]
        namespace: Option<String>,
    },

    /// Print the Wildfly CustomResourceDefinition
    Crd,

    /// Preview the resources generated for a Wildfly spec, without a cluster
    Resolve {
        /// Spec file (YAML or JSON)
        #[arg(short, long)]
        file: PathBuf,

        /// Name of the Wildfly resource
        #[arg(long, default_value = "wildfly")]
        name: String,

        /// Namespace of the Wildfly resource
        #[arg(long, default_value = "default")]
        namespace: String,

        /// Operator configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}
