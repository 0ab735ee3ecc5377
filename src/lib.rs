#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

//! # wildfly-operator
//!
//! Kubernetes operator keeping WildFly deployments and services converged
//! with `Wildfly` custom resources.
//!
//! This library re-exports the workspace crates and the CLI used by the binary.

pub use wildfly_core;
pub use wildfly_reconciler;

pub mod cli;
pub mod commands;
