//! K8s-style reconciliation for `Wildfly` resources.
//!
//! This crate keeps two managed resources converged with a `Wildfly`
//! custom resource:
//!
//! - **Desired State**: resolved from the (possibly partial) spec plus operator defaults
//! - **Actual State**: read from the object store on every pass
//! - **Diff**: only missing resources and deployment replica drift are acted upon
//! - **Actions**: at most one create or update per pass, then requeue
//!
//! # Key Concepts
//!
//! ## Reconciliation pass
//!
//! 1. Fetch the `Wildfly`; if it is gone there is nothing to do
//! 2. Create the deployment if missing, or fix its replica count
//! 3. Create the service if missing
//!
//! Owned resources carry a controller owner reference, so deleting the
//! `Wildfly` lets the cluster garbage collector remove them.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use wildfly_core::OperatorDefaults;
//! use wildfly_reconciler::{InMemoryStore, ObjectKey, Reconciler};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = Arc::new(InMemoryStore::new());
//!     let reconciler = Reconciler::new(store, Arc::new(OperatorDefaults::default()));
//!
//!     let outcome = reconciler.reconcile(&ObjectKey::new("apps", "web")).await;
//! }
//! ```

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod controller;
pub mod error;
pub mod kube_store;
pub mod ports;
pub mod reconciler;
pub mod resolver;
pub mod store;
pub mod synth;
pub mod types;

// Re-export main types
pub use error::{Error, Result};
pub use kube_store::KubeStore;
pub use ports::{PortMapping, map_ports, protocol_from_hint};
pub use reconciler::Reconciler;
pub use resolver::resolve;
pub use store::{InMemoryStore, MutationCounts, ObjectStore, StoreOp};
pub use synth::{owner_reference, synthesize_service, synthesize_workload};
pub use types::{
    ContainerPortBinding, ObjectKey, ReconcileAction, ReconcileOutcome, ResolvedConfig,
    ResourceKind, ServicePortBinding,
};
