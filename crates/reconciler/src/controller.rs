//! Controller wiring.
//!
//! Plugs the [`Reconciler`] into the kube runtime: watches `Wildfly` objects,
//! routes deployment and service events to their owner, and translates
//! outcomes into requeue decisions. Deduplication and backoff stay with the
//! runtime's work queue.

use std::sync::Arc;

use futures::StreamExt;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Service;
use kube::runtime::controller::{Action, Controller};
use kube::runtime::watcher;
use kube::{Api, Client};
use tracing::{debug, info, warn};
use wildfly_core::{ControllerConfig, OperatorConfig, Wildfly};

use crate::error::Error;
use crate::kube_store::KubeStore;
use crate::reconciler::Reconciler;
use crate::types::{ObjectKey, ReconcileOutcome};

/// Shared state handed to every reconcile invocation.
pub struct Context {
    reconciler: Reconciler,
    config: ControllerConfig,
}

impl Context {
    /// Create a new context.
    pub const fn new(reconciler: Reconciler, config: ControllerConfig) -> Self {
        Self { reconciler, config }
    }
}

/// Run the controller until a shutdown signal arrives.
pub async fn run(client: Client, config: OperatorConfig) {
    let OperatorConfig { defaults, controller } = config;

    let (wildflies, deployments, services) = match controller.namespace.as_deref() {
        Some(namespace) => {
            info!(namespace, "Watching a single namespace");
            (
                Api::<Wildfly>::namespaced(client.clone(), namespace),
                Api::<Deployment>::namespaced(client.clone(), namespace),
                Api::<Service>::namespaced(client.clone(), namespace),
            )
        }
        None => {
            info!("Watching all namespaces");
            (
                Api::<Wildfly>::all(client.clone()),
                Api::<Deployment>::all(client.clone()),
                Api::<Service>::all(client.clone()),
            )
        }
    };

    let store = Arc::new(KubeStore::new(client));
    let reconciler = Reconciler::new(store, Arc::new(defaults));
    let context = Arc::new(Context::new(reconciler, controller));

    Controller::new(wildflies, watcher::Config::default())
        .owns(deployments, watcher::Config::default())
        .owns(services, watcher::Config::default())
        .shutdown_on_signal()
        .run(reconcile, error_policy, context)
        .for_each(|result| async move {
            match result {
                Ok((object, action)) => debug!(object = %object, ?action, "Reconciled"),
                Err(e) => warn!(error = %e, "Reconcile failed"),
            }
        })
        .await;

    info!("Controller stopped");
}

async fn reconcile(wildfly: Arc<Wildfly>, context: Arc<Context>) -> Result<Action, Error> {
    let key = ObjectKey::from(wildfly.as_ref());
    let outcome = context.reconciler.reconcile(&key).await?;
    if let Some(action) = outcome.action() {
        info!(key = %action.key(), action = %action.description(), "Requeueing after mutation");
    }
    Ok(action_for(&outcome, &context.config))
}

fn error_policy(wildfly: Arc<Wildfly>, error: &Error, context: Arc<Context>) -> Action {
    let key = ObjectKey::from(wildfly.as_ref());
    if error.is_retryable() {
        warn!(%key, %error, retry_in = ?context.config.retry_delay(), "Reconcile error, retrying");
        Action::requeue(context.config.retry_delay())
    } else {
        warn!(%key, %error, "Reconcile error, waiting for the object to change");
        Action::await_change()
    }
}

/// Scheduler action for a pass outcome.
pub fn action_for(outcome: &ReconcileOutcome, config: &ControllerConfig) -> Action {
    if outcome.requeue() {
        Action::requeue(config.requeue_delay())
    } else {
        Action::await_change()
    }
}
