//! Reconcile driver.
//!
//! One pass walks `FetchOwner -> ReconcileWorkload -> ReconcileService` and
//! stops after the first mutation, returning [`ReconcileOutcome::Requeue`] so
//! the scheduler runs the next pass with its own rate limiting.

use std::sync::Arc;

use tracing::{debug, error, info};
use wildfly_core::{OperatorDefaults, Wildfly};

use crate::error::Result;
use crate::resolver::resolve;
use crate::store::ObjectStore;
use crate::synth::{owner_reference, synthesize_service, synthesize_workload, workload_replicas};
use crate::types::{ObjectKey, ReconcileAction, ReconcileOutcome, ResolvedConfig};

/// K8s-style reconciler for `Wildfly` resources.
pub struct Reconciler {
    /// Object store for reads and writes.
    store: Arc<dyn ObjectStore>,
    /// Values applied to omitted spec fields.
    defaults: Arc<OperatorDefaults>,
}

impl Reconciler {
    /// Create a new reconciler.
    pub const fn new(store: Arc<dyn ObjectStore>, defaults: Arc<OperatorDefaults>) -> Self {
        Self { store, defaults }
    }

    /// Run one reconciliation pass for the `Wildfly` identified by `key`.
    ///
    /// # Errors
    ///
    /// Returns the store error of the first failing read or write. A missing
    /// owner or managed resource is not an error.
    pub async fn reconcile(&self, key: &ObjectKey) -> Result<ReconcileOutcome> {
        info!(namespace = %key.namespace, name = %key.name, "Reconciling Wildfly");

        let owner = self.store.get_wildfly(key).await.inspect_err(|e| {
            error!(%key, error = %e, "Failed to get Wildfly");
        })?;
        let Some(owner) = owner else {
            debug!(%key, "Wildfly not found, owned resources are garbage collected");
            return Ok(ReconcileOutcome::OwnerGone);
        };

        let config = resolve(&key.name, &owner.spec, &self.defaults);

        if let Some(action) = self.reconcile_workload(key, &owner, &config).await? {
            return Ok(ReconcileOutcome::Requeue(action));
        }
        if let Some(action) = self.reconcile_service(key, &owner, &config).await? {
            return Ok(ReconcileOutcome::Requeue(action));
        }

        debug!(%key, "Wildfly converged");
        Ok(ReconcileOutcome::Converged)
    }

    /// Create the deployment or fix its replica count. Only replicas are compared.
    async fn reconcile_workload(
        &self,
        key: &ObjectKey,
        owner: &Wildfly,
        config: &ResolvedConfig,
    ) -> Result<Option<ReconcileAction>> {
        let live = self.store.get_deployment(key).await.inspect_err(|e| {
            error!(%key, error = %e, "Failed to get Deployment");
        })?;

        let Some(mut live) = live else {
            let deployment =
                synthesize_workload(key, &owner_reference(owner)?, config, &self.defaults);
            info!(%key, replicas = config.replicas, image = %config.image, "Creating a new Wildfly Deployment");
            self.store
                .create_deployment(&deployment)
                .await
                .inspect_err(|e| error!(%key, error = %e, "Failed to create new Wildfly Deployment"))?;
            return Ok(Some(ReconcileAction::CreateWorkload {
                key: key.clone(),
                replicas: config.replicas,
            }));
        };

        let current = workload_replicas(&live);
        if current == Some(config.replicas) {
            return Ok(None);
        }

        info!(%key, from = ?current, to = config.replicas, "Scaling Wildfly Deployment");
        live.spec.get_or_insert_with(Default::default).replicas = Some(config.replicas);
        self.store
            .update_deployment(&live)
            .await
            .inspect_err(|e| error!(%key, error = %e, "Failed to update Wildfly Deployment"))?;

        Ok(Some(ReconcileAction::ScaleWorkload {
            key: key.clone(),
            from: current,
            to: config.replicas,
        }))
    }

    /// Create the service if missing. An existing service is left untouched.
    async fn reconcile_service(
        &self,
        key: &ObjectKey,
        owner: &Wildfly,
        config: &ResolvedConfig,
    ) -> Result<Option<ReconcileAction>> {
        let live = self.store.get_service(key).await.inspect_err(|e| {
            error!(%key, error = %e, "Failed to get Service");
        })?;
        if live.is_some() {
            return Ok(None);
        }

        let service = synthesize_service(key, &owner_reference(owner)?, config);
        info!(%key, node_port = config.expose_externally, "Creating a new Wildfly Service");
        self.store
            .create_service(&service)
            .await
            .inspect_err(|e| error!(%key, error = %e, "Failed to create new Wildfly Service"))?;

        Ok(Some(ReconcileAction::CreateService {
            key: key.clone(),
            node_port: config.expose_externally,
        }))
    }

    /// Get the defaults used for resolution.
    pub fn defaults(&self) -> &OperatorDefaults {
        &self.defaults
    }
}
