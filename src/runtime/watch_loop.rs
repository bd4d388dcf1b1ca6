//! # Watch Loop
//!
//! Runs `kube_runtime::Controller` over `SecretClaim`s and the Secrets they own.
//!
//! The controller serializes cycles per claim key, so two cycles for the same
//! claim never overlap; cycles for different claims run concurrently up to
//! `MAX_CONCURRENT_RECONCILIATIONS`. A change to an owned Secret (including its
//! deletion) is mapped back to its claim through the owner reference.

use crate::controller::reconciler::{reconcile, Reconciler, ReconcilerError};
use crate::controller::server::ServerState;
use crate::crd::SecretClaim;
use crate::runtime::error_policy::handle_reconciliation_error;
use futures::StreamExt;
use k8s_openapi::api::core::v1::Secret;
use kube::api::Api;
use kube::Client;
use kube_runtime::controller::{self, Controller};
use kube_runtime::watcher;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Run the controller until a shutdown signal arrives
///
/// # Errors
///
/// Currently always returns `Ok`; stream errors are logged and the runtime
/// keeps watching.
pub async fn run_watch_loop(
    client: Client,
    reconciler: Arc<Reconciler>,
    server_state: Arc<ServerState>,
) -> Result<(), anyhow::Error> {
    let claims: Api<SecretClaim> = Api::all(client.clone());
    let secrets: Api<Secret> = Api::all(client);

    let concurrency = reconciler.config.max_concurrent_reconciliations;
    info!(concurrency, "Starting controller watch loop...");

    Controller::new(claims, watcher::Config::default().any_semantic())
        .owns(secrets, watcher::Config::default())
        .with_config(controller::Config::default().concurrency(concurrency))
        .shutdown_on_signal()
        .run(reconcile, handle_reconciliation_error, reconciler)
        .for_each(|result| async move {
            match result {
                Ok((obj, _action)) => debug!(resource = %obj, "watch.event.success"),
                Err(e) => log_controller_error(&e),
            }
        })
        .await;

    server_state.set_ready(false);
    info!("Controller stopped gracefully");
    Ok(())
}

fn log_controller_error(e: &controller::Error<ReconcilerError, watcher::Error>) {
    match e {
        // Already logged with context by the error policy
        controller::Error::ReconcilerFailed(err, obj) => {
            debug!(resource = %obj, error = %err, "reconciliation.error");
        }
        controller::Error::ObjectNotFound(obj) => {
            warn!(resource = %obj, "Object not found, it may have been deleted");
        }
        controller::Error::QueueError(err) => {
            warn!(error = %err, "Watch error, the watcher will retry");
        }
        other => error!(error = %other, "Controller stream error"),
    }
}
