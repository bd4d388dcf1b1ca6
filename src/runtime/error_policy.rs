//! # Error Policy
//!
//! Decides when a claim whose cycle failed is reconciled again.
//!
//! - Validation failures wait for the claim to change
//! - Everything else is requeued after a per-claim Fibonacci backoff, dropped by
//!   the next successful cycle

use crate::controller::reconciler::{BackoffState, Reconciler, ReconcilerError};
use crate::crd::SecretClaim;
use crate::observability::metrics;
use kube_runtime::controller::Action;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Fallback delay when the backoff table cannot be locked
const DEFAULT_BACKOFF_SECS: u64 = 60;

/// Handle a failed reconciliation for the controller runtime
pub fn handle_reconciliation_error(
    obj: Arc<SecretClaim>,
    error: &ReconcilerError,
    ctx: Arc<Reconciler>,
) -> Action {
    let name = obj.metadata.name.as_deref().unwrap_or("unknown");
    let namespace = obj.metadata.namespace.as_deref().unwrap_or("default");

    let error_span = tracing::span!(
        tracing::Level::ERROR,
        "controller.watch.reconciliation_error",
        resource.name = name,
        resource.namespace = namespace,
        error = %error
    );
    let _error_guard = error_span.enter();

    error!("Reconciliation error for {}/{}: {}", namespace, name, error);
    metrics::increment_reconciliation_errors();

    if !error.is_retryable() {
        info!("Not retrying; waiting for the SecretClaim to change");
        return Action::await_change();
    }

    let (backoff_seconds, error_count) = next_backoff(&ctx, &format!("{namespace}/{name}"));

    let next_trigger_time =
        chrono::Utc::now() + chrono::Duration::seconds(i64::try_from(backoff_seconds).unwrap_or(i64::MAX));
    info!(
        "🔄 Retrying with Fibonacci backoff: {}s (error count: {}, next attempt: {})",
        backoff_seconds,
        error_count,
        next_trigger_time.to_rfc3339()
    );

    metrics::increment_requeues_total("error-backoff");
    Action::requeue(Duration::from_secs(backoff_seconds))
}

/// Advance the backoff of `key` and return the delay in seconds with the
/// number of consecutive failures
pub fn next_backoff(ctx: &Reconciler, key: &str) -> (u64, u32) {
    match ctx.backoff_states.lock() {
        Ok(mut states) => {
            let state = states.entry(key.to_string()).or_insert_with(|| {
                BackoffState::new(ctx.config.backoff_min_minutes, ctx.config.backoff_max_minutes)
            });
            state.increment_error();
            (state.backoff.next_backoff_seconds(), state.error_count)
        }
        Err(e) => {
            warn!("Failed to lock backoff_states: {}, using default backoff", e);
            (DEFAULT_BACKOFF_SECS, 0)
        }
    }
}
