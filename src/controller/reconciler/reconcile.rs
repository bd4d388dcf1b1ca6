//! # Reconciliation Logic
//!
//! One cycle per delivered claim key:
//!
//! 1. **Fetch** the claim; gone means done
//! 2. **Probe** the Secret with the same name
//! 3. Foreign Secret: **skip** without touching status
//! 4. **Validate** the claim (rejections are reported, never written)
//! 5. Absent Secret: **create**. Owned Secret: **drift check**, then update,
//!    repair status, or stay idle
//!
//! Every path ends within one invocation. Status is the only state carried
//! between cycles.

use crate::controller::drift;
use crate::controller::materializer;
use crate::controller::ownership::is_owned_by;
use crate::controller::reconciler::types::{Outcome, ReconcileError, Reconciler, ReconcilerError};
use crate::controller::status::StatusReporter;
use crate::controller::store::ClaimKey;
use crate::controller::validation::validate_claim;
use crate::crd::SecretClaim;
use crate::observability::{metrics, TraceCarrier};
use kube_runtime::controller::Action;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, field, info, warn, Instrument, Span};

/// Entry point for the controller runtime
///
/// Runs [`reconcile_claim`] under the configured deadline. When the deadline
/// passes the cycle is dropped where it stands; status is only written by
/// steps that completed.
///
/// # Errors
///
/// Returns [`ReconcilerError`] for failed or timed out cycles; the error policy
/// decides whether and when to retry.
pub async fn reconcile(
    claim: Arc<SecretClaim>,
    ctx: Arc<Reconciler>,
) -> Result<Action, ReconcilerError> {
    let key = ClaimKey::from_claim(&claim).ok_or(ReconcilerError::MissingKey)?;

    let span = tracing::info_span!(
        "secretclaim.reconcile",
        resource.name = %key.name,
        resource.namespace = %key.namespace,
        resource.kind = "SecretClaim",
        claim.type = field::Empty,
        api.request.traceparent = field::Empty,
        trace_id = field::Empty,
    );

    let start = Instant::now();
    metrics::increment_reconciliations();

    let deadline = ctx.config.reconcile_timeout();
    let result = tokio::time::timeout(deadline, reconcile_claim(&ctx, &key))
        .instrument(span.clone())
        .await;

    metrics::observe_reconciliation_duration(start.elapsed().as_secs_f64());

    match result {
        Err(_elapsed) => Err(ReconcilerError::DeadlineExceeded(deadline)),
        Ok(Err(e)) => Err(e.into()),
        Ok(Ok(outcome)) => {
            ctx.reset_backoff(&key.to_string());
            span.in_scope(|| {
                info!(
                    outcome = outcome.as_str(),
                    duration_ms = start.elapsed().as_millis(),
                    "Reconciliation complete"
                );
            });
            Ok(Action::await_change())
        }
    }
}

/// Drive the Secret of one claim toward the claim
///
/// # Errors
///
/// Returns [`ReconcileError`] when the cycle failed. By then the failure has
/// already been reported on the claim's status (if the status write went
/// through).
pub async fn reconcile_claim(ctx: &Reconciler, key: &ClaimKey) -> Result<Outcome, ReconcileError> {
    let Some(claim) = ctx.claims.get(key).await? else {
        debug!("SecretClaim no longer exists");
        return Ok(Outcome::ClaimGone);
    };

    record_claim_fields(&claim);
    info!("Starting reconciliation cycle");

    let reporter = ctx.status_reporter();

    let existing = match ctx.artifacts.get(key).await {
        Ok(existing) => existing,
        Err(e) => return Err(fail(&reporter, &claim, e.into()).await),
    };

    if let Some(secret) = &existing {
        if !is_owned_by(secret, &claim) {
            warn!("Secret exists but is not controlled by this SecretClaim, skipping");
            metrics::increment_ownership_skips();
            return Ok(Outcome::SkippedForeign);
        }
    }

    let claim_type = match validate_claim(&claim.spec) {
        Ok(claim_type) => claim_type,
        Err(e) => {
            warn!(error = %e, "SecretClaim rejected");
            metrics::increment_validation_failures();
            return Err(fail(&reporter, &claim, e.into()).await);
        }
    };

    let Some(secret) = existing else {
        info!("Secret not found, creating");
        if let Err(e) =
            materializer::create(ctx.artifacts.as_ref(), &claim, &claim_type, &ctx.generator).await
        {
            return Err(fail(&reporter, &claim, e).await);
        }
        reporter.report_synced(&claim, &claim_type).await;
        return Ok(Outcome::Created);
    };

    if drift::detect(
        &claim_type,
        secret.data.as_ref(),
        claim.last_reconcile_trigger(),
    ) {
        info!(
            old_trigger = claim.last_reconcile_trigger(),
            new_trigger = claim.reconcile_trigger(),
            "Secret out of date, updating"
        );
        if let Err(e) =
            materializer::update(ctx.artifacts.as_ref(), &secret, &claim_type, &ctx.generator).await
        {
            return Err(fail(&reporter, &claim, e).await);
        }
        reporter.report_synced(&claim, &claim_type).await;
        return Ok(Outcome::Updated);
    }

    if !claim.is_synced() {
        info!("Secret in sync but status is not, updating status");
        reporter.report_synced(&claim, &claim_type).await;
        return Ok(Outcome::StatusRepaired);
    }

    Ok(Outcome::Idle)
}

/// Report `error` on the claim and hand it back for the caller to return
async fn fail(reporter: &StatusReporter, claim: &SecretClaim, error: ReconcileError) -> ReconcileError {
    warn!(error = %error, "Reconciliation step failed");
    reporter.report_error(claim, &error.to_string()).await;
    error
}

fn record_claim_fields(claim: &SecretClaim) {
    let span = Span::current();
    span.record("claim.type", claim.spec.claim_type.as_str());

    if let Some(carrier) = TraceCarrier::from_annotations(claim.metadata.annotations.as_ref()) {
        span.record("api.request.traceparent", carrier.traceparent());
        if let Some(trace_id) = carrier.trace_id() {
            span.record("trace_id", trace_id.as_str());
        }
    } else {
        debug!("No upstream trace context on SecretClaim");
    }
}
