//! # Status Reporter
//!
//! Computes and persists the observed state of a claim.
//!
//! Status is the only durable checkpoint of a reconciliation. Builders start
//! from the claim's current status so fields a report does not own (for
//! example `createdSecretName` after a failure) keep their last value.
//!
//! A failed status write is logged and counted, never returned: the Secret
//! write that preceded it already happened, and the next delivery of the claim
//! repairs the status.

use crate::controller::store::ClaimStore;
use crate::controller::validation::ClaimType;
use crate::crd::{Condition, SecretClaim, SecretClaimStatus};
use crate::observability::metrics;
use chrono::{DateTime, SecondsFormat, Utc};
use std::sync::Arc;
use tracing::{debug, error};

pub const CONDITION_READY: &str = "Ready";
pub const REASON_SUCCEEDED: &str = "ReconciliationSucceeded";
pub const REASON_FAILED: &str = "ReconciliationFailed";

fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Replace the `Ready` condition, keeping its transition time when the status
/// value did not flip
fn set_ready_condition(
    conditions: &mut Vec<Condition>,
    ready: bool,
    reason: &str,
    message: String,
    now: DateTime<Utc>,
) {
    let status = if ready { "True" } else { "False" };

    let last_transition_time = conditions
        .iter()
        .find(|c| c.r#type == CONDITION_READY && c.status == status)
        .and_then(|c| c.last_transition_time.clone())
        .unwrap_or_else(|| timestamp(now));

    conditions.retain(|c| c.r#type != CONDITION_READY);
    conditions.push(Condition {
        r#type: CONDITION_READY.to_string(),
        status: status.to_string(),
        last_transition_time: Some(last_transition_time),
        reason: Some(reason.to_string()),
        message: Some(message),
    });
}

/// Status after a successful sync
///
/// Stamps `lastUpdate`, records the Secret name and, for generated claims,
/// advances `lastReconcileTrigger` to the trigger that was just applied.
#[must_use]
pub fn synced_status(
    claim: &SecretClaim,
    claim_type: &ClaimType,
    now: DateTime<Utc>,
) -> SecretClaimStatus {
    let mut status = claim.status.clone().unwrap_or_default();
    let name = claim.metadata.name.clone().unwrap_or_default();

    status.synced = true;
    status.error_message.clear();
    status.last_update = Some(timestamp(now));
    status.observed_generation = claim.metadata.generation;
    if let Some(trigger) = claim_type.reconcile_trigger() {
        status.last_reconcile_trigger = trigger.to_string();
    }
    set_ready_condition(
        &mut status.conditions,
        true,
        REASON_SUCCEEDED,
        format!("Secret {name} is in sync"),
        now,
    );
    status.created_secret_name = name;

    status
}

/// Status after a failed cycle
///
/// Clears `lastReconcileTrigger` so that the next trigger comparison forces
/// regeneration once the cause is fixed.
#[must_use]
pub fn error_status(claim: &SecretClaim, message: &str, now: DateTime<Utc>) -> SecretClaimStatus {
    let mut status = claim.status.clone().unwrap_or_default();

    status.synced = false;
    status.error_message = message.to_string();
    status.last_reconcile_trigger.clear();
    status.observed_generation = claim.metadata.generation;
    set_ready_condition(
        &mut status.conditions,
        false,
        REASON_FAILED,
        message.to_string(),
        now,
    );

    status
}

/// Writes claim status through a [`ClaimStore`]
#[derive(Clone)]
pub struct StatusReporter {
    claims: Arc<dyn ClaimStore>,
}

impl std::fmt::Debug for StatusReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusReporter").finish_non_exhaustive()
    }
}

impl StatusReporter {
    #[must_use]
    pub fn new(claims: Arc<dyn ClaimStore>) -> Self {
        Self { claims }
    }

    /// Report a successful sync. Returns whether the write succeeded.
    pub async fn report_synced(&self, claim: &SecretClaim, claim_type: &ClaimType) -> bool {
        self.write(claim, &synced_status(claim, claim_type, Utc::now()))
            .await
    }

    /// Report a failed cycle. Returns whether the write succeeded.
    pub async fn report_error(&self, claim: &SecretClaim, message: &str) -> bool {
        self.write(claim, &error_status(claim, message, Utc::now()))
            .await
    }

    async fn write(&self, claim: &SecretClaim, status: &SecretClaimStatus) -> bool {
        debug!(synced = status.synced, "Updating SecretClaim status");
        match self.claims.update_status(claim, status).await {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "Failed to update SecretClaim status");
                metrics::increment_status_write_failures();
                false
            }
        }
    }
}
