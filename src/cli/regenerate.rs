//! # Regenerate Command
//!
//! Forces new values for an `AutoGenerated` claim by writing a fresh
//! `reconcileTrigger`. The controller sees a trigger that differs from the
//! last applied one and rewrites the Secret.

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use kube::api::{Api, Patch, PatchParams};
use kube::Client;
use secret_claim_controller::crd::{SecretClaim, CLAIM_TYPE_AUTO_GENERATED};
use serde_json::json;

const FIELD_MANAGER: &str = "scctl";

/// Trigger token for `now`
fn trigger_token(now: DateTime<Utc>) -> String {
    format!(
        "scctl-{}",
        now.to_rfc3339_opts(SecondsFormat::Millis, true)
    )
}

/// Patch that sets only `spec.generation.reconcileTrigger`
fn trigger_patch(token: &str) -> serde_json::Value {
    json!({
        "spec": {
            "generation": {
                "reconcileTrigger": token
            }
        }
    })
}

/// Set a new reconcile trigger on an `AutoGenerated` SecretClaim
pub async fn regenerate_command(
    client: Client,
    name: String,
    namespace: Option<String>,
) -> Result<()> {
    let ns = namespace.as_deref().unwrap_or("default");
    let api: Api<SecretClaim> = Api::namespaced(client, ns);

    let claim = api
        .get(&name)
        .await
        .with_context(|| format!("Failed to get SecretClaim '{ns}/{name}'"))?;

    if claim.spec.claim_type != CLAIM_TYPE_AUTO_GENERATED || claim.spec.generation.is_none() {
        return Err(anyhow::anyhow!(
            "SecretClaim '{ns}/{name}' is of type '{}'; only AutoGenerated claims with a generation policy can be regenerated",
            claim.spec.claim_type
        ));
    }

    let token = trigger_token(Utc::now());
    println!("🔄 Regenerating SecretClaim '{ns}/{name}'...");
    println!("   Previous trigger: {}", claim.reconcile_trigger());
    println!("   New trigger: {token}");

    api.patch(
        &name,
        &PatchParams::apply(FIELD_MANAGER),
        &Patch::Merge(trigger_patch(&token)),
    )
    .await
    .with_context(|| format!("Failed to patch SecretClaim '{ns}/{name}'"))?;

    println!("✅ Reconcile trigger updated; the controller will regenerate the Secret");
    Ok(())
}
