//! # Status Command
//!
//! Shows the spec and observed status of one SecretClaim. Secret values are
//! never read or printed.

use anyhow::{Context, Result};
use kube::{api::Api, Client};
use secret_claim_controller::crd::SecretClaim;

/// Show detailed status of a SecretClaim resource
pub async fn status_command(client: Client, name: String, namespace: Option<String>) -> Result<()> {
    let ns = namespace.as_deref().unwrap_or("default");

    println!("📊 Status for SecretClaim '{ns}/{name}'");
    println!();

    let api: Api<SecretClaim> = Api::namespaced(client, ns);
    let claim = api
        .get(&name)
        .await
        .with_context(|| format!("Failed to get SecretClaim '{ns}/{name}'"))?;

    println!("Resource Information:");
    println!("  Name: {name}");
    println!("  Namespace: {ns}");
    if let Some(uid) = &claim.metadata.uid {
        println!("  UID: {uid}");
    }
    if let Some(generation) = claim.metadata.generation {
        println!("  Generation: {generation}");
    }

    println!();
    println!("Spec:");
    println!("  Type: {}", claim.spec.claim_type);
    if !claim.spec.data.is_empty() {
        let keys: Vec<&str> = claim.spec.data.keys().map(String::as_str).collect();
        println!("  Data Keys: {}", keys.join(", "));
    }
    if let Some(generation) = &claim.spec.generation {
        println!("  Generated Keys: {}", generation.data_keys.join(", "));
        println!("  Length: {}", generation.length);
        println!(
            "  Encoding: {}",
            if generation.encoding.is_empty() {
                "alphanumeric (default)"
            } else {
                generation.encoding.as_str()
            }
        );
        println!("  Reconcile Trigger: {}", display_or_dash(&generation.reconcile_trigger));
    }

    println!();
    println!("Status:");
    let Some(status) = &claim.status else {
        println!("  Not reconciled yet");
        return Ok(());
    };
    println!("  Synced: {}", status.synced);
    println!("  Secret: {}", display_or_dash(&status.created_secret_name));
    println!("  Last Update: {}", status.last_update.as_deref().unwrap_or("-"));
    println!(
        "  Last Reconcile Trigger: {}",
        display_or_dash(&status.last_reconcile_trigger)
    );
    if let Some(observed) = status.observed_generation {
        println!("  Observed Generation: {observed}");
    }
    if !status.error_message.is_empty() {
        println!("  Error: {}", status.error_message);
    }

    if !status.conditions.is_empty() {
        println!();
        println!("Conditions:");
        for condition in &status.conditions {
            println!(
                "  {}: {} ({})",
                condition.r#type,
                condition.status,
                condition.reason.as_deref().unwrap_or("-")
            );
            if let Some(message) = &condition.message {
                println!("    {message}");
            }
            if let Some(time) = &condition.last_transition_time {
                println!("    Last Transition: {time}");
            }
        }
    }

    Ok(())
}

fn display_or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}
