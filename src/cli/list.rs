//! # List Command

use anyhow::{Context, Result};
use kube::{api::Api, api::ListParams, Client};
use secret_claim_controller::crd::SecretClaim;

/// List SecretClaim resources in one or all namespaces
pub async fn list_command(client: Client, namespace: Option<String>) -> Result<()> {
    let api: Api<SecretClaim> = if let Some(ns) = &namespace {
        println!("Listing SecretClaim resources in namespace '{ns}'...");
        Api::namespaced(client, ns)
    } else {
        println!("Listing SecretClaim resources in all namespaces...");
        Api::all(client)
    };

    let claims = api
        .list(&ListParams::default())
        .await
        .context("Failed to list SecretClaim resources")?;

    if claims.items.is_empty() {
        println!("No SecretClaim resources found.");
        return Ok(());
    }

    println!(
        "\n{:<30} {:<20} {:<15} {:<8} {:<30}",
        "NAME", "NAMESPACE", "TYPE", "SYNCED", "ERROR"
    );
    println!("{}", "-".repeat(106));

    for claim in claims.items {
        let name = claim.metadata.name.as_deref().unwrap_or("<unknown>");
        let ns = claim.metadata.namespace.as_deref().unwrap_or("<unknown>");
        let claim_type = claim.spec.claim_type.as_str();
        let synced = if claim.is_synced() { "True" } else { "False" };
        let error = claim
            .status
            .as_ref()
            .map(|s| s.error_message.as_str())
            .filter(|m| !m.is_empty())
            .unwrap_or("-");

        println!("{name:<30} {ns:<20} {claim_type:<15} {synced:<8} {error:<30}");
    }

    Ok(())
}
