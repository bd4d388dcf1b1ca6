//! # Delete Command
//!
//! Deletes a SecretClaim. The Secret it owns carries a controller owner
//! reference, so Kubernetes garbage-collects it along with the claim.

use anyhow::{Context, Result};
use kube::api::{Api, DeleteParams};
use kube::Client;
use secret_claim_controller::crd::SecretClaim;
use std::io::{BufRead, Write};

/// Whether a prompt answer confirms the deletion
fn confirmed(answer: &str) -> bool {
    matches!(answer.trim(), "y" | "Y" | "yes" | "Yes" | "YES")
}

/// Ask on `output` and read one line from `input`
///
/// An unreadable or empty answer counts as "no".
fn confirm(ns: &str, name: &str, input: &mut impl BufRead, output: &mut impl Write) -> bool {
    let _ = write!(
        output,
        "⚠️  Are you sure you want to delete SecretClaim '{ns}/{name}'? (y/N): "
    );
    let _ = output.flush();

    let mut answer = String::new();
    match input.read_line(&mut answer) {
        Ok(_) => confirmed(&answer),
        Err(_) => false,
    }
}

/// Delete a SecretClaim, prompting first unless `force` is set
pub async fn delete_command(
    client: Client,
    name: String,
    namespace: Option<String>,
    force: bool,
) -> Result<()> {
    let ns = namespace.as_deref().unwrap_or("default");

    if !force && !confirm(ns, &name, &mut std::io::stdin().lock(), &mut std::io::stdout()) {
        println!("Deletion cancelled.");
        return Ok(());
    }

    let api: Api<SecretClaim> = Api::namespaced(client, ns);
    api.delete(&name, &DeleteParams::default())
        .await
        .with_context(|| format!("Failed to delete SecretClaim '{ns}/{name}'"))?;

    println!("✅ SecretClaim '{ns}/{name}' deleted");
    println!("   The owned Secret is removed by garbage collection");
    Ok(())
}
