//! # SCCTL CLI
//!
//! Command-line interface for the SecretClaim Controller.
//!
//! ## Usage
//!
//! ```bash
//! # List SecretClaims in all namespaces
//! scctl list
//!
//! # Show status of a SecretClaim
//! scctl status db-credentials --namespace payments
//!
//! # Regenerate the values of an AutoGenerated claim
//! scctl regenerate db-credentials --namespace payments
//!
//! # Delete a SecretClaim (and, through its owner reference, its Secret)
//! scctl delete db-credentials --namespace payments --force
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kube::Client;

mod delete;
mod list;
mod regenerate;
mod status;

/// SecretClaim Controller CLI
#[derive(Parser)]
#[command(name = "scctl")]
#[command(
    about = "SecretClaim Controller CLI",
    long_about = None,
    after_help = "\
Examples:
  scctl list
  scctl status my-secret --namespace default
  scctl regenerate my-secret -n default
  scctl delete my-secret -n default --force
"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Kubernetes namespace (`list` defaults to all namespaces, other
    /// commands to `default`)
    #[arg(short, long, global = true)]
    namespace: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List SecretClaim resources
    List,
    /// Show status of a SecretClaim resource
    Status {
        /// Name of the SecretClaim resource
        #[arg(value_name = "NAME")]
        name: String,
    },
    /// Regenerate the values of an AutoGenerated SecretClaim
    /// Sets `spec.generation.reconcileTrigger` to a fresh token
    Regenerate {
        /// Name of the SecretClaim resource
        #[arg(value_name = "NAME")]
        name: String,
    },
    /// Delete a SecretClaim resource
    /// The owned Secret is garbage-collected with it
    #[command(visible_aliases = ["del", "rm"])]
    Delete {
        /// Name of the SecretClaim resource
        #[arg(value_name = "NAME")]
        name: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        eprintln!("rustls crypto provider was already installed");
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scctl=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let client = Client::try_default()
        .await
        .context("Failed to create Kubernetes client. Ensure kubeconfig is configured.")?;

    match cli.command {
        Commands::List => list::list_command(client, cli.namespace).await,
        Commands::Status { name } => status::status_command(client, name, cli.namespace).await,
        Commands::Regenerate { name } => {
            regenerate::regenerate_command(client, name, cli.namespace).await
        }
        Commands::Delete { name, force } => {
            delete::delete_command(client, name, cli.namespace, force).await
        }
    }
}
