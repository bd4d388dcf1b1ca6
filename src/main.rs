//! # SecretClaim Controller
//!
//! A Kubernetes controller that turns `SecretClaim` resources into `Secret`s.
//!
//! - `Opaque` claims copy their `data` into the Secret verbatim
//! - `AutoGenerated` claims get random values for every key in
//!   `generation.dataKeys`, regenerated whenever `reconcileTrigger` changes
//!
//! The controller owns the Secrets it creates and never touches Secrets owned
//! by anything else.

use anyhow::Result;
use secret_claim_controller::observability;
use secret_claim_controller::runtime::initialization::initialize;
use secret_claim_controller::runtime::watch_loop::run_watch_loop;

#[tokio::main]
async fn main() -> Result<()> {
    let init = initialize().await?;

    run_watch_loop(init.client, init.reconciler, init.server_state).await?;

    observability::shutdown_otel(init.otel_tracer_provider);
    Ok(())
}
