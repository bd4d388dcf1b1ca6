//! # Reconciler
//!
//! Reconciliation of `SecretClaim` resources into owned `Secret`s.
//!
//! The reconciler:
//! - Fetches the claim and the Secret sharing its name
//! - Leaves Secrets owned by anything else alone
//! - Creates missing Secrets and rewrites owned ones that drifted
//! - Reports the result on the claim's status
//!
//! Retries are not handled here; failed cycles return an error and the
//! runtime's error policy schedules the next attempt.

pub mod reconcile;
pub mod types;

pub use reconcile::{reconcile, reconcile_claim};
pub use types::{BackoffState, Outcome, ReconcileError, Reconciler, ReconcilerError};
