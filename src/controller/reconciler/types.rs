//! # Types
//!
//! Context, errors and outcomes of the reconciler.

use crate::config::ControllerConfig;
use crate::controller::backoff::FibonacciBackoff;
use crate::controller::generator::{GenerationError, SecretGenerator};
use crate::controller::status::StatusReporter;
use crate::controller::store::{
    ArtifactStore, ClaimStore, KubeArtifactStore, KubeClaimStore, StoreError,
};
use crate::controller::validation::ValidationError;
use kube::Client;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

/// Failure of one reconciliation cycle
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ReconcileError {
    /// Validation failures wait for the claim to change; everything else is
    /// retried with backoff
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Validation(_))
    }
}

/// Error returned to the controller runtime
#[derive(Debug, Error)]
pub enum ReconcilerError {
    #[error("Reconciliation failed: {0}")]
    ReconciliationFailed(#[from] ReconcileError),
    #[error("Reconciliation exceeded its deadline of {0:?}")]
    DeadlineExceeded(Duration),
    #[error("SecretClaim has no name or namespace")]
    MissingKey,
}

impl ReconcilerError {
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ReconciliationFailed(e) => e.is_retryable(),
            Self::DeadlineExceeded(_) => true,
            Self::MissingKey => false,
        }
    }
}

/// How a cycle ended when it did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The claim no longer exists
    ClaimGone,
    /// A Secret with the claim's name exists and belongs to something else
    SkippedForeign,
    /// Secret created
    Created,
    /// Secret rewritten after drift or a new reconcile trigger
    Updated,
    /// Secret already converged; only the status was marked synced
    StatusRepaired,
    /// Nothing to do
    Idle,
}

impl Outcome {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClaimGone => "claim-gone",
            Self::SkippedForeign => "skipped-foreign",
            Self::Created => "created",
            Self::Updated => "updated",
            Self::StatusRepaired => "status-repaired",
            Self::Idle => "idle",
        }
    }
}

/// Backoff state for a specific claim
#[derive(Debug, Clone)]
pub struct BackoffState {
    pub backoff: FibonacciBackoff,
    pub error_count: u32,
}

impl BackoffState {
    #[must_use]
    pub fn new(min_minutes: u64, max_minutes: u64) -> Self {
        Self {
            backoff: FibonacciBackoff::new(min_minutes, max_minutes),
            error_count: 0,
        }
    }

    pub fn increment_error(&mut self) {
        self.error_count = self.error_count.saturating_add(1);
    }
}

/// Shared reconciler context
#[derive(Clone)]
pub struct Reconciler {
    pub claims: Arc<dyn ClaimStore>,
    pub artifacts: Arc<dyn ArtifactStore>,
    pub generator: SecretGenerator,
    pub config: ControllerConfig,
    // Backoff state per claim (namespace/name), owned by the error policy
    pub backoff_states: Arc<Mutex<HashMap<String, BackoffState>>>,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("generator", &self.generator)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Reconciler {
    #[must_use]
    pub fn new(
        claims: Arc<dyn ClaimStore>,
        artifacts: Arc<dyn ArtifactStore>,
        generator: SecretGenerator,
        config: ControllerConfig,
    ) -> Self {
        Self {
            claims,
            artifacts,
            generator,
            config,
            backoff_states: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Reconciler backed by the Kubernetes API and the OS random source
    #[must_use]
    pub fn from_client(client: Client, config: ControllerConfig) -> Self {
        let claims = Arc::new(KubeClaimStore::new(
            client.clone(),
            config.field_manager.clone(),
        ));
        let artifacts = Arc::new(KubeArtifactStore::new(client, config.field_manager.clone()));
        Self::new(claims, artifacts, SecretGenerator::default(), config)
    }

    #[must_use]
    pub fn status_reporter(&self) -> StatusReporter {
        StatusReporter::new(Arc::clone(&self.claims))
    }

    /// Forget accumulated backoff for a claim after a successful cycle
    ///
    /// The entry is dropped rather than reset, so claims that were deleted
    /// (their last cycle ends in [`Outcome::ClaimGone`]) leave nothing behind.
    pub fn reset_backoff(&self, key: &str) {
        if let Ok(mut states) = self.backoff_states.lock() {
            states.remove(key);
        }
    }

    /// Number of claims currently carrying backoff state
    #[must_use]
    pub fn backoff_entries(&self) -> usize {
        self.backoff_states.lock().map_or(0, |states| states.len())
    }
}
