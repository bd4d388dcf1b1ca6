//! # Prelude
//!
//! Re-exports commonly used types and traits.
//!
//! ```rust
//! use secret_claim_controller::prelude::*;
//! ```

pub use crate::crd::*;

pub use crate::controller::reconciler::{
    reconcile, reconcile_claim, Outcome, ReconcileError, Reconciler, ReconcilerError,
};

pub use crate::controller::store::{ArtifactStore, ClaimKey, ClaimStore, StoreError};

pub use crate::controller::generator::{Encoding, EntropySource, GenerationError, SecretGenerator};
pub use crate::controller::validation::{validate_claim, ClaimType, GenerationPolicy, ValidationError};

pub use crate::config::ControllerConfig;
