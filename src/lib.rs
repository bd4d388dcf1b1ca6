//! SecretClaim Controller Library
//!
//! Reconciles `SecretClaim` resources into owned Kubernetes `Secret`s.
//! Tests are included in the module files and under `tests/`.
//!
//! ## Quick Start
//!
//! ```rust
//! use secret_claim_controller::prelude::*;
//! ```

pub mod config;
pub mod constants;
pub mod controller;
pub mod crd;
pub mod observability;
pub mod prelude;
pub mod runtime;
