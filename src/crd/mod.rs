//! # Custom Resource Definitions
//!
//! CRD types for the SecretClaim controller.
//!
//! ## Module Structure
//!
//! - `spec.rs` - `SecretClaim` resource and its generation policy
//! - `status.rs` - Status types for tracking reconciliation state

mod spec;
mod status;

pub use spec::{
    GenerationConfig, SecretClaim, SecretClaimSpec, CLAIM_TYPE_AUTO_GENERATED, CLAIM_TYPE_OPAQUE,
};
pub use status::{Condition, SecretClaimStatus};
