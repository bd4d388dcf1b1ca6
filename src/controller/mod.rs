//! # Controller
//!
//! Core controller modules for the SecretClaim controller.
//!
//! - `validation`: claim spec to [`validation::ClaimType`]
//! - `generator`: random values for generated claims
//! - `drift`: whether an owned Secret must be rewritten
//! - `ownership`: owner reference checks
//! - `materializer`: Secret content and the single create/update call
//! - `status`: status computation and persistence
//! - `store`: claim and Secret store interfaces
//! - `reconciler`: the per-claim state machine
//! - `backoff`: Fibonacci backoff for failed cycles
//! - `server`: HTTP server for metrics and health checks

pub mod backoff;
pub mod drift;
pub mod generator;
pub mod materializer;
pub mod ownership;
pub mod reconciler;
pub mod server;
pub mod status;
pub mod store;
pub mod validation;
