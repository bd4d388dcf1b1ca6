//! # Runtime
//!
//! Process-level wiring of the controller.
//!
//! - `initialization`: tracing, metrics, HTTP server and client setup
//! - `watch_loop`: the `kube_runtime::Controller` driving reconciliation
//! - `error_policy`: per-claim backoff after failed cycles

pub mod error_policy;
pub mod initialization;
pub mod watch_loop;
