//! # Constants
//!
//! Shared constants used throughout the controller.
//!
//! These values represent reasonable defaults and can be overridden via
//! environment variables where applicable.

/// Default HTTP server port for metrics and health probes
pub const DEFAULT_METRICS_PORT: u16 = 5000;

/// Default HTTP server startup timeout (how long to wait for server to be ready)
pub const DEFAULT_SERVER_STARTUP_TIMEOUT_SECS: u64 = 10;

/// Default HTTP server readiness poll interval
pub const DEFAULT_SERVER_POLL_INTERVAL_MS: u64 = 50;

/// Default deadline for a single reconciliation cycle (seconds)
pub const DEFAULT_RECONCILE_TIMEOUT_SECS: u64 = 30;

/// Default Fibonacci backoff floor (minutes)
pub const DEFAULT_BACKOFF_MIN_MINUTES: u64 = 1;

/// Default Fibonacci backoff cap (minutes)
pub const DEFAULT_BACKOFF_MAX_MINUTES: u64 = 10;

/// Default number of claims reconciled in parallel
pub const DEFAULT_MAX_CONCURRENT_RECONCILIATIONS: u16 = 10;

/// Field manager name used for status patches
pub const DEFAULT_FIELD_MANAGER: &str = "secret-claim-controller";

/// Minimum length of a generated secret value
pub const MIN_GENERATED_LENGTH: usize = 8;

/// Maximum length of a generated secret value
pub const MAX_GENERATED_LENGTH: usize = 4096;

/// Annotation carrying the W3C `traceparent` of the request that last wrote the claim
pub const TRACEPARENT_ANNOTATION: &str = "secret-claim.io/traceparent";

/// Annotation that kubectl uses for client-side apply; never copied onto Secrets
pub const LAST_APPLIED_ANNOTATION: &str = "kubectl.kubernetes.io/last-applied-configuration";

/// Kubernetes Secret type written for every materialized claim
pub const SECRET_TYPE_OPAQUE: &str = "Opaque";
