//! # Observability
//!
//! - `metrics`: Prometheus metrics collection
//! - `otel`: Datadog trace export and trace context carried on claims

pub mod metrics;
pub mod otel;

pub use otel::{init_otel, shutdown_otel, TraceCarrier, TracerProviderHandle};
