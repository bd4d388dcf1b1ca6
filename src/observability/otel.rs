//! # OpenTelemetry Support
//!
//! - Datadog trace export via `datadog-opentelemetry`, enabled when `DD_API_KEY`
//!   is present in the environment
//! - [`TraceCarrier`], the W3C `traceparent` a client attached to a claim
//!
//! The carrier is never interpreted beyond extracting a trace id for log
//! correlation. Reconciliation behaves identically with or without it.

use crate::constants::TRACEPARENT_ANNOTATION;
use anyhow::Result;
use opentelemetry::propagation::{Extractor, TextMapPropagator};
use opentelemetry::trace::TraceContextExt;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{info, warn};

const TRACEPARENT_HEADER: &str = "traceparent";

/// Tracer provider handle for graceful shutdown
#[derive(Debug)]
pub enum TracerProviderHandle {
    Datadog(opentelemetry_sdk::trace::SdkTracerProvider),
}

/// Initialize Datadog tracing when `DD_API_KEY` is set
///
/// Returns `Ok(None)` when Datadog is not configured.
///
/// # Errors
///
/// Returns an error if initialization fails.
pub fn init_otel() -> Result<Option<TracerProviderHandle>> {
    if std::env::var("DD_API_KEY").is_err() {
        info!("No Datadog configuration provided, skipping OpenTelemetry initialization");
        return Ok(None);
    }

    if std::env::var("DD_SERVICE").is_err() {
        std::env::set_var("DD_SERVICE", "secret-claim-controller");
    }
    if std::env::var("DD_VERSION").is_err() {
        let build_version = format!("{}-{}", env!("CARGO_PKG_VERSION"), env!("BUILD_GIT_HASH"));
        std::env::set_var("DD_VERSION", build_version);
    }
    if std::env::var("DD_SITE").is_err() {
        std::env::set_var("DD_SITE", "datadoghq.com");
    }
    if std::env::var("DD_TRACE_AGENT_URL").is_err() {
        std::env::set_var("DD_TRACE_AGENT_URL", "http://localhost:8126");
    }

    info!(
        service = %std::env::var("DD_SERVICE").unwrap_or_default(),
        version = %std::env::var("DD_VERSION").unwrap_or_default(),
        env = ?std::env::var("DD_ENV").ok(),
        agent = %std::env::var("DD_TRACE_AGENT_URL").unwrap_or_default(),
        "Initializing Datadog OpenTelemetry tracing"
    );

    let tracer_provider = datadog_opentelemetry::tracing().init();

    info!("✅ Datadog OpenTelemetry tracing initialized");
    Ok(Some(TracerProviderHandle::Datadog(tracer_provider)))
}

/// Flush pending spans and shut down the tracer provider
pub fn shutdown_otel(tracer_provider: Option<TracerProviderHandle>) {
    if let Some(TracerProviderHandle::Datadog(provider)) = tracer_provider {
        info!("Shutting down Datadog tracer provider...");
        if let Err(e) = provider.shutdown_with_timeout(Duration::from_secs(5)) {
            warn!("Error shutting down Datadog tracer provider: {}", e);
        } else {
            info!("✅ Datadog tracer provider shut down successfully");
        }
    }
}

/// W3C trace context attached to a claim by whoever last wrote it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceCarrier {
    traceparent: String,
}

impl TraceCarrier {
    /// Read the carrier from claim annotations, `None` when absent or blank
    #[must_use]
    pub fn from_annotations(annotations: Option<&BTreeMap<String, String>>) -> Option<Self> {
        annotations?
            .get(TRACEPARENT_ANNOTATION)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(|v| Self {
                traceparent: v.to_string(),
            })
    }

    #[must_use]
    pub fn traceparent(&self) -> &str {
        &self.traceparent
    }

    /// Trace id carried by a well-formed `traceparent`
    #[must_use]
    pub fn trace_id(&self) -> Option<String> {
        let cx = TraceContextPropagator::new().extract(self);
        let span = cx.span();
        let span_context = span.span_context();
        span_context
            .is_valid()
            .then(|| span_context.trace_id().to_string())
    }
}

impl Extractor for TraceCarrier {
    fn get(&self, key: &str) -> Option<&str> {
        key.eq_ignore_ascii_case(TRACEPARENT_HEADER)
            .then_some(self.traceparent.as_str())
    }

    fn keys(&self) -> Vec<&str> {
        vec![TRACEPARENT_HEADER]
    }
}
