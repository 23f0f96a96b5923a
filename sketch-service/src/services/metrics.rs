//! Prometheus metrics for sketch-service.

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::OnceLock;

/// Registry and collectors, set together so they always belong to each other.
struct SketchMetrics {
    registry: Registry,
    uploads: IntCounterVec,
    provider_latency: HistogramVec,
    provider_errors: IntCounterVec,
    extraction: IntCounterVec,
    schema_mismatch: IntCounter,
}

static METRICS: OnceLock<SketchMetrics> = OnceLock::new();

/// Initialize all metrics. Later calls are no-ops.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    if METRICS.get().is_some() {
        return Ok(());
    }

    let registry = Registry::new();

    let uploads = IntCounterVec::new(
        Opts::new("sketch_uploads_total", "Total sketch uploads by outcome"),
        &["outcome"],
    )?;

    let provider_latency = HistogramVec::new(
        HistogramOpts::new(
            "sketch_provider_latency_seconds",
            "Vision provider latency in seconds",
        )
        .buckets(vec![0.5, 1.0, 2.0, 5.0, 10.0, 20.0, 30.0, 60.0, 120.0]),
        &["provider", "model"],
    )?;

    let provider_errors = IntCounterVec::new(
        Opts::new("sketch_provider_errors_total", "Total vision provider errors"),
        &["provider", "error_type"],
    )?;

    // method: direct, fenced, brace_span, failed
    let extraction = IntCounterVec::new(
        Opts::new("sketch_extraction_total", "JSON extraction attempts by method"),
        &["method"],
    )?;

    let schema_mismatch = IntCounter::new(
        "sketch_schema_mismatch_total",
        "Model outputs that did not match the UI description shape",
    )?;

    registry.register(Box::new(uploads.clone()))?;
    registry.register(Box::new(provider_latency.clone()))?;
    registry.register(Box::new(provider_errors.clone()))?;
    registry.register(Box::new(extraction.clone()))?;
    registry.register(Box::new(schema_mismatch.clone()))?;

    // A concurrent initializer may have won; its set is equally complete.
    if METRICS
        .set(SketchMetrics {
            registry,
            uploads,
            provider_latency,
            provider_errors,
            extraction,
            schema_mismatch,
        })
        .is_ok()
    {
        tracing::info!("Prometheus metrics initialized");
    }
    Ok(())
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();

    let registry = match METRICS.get() {
        Some(m) => &m.registry,
        None => return "# Metrics registry not initialized\n".to_string(),
    };

    if let Err(e) = encoder.encode(&registry.gather(), &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return format!("# Failed to encode metrics: {}\n", e);
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to convert metrics to UTF-8");
        format!("# Failed to convert metrics to UTF-8: {}\n", e)
    })
}

// Helper functions for recording metrics

/// Record the outcome of an upload request.
pub fn record_upload(outcome: &str) {
    if let Some(m) = METRICS.get() {
        m.uploads.with_label_values(&[outcome]).inc();
    }
}

/// Record provider latency.
pub fn record_provider_latency(provider: &str, model: &str, duration_secs: f64) {
    if let Some(m) = METRICS.get() {
        m.provider_latency
            .with_label_values(&[provider, model])
            .observe(duration_secs);
    }
}

/// Record a provider error.
pub fn record_provider_error(provider: &str, error_type: &str) {
    if let Some(m) = METRICS.get() {
        m.provider_errors
            .with_label_values(&[provider, error_type])
            .inc();
    }
}

/// Record which extraction step produced the JSON, or `failed`.
pub fn record_extraction(method: &str) {
    if let Some(m) = METRICS.get() {
        m.extraction.with_label_values(&[method]).inc();
    }
}

pub fn record_schema_mismatch() {
    if let Some(m) = METRICS.get() {
        m.schema_mismatch.inc();
    }
}
