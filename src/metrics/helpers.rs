//! Metrics helper structs for convenient metric recording

use std::time::Duration;

use prometheus::{Encoder, TextEncoder};

use crate::template::Fallback;

use super::{
    CATALOG_TEMPLATES, COMPILE_LATENCY, EXTRACTIONS_TOTAL, FALLBACKS_APPLIED_TOTAL,
    PAYLOADS_COMPILED_TOTAL, SESSION_MESSAGES_TOTAL, SLOTS_EXTRACTED_TOTAL,
};

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for recording slot extraction metrics
pub struct SlotMetrics;

impl SlotMetrics {
    pub fn record_extraction(slot_count: usize) {
        EXTRACTIONS_TOTAL.inc();
        SLOTS_EXTRACTED_TOTAL.inc_by(slot_count as u64);
    }
}

/// Helper struct for recording compilation metrics
pub struct CompileMetrics;

impl CompileMetrics {
    /// Record a compiled payload and the fallbacks it needed
    pub fn record_compiled(fallbacks: &[Fallback], elapsed: Duration) {
        let outcome = if fallbacks.is_empty() {
            "complete"
        } else {
            "with_fallbacks"
        };
        PAYLOADS_COMPILED_TOTAL.with_label_values(&[outcome]).inc();

        for fallback in fallbacks {
            FALLBACKS_APPLIED_TOTAL
                .with_label_values(&[fallback.kind.as_str()])
                .inc();
        }

        COMPILE_LATENCY.observe(elapsed.as_secs_f64());
    }
}

/// Helper struct for recording catalog metrics
pub struct CatalogMetrics;

impl CatalogMetrics {
    pub fn set_size(count: usize) {
        CATALOG_TEMPLATES.set(count as i64);
    }
}

/// Helper struct for recording session message metrics
pub struct SessionMetrics;

impl SessionMetrics {
    pub fn record_text() {
        SESSION_MESSAGES_TOTAL.with_label_values(&["text"]).inc();
    }

    pub fn record_read() {
        SESSION_MESSAGES_TOTAL.with_label_values(&["read"]).inc();
    }

    pub fn record_typing() {
        SESSION_MESSAGES_TOTAL.with_label_values(&["typing"]).inc();
    }
}
