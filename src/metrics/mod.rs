//! Prometheus metrics for the template service.
//!
//! - Slot extraction counts
//! - Payload compilation counts, latency and applied fallbacks
//! - Catalog size
//! - Session message counts

mod helpers;

pub use helpers::{encode_metrics, CatalogMetrics, CompileMetrics, SessionMetrics, SlotMetrics};

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, register_int_gauge,
    Histogram, IntCounter, IntCounterVec, IntGauge,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "waba_template";

lazy_static! {
    // ============================================================================
    // Extraction Metrics
    // ============================================================================

    /// Total slot extraction requests
    pub static ref EXTRACTIONS_TOTAL: IntCounter = register_int_counter!(
        format!("{}_extractions_total", METRIC_PREFIX),
        "Total slot extraction requests"
    ).unwrap();

    /// Total slots returned by extraction
    pub static ref SLOTS_EXTRACTED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_slots_extracted_total", METRIC_PREFIX),
        "Total slots returned by extraction"
    ).unwrap();

    // ============================================================================
    // Compilation Metrics
    // ============================================================================

    /// Compiled payloads by outcome (complete, with_fallbacks)
    pub static ref PAYLOADS_COMPILED_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_payloads_compiled_total", METRIC_PREFIX),
        "Total template payloads compiled",
        &["outcome"]
    ).unwrap();

    /// Fallbacks applied during compilation by kind
    pub static ref FALLBACKS_APPLIED_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_fallbacks_applied_total", METRIC_PREFIX),
        "Total fallbacks applied during compilation",
        &["kind"]
    ).unwrap();

    /// Compilation latency
    pub static ref COMPILE_LATENCY: Histogram = register_histogram!(
        format!("{}_compile_latency_seconds", METRIC_PREFIX),
        "Template payload compilation latency in seconds",
        vec![0.000_001, 0.000_005, 0.000_01, 0.000_05, 0.000_1, 0.000_5, 0.001, 0.005]
    ).unwrap();

    // ============================================================================
    // Catalog Metrics
    // ============================================================================

    /// Templates currently held in the catalog
    pub static ref CATALOG_TEMPLATES: IntGauge = register_int_gauge!(
        format!("{}_catalog_templates", METRIC_PREFIX),
        "Number of templates in the catalog"
    ).unwrap();

    // ============================================================================
    // Session Message Metrics
    // ============================================================================

    /// Session payloads built by kind (text, read, typing)
    pub static ref SESSION_MESSAGES_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_session_messages_total", METRIC_PREFIX),
        "Total session message payloads built",
        &["kind"]
    ).unwrap();
}
