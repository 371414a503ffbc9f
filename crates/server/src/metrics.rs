//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the add-on server:
//! - HTTP request metrics (latency, counts, in flight)
//! - Stream resolution outcomes
//! - Catalog and cache sizes (collected dynamically)

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};
use regex_lite::Regex;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "raas_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("raas_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "raas_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Resolution Metrics
// =============================================================================

/// Stream resolutions by outcome ("resolved" or "empty").
pub static STREAM_RESOLUTIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "raas_stream_resolutions_total",
            "Stream resolution requests by outcome",
        ),
        &["outcome"],
    )
    .unwrap()
});

/// Stream candidates handed out.
pub static STREAM_CANDIDATES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "raas_stream_candidates_total",
        "Total playable stream candidates resolved",
    )
    .unwrap()
});

// =============================================================================
// Catalog and Cache Metrics (collected dynamically)
// =============================================================================

/// Catalogs known from the last discovery.
pub static CATALOGS_KNOWN: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("raas_catalogs_known", "Number of discovered catalogs").unwrap()
});

/// Item records held in the lookup cache.
pub static CACHED_RECORDS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("raas_cached_records", "Item records in the lookup cache").unwrap()
});

/// Item locations held in the lookup cache.
pub static CACHED_LOCATIONS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "raas_cached_locations",
        "Item listing locations in the lookup cache",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // Resolution
    registry
        .register(Box::new(STREAM_RESOLUTIONS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(STREAM_CANDIDATES_TOTAL.clone()))
        .unwrap();

    // Catalog and cache
    registry.register(Box::new(CATALOGS_KNOWN.clone())).unwrap();
    registry.register(Box::new(CACHED_RECORDS.clone())).unwrap();
    registry
        .register(Box::new(CACHED_LOCATIONS.clone()))
        .unwrap();
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, String> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| e.to_string())?;
    String::from_utf8(buffer).map_err(|e| e.to_string())
}

/// Record the outcome of one stream resolution.
pub fn record_stream_resolution(candidates: usize) {
    let outcome = if candidates > 0 { "resolved" } else { "empty" };
    STREAM_RESOLUTIONS_TOTAL.with_label_values(&[outcome]).inc();
    STREAM_CANDIDATES_TOTAL.inc_by(candidates as u64);
}

/// Collect dynamic metrics from current application state.
///
/// Called before encoding so gauges reflect the catalog directory and
/// cache as they are now.
pub async fn collect_dynamic_metrics(state: &crate::state::AppState) {
    let service = state.service();
    CATALOGS_KNOWN.set(service.list_catalogs().await.len() as i64);

    let stats = service.cache_stats().await;
    CACHED_RECORDS.set(stats.records as i64);
    CACHED_LOCATIONS.set(stats.listing_urls as i64);
}

static ADDON_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/(catalog|meta|stream)/([^/]+)/[^/]+(/[^/]+)?$").unwrap());
static NUMERIC_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"/\d+(/|$)").unwrap());

/// Normalize a path for metric labels (replace IDs with placeholders).
///
/// Add-on resources keep their resource and content type; item ids,
/// catalog ids and extras are collapsed.
pub fn normalize_path(path: &str) -> String {
    if let Some(caps) = ADDON_PATH.captures(path) {
        let extra = if caps.get(3).is_some() { "/{extra}" } else { "" };
        return format!("/{}/{}/{{id}}{}", &caps[1], &caps[2], extra);
    }

    NUMERIC_SEGMENT.replace_all(path, "/{id}$1").to_string()
}
