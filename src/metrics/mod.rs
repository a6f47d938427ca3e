pub mod registry;

use anyhow::{Context, Result};
use prometheus::{Encoder, TextEncoder};

/// Render every registered metric in the Prometheus text exposition format
pub fn render() -> Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .context("Failed to encode metrics")?;

    String::from_utf8(buffer).context("Metrics output is not valid UTF-8")
}

// Re-export commonly used metrics for convenience
pub use registry::{
    BOOLI_API_CALLS_TOTAL, BOOLI_API_ERRORS_TOTAL, BOOLI_RATE_LIMIT_WAITS_TOTAL,
    LISTINGS_DECODED_TOTAL, LISTINGS_SKIPPED_TOTAL,
};
