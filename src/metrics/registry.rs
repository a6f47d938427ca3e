use lazy_static::lazy_static;
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

lazy_static! {
    // Booli API Metrics
    pub static ref BOOLI_API_CALLS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "booli_api_calls_total",
        "Total calls to the Booli API",
        &["endpoint"]
    )
    .unwrap();

    pub static ref BOOLI_API_ERRORS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "booli_api_errors_total",
        "Total Booli API errors",
        &["status_code"]
    )
    .unwrap();

    pub static ref BOOLI_RATE_LIMIT_WAITS_TOTAL: IntCounter = register_int_counter!(
        "booli_rate_limit_waits_total",
        "Total times the rate limit caused a wait"
    )
    .unwrap();

    // Decoding Metrics
    pub static ref LISTINGS_DECODED_TOTAL: IntCounter = register_int_counter!(
        "booli_listings_decoded_total",
        "Listings decoded from search responses"
    )
    .unwrap();

    pub static ref LISTINGS_SKIPPED_TOTAL: IntCounter = register_int_counter!(
        "booli_listings_skipped_total",
        "Listings dropped because they could not be decoded"
    )
    .unwrap();
}

/// Initialize all metrics (called on startup)
pub fn init_metrics() {
    // Force lazy_static initialization
    lazy_static::initialize(&BOOLI_API_CALLS_TOTAL);
    lazy_static::initialize(&BOOLI_API_ERRORS_TOTAL);
    lazy_static::initialize(&BOOLI_RATE_LIMIT_WAITS_TOTAL);
    lazy_static::initialize(&LISTINGS_DECODED_TOTAL);
    lazy_static::initialize(&LISTINGS_SKIPPED_TOTAL);
}
