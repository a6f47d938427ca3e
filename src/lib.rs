// Library exports for the binary and integration tests
pub mod booli;
pub mod cli;
pub mod config;
pub mod errors;
pub mod metrics;
pub mod models;
pub mod query;
