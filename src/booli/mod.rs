//! Booli listing API: request signing, HTTP client and response decoding

pub mod auth;
pub mod client;
pub mod rate_limiter;
pub mod response;
pub mod source;

pub use auth::{AuthParams, SearchParams};
pub use client::BooliClient;
pub use source::{FileSource, ListingSource};
