use anyhow::{Context, Result};
use std::env;

pub const DEFAULT_BASE_URL: &str = "http://api.booli.se/listing/";

#[derive(Debug, Clone)]
pub struct Config {
    pub booli: BooliConfig,
}

#[derive(Debug, Clone)]
pub struct BooliConfig {
    pub caller_id: String,
    pub api_key: String,
    pub base_url: String,
    pub rate_limit_per_second: u32,
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Ok(Config {
            booli: BooliConfig {
                caller_id: env::var("BOOLI_CALLER_ID").context("BOOLI_CALLER_ID must be set")?,
                api_key: env::var("BOOLI_API_KEY").context("BOOLI_API_KEY must be set")?,
                base_url: env::var("BOOLI_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
                rate_limit_per_second: env::var("BOOLI_RATE_LIMIT_PER_SECOND")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .context("BOOLI_RATE_LIMIT_PER_SECOND must be a valid number")?,
                timeout_seconds: env::var("BOOLI_TIMEOUT_SECONDS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .context("BOOLI_TIMEOUT_SECONDS must be a valid number")?,
                user_agent: env::var("BOOLI_USER_AGENT").unwrap_or_else(|_| {
                    format!("booli-query/{}", env!("CARGO_PKG_VERSION"))
                }),
            },
        })
    }
}

impl BooliConfig {
    /// Request URL prefix for a search area; the base URL always ends in `/`
    pub fn area_url(&self, area: &str) -> String {
        if self.base_url.ends_with('/') {
            format!("{}{}", self.base_url, area)
        } else {
            format!("{}/{}", self.base_url, area)
        }
    }
}
