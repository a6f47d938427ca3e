use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

use crate::booli::auth::{encode_query, AuthParams, SearchParams};
use crate::booli::rate_limiter::RateLimiter;
use crate::booli::response::decode_search_response;
use crate::booli::source::ListingSource;
use crate::config::BooliConfig;
use crate::metrics::registry::{BOOLI_API_CALLS_TOTAL, BOOLI_API_ERRORS_TOTAL};
use crate::models::Listing;
use crate::query::ResultSet;

/// Rate-limited Booli listing API client
#[derive(Clone)]
pub struct BooliClient {
    config: BooliConfig,
    rate_limiter: RateLimiter,
    http_client: reqwest::Client,
}

impl BooliClient {
    pub fn new(config: &BooliConfig) -> Result<Self> {
        let rate_limiter = RateLimiter::new(config.rate_limit_per_second);

        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_seconds))
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(
                    reqwest::header::ACCEPT,
                    reqwest::header::HeaderValue::from_static("application/json"),
                );
                headers
            })
            .build()
            .context("Failed to build HTTP client")?;

        info!(
            "Initialized Booli client for {} with rate limit: {} req/sec",
            config.base_url,
            rate_limiter.requests_per_second()
        );

        Ok(Self {
            config: config.clone(),
            rate_limiter,
            http_client,
        })
    }

    /// Fully signed request URL for a search in `area`
    pub fn search_url(&self, area: &str, params: &SearchParams) -> String {
        let auth = AuthParams::generate(&self.config.caller_id, &self.config.api_key);
        format!(
            "{}?{}",
            self.config.area_url(area),
            encode_query(params, &auth)
        )
    }

    async fn make_request(&self, endpoint: &'static str, url: String) -> Result<reqwest::Response> {
        BOOLI_API_CALLS_TOTAL.with_label_values(&[endpoint]).inc();

        self.rate_limiter.acquire().await;

        self.http_client
            .get(&url)
            .send()
            .await
            .context("Failed to send request to Booli")
    }

    /// Search listings in an area, e.g. `"stockholm"`, with extra filter parameters
    pub async fn search(&self, area: &str, params: &SearchParams) -> Result<ResultSet<Listing>> {
        debug!("Searching Booli area '{}' with {} parameters", area, params.len());

        let url = self.search_url(area, params);
        let response = self.make_request("listing", url).await?;

        if !response.status().is_success() {
            let status = response.status();
            BOOLI_API_ERRORS_TOTAL
                .with_label_values(&[&status.as_u16().to_string()])
                .inc();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "Booli API error: {} - {}",
                status,
                error_text
            ));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .context("Failed to parse Booli response")?;

        let listings = decode_search_response(body)?;

        info!(
            "Found {} listings from Booli for area '{}' ({} reported)",
            listings.len(),
            area,
            listings.total_count().unwrap_or_default()
        );
        Ok(listings)
    }
}

#[async_trait]
impl ListingSource for BooliClient {
    async fn search(&self, area: &str, params: &SearchParams) -> Result<ResultSet<Listing>> {
        BooliClient::search(self, area, params).await
    }
}
