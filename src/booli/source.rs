use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

use crate::booli::auth::SearchParams;
use crate::booli::response::decode_search_response;
use crate::models::Listing;
use crate::query::ResultSet;

/// Anything that can produce listings for an area search
#[async_trait]
pub trait ListingSource: Send + Sync {
    async fn search(&self, area: &str, params: &SearchParams) -> Result<ResultSet<Listing>>;
}

/// Replays a saved search response from disk, ignoring area and parameters
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ListingSource for FileSource {
    async fn search(&self, area: &str, _params: &SearchParams) -> Result<ResultSet<Listing>> {
        debug!(
            "Reading saved response for area '{}' from {}",
            area,
            self.path.display()
        );

        let bytes = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let body: serde_json::Value = serde_json::from_slice(&bytes)
            .with_context(|| format!("{} is not valid JSON", self.path.display()))?;

        decode_search_response(body)
    }
}
