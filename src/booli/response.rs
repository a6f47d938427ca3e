use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::metrics::registry::{LISTINGS_DECODED_TOTAL, LISTINGS_SKIPPED_TOTAL};
use crate::models::Listing;
use crate::query::ResultSet;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    booli: Envelope,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    content: Content,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Content {
    #[serde(default)]
    listings: Vec<serde_json::Value>,
    total_listing_count: u64,
}

/// Decode a search response body into listings plus the server's total count.
///
/// Listings that fail to decode are logged and skipped.
pub fn decode_search_response(body: serde_json::Value) -> Result<ResultSet<Listing>> {
    let response: SearchResponse =
        serde_json::from_value(body).context("Unexpected Booli search response shape")?;
    let content = response.booli.content;

    let mut listings = Vec::with_capacity(content.listings.len());
    for listing_json in content.listings {
        match Listing::from_booli_json(listing_json) {
            Ok(listing) => listings.push(listing),
            Err(e) => {
                LISTINGS_SKIPPED_TOTAL.inc();
                warn!("Skipping listing that could not be decoded: {:#}", e);
            }
        }
    }

    LISTINGS_DECODED_TOTAL.inc_by(listings.len() as u64);
    debug!(
        "Decoded {} listings, server reports {} in total",
        listings.len(),
        content.total_listing_count
    );

    Ok(ResultSet::with_total_count(
        listings,
        content.total_listing_count,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_search_response() {
        let body = json!({
            "booli": {
                "content": {
                    "totalListingCount": 230,
                    "listings": [
                        { "booliId": 1, "created": "2012-05-01 08:00:00", "priceForSale": 100 },
                        { "booliId": 2, "created": "not a date" },
                        { "booliId": 3, "created": "2012-05-02 08:00:00", "priceForSale": 200 }
                    ]
                }
            }
        });

        let listings = decode_search_response(body).unwrap();
        assert_eq!(listings.total_count(), Some(230));
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].id, 1);
        assert_eq!(listings[1].price, 200);
    }

    #[test]
    fn test_unexpected_shape() {
        let err = decode_search_response(json!({ "error": "invalid hash" })).unwrap_err();
        assert!(err.to_string().contains("response shape"));
    }
}
