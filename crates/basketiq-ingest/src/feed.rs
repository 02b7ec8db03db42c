//! HTTP client for already-scraped retailer listing feeds.
//!
//! A feed is a URL returning a JSON array of listing objects. One timed GET
//! per fetch; retries and backoff belong to the scraping service upstream.

use std::time::Duration;

use basketiq_core::RawListing;
use reqwest::Client;

use crate::error::FeedError;

pub struct FeedClient {
    client: Client,
}

impl FeedClient {
    /// Creates a `FeedClient` with a request timeout and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    /// Fetches one retailer feed.
    ///
    /// # Errors
    ///
    /// - [`FeedError::Http`]: network, TLS, or timeout failure.
    /// - [`FeedError::UnexpectedStatus`]: any non-2xx response.
    /// - [`FeedError::Deserialize`]: the body is not a JSON array.
    pub async fn fetch_listings(&self, url: &str) -> Result<Vec<RawListing>, FeedError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        parse_listings(&body, url)
    }
}

/// Parses a JSON array of listings.
///
/// Elements that are not valid listing objects are logged and dropped so one
/// malformed record cannot sink the whole feed.
///
/// # Errors
///
/// Returns [`FeedError::Deserialize`] when `body` is not a JSON array.
pub fn parse_listings(body: &str, context: &str) -> Result<Vec<RawListing>, FeedError> {
    let values: Vec<serde_json::Value> =
        serde_json::from_str(body).map_err(|e| FeedError::Deserialize {
            context: context.to_string(),
            source: e,
        })?;

    let listings = values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value::<RawListing>(value) {
            Ok(listing) => Some(listing),
            Err(e) => {
                tracing::warn!(context, index, error = %e, "dropping malformed listing");
                None
            }
        })
        .collect();
    Ok(listings)
}
