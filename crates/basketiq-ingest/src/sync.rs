//! Sequential multi-retailer sync: fetch each feed, ingest it, report.

use basketiq_core::{PriceStore, RetailerFeed};
use chrono::Utc;
use serde::Serialize;

use crate::batch::ingest_batch;
use crate::feed::FeedClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Success,
    Failed,
}

/// Outcome of syncing one retailer feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RetailerSyncStatus {
    pub retailer: String,
    pub status: SyncStatus,
    pub products_processed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Syncs `feeds` strictly one after another, in the given order.
///
/// A fetch failure marks only that retailer as failed; later retailers are
/// still synced.
pub async fn sync_retailers<S>(
    store: &S,
    feeds: &[RetailerFeed],
    client: &FeedClient,
) -> Vec<RetailerSyncStatus>
where
    S: PriceStore + ?Sized,
{
    let mut results = Vec::with_capacity(feeds.len());

    for feed in feeds {
        tracing::info!(retailer = %feed.name, url = %feed.url, "starting retailer sync");

        match client.fetch_listings(&feed.url).await {
            Ok(listings) => {
                let report = ingest_batch(store, &listings, &feed.name, Utc::now()).await;
                tracing::info!(
                    retailer = %feed.name,
                    processed = report.processed,
                    skipped = report.skipped,
                    history_appended = report.history_appended,
                    "completed retailer sync"
                );
                results.push(RetailerSyncStatus {
                    retailer: feed.name.clone(),
                    status: SyncStatus::Success,
                    products_processed: report.processed,
                    error: None,
                });
            }
            Err(e) => {
                tracing::error!(retailer = %feed.name, error = %e, "retailer sync failed");
                results.push(RetailerSyncStatus {
                    retailer: feed.name.clone(),
                    status: SyncStatus::Failed,
                    products_processed: 0,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    results
}
