use basketiq_core::{PriceStore, RawListing};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::engine::process_scraped_product;
use crate::error::IngestError;

/// Tally of one retailer batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub processed: usize,
    pub skipped: usize,
    pub history_appended: usize,
}

/// Ingests every listing independently. A failing listing is logged and
/// counted as skipped; it never stops the rest of the batch.
pub async fn ingest_batch<S>(
    store: &S,
    listings: &[RawListing],
    retailer_name: &str,
    observed_at: DateTime<Utc>,
) -> BatchReport
where
    S: PriceStore + ?Sized,
{
    let mut report = BatchReport::default();

    for (index, raw) in listings.iter().enumerate() {
        match process_scraped_product(store, raw, retailer_name, observed_at).await {
            Ok(outcome) => {
                report.processed += 1;
                if outcome.history_appended {
                    report.history_appended += 1;
                }
            }
            Err(e @ IngestError::Store(_)) => {
                tracing::error!(
                    retailer = %retailer_name,
                    index,
                    error = %e,
                    "failed to store listing"
                );
                report.skipped += 1;
            }
            Err(e) => {
                tracing::warn!(
                    retailer = %retailer_name,
                    index,
                    error = %e,
                    "skipping invalid listing"
                );
                report.skipped += 1;
            }
        }
    }

    report
}
