//! `ingest`, `sync` and `backfill` command handlers.
//!
//! Listing-level failures never abort a run; they are counted as skipped by
//! the batch and logged.

use std::path::Path;

use anyhow::Context;
use basketiq_core::{AppConfig, PriceStore};
use basketiq_ingest::{
    backfill_price_history, ingest_batch, parse_listings, sync_retailers, validate_backfill_limit,
    BackfillReport, BatchReport, FeedClient, RetailerSyncStatus, SyncStatus,
};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Reads a listings file and ingests it for `retailer`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a JSON array.
pub(crate) async fn run_ingest_file<S>(
    store: &S,
    retailer: &str,
    path: &Path,
) -> anyhow::Result<BatchReport>
where
    S: PriceStore + ?Sized,
{
    let body = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read listings file {}", path.display()))?;
    ingest_listings_body(store, retailer, &body, &path.display().to_string()).await
}

/// Parses a JSON listing array and ingests it for `retailer`.
pub(crate) async fn ingest_listings_body<S>(
    store: &S,
    retailer: &str,
    body: &str,
    context: &str,
) -> anyhow::Result<BatchReport>
where
    S: PriceStore + ?Sized,
{
    let listings = parse_listings(body, context)?;
    tracing::info!(retailer, listings = listings.len(), "ingesting listings");
    Ok(ingest_batch(store, &listings, retailer, Utc::now()).await)
}

/// Syncs every configured retailer feed in order.
///
/// # Errors
///
/// Returns an error only if the feed client cannot be built; feed failures
/// are reported per retailer.
pub(crate) async fn run_sync<S>(
    store: &S,
    config: &AppConfig,
) -> anyhow::Result<Vec<RetailerSyncStatus>>
where
    S: PriceStore + ?Sized,
{
    if config.retailer_feeds.is_empty() {
        tracing::warn!("no retailer feeds configured; nothing to sync");
        return Ok(Vec::new());
    }

    let client = FeedClient::new(config.feed_timeout_secs, &config.feed_user_agent)?;
    Ok(sync_retailers(store, &config.retailer_feeds, &client).await)
}

/// Backfills synthetic history for up to `limit` products, ending today.
///
/// # Errors
///
/// Returns an error if `limit` is outside `1..=1000` or the store cannot be
/// read.
pub(crate) async fn run_backfill<S>(
    store: &S,
    limit: i64,
    days: usize,
) -> anyhow::Result<BackfillReport>
where
    S: PriceStore + ?Sized,
{
    let limit = validate_backfill_limit(limit)?;
    let mut rng = StdRng::from_os_rng();
    let report = backfill_price_history(store, limit, days, Utc::now(), &mut rng)
        .await
        .context("price history backfill failed")?;
    Ok(report)
}

pub(crate) fn print_backfill_report(report: &BackfillReport) {
    println!(
        "backfill: products={} skipped={} failed={} entries={}",
        report.products, report.skipped, report.failed, report.entries
    );
}

pub(crate) fn print_batch_report(retailer: &str, report: &BatchReport) {
    println!(
        "{retailer}: processed={} skipped={} history_appended={}",
        report.processed, report.skipped, report.history_appended
    );
}

pub(crate) fn print_sync_results(results: &[RetailerSyncStatus]) {
    for result in results {
        match result.status {
            SyncStatus::Success => println!(
                "{:<12} success  {} product(s)",
                result.retailer, result.products_processed
            ),
            SyncStatus::Failed => println!(
                "{:<12} failed   {}",
                result.retailer,
                result.error.as_deref().unwrap_or("unknown error")
            ),
        }
    }
}
