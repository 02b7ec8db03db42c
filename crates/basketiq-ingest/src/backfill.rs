//! Synthetic daily price history for products that only have a few real
//! observations.
//!
//! Each series is anchored on the product's latest observed price and unit
//! price: `price * (1 + seasonal + trend + noise + sale)`, with the unit price
//! scaled by the same factor so the price-to-unit-price ratio holds.

use std::f64::consts::PI;

use basketiq_core::{
    NewPriceHistory, PriceHistoryEntry, PriceStore, ProductFilter, StoreError, UnitPrice,
};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand_distr::StandardNormal;
use serde::Serialize;

use crate::error::BackfillError;

pub const DEFAULT_BACKFILL_DAYS: usize = 365;
pub const DEFAULT_BACKFILL_LIMIT: i64 = 100;
pub const MAX_BACKFILL_LIMIT: i64 = 1000;

const SEASONAL_AMPLITUDE: f64 = 0.1;
const TREND_RISE: f64 = 0.05;
const NOISE_STD_DEV: f64 = 0.02;
const SALE_DISCOUNT: f64 = -0.15;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BackfillReport {
    /// Products that received a generated series.
    pub products: usize,
    /// Products passed over because their latest observation has no unit price.
    pub skipped: usize,
    /// Products whose series could not be written.
    pub failed: usize,
    pub entries: usize,
}

/// Checks a requested product limit against `1..=1000`.
///
/// # Errors
///
/// Returns [`BackfillError::InvalidLimit`] outside that range.
pub fn validate_backfill_limit(limit: i64) -> Result<usize, BackfillError> {
    if (1..=MAX_BACKFILL_LIMIT).contains(&limit) {
        usize::try_from(limit).map_err(|_| BackfillError::InvalidLimit(limit))
    } else {
        Err(BackfillError::InvalidLimit(limit))
    }
}

#[allow(clippy::cast_precision_loss)]
fn linspace(start: f64, stop: f64, len: usize, i: usize) -> f64 {
    if len < 2 {
        return start;
    }
    start + (stop - start) * i as f64 / (len - 1) as f64
}

/// Three to five sale windows of three to six days at a flat discount.
fn sale_effect<R: Rng>(rng: &mut R, days: usize) -> Vec<f64> {
    let mut effect = vec![0.0; days];
    if days <= 7 {
        return effect;
    }
    for _ in 0..rng.random_range(3..6) {
        let start = rng.random_range(0..days - 7);
        let duration = rng.random_range(3..7);
        let end = (start + duration).min(days);
        effect[start..end].fill(SALE_DISCOUNT);
    }
    effect
}

/// Per-day factors applied to the anchor price, oldest first.
#[must_use]
pub fn price_factors<R: Rng>(rng: &mut R, days: usize) -> Vec<f64> {
    let sales = sale_effect(rng, days);
    (0..days)
        .map(|i| {
            let seasonal = linspace(0.0, 4.0 * PI, days, i).sin() * SEASONAL_AMPLITUDE;
            let trend = linspace(0.0, TREND_RISE, days, i);
            let noise: f64 = rng.sample::<f64, _>(StandardNormal) * NOISE_STD_DEV;
            1.0 + seasonal + trend + noise + sales[i]
        })
        .collect()
}

fn round2(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}

/// Builds `days` daily entries ending the day before `end`.
///
/// Returns `None` when `latest` has no unit price or a non-positive price.
#[must_use]
pub fn synthesize_history<R: Rng>(
    rng: &mut R,
    latest: &PriceHistoryEntry,
    days: usize,
    end: DateTime<Utc>,
) -> Option<Vec<NewPriceHistory>> {
    let base_unit_price = latest.unit_price?;
    let unit = latest.unit_price_unit.clone()?;
    if latest.price <= 0.0 {
        return None;
    }
    let ratio = base_unit_price / latest.price;
    let start = end - Duration::days(i64::try_from(days).ok()?);

    let entries = price_factors(rng, days)
        .into_iter()
        .zip(0_i64..)
        .map(|(factor, day)| {
            let price = latest.price * factor;
            let valid_from = start + Duration::days(day);
            NewPriceHistory {
                product_id: latest.product_id,
                price: round2(price),
                unit_price: Some(UnitPrice {
                    amount: round2(price * ratio),
                    unit: unit.clone(),
                }),
                is_offer: false,
                offer_description: None,
                valid_from,
                scraped_at: valid_from + Duration::hours(12),
            }
        })
        .collect();
    Some(entries)
}

/// Generates history for up to `limit` products whose latest observation
/// carries a unit price, in catalog order.
///
/// Products without one are skipped with a warning and do not count toward
/// `limit`. A failed write still counts toward `limit`; it is logged and the
/// run continues.
///
/// # Errors
///
/// Returns [`StoreError`] if the catalog or a product's history cannot be
/// read.
pub async fn backfill_price_history<S, R>(
    store: &S,
    limit: usize,
    days: usize,
    end: DateTime<Utc>,
    rng: &mut R,
) -> Result<BackfillReport, StoreError>
where
    S: PriceStore + ?Sized,
    R: Rng + Send,
{
    let mut report = BackfillReport::default();
    let products = store.list_products(&ProductFilter::default()).await?;

    for product in &products {
        if report.products + report.failed >= limit {
            break;
        }

        let latest = store.recent_price_history(product.id, 1).await?.pop();
        let Some(entries) = latest.and_then(|l| synthesize_history(rng, &l, days, end)) else {
            tracing::warn!(product = %product.name, "no unit price available, skipping");
            report.skipped += 1;
            continue;
        };

        match store.append_price_history_batch(&entries).await {
            Ok(written) => {
                tracing::info!(
                    product = %product.name,
                    entries = written,
                    "generated price history"
                );
                report.products += 1;
                report.entries += written;
            }
            Err(e) => {
                tracing::error!(
                    product = %product.name,
                    error = %e,
                    "price history generation failed"
                );
                report.failed += 1;
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
#[path = "backfill_test.rs"]
mod tests;
