//! Turns one raw listing into retailer, product, and price-history writes.

use basketiq_core::{
    NewPriceHistory, NewProduct, NewRetailer, PriceStore, ProductObservation, RawListing,
};
use basketiq_normalize::{classify_category, normalize_size, normalize_unit_price};
use chrono::{DateTime, Utc};

use crate::error::IngestError;

const DEFAULT_CURRENCY: &str = "GBP";

/// What one successful ingestion did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOutcome {
    pub product_id: i64,
    pub product_created: bool,
    pub history_appended: bool,
}

#[allow(clippy::cast_possible_truncation)]
fn to_pence(price: f64) -> i64 {
    (price * 100.0).round() as i64
}

/// Ingests one scraped listing for `retailer_name`.
///
/// The retailer is resolved by exact name and the product by
/// `(retailer, url)`; both are created on first sight. A repeat observation
/// only refreshes the product's price and size. A history row is appended
/// when the product has none yet or the price moved by at least a penny, so
/// re-ingesting an unchanged listing writes no history.
///
/// # Errors
///
/// - [`IngestError::MissingField`] when `name`, `url`, or `price` is absent or blank.
/// - [`IngestError::InvalidPrice`] when the price is negative or not finite.
/// - [`IngestError::Store`] when any storage call fails.
pub async fn process_scraped_product<S>(
    store: &S,
    raw: &RawListing,
    retailer_name: &str,
    observed_at: DateTime<Utc>,
) -> Result<IngestOutcome, IngestError>
where
    S: PriceStore + ?Sized,
{
    let name = raw.trimmed_name().ok_or(IngestError::MissingField("name"))?;
    let url = raw.trimmed_url().ok_or(IngestError::MissingField("url"))?;
    let price = raw.price.ok_or(IngestError::MissingField("price"))?;
    if !price.is_finite() || price < 0.0 {
        return Err(IngestError::InvalidPrice(price));
    }

    let retailer = store
        .upsert_retailer(&NewRetailer {
            name: retailer_name.to_string(),
            base_url: raw.base_url.clone(),
            provides_rating: raw.provide_rating.unwrap_or(raw.rating.is_some()),
        })
        .await?;

    let size = normalize_size(raw.size.as_deref());

    let (product_id, product_created, price_changed) =
        match store.find_product(retailer.id, url).await? {
            Some(existing) => {
                let changed = to_pence(existing.current_price) != to_pence(price);
                store
                    .update_product_observation(
                        existing.id,
                        ProductObservation {
                            current_price: price,
                            size,
                        },
                    )
                    .await?;
                (existing.id, false, changed)
            }
            None => {
                let created = store
                    .insert_product(&NewProduct {
                        retailer_id: retailer.id,
                        external_id: raw.external_id.clone(),
                        url: url.to_string(),
                        name: name.to_string(),
                        current_price: price,
                        currency: raw
                            .currency
                            .clone()
                            .filter(|c| !c.trim().is_empty())
                            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
                        category: classify_category(name),
                        brand: raw.brand.clone(),
                        image_url: raw.image_url.clone(),
                        size,
                        rating: raw.rating,
                        badges: raw.badges.clone(),
                    })
                    .await?;
                tracing::debug!(
                    retailer = %retailer_name,
                    product_id = created.id,
                    category = %created.category,
                    "created product"
                );
                (created.id, true, true)
            }
        };

    let history_appended = price_changed || !store.has_price_history(product_id).await?;
    if history_appended {
        let offer = raw.offer_text();
        store
            .append_price_history(&NewPriceHistory {
                product_id,
                price,
                unit_price: normalize_unit_price(raw.unit_price.as_deref()),
                is_offer: offer.is_some(),
                offer_description: offer.map(str::to_string),
                valid_from: observed_at,
                scraped_at: observed_at,
            })
            .await?;
    }

    Ok(IngestOutcome {
        product_id,
        product_created,
        history_appended,
    })
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
