//! In-memory [`PriceStore`] implementation for tests and local runs.
//!
//! All tables sit behind one `std::sync::RwLock` so every trait call observes
//! a consistent snapshot. Ids are assigned sequentially from 1.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::models::{
    NewPriceHistory, NewProduct, NewRetailer, PriceHistoryEntry, Product, ProductFilter,
    ProductObservation, Retailer,
};

use super::{PriceStore, StoreError};

#[derive(Default)]
struct Tables {
    retailers: Vec<Retailer>,
    products: Vec<Product>,
    history: Vec<PriceHistoryEntry>,
}

/// In-memory store for tests and local experiments.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables.write().map_err(|_| StoreError::Poisoned)
    }
}

fn next_id(len: usize) -> i64 {
    i64::try_from(len).map_or(i64::MAX, |n| n + 1)
}

fn push_history(tables: &mut Tables, entry: &NewPriceHistory) -> i64 {
    let id = next_id(tables.history.len());
    let (unit_price, unit_price_unit) = entry
        .unit_price
        .as_ref()
        .map(|u| (u.amount, u.unit.clone()))
        .unzip();
    tables.history.push(PriceHistoryEntry {
        id,
        product_id: entry.product_id,
        price: entry.price,
        unit_price,
        unit_price_unit,
        is_offer: entry.is_offer,
        offer_description: entry.offer_description.clone(),
        valid_from: entry.valid_from,
        scraped_at: entry.scraped_at,
    });
    id
}

#[async_trait]
impl PriceStore for InMemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.read().map(|_| ())
    }

    async fn upsert_retailer(&self, retailer: &NewRetailer) -> Result<Retailer, StoreError> {
        let mut tables = self.write()?;
        if let Some(existing) = tables.retailers.iter().find(|r| r.name == retailer.name) {
            return Ok(existing.clone());
        }
        let created = Retailer {
            id: next_id(tables.retailers.len()),
            name: retailer.name.clone(),
            base_url: retailer.base_url.clone(),
            provides_rating: retailer.provides_rating,
        };
        tables.retailers.push(created.clone());
        Ok(created)
    }

    async fn find_product(
        &self,
        retailer_id: i64,
        url: &str,
    ) -> Result<Option<Product>, StoreError> {
        let tables = self.read()?;
        Ok(tables
            .products
            .iter()
            .find(|p| p.retailer_id == retailer_id && p.url == url)
            .cloned())
    }

    async fn insert_product(&self, product: &NewProduct) -> Result<Product, StoreError> {
        let mut tables = self.write()?;
        let retailer_name = tables
            .retailers
            .iter()
            .find(|r| r.id == product.retailer_id)
            .map(|r| r.name.clone())
            .ok_or_else(|| StoreError::NotFound(format!("retailer {}", product.retailer_id)))?;
        let created = Product {
            id: next_id(tables.products.len()),
            retailer_id: product.retailer_id,
            retailer_name,
            external_id: product.external_id.clone(),
            url: product.url.clone(),
            name: product.name.clone(),
            current_price: product.current_price,
            currency: product.currency.clone(),
            category: product.category,
            brand: product.brand.clone(),
            image_url: product.image_url.clone(),
            base_quantity: product.size.base_quantity,
            base_unit: product.size.base_unit,
            rating: product.rating,
            badges: product.badges.clone(),
        };
        tables.products.push(created.clone());
        Ok(created)
    }

    async fn update_product_observation(
        &self,
        product_id: i64,
        observation: ProductObservation,
    ) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        let product = tables
            .products
            .iter_mut()
            .find(|p| p.id == product_id)
            .ok_or_else(|| StoreError::NotFound(format!("product {product_id}")))?;
        product.current_price = observation.current_price;
        product.base_quantity = observation.size.base_quantity;
        product.base_unit = observation.size.base_unit;
        Ok(())
    }

    async fn has_price_history(&self, product_id: i64) -> Result<bool, StoreError> {
        let tables = self.read()?;
        Ok(tables.history.iter().any(|h| h.product_id == product_id))
    }

    async fn append_price_history(&self, entry: &NewPriceHistory) -> Result<i64, StoreError> {
        let mut tables = self.write()?;
        Ok(push_history(&mut tables, entry))
    }

    async fn append_price_history_batch(
        &self,
        entries: &[NewPriceHistory],
    ) -> Result<usize, StoreError> {
        let mut tables = self.write()?;
        for entry in entries {
            push_history(&mut tables, entry);
        }
        Ok(entries.len())
    }

    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, StoreError> {
        let tables = self.read()?;
        Ok(tables
            .products
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect())
    }

    async fn recent_price_history(
        &self,
        product_id: i64,
        limit: usize,
    ) -> Result<Vec<PriceHistoryEntry>, StoreError> {
        let tables = self.read()?;
        let mut entries: Vec<PriceHistoryEntry> = tables
            .history
            .iter()
            .filter(|h| h.product_id == product_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| a.valid_from.cmp(&b.valid_from).then(a.id.cmp(&b.id)));
        let skip = entries.len().saturating_sub(limit);
        Ok(entries.split_off(skip))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::models::{Category, NormalizedSize, UnitPrice};

    fn new_retailer(name: &str) -> NewRetailer {
        NewRetailer {
            name: name.to_string(),
            base_url: None,
            provides_rating: false,
        }
    }

    fn new_product(retailer_id: i64, url: &str, price: f64) -> NewProduct {
        NewProduct {
            retailer_id,
            external_id: None,
            url: url.to_string(),
            name: "Test Product".to_string(),
            current_price: price,
            currency: "GBP".to_string(),
            category: Category::Others,
            brand: Some("Test Brand".to_string()),
            image_url: None,
            size: NormalizedSize::unknown(),
            rating: None,
            badges: None,
        }
    }

    #[tokio::test]
    async fn upsert_retailer_is_exact_and_case_sensitive() {
        let store = InMemoryStore::new();
        let first = store.upsert_retailer(&new_retailer("aldi")).await.unwrap();
        let again = store.upsert_retailer(&new_retailer("aldi")).await.unwrap();
        let other = store.upsert_retailer(&new_retailer("Aldi")).await.unwrap();
        assert_eq!(first.id, again.id);
        assert_ne!(first.id, other.id);
    }

    #[tokio::test]
    async fn insert_product_requires_known_retailer() {
        let store = InMemoryStore::new();
        let err = store
            .insert_product(&new_product(99, "http://a.com/1", 1.0))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_observation_keeps_descriptive_fields() {
        let store = InMemoryStore::new();
        let retailer = store.upsert_retailer(&new_retailer("aldi")).await.unwrap();
        let product = store
            .insert_product(&new_product(retailer.id, "http://a.com/1", 1.99))
            .await
            .unwrap();

        store
            .update_product_observation(
                product.id,
                ProductObservation {
                    current_price: 2.49,
                    size: NormalizedSize::new(500.0, crate::BaseUnit::Grams),
                },
            )
            .await
            .unwrap();

        let found = store
            .find_product(retailer.id, "http://a.com/1")
            .await
            .unwrap()
            .expect("product exists");
        assert!((found.current_price - 2.49).abs() < f64::EPSILON);
        assert_eq!(found.base_quantity, Some(500.0));
        assert_eq!(found.brand.as_deref(), Some("Test Brand"));
        assert_eq!(found.retailer_name, "aldi");
    }

    #[tokio::test]
    async fn recent_price_history_returns_newest_window_oldest_first() {
        let store = InMemoryStore::new();
        let retailer = store.upsert_retailer(&new_retailer("aldi")).await.unwrap();
        let product = store
            .insert_product(&new_product(retailer.id, "http://a.com/1", 1.0))
            .await
            .unwrap();
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();

        // Appended out of order to prove sorting by valid_from.
        for day in [2_i64, 0, 3, 1] {
            let at = start + Duration::days(day);
            #[allow(clippy::cast_precision_loss)]
            let price = 1.0 + day as f64;
            store
                .append_price_history(&NewPriceHistory {
                    product_id: product.id,
                    price,
                    unit_price: Some(UnitPrice {
                        amount: 0.5,
                        unit: "100g".to_string(),
                    }),
                    is_offer: false,
                    offer_description: None,
                    valid_from: at,
                    scraped_at: at,
                })
                .await
                .unwrap();
        }

        let window = store.recent_price_history(product.id, 3).await.unwrap();
        let prices: Vec<f64> = window.iter().map(|h| h.price).collect();
        assert_eq!(prices, vec![2.0, 3.0, 4.0]);
        assert_eq!(window[0].unit_price_unit.as_deref(), Some("100g"));
        assert!(store.has_price_history(product.id).await.unwrap());
    }

    #[tokio::test]
    async fn batch_append_writes_every_entry() {
        let store = InMemoryStore::new();
        let retailer = store.upsert_retailer(&new_retailer("aldi")).await.unwrap();
        let product = store
            .insert_product(&new_product(retailer.id, "http://a.com/1", 1.0))
            .await
            .unwrap();
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();

        let entries: Vec<NewPriceHistory> = (0..3)
            .map(|day| NewPriceHistory {
                product_id: product.id,
                price: 1.0,
                unit_price: None,
                is_offer: false,
                offer_description: None,
                valid_from: start + Duration::days(day),
                scraped_at: start + Duration::days(day),
            })
            .collect();

        let written = store.append_price_history_batch(&entries).await.unwrap();
        assert_eq!(written, 3);

        let history = store
            .recent_price_history(product.id, usize::MAX)
            .await
            .unwrap();
        let ids: Vec<i64> = history.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
