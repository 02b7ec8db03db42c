//! Storage seam between the pipeline and its durable store.
//!
//! The ingestion engine and the API depend only on [`PriceStore`]; the
//! Postgres implementation lives in `basketiq-db` and [`memory::InMemoryStore`]
//! backs tests and local experiments.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    NewPriceHistory, NewProduct, NewRetailer, PriceHistoryEntry, Product, ProductFilter,
    ProductObservation, Retailer,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("in-memory store lock poisoned")]
    Poisoned,

    #[error("storage backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Abstract storage backend for retailers, products and price history.
///
/// | Method | Semantics |
/// |--------|-----------|
/// | `upsert_retailer` | get-or-create by exact name |
/// | `find_product` | lookup by natural key `(retailer_id, url)` |
/// | `insert_product` | create a product row |
/// | `update_product_observation` | overwrite price and size only |
/// | `append_price_history` | append-only history |
/// | `append_price_history_batch` | append many facts at once |
/// | `recent_price_history` | newest `limit` entries, oldest first |
#[async_trait]
pub trait PriceStore: Send + Sync {
    /// Verify the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Return the retailer named exactly `retailer.name`, creating it if absent.
    async fn upsert_retailer(&self, retailer: &NewRetailer) -> Result<Retailer, StoreError>;

    async fn find_product(&self, retailer_id: i64, url: &str)
        -> Result<Option<Product>, StoreError>;

    async fn insert_product(&self, product: &NewProduct) -> Result<Product, StoreError>;

    /// Overwrite `current_price`, `base_quantity` and `base_unit`; every other
    /// descriptive field keeps its first-ingestion value.
    async fn update_product_observation(
        &self,
        product_id: i64,
        observation: ProductObservation,
    ) -> Result<(), StoreError>;

    async fn has_price_history(&self, product_id: i64) -> Result<bool, StoreError>;

    /// Append one history fact and return its id.
    async fn append_price_history(&self, entry: &NewPriceHistory) -> Result<i64, StoreError>;

    /// Append every entry or none of them; returns the number written.
    async fn append_price_history_batch(
        &self,
        entries: &[NewPriceHistory],
    ) -> Result<usize, StoreError>;

    /// Products matching `filter`, in creation order.
    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, StoreError>;

    /// The newest `limit` history entries by `valid_from`, returned in
    /// chronological order (oldest first).
    async fn recent_price_history(
        &self,
        product_id: i64,
        limit: usize,
    ) -> Result<Vec<PriceHistoryEntry>, StoreError>;
}
