//! Postgres-backed [`PriceStore`].

use async_trait::async_trait;
use basketiq_core::{
    NewPriceHistory, NewProduct, NewRetailer, PriceHistoryEntry, PriceStore, Product,
    ProductFilter, ProductObservation, Retailer, StoreError,
};
use sqlx::PgPool;

use crate::{price_history, products, retailers, DbError};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl From<DbError> for StoreError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound => StoreError::NotFound(e.to_string()),
            other => StoreError::Backend(Box::new(other)),
        }
    }
}

#[async_trait]
impl PriceStore for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        crate::ping(&self.pool).await.map_err(DbError::from)?;
        Ok(())
    }

    async fn upsert_retailer(&self, retailer: &NewRetailer) -> Result<Retailer, StoreError> {
        let row = retailers::upsert_retailer(&self.pool, retailer).await?;
        Ok(row.into())
    }

    async fn find_product(
        &self,
        retailer_id: i64,
        url: &str,
    ) -> Result<Option<Product>, StoreError> {
        let row = products::get_product_by_url(&self.pool, retailer_id, url).await?;
        Ok(row.map(products::ProductRow::into_product).transpose()?)
    }

    async fn insert_product(&self, product: &NewProduct) -> Result<Product, StoreError> {
        let row = products::insert_product(&self.pool, product).await?;
        Ok(row.into_product()?)
    }

    async fn update_product_observation(
        &self,
        product_id: i64,
        observation: ProductObservation,
    ) -> Result<(), StoreError> {
        products::update_product_observation(
            &self.pool,
            product_id,
            observation.current_price,
            observation.size,
        )
        .await?;
        Ok(())
    }

    async fn has_price_history(&self, product_id: i64) -> Result<bool, StoreError> {
        Ok(price_history::has_price_history(&self.pool, product_id).await?)
    }

    async fn append_price_history(&self, entry: &NewPriceHistory) -> Result<i64, StoreError> {
        Ok(price_history::insert_price_history(&self.pool, entry).await?)
    }

    async fn append_price_history_batch(
        &self,
        entries: &[NewPriceHistory],
    ) -> Result<usize, StoreError> {
        Ok(price_history::insert_price_history_batch(&self.pool, entries).await?)
    }

    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, StoreError> {
        let rows = products::list_products(&self.pool, filter).await?;
        Ok(rows
            .into_iter()
            .map(products::ProductRow::into_product)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn recent_price_history(
        &self,
        product_id: i64,
        limit: usize,
    ) -> Result<Vec<PriceHistoryEntry>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = price_history::list_recent_price_history(&self.pool, product_id, limit).await?;
        Ok(rows.into_iter().map(PriceHistoryEntry::from).collect())
    }
}
