//! Database operations for the `products` table.

use basketiq_core::{BaseUnit, NewProduct, NormalizedSize, Product, ProductFilter};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::numeric::{opt_to_f64, to_f64};
use crate::DbError;

/// Column list shared by every product read; expects `p` = products and
/// `r` = retailers.
const PRODUCT_COLUMNS: &str = "p.id, p.retailer_id, r.name AS retailer_name, p.external_id, \
     p.product_url, p.name, p.current_price, p.currency, p.category, p.brand, p.image_url, \
     p.base_quantity, p.base_unit, p.rating, p.badges, p.created_at, p.updated_at";

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `products` table joined with its retailer's name.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub retailer_id: i64,
    pub retailer_name: String,
    pub external_id: Option<String>,
    pub product_url: String,
    pub name: String,
    pub current_price: Decimal,
    pub currency: String,
    /// One of the lower-case category names; enforced by a CHECK constraint.
    pub category: String,
    pub brand: Option<String>,
    pub image_url: Option<String>,
    pub base_quantity: Option<Decimal>,
    pub base_unit: Option<String>,
    pub rating: Option<Decimal>,
    pub badges: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductRow {
    /// Converts the row into the domain record.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidValue`] if `category` or `base_unit` holds a
    /// value outside the closed sets.
    pub fn into_product(self) -> Result<Product, DbError> {
        Ok(Product {
            id: self.id,
            retailer_id: self.retailer_id,
            retailer_name: self.retailer_name,
            external_id: self.external_id,
            url: self.product_url,
            name: self.name,
            current_price: to_f64(self.current_price),
            currency: self.currency,
            category: self.category.parse()?,
            brand: self.brand,
            image_url: self.image_url,
            base_quantity: opt_to_f64(self.base_quantity),
            base_unit: self.base_unit.as_deref().map(str::parse::<BaseUnit>).transpose()?,
            rating: opt_to_f64(self.rating),
            badges: self.badges,
        })
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Looks a product up by its natural key.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_product_by_url(
    pool: &PgPool,
    retailer_id: i64,
    product_url: &str,
) -> Result<Option<ProductRow>, DbError> {
    let sql = format!(
        "SELECT {PRODUCT_COLUMNS} \
         FROM products p JOIN retailers r ON r.id = p.retailer_id \
         WHERE p.retailer_id = $1 AND p.product_url = $2"
    );
    let row = sqlx::query_as::<_, ProductRow>(&sql)
        .bind(retailer_id)
        .bind(product_url)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

/// Returns products matching `filter`, ordered by id.
///
/// Every filter field is optional; a `NULL` bind disables that predicate.
/// Unrated products never satisfy `min_rating`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_products(
    pool: &PgPool,
    filter: &ProductFilter,
) -> Result<Vec<ProductRow>, DbError> {
    let sql = format!(
        "SELECT {PRODUCT_COLUMNS} \
         FROM products p JOIN retailers r ON r.id = p.retailer_id \
         WHERE ($1::text IS NULL OR lower(r.name) = lower($1)) \
           AND ($2::text IS NULL OR strpos(lower(p.name), lower($2)) > 0) \
           AND ($3::text IS NULL OR p.category = $3) \
           AND ($4::float8 IS NULL OR p.rating >= $4::numeric) \
         ORDER BY p.id"
    );
    let rows = sqlx::query_as::<_, ProductRow>(&sql)
        .bind(&filter.retailer)
        .bind(&filter.name_contains)
        .bind(filter.category.map(|c| c.as_str()))
        .bind(filter.min_rating)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// Inserts a product.
///
/// A concurrent insert of the same `(retailer_id, product_url)` collapses
/// into the existing row, refreshing only price and size, so the natural
/// key never duplicates.
///
/// Prices and quantities are bound as `f64` and cast to fixed-scale
/// `NUMERIC` columns by the database engine.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_product(pool: &PgPool, product: &NewProduct) -> Result<ProductRow, DbError> {
    let sql = format!(
        "WITH p AS ( \
             INSERT INTO products \
                 (retailer_id, external_id, product_url, name, current_price, currency, \
                  category, brand, image_url, base_quantity, base_unit, rating, badges) \
             VALUES ($1, $2, $3, $4, $5::numeric(10,2), $6, \
                     $7, $8, $9, $10::numeric(12,3), $11, $12::numeric(3,2), $13) \
             ON CONFLICT (retailer_id, product_url) DO UPDATE SET \
                 current_price = EXCLUDED.current_price, \
                 base_quantity = EXCLUDED.base_quantity, \
                 base_unit     = EXCLUDED.base_unit, \
                 updated_at    = NOW() \
             RETURNING * \
         ) \
         SELECT {PRODUCT_COLUMNS} FROM p JOIN retailers r ON r.id = p.retailer_id"
    );
    let row = sqlx::query_as::<_, ProductRow>(&sql)
        .bind(product.retailer_id)
        .bind(&product.external_id)
        .bind(&product.url)
        .bind(&product.name)
        .bind(product.current_price)
        .bind(&product.currency)
        .bind(product.category.as_str())
        .bind(&product.brand)
        .bind(&product.image_url)
        .bind(product.size.base_quantity)
        .bind(product.size.base_unit.map(|u| u.as_str()))
        .bind(product.rating)
        .bind(&product.badges)
        .fetch_one(pool)
        .await?;

    Ok(row)
}

/// Overwrites a product's price and size; every other column is left alone.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no product has `product_id`, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn update_product_observation(
    pool: &PgPool,
    product_id: i64,
    current_price: f64,
    size: NormalizedSize,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE products SET \
             current_price = $2::numeric(10,2), \
             base_quantity = $3::numeric(12,3), \
             base_unit     = $4, \
             updated_at    = NOW() \
         WHERE id = $1",
    )
    .bind(product_id)
    .bind(current_price)
    .bind(size.base_quantity)
    .bind(size.base_unit.map(|u| u.as_str()))
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}
