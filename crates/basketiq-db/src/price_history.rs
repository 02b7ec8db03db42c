//! Database operations for the append-only `price_history` table.

use basketiq_core::{NewPriceHistory, PriceHistoryEntry};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgArguments;
use sqlx::query::QueryScalar;
use sqlx::{PgPool, Postgres};

use crate::numeric::{opt_to_f64, to_f64};
use crate::DbError;

/// A row from the `price_history` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PriceHistoryRow {
    pub id: i64,
    pub product_id: i64,
    pub price: Decimal,
    pub unit_price: Option<Decimal>,
    pub unit_price_unit: Option<String>,
    pub is_offer: bool,
    pub offer_description: Option<String>,
    pub valid_from: DateTime<Utc>,
    pub scraped_at: DateTime<Utc>,
}

impl From<PriceHistoryRow> for PriceHistoryEntry {
    fn from(row: PriceHistoryRow) -> Self {
        Self {
            id: row.id,
            product_id: row.product_id,
            price: to_f64(row.price),
            unit_price: opt_to_f64(row.unit_price),
            unit_price_unit: row.unit_price_unit,
            is_offer: row.is_offer,
            offer_description: row.offer_description,
            valid_from: row.valid_from,
            scraped_at: row.scraped_at,
        }
    }
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn has_price_history(pool: &PgPool, product_id: i64) -> Result<bool, DbError> {
    let exists: bool = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM price_history WHERE product_id = $1)",
    )
    .bind(product_id)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

/// Appends one history row and returns its id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_price_history(
    pool: &PgPool,
    entry: &NewPriceHistory,
) -> Result<i64, DbError> {
    let id: i64 = bind_history(sqlx::query_scalar::<_, i64>(INSERT_HISTORY_SQL), entry)
        .fetch_one(pool)
        .await?;

    Ok(id)
}

/// Appends every entry inside one transaction and returns how many were
/// written. Nothing is kept if any insert fails.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the transaction or any insert fails.
pub async fn insert_price_history_batch(
    pool: &PgPool,
    entries: &[NewPriceHistory],
) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;

    for entry in entries {
        bind_history(sqlx::query_scalar::<_, i64>(INSERT_HISTORY_SQL), entry)
            .fetch_one(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(entries.len())
}

const INSERT_HISTORY_SQL: &str = "INSERT INTO price_history \
         (product_id, price, unit_price, unit_price_unit, is_offer, offer_description, \
          valid_from, scraped_at) \
     VALUES ($1, $2::numeric(10,2), $3::numeric(10,4), $4, $5, $6, $7, $8) \
     RETURNING id";

fn bind_history<'q>(
    query: QueryScalar<'q, Postgres, i64, PgArguments>,
    entry: &'q NewPriceHistory,
) -> QueryScalar<'q, Postgres, i64, PgArguments> {
    let (unit_price, unit_price_unit) = entry
        .unit_price
        .as_ref()
        .map(|u| (u.amount, u.unit.as_str()))
        .unzip();

    query
        .bind(entry.product_id)
        .bind(entry.price)
        .bind(unit_price)
        .bind(unit_price_unit)
        .bind(entry.is_offer)
        .bind(&entry.offer_description)
        .bind(entry.valid_from)
        .bind(entry.scraped_at)
}

/// Returns the newest `limit` rows for a product, oldest first.
///
/// Ordered by `valid_from DESC, id DESC` in SQL so the window is always the
/// latest, then reversed so callers see chronological order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_recent_price_history(
    pool: &PgPool,
    product_id: i64,
    limit: i64,
) -> Result<Vec<PriceHistoryRow>, DbError> {
    let mut rows = sqlx::query_as::<_, PriceHistoryRow>(
        "SELECT id, product_id, price, unit_price, unit_price_unit, is_offer, \
                offer_description, valid_from, scraped_at \
         FROM price_history \
         WHERE product_id = $1 \
         ORDER BY valid_from DESC, id DESC \
         LIMIT $2",
    )
    .bind(product_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.reverse();
    Ok(rows)
}
