//! Database operations for the `retailers` table.

use basketiq_core::{NewRetailer, Retailer};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `retailers` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RetailerRow {
    pub id: i64,
    pub name: String,
    pub base_url: Option<String>,
    pub provides_rating: bool,
    pub created_at: DateTime<Utc>,
}

impl From<RetailerRow> for Retailer {
    fn from(row: RetailerRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            base_url: row.base_url,
            provides_rating: row.provides_rating,
        }
    }
}

/// Returns the retailer named exactly `retailer.name`, inserting it first if
/// absent.
///
/// An existing row is returned untouched; the no-op `DO UPDATE` only exists
/// so `RETURNING` yields the row on conflict.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_retailer(
    pool: &PgPool,
    retailer: &NewRetailer,
) -> Result<RetailerRow, DbError> {
    let row = sqlx::query_as::<_, RetailerRow>(
        "INSERT INTO retailers (name, base_url, provides_rating) \
         VALUES ($1, $2, $3) \
         ON CONFLICT (name) DO UPDATE SET name = retailers.name \
         RETURNING id, name, base_url, provides_rating, created_at",
    )
    .bind(&retailer.name)
    .bind(&retailer.base_url)
    .bind(retailer.provides_rating)
    .fetch_one(pool)
    .await?;

    Ok(row)
}
