//! `NUMERIC` columns are read as [`Decimal`] and handed to the domain as `f64`.
//!
//! Writes bind `f64` and cast to the column's scale in SQL, so prices are
//! rounded to pence on persistence.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

pub(crate) fn to_f64(value: Decimal) -> f64 {
    // Every in-range NUMERIC(10,2) value has an f64 approximation.
    value.to_f64().unwrap_or_default()
}

pub(crate) fn opt_to_f64(value: Option<Decimal>) -> Option<f64> {
    value.and_then(|v| v.to_f64())
}
