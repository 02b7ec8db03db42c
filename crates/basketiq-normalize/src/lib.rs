//! Text normalization for retailer listings: pack sizes, unit prices, and
//! coarse categories.
//!
//! Every function here is total. Unparseable input yields an empty result
//! (and, for unit prices, a `warn` event) rather than an error.

pub mod category;
pub mod size;
pub mod unit_price;

pub use category::classify_category;
pub use size::normalize_size;
pub use unit_price::normalize_unit_price;
