//! Read-side price intelligence: matching, grouping, forecasting, scoring,
//! and recommendations.
//!
//! Everything here is a pure synchronous function over already-fetched
//! products and history.

pub mod fuzz;
pub mod grouper;
pub mod grouping;
pub mod matcher;
pub mod predictor;
pub mod recommendation;
pub mod report;
pub mod value;

pub use grouper::{group_by_specs, ProductSpecs};
pub use grouping::{group_by_keyword, ProductGroup};
pub use matcher::{best_match, is_main_product, preprocess_name, select_candidates};
pub use predictor::{predict_next_week_prices, PredictionResult};
pub use recommendation::generate_recommendation;
pub use report::{analyze_product, best_deals, ProductAnalysis};
pub use value::calculate_value_score;

#[cfg(test)]
pub(crate) mod test_support {
    use basketiq_core::{Category, Product};

    pub(crate) fn product(id: i64, name: &str, price: f64) -> Product {
        Product {
            id,
            retailer_id: 1,
            retailer_name: "Test Retailer".to_string(),
            external_id: None,
            url: format!("http://test.com/products/{id}"),
            name: name.to_string(),
            current_price: price,
            currency: "GBP".to_string(),
            category: Category::Others,
            brand: None,
            image_url: None,
            base_quantity: None,
            base_unit: None,
            rating: None,
            badges: None,
        }
    }
}
