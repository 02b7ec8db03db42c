//! Per-product analysis rows assembled from forecast, score and advice.

use basketiq_core::{PriceHistoryEntry, Product};
use serde::Serialize;

use crate::predictor::predict_next_week_prices;
use crate::recommendation::generate_recommendation;
use crate::value::calculate_value_score;

/// One analyzed product as exposed to API and CLI consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductAnalysis {
    pub id: i64,
    pub name: String,
    pub retailer: String,
    pub current_price: f64,
    pub predicted_price: f64,
    pub confidence: f64,
    pub recommendation: String,
    pub value_score: f64,
    pub image_url: Option<String>,
    pub url: String,
    pub rating: Option<f64>,
}

/// Runs forecast, value scoring, and recommendation for one product.
///
/// `history` must be in chronological order (oldest first).
#[must_use]
pub fn analyze_product(product: &Product, history: &[PriceHistoryEntry]) -> ProductAnalysis {
    let prices: Vec<f64> = history.iter().map(|h| h.price).collect();
    let prediction = predict_next_week_prices(&prices);

    ProductAnalysis {
        id: product.id,
        name: product.name.clone(),
        retailer: product.retailer_name.clone(),
        current_price: product.current_price,
        predicted_price: prediction.predicted_price,
        confidence: prediction.confidence,
        recommendation: generate_recommendation(&prediction, product.current_price),
        value_score: calculate_value_score(product.current_price, product.rating, &prediction),
        image_url: product.image_url.clone(),
        url: product.url.clone(),
        rating: product.rating,
    }
}

/// Orders analyses by value score, best deal first. Ties keep input order.
#[must_use]
pub fn best_deals(mut analyses: Vec<ProductAnalysis>) -> Vec<ProductAnalysis> {
    analyses.sort_by(|a, b| b.value_score.total_cmp(&a.value_score));
    analyses
}
