use crate::predictor::{round2, PredictionResult};

const PRICE_WEIGHT: f64 = 0.6;
const PREDICTION_WEIGHT: f64 = 0.3;
const QUALITY_WEIGHT: f64 = 0.1;

/// Quality sub-score for products without a rating.
const NEUTRAL_QUALITY: f64 = 0.5;

/// Scores how good a deal a product is right now, rounded to 2 dp.
///
/// Cheaper prices, forecast drops, and higher ratings all raise the score.
/// The prediction sub-score uses the prediction's own `current_price` and is
/// zero when that price is zero.
#[must_use]
pub fn calculate_value_score(
    current_price: f64,
    rating: Option<f64>,
    prediction: &PredictionResult,
) -> f64 {
    let price_score = 1.0 / (1.0 + current_price);
    let prediction_score = prediction_score(prediction);
    let quality_score = rating.map_or(NEUTRAL_QUALITY, |r| round2(r / 5.0));

    round2(
        PRICE_WEIGHT * price_score
            + PREDICTION_WEIGHT * prediction_score
            + QUALITY_WEIGHT * quality_score,
    )
}

fn prediction_score(prediction: &PredictionResult) -> f64 {
    if prediction.current_price.abs() < f64::EPSILON {
        return 0.0;
    }
    let trend = prediction.predicted_price / prediction.current_price;
    round2(prediction.confidence * (1.0 - trend))
}
