use crate::predictor::PredictionResult;

/// Smallest forecast move, in pounds, worth acting on.
const MOVE_THRESHOLD: f64 = 0.05;
const BUY_CONFIDENCE: f64 = 0.7;
const WAIT_CONFIDENCE: f64 = 0.6;

/// Turns a forecast into a buy/wait sentence for the shopper.
#[must_use]
pub fn generate_recommendation(prediction: &PredictionResult, current_price: f64) -> String {
    let diff = prediction.predicted_price - current_price;
    let confidence = prediction.confidence;

    if diff < -MOVE_THRESHOLD && confidence > BUY_CONFIDENCE {
        format!(
            "Good time to buy ({:.2} expected drop, {:.0}% confidence)",
            diff.abs(),
            confidence * 100.0
        )
    } else if diff > MOVE_THRESHOLD && confidence > WAIT_CONFIDENCE {
        format!(
            "Consider waiting ({diff:.2} expected rise, {:.0}% confidence)",
            confidence * 100.0
        )
    } else if (0.0..=MOVE_THRESHOLD).contains(&diff) {
        "Stable pricing expected, buy anytime".to_string()
    } else {
        "No strong recommendation".to_string()
    }
}
