//! Next-week price forecast from recent history.

use serde::{Deserialize, Serialize};

/// How many trailing observations are considered at all.
const HISTORY_WINDOW: usize = 14;

/// Positional weights over the last seven observations, oldest first.
const WEIGHTS: [f64; 7] = [0.7, 0.8, 0.9, 1.0, 0.9, 0.8, 0.7];

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub predicted_price: f64,
    /// In `[0, 1]`; zero when there is too little history to judge.
    pub confidence: f64,
    pub current_price: f64,
}

/// Rounds the exact binary value to two decimals, so `1.355` (stored just
/// below the tie) becomes `1.35`.
pub(crate) fn round2(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}

/// Forecasts next week's price from prices in chronological order.
///
/// Non-finite values are ignored. With no usable prices everything is zero;
/// with fewer than seven the last price is echoed at zero confidence.
/// Otherwise the prediction is a weighted mean of the last seven prices and
/// confidence is one minus their coefficient of variation.
#[must_use]
pub fn predict_next_week_prices(prices: &[f64]) -> PredictionResult {
    let usable: Vec<f64> = prices.iter().copied().filter(|p| p.is_finite()).collect();
    let recent = &usable[usable.len().saturating_sub(HISTORY_WINDOW)..];

    let Some(&current_price) = recent.last() else {
        return PredictionResult::default();
    };
    if recent.len() < WEIGHTS.len() {
        return PredictionResult {
            predicted_price: current_price,
            confidence: 0.0,
            current_price,
        };
    }

    let last = &recent[recent.len() - WEIGHTS.len()..];
    let weighted_sum: f64 = last.iter().zip(WEIGHTS).map(|(p, w)| p * w).sum();
    let predicted = weighted_sum / WEIGHTS.iter().sum::<f64>();

    PredictionResult {
        predicted_price: round2(predicted),
        confidence: round2(confidence(last)),
        current_price,
    }
}

#[allow(clippy::cast_precision_loss)]
fn confidence(prices: &[f64]) -> f64 {
    let n = prices.len() as f64;
    let mean = prices.iter().sum::<f64>() / n;
    if mean.abs() < f64::EPSILON {
        return 0.0;
    }
    let variance = prices.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / n;
    (1.0 - variance.sqrt() / mean).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_history_is_all_zero() {
        let result = predict_next_week_prices(&[]);
        assert_eq!(result, PredictionResult::default());
    }

    #[test]
    fn short_history_echoes_last_price() {
        let result = predict_next_week_prices(&[1.00, 1.10, 1.20]);
        assert!((result.predicted_price - 1.20).abs() < f64::EPSILON);
        assert!((result.current_price - 1.20).abs() < f64::EPSILON);
        assert!(result.confidence.abs() < f64::EPSILON);
    }

    #[test]
    fn constant_history_is_fully_confident() {
        let result = predict_next_week_prices(&[2.50; 7]);
        assert!((result.predicted_price - 2.50).abs() < f64::EPSILON);
        assert!((result.confidence - 1.0).abs() < f64::EPSILON);
        assert!((result.current_price - 2.50).abs() < f64::EPSILON);
    }

    #[test]
    fn weights_apply_positionally_to_last_seven() {
        // Only the fourth of the last seven differs; it carries weight 1.0.
        let prices = [9.0, 9.0, 1.0, 1.0, 1.0, 8.0, 1.0, 1.0, 1.0];
        let result = predict_next_week_prices(&prices);
        // (4.8 + 8.0) / 5.8
        assert!((result.predicted_price - 2.21).abs() < 1e-9);
        assert!((result.current_price - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn non_finite_prices_are_not_usable() {
        let mut prices = vec![1.0; 6];
        prices.push(f64::NAN);
        let result = predict_next_week_prices(&prices);
        // Six usable prices is short history.
        assert!(result.confidence.abs() < f64::EPSILON);
        assert!((result.current_price - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn volatile_history_lowers_confidence() {
        let result = predict_next_week_prices(&[1.0, 3.0, 1.0, 3.0, 1.0, 3.0, 1.0]);
        // mean 13/7, pstdev ~0.9897
        assert!((result.confidence - 0.47).abs() < 1e-9);
    }

    #[test]
    fn rounding_uses_the_exact_weighted_mean() {
        // The weighted mean is 1.355 in decimal but just under it in binary.
        let result = predict_next_week_prices(&[2.33, 2.24, 1.28, 0.67, 0.77, 1.08, 1.51]);
        assert!((result.predicted_price - 1.35).abs() < 1e-9);
        assert!((result.confidence - 0.57).abs() < 1e-9);
    }

    #[test]
    fn round2_keeps_two_decimals() {
        assert!((round2(2.004) - 2.0).abs() < f64::EPSILON);
        assert!((round2(0.996) - 1.0).abs() < f64::EPSILON);
        assert!((round2(-1.234) + 1.23).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_prices_do_not_divide_by_zero() {
        let result = predict_next_week_prices(&[0.0; 7]);
        assert!(result.confidence.abs() < f64::EPSILON);
        assert!(result.predicted_price.abs() < f64::EPSILON);
    }
}
