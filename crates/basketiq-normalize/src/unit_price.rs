//! Unit-price parsing: `"£1.45 per 1L"`, `"20p per 100ml"`, `"£0.20/100ml"`.
//!
//! Patterns are tried in a fixed order and the first match wins. The loose
//! `<amount> per <unit>` form is last so the currency-marked forms are never
//! shadowed by it.

use std::sync::LazyLock;

use basketiq_core::UnitPrice;
use regex::Regex;

/// Amount transform applied to the captured number.
type Transform = fn(f64) -> f64;

fn pounds(amount: f64) -> f64 {
    amount
}

fn pence(amount: f64) -> f64 {
    amount / 100.0
}

static UNIT_PRICE_POLICIES: LazyLock<Vec<(Regex, Transform)>> = LazyLock::new(|| {
    const AMOUNT: &str = r"(\d+(?:\.\d+)?)";
    const UNIT: &str = r"([0-9.]*\s*[a-z]+)";
    let policies: [(String, Transform); 5] = [
        (format!(r"(?i)£\s*{AMOUNT}\s*per\s*{UNIT}"), pounds),
        (format!(r"(?i){AMOUNT}p\s+per\s*{UNIT}"), pence),
        (format!(r"(?i)£\s*{AMOUNT}\s*/\s*{UNIT}"), pounds),
        (format!(r"(?i){AMOUNT}\s*p\s*/\s*{UNIT}"), pence),
        (format!(r"(?i){AMOUNT}\s*per\s*{UNIT}"), pounds),
    ];
    policies
        .into_iter()
        .map(|(pattern, transform)| {
            (
                Regex::new(&pattern).expect("valid unit price regex"),
                transform,
            )
        })
        .collect()
});

/// Parses a free-text "price per unit" string into pounds and a compact unit.
///
/// The unit is lower-cased with whitespace removed. Returns `None` (and logs
/// a warning) when no pattern matches or the amount does not parse.
#[must_use]
pub fn normalize_unit_price(text: Option<&str>) -> Option<UnitPrice> {
    let text = text.map(str::trim).filter(|t| !t.is_empty())?;

    for (pattern, transform) in UNIT_PRICE_POLICIES.iter() {
        let Some(caps) = pattern.captures(text) else {
            continue;
        };
        let amount = match caps[1].parse::<f64>() {
            Ok(amount) => transform(amount),
            Err(e) => {
                tracing::warn!(text, error = %e, "unit price amount did not parse");
                return None;
            }
        };
        let unit: String = caps[2]
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();
        return Some(UnitPrice { amount, unit });
    }

    tracing::warn!(text, "unrecognized unit price format");
    None
}

#[cfg(test)]
#[path = "unit_price_test.rs"]
mod tests;
