//! Pack-size parsing: `"500g"`, `"1.5 kg"`, `"4 pack"`.

use std::sync::LazyLock;

use basketiq_core::{BaseUnit, NormalizedSize};
use regex::Regex;

static NUMBER_THEN_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*([a-z]*)").expect("valid size regex")
});

/// Maps a raw unit token (already lower-cased) onto the closed unit set.
/// Anything unrecognized, including an empty token, counts as `units`.
fn canonical_unit(token: &str) -> BaseUnit {
    match token {
        "g" | "gram" | "grams" => BaseUnit::Grams,
        "kg" | "kgs" | "kilogram" | "kilograms" => BaseUnit::Kilograms,
        "l" | "litre" | "litres" | "liter" | "liters" => BaseUnit::Liters,
        "ml" | "millilitre" | "millilitres" | "milliliter" | "milliliters" => {
            BaseUnit::Milliliters
        }
        _ => BaseUnit::Units,
    }
}

/// Parses the first "number then word" in a retailer size string.
///
/// Returns [`NormalizedSize::unknown`] when the text is absent or holds no
/// number, logging a warning for non-blank text; never fails.
#[must_use]
pub fn normalize_size(text: Option<&str>) -> NormalizedSize {
    let Some(text) = text.filter(|t| !t.trim().is_empty()) else {
        return NormalizedSize::unknown();
    };
    let Some(caps) = NUMBER_THEN_WORD.captures(text) else {
        tracing::warn!(text, "size text has no quantity");
        return NormalizedSize::unknown();
    };
    let quantity = match caps[1].parse::<f64>() {
        Ok(quantity) => quantity,
        Err(e) => {
            tracing::warn!(text, error = %e, "size quantity did not parse");
            return NormalizedSize::unknown();
        }
    };
    let unit = canonical_unit(&caps[2].to_lowercase());
    NormalizedSize::new(quantity, unit)
}

#[cfg(test)]
#[path = "size_test.rs"]
mod tests;
